//! Shell command execution.
//!
//! Every command runs under a deadline and a [`CancelToken`]. A child that
//! outlives either is killed and reported as an error, so no external
//! install can block the run forever.
//!
//! On unix each command leads its own process group. Killing a command
//! kills the group, so nothing it started keeps running after it is
//! reported as timed out or cancelled.

use crate::error::{BootError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

static INTERRUPT: OnceLock<CancelToken> = OnceLock::new();
static INTERRUPT_HANDLER: Once = Once::new();

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty unless captured).
    pub stdout: String,

    /// Standard error (empty unless captured).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Turn a non-zero exit into [`BootError::CommandFailed`].
    pub fn check(self, command: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(BootError::CommandFailed {
                command: command.to_string(),
                code: self.exit_code,
            })
        }
    }

    /// Last few lines of stderr, for error reports.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the process env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,

    /// Kill the command after this long.
    pub timeout: Option<Duration>,

    /// Interpreter for the command string. Defaults to `/bin/sh`.
    pub shell: Option<PathBuf>,

    /// Hand the command the terminal: stdin, stdout and stderr are
    /// inherited and its process group becomes the foreground group, so it
    /// can prompt (for a sudo password, say). Capture flags are ignored.
    pub interactive: bool,
}

impl CommandOptions {
    /// Options that capture both streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run attached to the terminal. See [`interactive`](Self::interactive).
    pub fn attached(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }
}

/// Shared flag that aborts running commands.
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of current and future commands.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The process-wide token cancelled by Ctrl-C.
    ///
    /// The first call installs a SIGINT handler; later calls return the same
    /// token. A second Ctrl-C after cancellation terminates the process.
    pub fn on_interrupt() -> Self {
        let token = INTERRUPT.get_or_init(CancelToken::new).clone();
        INTERRUPT_HANDLER.call_once(sys::install_interrupt_handler);
        token
    }
}

/// Something that can run shell commands.
///
/// Steps talk to this trait so tests can record commands instead of
/// executing them.
pub trait CommandRunner {
    /// Run a command to completion. A non-zero exit is `Ok` with
    /// `success == false`; spawn failures, timeouts, and cancellation
    /// are `Err`.
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult>;
}

/// Runs commands through a real shell.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    cancel: CancelToken,
    stream_output: bool,
}

impl ShellRunner {
    /// Create a runner bound to a cancel token.
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            stream_output: false,
        }
    }

    /// Let command output through to the terminal instead of capturing it.
    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        let mut options = options.clone();
        if self.stream_output {
            options.capture_stdout = false;
            options.capture_stderr = false;
        }
        tracing::debug!("Running command: {}", command);
        execute(command, &options, &self.cancel)
    }
}

/// Execute a shell command, honoring timeout and cancellation.
pub fn execute(
    command: &str,
    options: &CommandOptions,
    cancel: &CancelToken,
) -> Result<CommandResult> {
    if cancel.is_cancelled() {
        return Err(BootError::CommandCancelled {
            command: command.to_string(),
        });
    }

    let start = Instant::now();
    let shell = options
        .shell
        .clone()
        .unwrap_or_else(|| PathBuf::from("/bin/sh"));

    let mut cmd = Command::new(&shell);
    cmd.arg("-c").arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    if options.interactive {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    } else {
        cmd.stdin(Stdio::null())
            .stdout(output(options.capture_stdout))
            .stderr(output(options.capture_stderr));
    }
    sys::isolate(&mut cmd);

    let mut child = cmd.spawn().map_err(|e| {
        tracing::warn!("Failed to spawn {}: {}", shell.display(), e);
        BootError::CommandFailed {
            command: command.to_string(),
            code: None,
        }
    })?;

    let _terminal = options.interactive.then(|| sys::Foreground::give(&child));

    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let deadline = options.timeout.map(|t| start + t);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if cancel.is_cancelled() {
            kill(&mut child);
            return Err(BootError::CommandCancelled {
                command: command.to_string(),
            });
        }
        if let (Some(deadline), Some(timeout)) = (deadline, options.timeout) {
            if Instant::now() >= deadline {
                kill(&mut child);
                return Err(BootError::CommandTimedOut {
                    command: command.to_string(),
                    timeout,
                });
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    if sys::interrupted(&status) {
        cancel.cancel();
        return Err(BootError::CommandCancelled {
            command: command.to_string(),
        });
    }

    let stdout = collect(stdout_reader);
    let stderr = collect(stderr_reader);
    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Quote a string for inclusion in a POSIX shell command.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn output(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    sys::kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
mod sys {
    use super::INTERRUPT;
    use std::os::unix::process::{CommandExt, ExitStatusExt};
    use std::process::{Child, Command, ExitStatus};

    /// Start the command as the leader of a new process group.
    pub(super) fn isolate(cmd: &mut Command) {
        cmd.process_group(0);
    }

    pub(super) fn kill_group(child: &Child) {
        // SAFETY: killpg only sends a signal. The group id is the child's
        // pid because the child was started by `isolate`.
        unsafe {
            libc::killpg(child.id() as libc::pid_t, libc::SIGKILL);
        }
    }

    /// Whether the command died from Ctrl-C at the terminal.
    pub(super) fn interrupted(status: &ExitStatus) -> bool {
        status.signal() == Some(libc::SIGINT)
    }

    pub(super) fn install_interrupt_handler() {
        // SAFETY: the handler only touches atomics and async-signal-safe calls.
        unsafe {
            libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
        }
    }

    extern "C" fn on_sigint(_: libc::c_int) {
        let Some(token) = INTERRUPT.get() else {
            return;
        };
        if token.is_cancelled() {
            // SAFETY: signal and raise are async-signal-safe.
            unsafe {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
                libc::raise(libc::SIGINT);
            }
        } else {
            token.cancel();
        }
    }

    /// Makes a child's process group the terminal's foreground group until
    /// dropped. Does nothing when stdin is not a terminal this process owns.
    pub(super) struct Foreground {
        restore: Option<libc::pid_t>,
    }

    impl Foreground {
        pub(super) fn give(child: &Child) -> Self {
            let group = child.id() as libc::pid_t;
            // SAFETY: terminal-control calls on our own stdin.
            unsafe {
                let fd = libc::STDIN_FILENO;
                let ours = libc::getpgrp();
                if libc::isatty(fd) != 1 || libc::tcgetpgrp(fd) != ours {
                    return Self { restore: None };
                }
                let handed = set_foreground(fd, group);
                // The child may already have stopped reading the terminal.
                libc::killpg(group, libc::SIGCONT);
                Self {
                    restore: handed.then_some(ours),
                }
            }
        }
    }

    impl Drop for Foreground {
        fn drop(&mut self) {
            if let Some(ours) = self.restore {
                // SAFETY: see `give`.
                unsafe {
                    set_foreground(libc::STDIN_FILENO, ours);
                }
            }
        }
    }

    /// `tcsetpgrp` with SIGTTOU ignored, so a background caller is not stopped.
    unsafe fn set_foreground(fd: libc::c_int, group: libc::pid_t) -> bool {
        let previous = libc::signal(libc::SIGTTOU, libc::SIG_IGN);
        let ok = libc::tcsetpgrp(fd, group) == 0;
        libc::signal(libc::SIGTTOU, previous);
        ok
    }
}

#[cfg(not(unix))]
mod sys {
    use std::process::{Child, Command, ExitStatus};

    pub(super) fn isolate(_cmd: &mut Command) {}

    pub(super) fn kill_group(_child: &Child) {}

    pub(super) fn interrupted(_status: &ExitStatus) -> bool {
        false
    }

    pub(super) fn install_interrupt_handler() {}

    pub(super) struct Foreground;

    impl Foreground {
        pub(super) fn give(_child: &Child) -> Self {
            Foreground
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::captured(), &CancelToken::new())
            .unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::captured(), &CancelToken::new()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn check_converts_failure_to_error() {
        let result = execute("exit 1", &CommandOptions::captured(), &CancelToken::new()).unwrap();
        let err = result.check("exit 1").unwrap_err();
        assert!(matches!(err, BootError::CommandFailed { code: Some(1), .. }));
    }

    #[test]
    fn execute_with_env() {
        let options = CommandOptions::captured().with_env("MACBOOT_TEST_VAR", "my_value");

        let result = execute("echo $MACBOOT_TEST_VAR", &options, &CancelToken::new()).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..CommandOptions::captured()
        };

        let result = execute("pwd", &options, &CancelToken::new()).unwrap();

        assert!(result.success);
    }

    #[test]
    fn execute_times_out() {
        let options = CommandOptions::captured().with_timeout(Duration::from_millis(200));
        let start = Instant::now();

        let err = execute("sleep 5", &options, &CancelToken::new()).unwrap_err();

        assert!(matches!(err, BootError::CommandTimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn execute_honors_cancelled_token() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = execute("echo never", &CommandOptions::captured(), &cancel).unwrap_err();

        assert!(matches!(err, BootError::CommandCancelled { .. }));
    }

    #[test]
    fn cancel_from_another_thread_kills_child() {
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            remote.cancel();
        });

        let err = execute("sleep 5", &CommandOptions::captured(), &cancel).unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, BootError::CommandCancelled { .. }));
    }

    #[test]
    fn timeout_kills_everything_the_command_started() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("marker");
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..CommandOptions::captured().with_timeout(Duration::from_millis(200))
        };

        let err = execute("/bin/sh -c 'sleep 1; touch marker'; true", &options, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, BootError::CommandTimedOut { .. }));

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists(), "child of a timed-out command kept running");
    }

    #[test]
    fn cancel_kills_everything_the_command_started() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("marker");
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..CommandOptions::captured()
        };
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            remote.cancel();
        });

        let err = execute("/bin/sh -c 'sleep 1; touch marker'; true", &options, &cancel)
            .unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, BootError::CommandCancelled { .. }));

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn death_by_sigint_counts_as_interrupt() {
        use std::os::unix::process::ExitStatusExt;
        use std::process::ExitStatus;

        assert!(sys::interrupted(&ExitStatus::from_raw(libc::SIGINT)));
        assert!(!sys::interrupted(&ExitStatus::from_raw(libc::SIGTERM)));
        assert!(!sys::interrupted(&ExitStatus::from_raw(1 << 8)));
    }

    #[test]
    fn attached_command_still_runs_and_times_out() {
        let options = CommandOptions::default().attached();
        assert!(options.interactive);
        assert!(execute("true", &options, &CancelToken::new()).unwrap().success);

        let options = options.with_timeout(Duration::from_millis(200));
        let err = execute("sleep 5", &options, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, BootError::CommandTimedOut { .. }));
    }

    #[test]
    fn interrupt_token_is_shared() {
        let first = CancelToken::on_interrupt();
        let second = CancelToken::on_interrupt();
        assert!(Arc::ptr_eq(&first.0, &second.0));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let result = CommandResult::failure(
            Some(1),
            String::new(),
            "one\ntwo\nthree\n".to_string(),
            Duration::ZERO,
        );
        assert_eq!(result.stderr_tail(2), "two\nthree");
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        let result = execute(
            &format!("printf %s {}", shell_quote("a 'b' c")),
            &CommandOptions::captured(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(result.stdout, "a 'b' c");
    }

    #[test]
    fn shell_runner_captures_by_default() {
        let mut runner = ShellRunner::new(CancelToken::new());
        let result = runner
            .run("echo captured", &CommandOptions::captured())
            .unwrap();
        assert!(result.stdout.contains("captured"));
    }
}
