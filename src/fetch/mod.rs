//! Remote script retrieval.
//!
//! - [`http`] - reqwest-backed [`HttpFetcher`]

pub mod http;

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{BootError, Result};

pub use http::HttpFetcher;

/// Downloads the text of a script.
pub trait ScriptFetcher {
    /// Fetch `url` and return its body.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Serves canned scripts, for tests. Unknown URLs fail.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    scripts: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl StaticFetcher {
    /// Create with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_script(mut self, url: &str, body: &str) -> Self {
        self.scripts.insert(url.to_string(), body.to_string());
        self
    }

    /// URLs requested so far.
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ScriptFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requested.borrow_mut().push(url.to_string());
        self.scripts
            .get(url)
            .cloned()
            .ok_or_else(|| BootError::FetchFailed {
                url: url.to_string(),
                message: "no canned script".to_string(),
            })
    }
}
