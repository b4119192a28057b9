//! HTTP download of bootstrap scripts.

use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{BootError, Result};

use super::ScriptFetcher;

/// Downloads scripts over HTTP/HTTPS with a hard timeout.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("macboot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, timeout })
    }

    fn get(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            bail!("HTTP {}", response.status());
        }

        let body = response.text()?;
        if body.trim().is_empty() {
            bail!("empty response body");
        }
        Ok(body)
    }
}

impl ScriptFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {} (timeout {:?})", url, self.timeout);
        self.get(url).map_err(|e| BootError::FetchFailed {
            url: url.to_string(),
            message: format!("{:#}", e),
        })
    }
}
