//! HTTP Producer Module
//!
//! Wraps a reqwest client as the producer side of the cache: a fetch is a
//! GET against an upstream JSON API. The cache owns the timeout; the
//! producer itself never retries.

use anyhow::{bail, Context};
use serde_json::Value;

// == HTTP Producer ==
/// Upstream JSON fetcher backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpProducer {
    client: reqwest::Client,
}

impl HttpProducer {
    /// Creates a producer with a fresh client.
    pub fn new() -> Self {
        Self::default()
    }

    // == Fetch JSON ==
    /// GETs `url` and returns its JSON body.
    ///
    /// Non-2xx statuses and undecodable bodies are producer failures; the
    /// cause is passed through to the caller unchanged.
    pub async fn fetch_json(&self, url: &str) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("upstream returned {}", status);
        }

        let value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON body from {}", url))?;
        Ok(value)
    }
}
