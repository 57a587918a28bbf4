//! Liveness probing.
//!
//! A product counts as live once its probe URL answers a HEAD request with
//! a success status.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Checks whether a probe URL currently resolves.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// `None` or an empty URL is never live. Errors count as "not live";
    /// callers re-probe on the next cycle instead of retrying here.
    async fn is_live(&self, probe_url: Option<&str>) -> bool;
}

/// HEAD-request prober.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// The client should carry a browser-like user agent and a timeout.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LivenessProbe for HttpProber {
    async fn is_live(&self, probe_url: Option<&str>) -> bool {
        let Some(url) = probe_url.map(str::trim).filter(|u| !u.is_empty()) else {
            return false;
        };

        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Probe not live");
                false
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Probe request failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http_client::{DEFAULT_USER_AGENT, build_client};
    use std::time::Duration;

    fn prober() -> HttpProber {
        HttpProber::new(build_client(DEFAULT_USER_AGENT, Duration::from_secs(2)).unwrap())
    }

    #[tokio::test]
    async fn test_missing_url_is_not_live() {
        assert!(!prober().is_live(None).await);
        assert!(!prober().is_live(Some("  ")).await);
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_live() {
        assert!(!prober().is_live(Some("not a url")).await);
    }
}
