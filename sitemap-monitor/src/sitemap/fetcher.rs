use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::parser::{SitemapProduct, parse_sitemap};
use crate::{Error, Result};

/// Result of one conditional sitemap fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapFetch {
    /// False when the server answered "not modified".
    pub changed: bool,
    /// Validator to send next time; empty disables conditional caching.
    pub token: String,
    pub products: Vec<SitemapProduct>,
}

impl SitemapFetch {
    /// A "not modified" answer echoing the prior token.
    pub fn unchanged(prior_token: impl Into<String>) -> Self {
        Self {
            changed: false,
            token: prior_token.into(),
            products: Vec::new(),
        }
    }

    pub fn changed(token: impl Into<String>, products: Vec<SitemapProduct>) -> Self {
        Self {
            changed: true,
            token: token.into(),
            products,
        }
    }
}

/// Source of sitemap snapshots.
#[async_trait]
pub trait SitemapSource: Send + Sync {
    /// Fetch the sitemap, sending `prior_token` as a cache validator when it
    /// is non-empty.
    ///
    /// Any failure other than "not modified" is an error; it never means
    /// "no changes".
    async fn fetch(&self, prior_token: &str) -> Result<SitemapFetch>;
}

/// Sitemap fetched over HTTP with `If-None-Match`.
pub struct HttpSitemapFetcher {
    client: Client,
    url: String,
    id_marker: String,
}

impl HttpSitemapFetcher {
    pub fn new(client: Client, url: impl Into<String>, id_marker: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            id_marker: id_marker.into(),
        }
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapFetcher {
    async fn fetch(&self, prior_token: &str) -> Result<SitemapFetch> {
        let mut request = self.client.get(&self.url);
        if !prior_token.is_empty() {
            match HeaderValue::from_str(prior_token) {
                Ok(value) => request = request.header(header::IF_NONE_MATCH, value),
                Err(_) => warn!(
                    token = prior_token,
                    "Stored cache token is not a valid header value, fetching unconditionally"
                ),
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_MODIFIED {
            debug!(url = %self.url, "Sitemap not modified");
            return Ok(SitemapFetch::unchanged(prior_token));
        }
        if !status.is_success() {
            return Err(Error::unexpected_status(&self.url, status.as_u16()));
        }

        let token = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response.text().await?;
        let products = parse_sitemap(&body, &self.id_marker)?;

        debug!(
            url = %self.url,
            bytes = body.len(),
            products = products.len(),
            etag = %token,
            "Sitemap fetched"
        );

        Ok(SitemapFetch::changed(token, products))
    }
}
