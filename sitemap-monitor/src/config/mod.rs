//! Runtime configuration.
//!
//! [`MonitorConfig`] is assembled from the parsed command line (every option
//! can also come from the environment) and validated once at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::monitor::PollSchedule;
use crate::notification::WebhookConfig;
use crate::{Error, Result};

/// Placeholder replaced by the product id in [`ProductUrlTemplate`].
pub const ID_PLACEHOLDER: &str = "{id}";

/// Canonical storefront URL for a product id, e.g.
/// `https://shop.example.com/us/item/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUrlTemplate(String);

impl ProductUrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(Error::config(format!(
                "product URL template must contain {ID_PLACEHOLDER}: {template}"
            )));
        }
        Ok(Self(template))
    }

    /// Derive `<sitemap directory>/<marker>/{id}` from the sitemap URL.
    pub fn derive(sitemap_url: &url::Url, marker: &str) -> Result<Self> {
        let base = sitemap_url
            .join(&format!("{marker}/"))
            .map_err(|e| Error::config(format!("cannot derive product URL: {e}")))?;
        Self::new(format!("{base}{ID_PLACEHOLDER}"))
    }

    pub fn render(&self, id: &str) -> String {
        self.0.replace(ID_PLACEHOLDER, id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fully resolved monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub sitemap_url: url::Url,
    pub id_marker: String,
    pub product_urls: ProductUrlTemplate,
    pub state_file: PathBuf,
    pub schedule: PollSchedule,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// `None` disables notifications.
    pub webhook: Option<WebhookConfig>,
    pub log_dir: Option<PathBuf>,
    pub run_once: bool,
}

impl MonitorConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let sitemap_url = url::Url::parse(&args.sitemap_url)
            .map_err(|e| Error::config(format!("invalid sitemap URL {}: {e}", args.sitemap_url)))?;

        let id_marker = args.id_marker.trim_matches('/').to_string();
        if id_marker.is_empty() {
            return Err(Error::config("id path marker must not be empty"));
        }

        let product_urls = match args.product_url_template.as_deref() {
            Some(template) => ProductUrlTemplate::new(template)?,
            None => ProductUrlTemplate::derive(&sitemap_url, &id_marker)?,
        };

        let webhook = args
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|url| WebhookConfig::new(url, args.webhook_text_field.as_str()));

        Ok(Self {
            sitemap_url,
            id_marker,
            product_urls,
            state_file: args.state_file.clone(),
            schedule: PollSchedule {
                interval: Duration::from_secs(args.interval_secs),
                backoff_pause: Duration::from_secs(args.backoff_secs),
                error_threshold: args.error_threshold,
            },
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            user_agent: args.user_agent.clone(),
            webhook,
            log_dir: args.log_dir.clone(),
            run_once: args.once,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http_client::DEFAULT_USER_AGENT;

    // Not parsed: clap would pick up an exported SITEMAP_URL or WEBHOOK_URL
    fn args() -> Args {
        Args {
            once: false,
            sitemap_url: "https://shop.example.com/us/sitemap.xml".to_string(),
            product_url_template: None,
            id_marker: "item".to_string(),
            state_file: PathBuf::from("monitor-state.json"),
            interval_secs: 60,
            backoff_secs: 300,
            error_threshold: 5,
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            webhook_url: None,
            webhook_text_field: "content".to_string(),
            log_dir: None,
        }
    }

    #[test]
    fn test_template_requires_placeholder() {
        assert!(ProductUrlTemplate::new("https://shop.example.com/item/").is_err());
        let t = ProductUrlTemplate::new("https://shop.example.com/item/{id}/").unwrap();
        assert_eq!(t.render("N1"), "https://shop.example.com/item/N1/");
    }

    #[test]
    fn test_template_derived_from_sitemap_directory() {
        let config = MonitorConfig::from_args(&args()).unwrap();
        assert_eq!(
            config.product_urls.render("N0001"),
            "https://shop.example.com/us/item/N0001"
        );
        assert!(config.webhook.is_none());
        assert!(!config.run_once);
        assert_eq!(config.schedule.interval, Duration::from_secs(60));
        assert_eq!(config.schedule.error_threshold, 5);
    }

    #[test]
    fn test_explicit_template_and_trimmed_marker() {
        let mut a = args();
        a.id_marker = "/p/".to_string();
        a.product_url_template = Some("https://m.example.com/p/{id}".to_string());

        let config = MonitorConfig::from_args(&a).unwrap();
        assert_eq!(config.id_marker, "p");
        assert_eq!(config.product_urls.render("X"), "https://m.example.com/p/X");
    }

    #[test]
    fn test_webhook_and_once() {
        let mut a = args();
        a.once = true;
        a.webhook_url = Some("https://hooks.example.com/abc".to_string());
        a.webhook_text_field = "text".to_string();

        let config = MonitorConfig::from_args(&a).unwrap();
        assert!(config.run_once);
        assert_eq!(
            config.webhook,
            Some(WebhookConfig::new("https://hooks.example.com/abc", "text"))
        );
    }

    #[test]
    fn test_blank_webhook_disables_notifier() {
        let mut a = args();
        a.webhook_url = Some("  ".to_string());
        let config = MonitorConfig::from_args(&a).unwrap();
        assert!(config.webhook.is_none());
    }

    #[test]
    fn test_invalid_sitemap_url() {
        let mut a = args();
        a.sitemap_url = "::nope".to_string();
        assert!(matches!(
            MonitorConfig::from_args(&a),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut a = args();
        a.id_marker = "/".to_string();
        assert!(matches!(
            MonitorConfig::from_args(&a),
            Err(Error::Configuration(_))
        ));
    }
}
