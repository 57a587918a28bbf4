//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::utils::http_client::DEFAULT_USER_AGENT;

/// Watch a product sitemap and announce new products once they go live.
#[derive(Parser, Debug, Clone)]
#[command(name = "sitemap-monitor", version, about, long_about = None)]
pub struct Args {
    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Sitemap to watch
    #[arg(long, env = "SITEMAP_URL")]
    pub sitemap_url: String,

    /// Canonical product URL with an `{id}` placeholder
    /// [default: <sitemap directory>/<id marker>/{id}]
    #[arg(long, env = "PRODUCT_URL_TEMPLATE")]
    pub product_url_template: Option<String>,

    /// Path segment that precedes the product id in sitemap URLs
    #[arg(long, env = "ID_PATH_MARKER", default_value = "item")]
    pub id_marker: String,

    /// Where the monitor state document is kept
    #[arg(long, env = "STATE_FILE", default_value = "monitor-state.json")]
    pub state_file: PathBuf,

    /// Seconds between poll cycles
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 60)]
    pub interval_secs: u64,

    /// Seconds to pause after repeated failed cycles
    #[arg(long, env = "BACKOFF_PAUSE_SECS", default_value_t = 300)]
    pub backoff_secs: u64,

    /// Consecutive failed cycles before pausing
    #[arg(long, env = "ERROR_THRESHOLD", default_value_t = 5)]
    pub error_threshold: u32,

    /// Timeout for every outbound request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// User agent sent with sitemap and probe requests
    #[arg(long, env = "MONITOR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Webhook receiving notifications; notifications are only logged without it
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// JSON field carrying the message text in the webhook payload
    #[arg(long, env = "WEBHOOK_TEXT_FIELD", default_value = "content")]
    pub webhook_text_field: String,

    /// Also write daily-rotated log files into this directory
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}
