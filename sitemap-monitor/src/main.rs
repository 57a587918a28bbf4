use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sitemap_monitor::cli::Args;
use sitemap_monitor::config::MonitorConfig;
use sitemap_monitor::logging;
use sitemap_monitor::monitor::MonitorService;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = MonitorConfig::from_args(&args)?;

    let _log_guard = logging::init_logging(config.log_dir.as_deref())?;
    if let Some(dir) = config.log_dir.as_deref() {
        logging::cleanup_old_logs(dir).await;
    }

    info!(
        sitemap = %config.sitemap_url,
        state_file = %config.state_file.display(),
        product_urls = config.product_urls.as_str(),
        "sitemap-monitor initialized"
    );

    let service = MonitorService::from_config(&config)?;

    if config.run_once {
        return Ok(match service.run_once().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "Single cycle failed");
                ExitCode::FAILURE
            }
        });
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    service.run(cancel).await;
    Ok(ExitCode::SUCCESS)
}
