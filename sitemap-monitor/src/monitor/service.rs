//! Poll loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::backoff::{FailureTracker, PollDelay, PollSchedule};
use super::cycle::{CycleReport, Monitor};
use super::prober::HttpProber;
use crate::Result;
use crate::config::MonitorConfig;
use crate::notification::{Notifier, WebhookChannel};
use crate::sitemap::HttpSitemapFetcher;
use crate::state::JsonFileStore;
use crate::utils::http_client;

/// Runs [`Monitor`] cycles one at a time on a fixed schedule.
pub struct MonitorService {
    monitor: Monitor,
    schedule: PollSchedule,
}

impl MonitorService {
    pub fn new(monitor: Monitor, schedule: PollSchedule) -> Self {
        Self { monitor, schedule }
    }

    /// Wire the HTTP and file-backed implementations from configuration.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let client = http_client::build_client(&config.user_agent, config.request_timeout)?;

        let notifier = match &config.webhook {
            Some(webhook) => {
                Notifier::new(Arc::new(WebhookChannel::with_client(webhook.clone(), client.clone())))
            }
            None => {
                warn!("WEBHOOK_URL not set; changes will be logged but not announced");
                Notifier::disabled()
            }
        };

        let monitor = Monitor::new(
            Arc::new(JsonFileStore::new(&config.state_file)),
            Arc::new(HttpSitemapFetcher::new(
                client.clone(),
                config.sitemap_url.as_str(),
                &config.id_marker,
            )),
            Arc::new(HttpProber::new(client)),
            notifier,
            config.product_urls.clone(),
        );

        Ok(Self::new(monitor, config.schedule))
    }

    /// Run exactly one cycle.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let result = self.monitor.run_cycle().await;
        match &result {
            Ok(report) => log_report(report),
            Err(e) => warn!(error = %e, "Poll cycle failed"),
        }
        result
    }

    /// Poll until `cancel` fires.
    ///
    /// A cycle in flight is allowed to finish; cancellation is observed
    /// between cycles and during sleeps.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.schedule.interval.as_secs(),
            "Sitemap monitor started"
        );

        let mut failures = FailureTracker::new();

        while !cancel.is_cancelled() {
            let succeeded = self.run_once().await.is_ok();
            failures = failures.after_cycle(succeeded);

            let delay = failures.next_delay(&self.schedule);
            match delay {
                PollDelay::Backoff(pause) => warn!(
                    consecutive_errors = failures.consecutive(),
                    pause_secs = pause.as_secs(),
                    "Too many consecutive failures, pausing"
                ),
                PollDelay::Interval(_) if !succeeded => warn!(
                    consecutive_errors = failures.consecutive(),
                    "Cycle failed, retrying on next tick"
                ),
                PollDelay::Interval(_) => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay.duration()) => {}
            }
        }

        info!("Sitemap monitor stopped");
    }
}

fn log_report(report: &CycleReport) {
    info!(
        outcome = ?report.outcome,
        new = report.new_count,
        removed = report.removed_count,
        live = report.live_count,
        staged = report.staged_count,
        resolved = report.resolved_count,
        "Poll cycle complete"
    );
}
