//! Sitemap change monitor.
//!
//! The monitor is responsible for:
//! - Re-probing watched products and announcing the ones that went live
//! - Fetching the sitemap conditionally and diffing it against known ids
//! - Classifying new products as live or staged for later probing
//! - Committing the merged state once per cycle
//! - Scheduling cycles and pausing after repeated failures

mod backoff;
mod cycle;
mod diff;
mod prober;
mod reconciler;
mod service;

pub use backoff::{FailureTracker, PollDelay, PollSchedule};
pub use cycle::{CycleOutcome, CycleReport, Monitor};
pub use diff::SitemapDiff;
pub use prober::{HttpProber, LivenessProbe};
pub use reconciler::{Reconciliation, reconcile};
pub use service::MonitorService;
