//! Watchlist reconciliation.

use futures::future::join_all;

use super::prober::LivenessProbe;
use crate::state::WatchItem;

/// Watchlist split by the latest probe results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub now_live: Vec<WatchItem>,
    pub still_pending: Vec<WatchItem>,
}

/// Probe every watched item and partition the list, keeping relative order
/// within each side.
pub async fn reconcile(watch_list: Vec<WatchItem>, prober: &dyn LivenessProbe) -> Reconciliation {
    let results = join_all(
        watch_list
            .iter()
            .map(|item| prober.is_live(item.probe_url.as_deref())),
    )
    .await;

    let mut reconciliation = Reconciliation::default();
    for (item, live) in watch_list.into_iter().zip(results) {
        if live {
            reconciliation.now_live.push(item);
        } else {
            reconciliation.still_pending.push(item);
        }
    }
    reconciliation
}
