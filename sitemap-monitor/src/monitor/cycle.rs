//! One poll cycle: reconcile, fetch, diff, classify, notify, commit.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info};

use super::diff::SitemapDiff;
use super::prober::LivenessProbe;
use super::reconciler::reconcile;
use crate::Result;
use crate::config::ProductUrlTemplate;
use crate::notification::{NotificationEvent, Notifier, ProductLink};
use crate::sitemap::{SitemapProduct, SitemapSource};
use crate::state::{MonitorState, StateStore, WatchItem};

/// How a successful cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The sitemap was not modified.
    Unchanged,
    /// First full fetch; ids adopted without notifications.
    Baseline,
    /// The sitemap changed and was diffed.
    Changed,
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Ids listed now that were not known before.
    pub new_count: usize,
    pub removed_count: usize,
    /// New ids announced live right away.
    pub live_count: usize,
    /// New ids added to the watchlist.
    pub staged_count: usize,
    /// Watched ids that went live during reconciliation.
    pub resolved_count: usize,
}

impl CycleReport {
    fn short_circuit(outcome: CycleOutcome, resolved_count: usize) -> Self {
        Self {
            outcome,
            new_count: 0,
            removed_count: 0,
            live_count: 0,
            staged_count: 0,
            resolved_count,
        }
    }
}

/// The sitemap change monitor.
///
/// Holds no state between cycles: every cycle starts from what the store
/// returns and ends with a single save.
pub struct Monitor {
    store: Arc<dyn StateStore>,
    source: Arc<dyn SitemapSource>,
    prober: Arc<dyn LivenessProbe>,
    notifier: Notifier,
    product_urls: ProductUrlTemplate,
}

impl Monitor {
    pub fn new(
        store: Arc<dyn StateStore>,
        source: Arc<dyn SitemapSource>,
        prober: Arc<dyn LivenessProbe>,
        notifier: Notifier,
        product_urls: ProductUrlTemplate,
    ) -> Self {
        Self {
            store,
            source,
            prober,
            notifier,
            product_urls,
        }
    }

    fn links<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<ProductLink> {
        ids.into_iter()
            .map(|id| ProductLink::new(id, self.product_urls.render(id)))
            .collect()
    }

    /// Run one cycle.
    ///
    /// On error nothing is persisted or announced; the next cycle starts
    /// again from the last saved state.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut state = self.store.load().await;
        let pristine = state.is_pristine();

        let resolved = self.reconcile(&mut state).await;
        let resolved_count = resolved.len();

        let fetch = self.source.fetch(&state.cache_token).await?;

        if !resolved.is_empty() {
            let event = NotificationEvent::products_live(
                self.links(resolved.iter().map(|item| item.id.as_str())),
            );
            self.notifier.notify(&event).await;
        }

        if !fetch.changed {
            debug!("Sitemap unchanged");
            self.store.save(&state).await?;
            return Ok(CycleReport::short_circuit(
                CycleOutcome::Unchanged,
                resolved_count,
            ));
        }

        let diff = SitemapDiff::compute(&state.known_ids, &fetch.products);

        if pristine {
            info!(
                products = diff.fetched_ids.len(),
                "Recorded baseline sitemap snapshot"
            );
            state.known_ids = diff.fetched_ids;
            state.cache_token = fetch.token;
            self.store.save(&state).await?;
            return Ok(CycleReport::short_circuit(
                CycleOutcome::Baseline,
                resolved_count,
            ));
        }

        if !diff.removed_ids.is_empty() {
            info!(
                count = diff.removed_ids.len(),
                ids = ?diff.removed_ids,
                "Products removed from sitemap"
            );
        }

        let new_count = diff.new_products.len();
        let (live_now, staged) = self.classify(&state, &diff.new_products).await;

        if !live_now.is_empty() {
            let event = NotificationEvent::products_live(
                self.links(live_now.iter().map(|p| p.id.as_str())),
            );
            self.notifier.notify(&event).await;
        }
        if !staged.is_empty() {
            let event = NotificationEvent::products_detected(
                self.links(staged.iter().map(|p| p.id.as_str())),
            );
            self.notifier.notify(&event).await;
        }

        let first_seen = Utc::now();
        for product in &staged {
            state.stage(WatchItem::new(
                product.id.clone(),
                product.probe_url.clone(),
                first_seen,
            ));
        }
        let staged_count = staged.len();
        state.confirm(live_now.iter().map(|p| p.id.clone()));
        state.known_ids = diff.fetched_ids;
        state.cache_token = fetch.token;
        self.store.save(&state).await?;

        info!(
            new = new_count,
            removed = diff.removed_ids.len(),
            live = live_now.len(),
            staged = staged_count,
            "Sitemap changes committed"
        );

        Ok(CycleReport {
            outcome: CycleOutcome::Changed,
            new_count,
            removed_count: diff.removed_ids.len(),
            live_count: live_now.len(),
            staged_count,
            resolved_count,
        })
    }

    /// Re-probe the watchlist and retire whatever went live.
    ///
    /// Returns the retired items; they are announced once the fetch succeeds.
    async fn reconcile(&self, state: &mut MonitorState) -> Vec<WatchItem> {
        if state.watch_list.is_empty() {
            return Vec::new();
        }

        let watch_list = std::mem::take(&mut state.watch_list);
        let result = reconcile(watch_list, self.prober.as_ref()).await;
        state.watch_list = result.still_pending;

        if result.now_live.is_empty() {
            debug!(pending = state.watch_list.len(), "No watched product went live");
            return Vec::new();
        }

        info!(
            count = result.now_live.len(),
            pending = state.watch_list.len(),
            "Watched products went live"
        );
        state.confirm(result.now_live.iter().map(|item| item.id.clone()));
        result.now_live
    }

    /// Probe new products, splitting them into live and staged. Products
    /// already confirmed, or still watched from an earlier listing, are left
    /// out of both.
    async fn classify(
        &self,
        state: &MonitorState,
        new_products: &[SitemapProduct],
    ) -> (Vec<SitemapProduct>, Vec<SitemapProduct>) {
        let candidates: Vec<&SitemapProduct> = new_products
            .iter()
            .filter(|product| {
                if state.is_confirmed(&product.id) {
                    debug!(id = %product.id, "Skipping product that was already announced");
                    return false;
                }
                !state.is_watching(&product.id)
            })
            .collect();

        let results = join_all(
            candidates
                .iter()
                .map(|product| self.prober.is_live(product.probe_url.as_deref())),
        )
        .await;

        let mut live_now = Vec::new();
        let mut staged = Vec::new();
        for (product, live) in candidates.into_iter().zip(results) {
            debug!(id = %product.id, loc = %product.loc, live, "Probed new product");
            if live {
                live_now.push(product.clone());
            } else {
                staged.push(product.clone());
            }
        }
        (live_now, staged)
    }
}
