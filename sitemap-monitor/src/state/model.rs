use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product seen in the sitemap whose probe URL did not resolve yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchItem {
    /// Product identifier, unique within the watchlist.
    pub id: String,
    /// URL whose reachability decides liveness.
    #[serde(rename = "imageUrl", default)]
    pub probe_url: Option<String>,
    /// When the product was first detected.
    pub first_seen: DateTime<Utc>,
}

impl WatchItem {
    pub fn new(id: impl Into<String>, probe_url: Option<String>, first_seen: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            probe_url,
            first_seen,
        }
    }
}

/// The persisted snapshot.
///
/// `known_ids` tracks the sitemap as of the last *changed* fetch and is left
/// untouched on a cache hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    /// Validator from the last full fetch; empty when there was none.
    #[serde(rename = "etag")]
    pub cache_token: String,
    #[serde(rename = "productIds")]
    pub known_ids: BTreeSet<String>,
    pub watch_list: Vec<WatchItem>,
    /// Ids already announced as live. They are retired for good, so the set
    /// only grows: an id stays here after it leaves the sitemap, which is
    /// what keeps a re-listed product from being announced twice.
    #[serde(default)]
    pub confirmed_ids: BTreeSet<String>,
}

impl MonitorState {
    /// True before the first successful full fetch.
    pub fn is_pristine(&self) -> bool {
        self.known_ids.is_empty() && self.cache_token.is_empty()
    }

    pub fn is_watching(&self, id: &str) -> bool {
        self.watch_list.iter().any(|item| item.id == id)
    }

    pub fn is_confirmed(&self, id: &str) -> bool {
        self.confirmed_ids.contains(id)
    }

    /// Append to the watchlist unless the id is already watched or retired.
    ///
    /// Returns whether the item was added.
    pub fn stage(&mut self, item: WatchItem) -> bool {
        if self.is_watching(&item.id) || self.is_confirmed(&item.id) {
            return false;
        }
        self.watch_list.push(item);
        true
    }

    /// Retire ids that were announced as live.
    pub fn confirm<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            let id = id.into();
            self.watch_list.retain(|item| item.id != id);
            self.confirmed_ids.insert(id);
        }
    }
}
