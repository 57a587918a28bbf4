use std::collections::{BTreeSet, HashMap};

use crate::sitemap::SitemapProduct;

/// Set difference between the known ids and a fresh sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDiff {
    /// Every id in the fetched sitemap.
    pub fetched_ids: BTreeSet<String>,
    /// Fetched but not known, one entry per id in document order.
    pub new_products: Vec<SitemapProduct>,
    /// Known but no longer listed.
    pub removed_ids: BTreeSet<String>,
}

impl SitemapDiff {
    /// Compute the diff. When an id is listed several times, the first entry
    /// carrying a probe URL wins.
    pub fn compute(known_ids: &BTreeSet<String>, products: &[SitemapProduct]) -> Self {
        let mut fetched_ids = BTreeSet::new();
        let mut new_products: Vec<SitemapProduct> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for product in products {
            fetched_ids.insert(product.id.clone());
            if known_ids.contains(&product.id) {
                continue;
            }
            match index.get(product.id.as_str()) {
                Some(&i) => {
                    if new_products[i].probe_url.is_none() && product.probe_url.is_some() {
                        new_products[i].probe_url = product.probe_url.clone();
                    }
                }
                None => {
                    index.insert(&product.id, new_products.len());
                    new_products.push(product.clone());
                }
            }
        }

        let removed_ids = known_ids.difference(&fetched_ids).cloned().collect();

        Self {
            fetched_ids,
            new_products,
            removed_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, probe: Option<&str>) -> SitemapProduct {
        SitemapProduct {
            id: id.to_string(),
            probe_url: probe.map(str::to_string),
            loc: format!("https://s.example.com/item/{id}"),
        }
    }

    fn known(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn new_ids(diff: &SitemapDiff) -> Vec<&str> {
        diff.new_products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_new_and_removed_are_disjoint() {
        let diff = SitemapDiff::compute(
            &known(&["A", "B"]),
            &[product("A", None), product("C", Some("c.jpg"))],
        );

        assert_eq!(new_ids(&diff), ["C"]);
        assert_eq!(diff.removed_ids, known(&["B"]));
        assert_eq!(diff.fetched_ids, known(&["A", "C"]));
        assert!(new_ids(&diff).iter().all(|id| !diff.removed_ids.contains(*id)));
    }

    #[test]
    fn test_duplicate_new_id_collapses_and_keeps_probe() {
        let diff = SitemapDiff::compute(
            &known(&[]),
            &[
                product("D", None),
                product("E", None),
                product("D", Some("d.jpg")),
            ],
        );

        assert_eq!(new_ids(&diff), ["D", "E"]);
        assert_eq!(diff.new_products[0].probe_url.as_deref(), Some("d.jpg"));
    }

    #[test]
    fn test_unchanged_sitemap_has_empty_diff() {
        let diff = SitemapDiff::compute(&known(&["A"]), &[product("A", None)]);
        assert!(diff.new_products.is_empty());
        assert!(diff.removed_ids.is_empty());
    }
}
