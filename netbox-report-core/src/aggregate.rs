//! Single-pass accumulation of items into report buckets.
//!
//! Sites are kept in `BTreeMap`s so iteration is alphabetical; heading and
//! subheading order comes from the [`Taxonomy`] at render time.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::model::Item;
use crate::taxonomy::{Classification, Taxonomy};

/// Items sharing one `(site, heading, subheading)` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    pub count: usize,
    pub items: Vec<Item>,
}

impl Bucket {
    fn push(&mut self, item: Item) {
        self.count += 1;
        self.items.push(item);
    }

    /// Items ordered by name, ties broken by kind and NetBox ID.
    pub fn sorted_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.kind.cmp(&b.kind))
                .then(a.id.cmp(&b.id))
        });
        items
    }
}

pub type SiteBuckets = BTreeMap<Classification, Bucket>;

/// Classified inventory: site → classification → bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub sites: BTreeMap<String, SiteBuckets>,
    pub skipped_inactive: usize,
    pub skipped_excluded: usize,
}

impl Inventory {
    /// Drops items that are not `active` or whose role is excluded, then
    /// classifies every remaining item into exactly one bucket.
    pub fn accumulate<I>(items: I, taxonomy: &Taxonomy) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let mut inventory = Inventory::default();
        for item in items {
            if !item.is_active() {
                debug!(name = %item.name, status = %item.status, "Skipping inactive item");
                inventory.skipped_inactive += 1;
                continue;
            }
            if taxonomy.is_excluded(item.role_id) {
                debug!(name = %item.name, role_id = ?item.role_id, "Skipping excluded role");
                inventory.skipped_excluded += 1;
                continue;
            }
            let class = taxonomy.classify(item.role_id);
            inventory
                .sites
                .entry(item.site.clone())
                .or_default()
                .entry(class)
                .or_default()
                .push(item);
        }
        info!(
            sites = inventory.sites.len(),
            classified = inventory.total(),
            skipped_inactive = inventory.skipped_inactive,
            skipped_excluded = inventory.skipped_excluded,
            "Aggregated inventory"
        );
        inventory
    }

    pub fn total(&self) -> usize {
        self.sites.keys().map(|site| self.site_total(site)).sum()
    }

    pub fn site_total(&self, site: &str) -> usize {
        self.sites
            .get(site)
            .map(|buckets| buckets.values().map(|b| b.count).sum())
            .unwrap_or(0)
    }

    /// Buckets of one site in taxonomy order. Keys the taxonomy does not know
    /// sort after known ones, alphabetically.
    pub fn ordered_buckets<'a>(
        &'a self,
        site: &str,
        taxonomy: &Taxonomy,
    ) -> Vec<(&'a Classification, &'a Bucket)> {
        let Some(buckets) = self.sites.get(site) else {
            return Vec::new();
        };
        let headings = taxonomy.heading_order();
        let mut ordered: Vec<_> = buckets.iter().collect();
        ordered.sort_by_key(|(class, _)| {
            let heading_rank = rank(&headings, &class.heading);
            let subheading_rank = rank(&taxonomy.subheading_order(&class.heading), &class.subheading);
            (heading_rank, subheading_rank, (*class).clone())
        });
        ordered
    }

    /// Per-heading totals across all sites, in taxonomy order, omitting
    /// headings with no items.
    pub fn heading_totals(&self, taxonomy: &Taxonomy) -> Vec<(String, usize)> {
        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        for buckets in self.sites.values() {
            for (class, bucket) in buckets {
                *totals.entry(class.heading.as_str()).or_default() += bucket.count;
            }
        }
        let mut ordered: Vec<(String, usize)> = taxonomy
            .heading_order()
            .into_iter()
            .filter_map(|heading| totals.remove(heading.as_str()).map(|n| (heading, n)))
            .collect();
        ordered.extend(totals.into_iter().map(|(h, n)| (h.to_string(), n)));
        ordered
    }
}

fn rank(order: &[String], key: &str) -> usize {
    order.iter().position(|k| k == key).unwrap_or(usize::MAX)
}

/// Device counts per site and role name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub sites: BTreeMap<String, BTreeMap<String, usize>>,
}

impl RoleCounts {
    /// Counts every item regardless of status or role.
    pub fn accumulate<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut counts = RoleCounts::default();
        for item in items {
            *counts
                .sites
                .entry(item.site.clone())
                .or_default()
                .entry(item.role_label().to_string())
                .or_default() += 1;
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.sites.values().flat_map(|roles| roles.values()).sum()
    }
}

/// `part / whole` as a percentage rounded to one decimal place.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}
