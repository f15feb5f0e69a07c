use marketgen_core::{CoreResult, CountTotals, PartitionTally};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog_store::CatalogStore;

/// What the reconciler merged and what it had to leave out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Partitions whose tallies were merged, ascending
    pub contributing: Vec<usize>,
    /// Partitions that produced no tally, ascending
    pub excluded: Vec<usize>,
    /// Records represented by the merged tallies
    pub records: u64,
    pub category_total: u64,
    pub vendor_total: u64,
    /// Tally ids with no matching catalog entity
    pub unmatched_category_ids: Vec<u32>,
    pub unmatched_vendor_ids: Vec<u32>,
}

impl ReconcileReport {
    /// True when every partition contributed and every tallied id matched
    pub fn is_complete(&self) -> bool {
        self.excluded.is_empty()
            && self.unmatched_category_ids.is_empty()
            && self.unmatched_vendor_ids.is_empty()
    }
}

/// Folds partition tallies into the persisted base catalog.
pub struct Reconciler<'a> {
    store: &'a CatalogStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// Read the whole catalog, set every `products_count` to its merged
    /// total and write the whole catalog back. Counts are assigned, never
    /// accumulated, so reconciling the same tallies twice is a no-op.
    ///
    /// Must only run once the parallel phase is over.
    pub fn reconcile(
        &self,
        tallies: &[PartitionTally],
        excluded: &[usize],
    ) -> CoreResult<ReconcileReport> {
        let totals = CountTotals::from_tallies(tallies);
        let mut catalog = self.store.load()?;

        for category in &mut catalog.categories {
            category.products_count = totals.category_count(category.id);
        }
        for vendor in &mut catalog.vendors {
            vendor.products_count = totals.vendor_count(vendor.id);
        }

        self.store.save(&catalog)?;

        let unmatched_category_ids: Vec<u32> = totals
            .categories
            .keys()
            .copied()
            .filter(|id| !catalog.categories.iter().any(|c| c.id == *id))
            .collect();
        let unmatched_vendor_ids: Vec<u32> = totals
            .vendors
            .keys()
            .copied()
            .filter(|id| !catalog.vendors.iter().any(|v| v.id == *id))
            .collect();

        let mut excluded = excluded.to_vec();
        excluded.sort_unstable();
        excluded.dedup();

        let report = ReconcileReport {
            contributing: totals.partitions.clone(),
            excluded,
            records: totals.records,
            category_total: catalog.category_total(),
            vendor_total: catalog.vendor_total(),
            unmatched_category_ids,
            unmatched_vendor_ids,
        };

        if !report.excluded.is_empty() {
            warn!(
                excluded = ?report.excluded,
                "Catalog counts exclude failed partitions; totals are incomplete"
            );
        }
        if !report.unmatched_category_ids.is_empty() || !report.unmatched_vendor_ids.is_empty() {
            warn!(
                categories = ?report.unmatched_category_ids,
                vendors = ?report.unmatched_vendor_ids,
                "Tallied ids have no catalog entry"
            );
        }
        info!(
            contributing = ?report.contributing,
            records = report.records,
            "Base catalog counts updated"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketgen_core::GeneratorConfig;

    fn tally(partition: usize, pairs: &[(u32, u32)]) -> PartitionTally {
        let mut tally = PartitionTally::new(partition);
        for &(category, vendor) in pairs {
            tally.record(category, vendor);
        }
        tally
    }

    fn store_in(dir: &std::path::Path) -> (GeneratorConfig, CatalogStore) {
        let config = GeneratorConfig {
            output_dir: dir.to_path_buf(),
            num_categories: 4,
            vendor_count: 3,
            ..Default::default()
        };
        let store = CatalogStore::new(&config);
        store.initialize(&config, 5).unwrap();
        (config, store)
    }

    #[test]
    fn test_sets_counts_from_tallies() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_in(dir.path());
        let tallies = [tally(1, &[(0, 0), (1, 2)]), tally(2, &[(1, 2), (3, 1)])];

        let report = Reconciler::new(&store).reconcile(&tallies, &[]).unwrap();
        let catalog = store.load().unwrap();

        let counts: Vec<u64> = catalog.categories.iter().map(|c| c.products_count).collect();
        assert_eq!(counts, vec![1, 2, 0, 1]);
        let counts: Vec<u64> = catalog.vendors.iter().map(|v| v.products_count).collect();
        assert_eq!(counts, vec![1, 1, 2]);
        assert_eq!(report.records, 4);
        assert_eq!(report.category_total, 4);
        assert_eq!(report.vendor_total, 4);
        assert!(report.is_complete());
    }

    #[test]
    fn test_reports_excluded_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_in(dir.path());
        let tallies = [tally(3, &[(0, 0)]), tally(1, &[(0, 0)])];

        let report = Reconciler::new(&store).reconcile(&tallies, &[2]).unwrap();

        assert_eq!(report.contributing, vec![1, 3]);
        assert_eq!(report.excluded, vec![2]);
        assert!(!report.is_complete());
        assert_eq!(report.category_total, 2);
    }

    #[test]
    fn test_reconcile_twice_does_not_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_in(dir.path());
        let tallies = [tally(1, &[(2, 1), (2, 1)])];
        let reconciler = Reconciler::new(&store);

        reconciler.reconcile(&tallies, &[]).unwrap();
        let first = store.load().unwrap();
        reconciler.reconcile(&tallies, &[]).unwrap();
        let second = store.load().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.categories[2].products_count, 2);
    }

    #[test]
    fn test_reports_unmatched_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_in(dir.path());
        let tallies = [tally(1, &[(9, 0), (0, 7)])];

        let report = Reconciler::new(&store).reconcile(&tallies, &[]).unwrap();

        assert_eq!(report.unmatched_category_ids, vec![9]);
        assert_eq!(report.unmatched_vendor_ids, vec![7]);
        assert_eq!(report.category_total, 1);
    }

    #[test]
    fn test_missing_catalog_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let store = CatalogStore::new(&config);

        assert!(Reconciler::new(&store).reconcile(&[], &[]).is_err());
    }
}
