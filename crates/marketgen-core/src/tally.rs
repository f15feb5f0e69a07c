use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-partition usage counts, produced by one partition writer and consumed
/// once by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTally {
    /// 1-based partition index.
    pub partition: usize,
    /// Records produced by this partition.
    pub records: u64,
    pub category_counts: BTreeMap<u32, u64>,
    pub vendor_counts: BTreeMap<u32, u64>,
}

impl PartitionTally {
    pub fn new(partition: usize) -> Self {
        Self {
            partition,
            ..Default::default()
        }
    }

    /// Count one record assigned to `category_id` and `vendor_id`.
    pub fn record(&mut self, category_id: u32, vendor_id: u32) {
        self.records += 1;
        *self.category_counts.entry(category_id).or_insert(0) += 1;
        *self.vendor_counts.entry(vendor_id).or_insert(0) += 1;
    }
}

/// Global totals merged from any number of partition tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTotals {
    pub records: u64,
    pub categories: BTreeMap<u32, u64>,
    pub vendors: BTreeMap<u32, u64>,
    /// Partitions merged so far, ascending.
    pub partitions: Vec<usize>,
}

impl CountTotals {
    /// Merge tallies in any order; the result does not depend on it.
    pub fn from_tallies<'a, I>(tallies: I) -> Self
    where
        I: IntoIterator<Item = &'a PartitionTally>,
    {
        let mut totals = Self::default();
        for tally in tallies {
            totals.merge(tally);
        }
        totals
    }

    pub fn merge(&mut self, tally: &PartitionTally) {
        self.records += tally.records;
        for (&id, &count) in &tally.category_counts {
            *self.categories.entry(id).or_insert(0) += count;
        }
        for (&id, &count) in &tally.vendor_counts {
            *self.vendors.entry(id).or_insert(0) += count;
        }
        if let Err(pos) = self.partitions.binary_search(&tally.partition) {
            self.partitions.insert(pos, tally.partition);
        }
    }

    /// Total for a category id; absent ids count as 0.
    pub fn category_count(&self, id: u32) -> u64 {
        self.categories.get(&id).copied().unwrap_or(0)
    }

    /// Total for a vendor id; absent ids count as 0.
    pub fn vendor_count(&self, id: u32) -> u64 {
        self.vendors.get(&id).copied().unwrap_or(0)
    }
}
