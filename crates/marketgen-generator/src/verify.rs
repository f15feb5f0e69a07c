//! Post-run verification of an output directory.
//!
//! Partition artifacts are streamed record by record, so verifying a
//! multi-gigabyte partition needs no more memory than generating it.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};

use marketgen_core::{CoreError, CoreResult, CountTotals, GeneratorConfig, PartitionTally, Product};
use serde::de::{Deserializer as _, SeqAccess, Visitor};
use tracing::{info, warn};

use crate::catalog_store::{BaseCatalog, CatalogStore};
use crate::orchestrator::plan_partitions;

/// Errors kept per partition before the rest are only counted.
const MAX_ERRORS_PER_PARTITION: usize = 10;

/// Verification result
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub partitions_checked: Vec<usize>,
    pub missing_partitions: Vec<usize>,
    pub records: u64,
    pub errors: Vec<String>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

struct ProductSeq<F>(F);

impl<'de, F: FnMut(Product)> Visitor<'de> for ProductSeq<F> {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON array of product records")
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<u64, A::Error> {
        let mut count = 0;
        while let Some(product) = seq.next_element::<Product>()? {
            (self.0)(product);
            count += 1;
        }
        Ok(count)
    }
}

/// Parse a JSON array of products one element at a time, handing each to
/// `on_product`. Returns the element count; trailing garbage is an error.
pub fn stream_products<R, F>(reader: R, on_product: F) -> CoreResult<u64>
where
    R: Read,
    F: FnMut(Product),
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    let count = (&mut de).deserialize_seq(ProductSeq(on_product))?;
    de.end()?;
    Ok(count)
}

/// Check an output directory against `config`. Only a missing or unreadable
/// catalog is an `Err`; every other problem lands in the report.
pub fn verify_output(config: &GeneratorConfig) -> CoreResult<VerificationReport> {
    let catalog = CatalogStore::new(config).load()?;
    let mut report = VerificationReport::default();

    check_catalog_shape(config, &catalog, &mut report);

    let mut tallies = Vec::new();
    for spec in plan_partitions(config, 0) {
        let path = config.partition_path(spec.partition);
        if !path.exists() {
            report.missing_partitions.push(spec.partition);
            report
                .errors
                .push(format!("partition {}: {} not found", spec.partition, path.display()));
            continue;
        }

        info!(partition = spec.partition, path = %path.display(), "Verifying partition");
        let mut tally = PartitionTally::new(spec.partition);
        let mut expected_id = spec.start_id;
        let mut problems = Vec::new();

        let parsed = File::open(&path).map_err(CoreError::from).and_then(|file| {
            stream_products(BufReader::new(file), |product| {
                if product.product_id != expected_id {
                    problems.push(format!(
                        "product_id {} where {} was expected",
                        product.product_id, expected_id
                    ));
                }
                problems.extend(product.range_violations(
                    config.num_categories,
                    config.vendor_count,
                    config.attributes_per_product,
                ));
                tally.record(product.category_id, product.vendor_id);
                expected_id = product.product_id.saturating_add(1);
            })
        });

        match parsed {
            Ok(count) => {
                if count != spec.count {
                    problems.push(format!("{} records, expected {}", count, spec.count));
                }
                report.records += count;
                report.partitions_checked.push(spec.partition);
                tallies.push(tally);
            }
            Err(e) => problems.push(format!("not a valid product array: {}", e)),
        }

        push_capped(&mut report.errors, spec.partition, problems);
    }

    check_catalog_counts(&catalog, &CountTotals::from_tallies(&tallies), &mut report);

    if report.is_valid() {
        info!(records = report.records, "Output verification passed");
    } else {
        warn!(errors = report.errors.len(), "Output verification failed");
    }
    Ok(report)
}

fn check_catalog_shape(
    config: &GeneratorConfig,
    catalog: &BaseCatalog,
    report: &mut VerificationReport,
) {
    if catalog.categories.len() != config.num_categories as usize {
        report.errors.push(format!(
            "catalog has {} categories, expected {}",
            catalog.categories.len(),
            config.num_categories
        ));
    }
    if catalog.vendors.len() != config.vendor_count as usize {
        report.errors.push(format!(
            "catalog has {} vendors, expected {}",
            catalog.vendors.len(),
            config.vendor_count
        ));
    }
    for (expected, category) in catalog.categories.iter().enumerate() {
        if category.id as usize != expected {
            report
                .errors
                .push(format!("category at position {} has id {}", expected, category.id));
        }
    }
    for (expected, vendor) in catalog.vendors.iter().enumerate() {
        if vendor.id as usize != expected {
            report
                .errors
                .push(format!("vendor at position {} has id {}", expected, vendor.id));
        }
    }
}

fn check_catalog_counts(
    catalog: &BaseCatalog,
    observed: &CountTotals,
    report: &mut VerificationReport,
) {
    for category in &catalog.categories {
        let actual = observed.category_count(category.id);
        if category.products_count != actual {
            report.errors.push(format!(
                "category {}: products_count {} but artifacts hold {}",
                category.id, category.products_count, actual
            ));
        }
    }
    for vendor in &catalog.vendors {
        let actual = observed.vendor_count(vendor.id);
        if vendor.products_count != actual {
            report.errors.push(format!(
                "vendor {}: products_count {} but artifacts hold {}",
                vendor.id, vendor.products_count, actual
            ));
        }
    }
    if catalog.category_total() != observed.records {
        report.errors.push(format!(
            "category counts sum to {}, artifacts hold {} records",
            catalog.category_total(),
            observed.records
        ));
    }
    if catalog.vendor_total() != observed.records {
        report.errors.push(format!(
            "vendor counts sum to {}, artifacts hold {} records",
            catalog.vendor_total(),
            observed.records
        ));
    }
}

fn push_capped(errors: &mut Vec<String>, partition: usize, problems: Vec<String>) {
    let total = problems.len();
    errors.extend(
        problems
            .into_iter()
            .take(MAX_ERRORS_PER_PARTITION)
            .map(|p| format!("partition {}: {}", partition, p)),
    );
    if total > MAX_ERRORS_PER_PARTITION {
        errors.push(format!(
            "partition {}: ... and {} more",
            partition,
            total - MAX_ERRORS_PER_PARTITION
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_products_counts_elements() {
        let json = r#"[
{"name":"Economical Choice","price":10.0,"rating":3.0,"attributes":[],"category_id":0,"vendor_id":0,"product_id":0},
{"name":"Economical Choice","price":11.5,"rating":3.1,"attributes":[],"category_id":1,"vendor_id":2,"product_id":1}
]"#;
        let mut ids = Vec::new();
        let count = stream_products(json.as_bytes(), |p| ids.push(p.product_id)).unwrap();

        assert_eq!(count, 2);
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_stream_products_empty_array() {
        assert_eq!(stream_products("[]".as_bytes(), |_| {}).unwrap(), 0);
    }

    #[test]
    fn test_stream_products_rejects_truncated_array() {
        let json = r#"[
{"name":"Economical Choice","price":10.0,"rating":3.0,"attributes":[],"category_id":0,"vendor_id":0,"product_id":0},"#;
        assert!(stream_products(json.as_bytes(), |_| {}).is_err());
    }

    #[test]
    fn test_stream_products_rejects_trailing_data() {
        assert!(stream_products("[] []".as_bytes(), |_| {}).is_err());
    }

    #[test]
    fn test_push_capped_summarizes_overflow() {
        let mut errors = Vec::new();
        let problems = (0..15).map(|i| format!("problem {}", i)).collect();
        push_capped(&mut errors, 3, problems);

        assert_eq!(errors.len(), MAX_ERRORS_PER_PARTITION + 1);
        assert_eq!(errors.last().unwrap(), "partition 3: ... and 5 more");
    }
}
