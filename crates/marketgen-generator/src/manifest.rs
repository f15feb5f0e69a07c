use std::path::Path;

use marketgen_core::{CoreResult, GeneratorConfig};
use serde::{Deserialize, Serialize};

use crate::catalog_store::write_json_atomic;
use crate::orchestrator::PartitionOutcome;

/// Run manifest written next to the generated artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Manifest format version
    pub version: String,

    /// Creation timestamp (RFC 3339)
    pub created_at: String,

    /// marketgen version that produced the run
    pub generator_version: String,

    /// Base seed every partition seed derives from
    pub base_seed: u64,

    /// Effective configuration, with `seed` set to the base seed
    pub config: GeneratorConfig,

    pub partitions: Vec<PartitionEntry>,

    /// Partitions whose records are missing from the catalog counts
    pub excluded_partitions: Vec<usize>,

    /// Records written by successful partitions
    pub total_records: u64,
}

/// Per-partition line of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub partition: usize,
    pub start_id: u64,
    pub end_id: u64,
    pub seed: u64,
    pub artifact: String,
    pub records: u64,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunManifest {
    pub fn new(config: &GeneratorConfig, base_seed: u64, outcomes: &[PartitionOutcome]) -> Self {
        let partitions: Vec<PartitionEntry> = outcomes.iter().map(PartitionEntry::from).collect();
        let excluded_partitions = partitions
            .iter()
            .filter(|p| p.error.is_some())
            .map(|p| p.partition)
            .collect();
        let total_records = partitions.iter().map(|p| p.records).sum();

        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            base_seed,
            config: GeneratorConfig {
                seed: Some(base_seed),
                ..config.clone()
            },
            partitions,
            excluded_partitions,
            total_records,
        }
    }

    pub fn write(&self, path: &Path) -> CoreResult<()> {
        write_json_atomic(path, self)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&PartitionOutcome> for PartitionEntry {
    fn from(outcome: &PartitionOutcome) -> Self {
        Self {
            partition: outcome.spec.partition,
            start_id: outcome.spec.start_id,
            end_id: outcome.spec.end_id(),
            seed: outcome.spec.seed,
            artifact: outcome
                .artifact
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            records: outcome.tally().map_or(0, |t| t.records),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            error: outcome.error().map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PartitionSpec;
    use marketgen_core::{CoreError, PartitionTally};
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcome(partition: usize, ok: bool) -> PartitionOutcome {
        let spec = PartitionSpec {
            partition,
            start_id: (partition as u64 - 1) * 10,
            count: 10,
            seed: partition as u64,
        };
        let result = if ok {
            let mut tally = PartitionTally::new(partition);
            for _ in 0..10 {
                tally.record(0, 0);
            }
            Ok(tally)
        } else {
            Err(CoreError::partition(partition, "disk full"))
        };
        PartitionOutcome {
            spec,
            artifact: PathBuf::from(format!("out/products_part_{}.json", partition)),
            elapsed: Duration::from_millis(12),
            result,
        }
    }

    #[test]
    fn test_manifest_records_failures() {
        let outcomes = vec![outcome(1, true), outcome(2, false), outcome(3, true)];
        let manifest = RunManifest::new(&GeneratorConfig::default(), 42, &outcomes);

        assert_eq!(manifest.excluded_partitions, vec![2]);
        assert_eq!(manifest.total_records, 20);
        assert_eq!(manifest.config.seed, Some(42));
        assert_eq!(manifest.partitions[0].artifact, "products_part_1.json");
        assert_eq!(manifest.partitions[1].end_id, 20);
        assert!(manifest.partitions[1]
            .error
            .as_deref()
            .unwrap()
            .contains("disk full"));
    }

    #[test]
    fn test_manifest_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = RunManifest::new(&GeneratorConfig::default(), 7, &[outcome(1, true)]);

        manifest.write(&path).unwrap();
        let loaded = RunManifest::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded.base_seed, 7);
        assert_eq!(loaded.partitions.len(), 1);
        assert!(loaded.partitions[0].error.is_none());
    }
}
