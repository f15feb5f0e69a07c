use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use marketgen_core::{CoreError, CoreResult, GeneratorConfig, PartitionTally};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::builder::partition_seed;
use crate::writer::{ArtifactSink, PartitionSpec, PartitionWriter};

/// Result of one partition, successful or not.
#[derive(Debug)]
pub struct PartitionOutcome {
    pub spec: PartitionSpec,
    pub artifact: PathBuf,
    pub elapsed: Duration,
    pub result: CoreResult<PartitionTally>,
}

impl PartitionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn tally(&self) -> Option<&PartitionTally> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.result.as_ref().err()
    }
}

/// Split the run into `split_parts` equal, contiguous, disjoint id ranges.
/// Partition `i` (1-based) owns `[(i - 1) * n, i * n)`.
pub fn plan_partitions(config: &GeneratorConfig, base_seed: u64) -> Vec<PartitionSpec> {
    (1..=config.split_parts)
        .map(|partition| PartitionSpec {
            partition,
            start_id: (partition as u64 - 1) * config.products_per_file,
            count: config.products_per_file,
            seed: partition_seed(base_seed, partition),
        })
        .collect()
}

/// Runs every partition on a bounded rayon pool and gathers the outcomes.
pub struct Orchestrator<'a> {
    config: &'a GeneratorConfig,
    sink: &'a dyn ArtifactSink,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a GeneratorConfig, sink: &'a dyn ArtifactSink) -> Self {
        Self { config, sink }
    }

    /// Blocks until every partition has finished or failed. A failed
    /// partition never aborts its siblings. Outcomes come back sorted by
    /// partition index whatever order they completed in.
    pub fn run(&self, base_seed: u64, progress: &ProgressBar) -> CoreResult<Vec<PartitionOutcome>> {
        let specs = plan_partitions(self.config, base_seed);
        let workers = self.config.worker_count();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("marketgen-worker-{}", i))
            .build()
            .map_err(|e| CoreError::internal(format!("failed to build worker pool: {}", e)))?;

        info!(
            partitions = specs.len(),
            workers,
            total_products = self.config.total_products(),
            "Starting partition generation"
        );

        let outcomes: Vec<PartitionOutcome> = pool.install(|| {
            specs
                .into_par_iter()
                .map(|spec| self.run_partition(spec, progress))
                .collect()
        });

        let failed: Vec<usize> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.spec.partition)
            .collect();
        if !failed.is_empty() {
            warn!(?failed, "Some partitions failed and will be excluded");
        }

        Ok(outcomes)
    }

    fn run_partition(&self, spec: PartitionSpec, progress: &ProgressBar) -> PartitionOutcome {
        let start = Instant::now();
        info!(
            partition = spec.partition,
            records = spec.count,
            start_id = spec.start_id,
            "Generating partition"
        );

        let result = PartitionWriter::new(self.sink, self.config)
            .with_progress(progress)
            .write(&spec);
        let elapsed = start.elapsed();

        if result.is_ok() {
            info!(
                partition = spec.partition,
                records = spec.count,
                elapsed_ms = elapsed.as_millis() as u64,
                "Finished partition"
            );
        }

        PartitionOutcome {
            spec,
            artifact: self.sink.location(spec.partition),
            elapsed,
            result,
        }
    }
}
