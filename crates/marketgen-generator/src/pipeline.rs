use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use marketgen_core::{CoreResult, GeneratorConfig, PartitionTally};
use tracing::info;

use crate::builder::random_base_seed;
use crate::catalog_store::CatalogStore;
use crate::manifest::RunManifest;
use crate::orchestrator::{Orchestrator, PartitionOutcome};
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::writer::{ArtifactSink, FsArtifactSink};

/// Everything a caller needs to report on a finished run
#[derive(Debug)]
pub struct GenerationSummary {
    pub base_seed: u64,
    pub outcomes: Vec<PartitionOutcome>,
    pub report: ReconcileReport,
    pub elapsed: Duration,
    pub categories_path: PathBuf,
    pub vendors_path: PathBuf,
    pub manifest_path: PathBuf,
}

impl GenerationSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn throughput(&self) -> f64 {
        self.report.records as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

/// Initializer, orchestrator and reconciler wired together
pub struct GenerationPipeline {
    config: GeneratorConfig,
    sink: Box<dyn ArtifactSink>,
}

impl GenerationPipeline {
    /// Pipeline writing partitions into `config.output_dir`
    pub fn new(config: GeneratorConfig) -> Self {
        let sink = Box::new(FsArtifactSink::new(config.output_dir.clone()));
        Self { config, sink }
    }

    /// Pipeline with a custom partition destination
    pub fn with_sink(config: GeneratorConfig, sink: Box<dyn ArtifactSink>) -> Self {
        Self { config, sink }
    }

    /// Run to completion. Catalog and manifest failures are returned as
    /// errors; partition failures are recorded in the summary.
    pub fn run(&self, progress: &ProgressBar) -> CoreResult<GenerationSummary> {
        let start = Instant::now();
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let base_seed = self.config.seed.unwrap_or_else(random_base_seed);
        info!(
            base_seed,
            output_dir = %self.config.output_dir.display(),
            "Starting generation run"
        );

        let store = CatalogStore::new(&self.config);
        store.initialize(&self.config, base_seed)?;

        let outcomes =
            Orchestrator::new(&self.config, &*self.sink).run(base_seed, progress)?;

        let tallies: Vec<PartitionTally> =
            outcomes.iter().filter_map(|o| o.tally().cloned()).collect();
        let excluded: Vec<usize> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.spec.partition)
            .collect();
        let report = Reconciler::new(&store).reconcile(&tallies, &excluded)?;

        let manifest_path = self.config.manifest_path();
        RunManifest::new(&self.config, base_seed, &outcomes).write(&manifest_path)?;

        Ok(GenerationSummary {
            base_seed,
            outcomes,
            report,
            elapsed: start.elapsed(),
            categories_path: store.categories_path().to_path_buf(),
            vendors_path: store.vendors_path().to_path_buf(),
            manifest_path,
        })
    }
}
