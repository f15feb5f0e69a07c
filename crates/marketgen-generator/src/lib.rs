//! Partitioned synthetic catalog generation.
//!
//! The pipeline writes a zero-count base catalog, fans partition writers out
//! over a rayon pool, then reconciles the per-partition tallies back into the
//! catalog.

pub mod builder;
pub mod catalog_store;
pub mod manifest;
pub mod orchestrator;
pub mod pipeline;
pub mod reconciler;
pub mod verify;
pub mod vocab;
pub mod writer;

pub use builder::{partition_seed, random_base_seed, RecordBuilder};
pub use catalog_store::{BaseCatalog, CatalogStore};
pub use manifest::{PartitionEntry, RunManifest};
pub use orchestrator::{plan_partitions, Orchestrator, PartitionOutcome};
pub use pipeline::{GenerationPipeline, GenerationSummary};
pub use reconciler::{ReconcileReport, Reconciler};
pub use verify::{stream_products, verify_output, VerificationReport};
pub use writer::{ArtifactSink, FsArtifactSink, PartitionSpec, PartitionWriter};
