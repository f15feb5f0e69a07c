use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use indicatif::ProgressBar;
use marketgen_core::config::partition_file_name;
use marketgen_core::{CoreError, CoreResult, GeneratorConfig, PartitionTally};
use tracing::{debug, error, warn};

use crate::builder::RecordBuilder;

/// Records between progress bar updates.
const PROGRESS_BATCH: u64 = 10_000;

/// Destination for partition artifacts. Each partition opens its own handle
/// and owns it exclusively.
pub trait ArtifactSink: Send + Sync {
    /// Open a fresh writer for a 1-based partition, truncating any old artifact
    fn open(&self, partition: usize) -> io::Result<Box<dyn Write + Send>>;

    /// Where the partition's artifact lives, for reporting
    fn location(&self, partition: usize) -> PathBuf;

    /// Drop whatever a failed partition left behind
    fn discard(&self, _partition: usize) -> io::Result<()> {
        Ok(())
    }
}

/// Writes `products_part_{n}.json` files into a directory.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    dir: PathBuf,
}

impl FsArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for FsArtifactSink {
    fn open(&self, partition: usize) -> io::Result<Box<dyn Write + Send>> {
        let file = File::create(self.location(partition))?;
        Ok(Box::new(BufWriter::with_capacity(1 << 20, file)))
    }

    fn location(&self, partition: usize) -> PathBuf {
        self.dir.join(partition_file_name(partition))
    }

    fn discard(&self, partition: usize) -> io::Result<()> {
        match std::fs::remove_file(self.location(partition)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// One unit of work: a contiguous id range written to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSpec {
    /// 1-based partition index
    pub partition: usize,
    pub start_id: u64,
    pub count: u64,
    pub seed: u64,
}

impl PartitionSpec {
    /// Exclusive end of the id range
    pub fn end_id(&self) -> u64 {
        self.start_id + self.count
    }
}

/// Streams one partition's records as a JSON array without buffering them.
pub struct PartitionWriter<'a> {
    sink: &'a dyn ArtifactSink,
    config: &'a GeneratorConfig,
    progress: Option<&'a ProgressBar>,
}

impl<'a> PartitionWriter<'a> {
    pub fn new(sink: &'a dyn ArtifactSink, config: &'a GeneratorConfig) -> Self {
        Self {
            sink,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Generate and persist the partition. On failure the partition is
    /// abandoned and no partial tally is returned.
    pub fn write(&self, spec: &PartitionSpec) -> CoreResult<PartitionTally> {
        let mut tally = PartitionTally::new(spec.partition);

        let result = self
            .sink
            .open(spec.partition)
            .map_err(CoreError::from)
            .and_then(|mut out| self.stream(spec, &mut *out, &mut tally));

        match result {
            Ok(()) => {
                debug!(
                    partition = spec.partition,
                    records = tally.records,
                    "Partition artifact complete"
                );
                Ok(tally)
            }
            Err(e) => {
                error!(partition = spec.partition, error = %e, "Partition generation failed");
                if let Err(cleanup) = self.sink.discard(spec.partition) {
                    warn!(
                        partition = spec.partition,
                        error = %cleanup,
                        "Could not remove partial partition artifact"
                    );
                }
                Err(CoreError::partition(spec.partition, e.to_string()))
            }
        }
    }

    fn stream(
        &self,
        spec: &PartitionSpec,
        out: &mut (dyn Write + Send),
        tally: &mut PartitionTally,
    ) -> CoreResult<()> {
        let mut builder = RecordBuilder::new(spec.seed, self.config);
        let mut pending = 0u64;

        out.write_all(b"[\n")?;
        for offset in 0..spec.count {
            let product = builder.build(spec.start_id + offset);
            tally.record(product.category_id, product.vendor_id);

            if offset > 0 {
                out.write_all(b",\n")?;
            }
            serde_json::to_writer(&mut *out, &product)?;

            pending += 1;
            if pending == PROGRESS_BATCH {
                self.report(pending);
                pending = 0;
            }
        }
        out.write_all(b"\n]")?;
        out.flush()?;

        self.report(pending);
        Ok(())
    }

    fn report(&self, records: u64) {
        if let Some(pb) = self.progress {
            pb.inc(records);
        }
    }
}
