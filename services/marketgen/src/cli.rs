use clap::{Args, Parser, Subcommand};
use marketgen_core::{CoreResult, GeneratorConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marketgen")]
#[command(about = "Synthetic e-commerce catalog generator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the base catalog and all product partitions
    Generate {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Check a finished output directory for consistency
    Verify {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Overrides applied on top of the layered configuration
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory for catalog, partitions and manifest
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Records per partition file
    #[arg(long)]
    pub products_per_file: Option<u64>,

    /// Number of partition files
    #[arg(long)]
    pub split_parts: Option<usize>,

    /// Number of categories
    #[arg(long)]
    pub categories: Option<u32>,

    /// Number of vendors
    #[arg(long)]
    pub vendors: Option<u32>,

    /// Attributes per product
    #[arg(long)]
    pub attributes: Option<usize>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Base seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SettingsArgs {
    /// Load layered configuration, then apply command-line overrides
    pub fn resolve(&self) -> CoreResult<GeneratorConfig> {
        let config = GeneratorConfig::load(self.config.as_deref())?;
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.products_per_file {
            config.products_per_file = n;
        }
        if let Some(n) = self.split_parts {
            config.split_parts = n;
        }
        if let Some(n) = self.categories {
            config.num_categories = n;
        }
        if let Some(n) = self.vendors {
            config.vendor_count = n;
        }
        if let Some(n) = self.attributes {
            config.attributes_per_product = n;
        }
        if let Some(n) = self.workers {
            config.max_workers = n;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}
