//! Configuration management for marketgen
//!
//! Settings are layered, lowest priority first:
//! - Hardcoded defaults
//! - ./config/marketgen.{toml,yaml,json}
//! - File named by the MARKETGEN_CONFIG env var
//! - File passed explicitly by the caller (e.g. `--config`)
//! - MARKETGEN_* environment variables
//!
//! `load` only layers the sources. Callers apply their own overrides and then
//! call `validate` once on the final value.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

pub const CATEGORIES_FILE: &str = "categories.json";
pub const VENDORS_FILE: &str = "vendors.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Run-wide generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Directory receiving the catalog, partition artifacts and manifest
    pub output_dir: PathBuf,

    /// Number of category reference entities
    pub num_categories: u32,

    /// Number of vendor reference entities
    pub vendor_count: u32,

    /// Attribute pairs per product (slot 0 = RAM, 1 = Storage, rest = Color)
    pub attributes_per_product: usize,

    /// Number of partitions, one artifact each
    pub split_parts: usize,

    /// Records generated per partition
    pub products_per_file: u64,

    /// Worker pool size, 0 means host parallelism
    pub max_workers: usize,

    /// Base seed; a random one in `0..=i64::MAX` is drawn when unset so it
    /// can be replayed through TOML or `MARKETGEN_SEED`
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated_data"),
            num_categories: 100,
            vendor_count: 100,
            attributes_per_product: 3,
            split_parts: 4,
            products_per_file: 2_500_000,
            max_workers: 0,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from every layer, plus an optional explicit file
    /// that overrides the implicit ones. Environment variables always win,
    /// e.g. `MARKETGEN_SPLIT_PARTS=8`. The result is not validated.
    pub fn load(explicit: Option<&Path>) -> CoreResult<Self> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder.add_source(File::with_name("./config/marketgen").required(false));

        if let Ok(config_path) = std::env::var("MARKETGEN_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("MARKETGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: GeneratorConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = Self::default();
        builder
            .set_default("output_dir", defaults.output_dir.to_string_lossy().to_string())?
            .set_default("num_categories", i64::from(defaults.num_categories))?
            .set_default("vendor_count", i64::from(defaults.vendor_count))?
            .set_default("attributes_per_product", defaults.attributes_per_product as i64)?
            .set_default("split_parts", defaults.split_parts as i64)?
            .set_default("products_per_file", defaults.products_per_file as i64)?
            .set_default("max_workers", defaults.max_workers as i64)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CoreResult<()> {
        if self.num_categories == 0 {
            return Err(CoreError::invalid_config("num_categories must be > 0"));
        }

        if self.vendor_count == 0 {
            return Err(CoreError::invalid_config("vendor_count must be > 0"));
        }

        if self.attributes_per_product == 0 {
            return Err(CoreError::invalid_config(
                "attributes_per_product must be > 0",
            ));
        }

        if self.split_parts == 0 {
            return Err(CoreError::invalid_config("split_parts must be > 0"));
        }

        if self.products_per_file == 0 {
            return Err(CoreError::invalid_config("products_per_file must be > 0"));
        }

        if self
            .products_per_file
            .checked_mul(self.split_parts as u64)
            .is_none()
        {
            return Err(CoreError::invalid_config(
                "products_per_file * split_parts overflows the id space",
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::invalid_config("output_dir must not be empty"));
        }

        Ok(())
    }

    /// Total records across all partitions
    pub fn total_products(&self) -> u64 {
        self.products_per_file * self.split_parts as u64
    }

    /// Effective worker pool size
    pub fn worker_count(&self) -> usize {
        if self.max_workers > 0 {
            return self.max_workers;
        }
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.output_dir.join(CATEGORIES_FILE)
    }

    pub fn vendors_path(&self) -> PathBuf {
        self.output_dir.join(VENDORS_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }

    /// Artifact path of a 1-based partition index
    pub fn partition_path(&self, partition: usize) -> PathBuf {
        self.output_dir.join(partition_file_name(partition))
    }
}

/// File name of a 1-based partition artifact
pub fn partition_file_name(partition: usize) -> String {
    format!("products_part_{}.json", partition)
}
