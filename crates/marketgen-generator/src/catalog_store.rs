//! Base catalog persistence.
//!
//! Both files are written whole: serialize into a sibling `.tmp` file, sync,
//! then rename over the target. A reader never sees a half-merged catalog.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use marketgen_core::{Category, CoreError, CoreResult, GeneratorConfig, Vendor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::pick;
use crate::vocab::CATEGORY_WORDS;

const CATALOG_SEED_SALT: u64 = 0xC0FF_EE00_CA7A_1060;

/// Category and vendor reference collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCatalog {
    pub categories: Vec<Category>,
    pub vendors: Vec<Vendor>,
}

impl BaseCatalog {
    /// Zero-count catalog; label words come from a generator seeded by
    /// `base_seed`, so the same seed yields the same catalog.
    pub fn generate(num_categories: u32, vendor_count: u32, base_seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(base_seed ^ CATALOG_SEED_SALT);
        let categories = (0..num_categories)
            .map(|id| Category::new(id, pick(&mut rng, CATEGORY_WORDS)))
            .collect();
        let vendors = (0..vendor_count).map(Vendor::new).collect();

        Self {
            categories,
            vendors,
        }
    }

    pub fn category_total(&self) -> u64 {
        self.categories.iter().map(|c| c.products_count).sum()
    }

    pub fn vendor_total(&self) -> u64 {
        self.vendors.iter().map(|v| v.products_count).sum()
    }
}

/// Reads and writes `categories.json` and `vendors.json`.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    categories_path: PathBuf,
    vendors_path: PathBuf,
}

impl CatalogStore {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            categories_path: config.categories_path(),
            vendors_path: config.vendors_path(),
        }
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn vendors_path(&self) -> &Path {
        &self.vendors_path
    }

    /// Create and persist the zero-count catalog. Must finish before any
    /// partition starts.
    pub fn initialize(&self, config: &GeneratorConfig, base_seed: u64) -> CoreResult<BaseCatalog> {
        let catalog = BaseCatalog::generate(config.num_categories, config.vendor_count, base_seed);
        self.save(&catalog)?;

        info!(
            categories = catalog.categories.len(),
            vendors = catalog.vendors.len(),
            "Base catalog initialized"
        );
        Ok(catalog)
    }

    pub fn load(&self) -> CoreResult<BaseCatalog> {
        Ok(BaseCatalog {
            categories: read_json(&self.categories_path)?,
            vendors: read_json(&self.vendors_path)?,
        })
    }

    pub fn save(&self, catalog: &BaseCatalog) -> CoreResult<()> {
        write_json_atomic(&self.categories_path, &catalog.categories)?;
        write_json_atomic(&self.vendors_path, &catalog.vendors)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let file = File::open(path).map_err(|e| CoreError::catalog(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| CoreError::catalog(path, e.to_string()))
}

/// Pretty-print `value` to `path` through a temporary sibling and a rename.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> CoreResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp_path, path)
    };

    write().map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CoreError::catalog(path, e.to_string())
    })?;

    debug!(path = %path.display(), "Wrote JSON artifact");
    Ok(())
}
