use marketgen_core::product::{round_to, MAX_PRICE, MAX_RATING, MIN_PRICE, MIN_RATING};
use marketgen_core::{Attribute, GeneratorConfig, Product};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::vocab::{COLORS, PRODUCT_NAMES, RAM_SIZES, STORAGE_SIZES};

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for a 1-based partition, derived only from the base seed and the
/// partition index so it never depends on scheduling.
pub fn partition_seed(base_seed: u64, partition: usize) -> u64 {
    base_seed ^ (partition as u64).wrapping_mul(SEED_MIX)
}

/// Fresh base seed for runs without one. Kept within `i64` range so the
/// value in the manifest can be fed back through a config file or env var.
pub fn random_base_seed() -> u64 {
    rand::thread_rng().gen_range(0..=i64::MAX as u64)
}

/// Builds synthetic product records from an owned, seeded generator.
pub struct RecordBuilder {
    rng: StdRng,
    num_categories: u32,
    vendor_count: u32,
    attributes_per_product: usize,
}

impl RecordBuilder {
    pub fn new(seed: u64, config: &GeneratorConfig) -> Self {
        Self::with_limits(
            seed,
            config.num_categories,
            config.vendor_count,
            config.attributes_per_product,
        )
    }

    pub fn with_limits(
        seed: u64,
        num_categories: u32,
        vendor_count: u32,
        attributes_per_product: usize,
    ) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            num_categories,
            vendor_count,
            attributes_per_product,
        }
    }

    /// Build one record. Category and vendor are drawn independently and
    /// uniformly for every record.
    pub fn build(&mut self, product_id: u64) -> Product {
        let attributes = (0..self.attributes_per_product)
            .map(|slot| self.attribute(slot))
            .collect();
        let vendor_id = self.rng.gen_range(0..self.vendor_count);
        let category_id = self.rng.gen_range(0..self.num_categories);

        Product {
            name: pick(&mut self.rng, PRODUCT_NAMES).to_string(),
            price: round_to(self.rng.gen_range(MIN_PRICE..=MAX_PRICE), 2),
            rating: round_to(self.rng.gen_range(MIN_RATING..=MAX_RATING), 1),
            attributes,
            category_id,
            vendor_id,
            product_id,
        }
    }

    fn attribute(&mut self, slot: usize) -> Attribute {
        match slot {
            0 => Attribute::new("RAM", format!("{}GB", pick(&mut self.rng, RAM_SIZES))),
            1 => Attribute::new(
                "Storage",
                format!("{}GB SSD", pick(&mut self.rng, STORAGE_SIZES)),
            ),
            _ => Attribute::new("Color", pick(&mut self.rng, COLORS)),
        }
    }
}

/// Uniform pick from a non-empty vocabulary.
pub(crate) fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}
