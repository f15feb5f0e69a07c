//! Category and vendor reference entities.
//!
//! `products_count` is the only field that changes after creation. `_id` is
//! accepted on read so catalogs exported by the document-database loader can
//! be reconciled as well.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: u32,
    pub label: String,
    pub products_count: u64,
}

impl Category {
    pub fn new(id: u32, word: &str) -> Self {
        Self {
            id,
            label: format!("Category Label {} - {}", id, word),
            products_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(alias = "_id")]
    pub id: u32,
    pub full_name: String,
    pub products_count: u64,
}

impl Vendor {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            full_name: format!("Vendor Company {}", id),
            products_count: 0,
        }
    }
}
