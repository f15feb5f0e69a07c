//! Core domain types for the marketgen synthetic catalog generator.

pub mod catalog;
pub mod config;
pub mod error;
pub mod product;
pub mod tally;

pub use catalog::{Category, Vendor};
pub use crate::config::GeneratorConfig;
pub use error::{CoreError, CoreResult};
pub use product::{Attribute, Product};
pub use tally::{CountTotals, PartitionTally};
