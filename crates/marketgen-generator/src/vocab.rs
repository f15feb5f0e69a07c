//! Fixed vocabularies for synthetic records.

pub const CATEGORY_WORDS: &[&str] = &[
    "Electronics",
    "Apparel",
    "HomeGoods",
    "Tools",
    "Books",
    "Software",
    "Sporting",
];

pub const PRODUCT_NAMES: &[&str] = &[
    "Ultimate Pro Gadget",
    "Smart Home Device",
    "Vintage Look Accessory",
    "High Performance Tool",
    "Economical Choice",
];

/// RAM sizes in GB
pub const RAM_SIZES: &[u32] = &[8, 16, 32, 64];

/// SSD sizes in GB
pub const STORAGE_SIZES: &[u32] = &[128, 256, 512, 1024];

pub const COLORS: &[&str] = &["Red", "Blue", "Green", "Black", "White", "Silver"];
