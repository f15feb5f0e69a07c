use serde::{Deserialize, Serialize};

pub const MIN_PRICE: f64 = 10.0;
pub const MAX_PRICE: f64 = 5000.0;
pub const MIN_RATING: f64 = 3.0;
pub const MAX_RATING: f64 = 5.0;

/// One `{k, v}` product attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub k: String,
    pub v: String,
}

impl Attribute {
    pub fn new(k: impl Into<String>, v: impl Into<String>) -> Self {
        Self {
            k: k.into(),
            v: v.into(),
        }
    }
}

/// A synthetic product record. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub attributes: Vec<Attribute>,
    pub category_id: u32,
    pub vendor_id: u32,
    pub product_id: u64,
}

impl Product {
    /// Returns every field-range violation for the given reference set sizes.
    pub fn range_violations(
        &self,
        num_categories: u32,
        vendor_count: u32,
        attributes_per_product: usize,
    ) -> Vec<String> {
        let mut violations = Vec::new();

        if self.category_id >= num_categories {
            violations.push(format!(
                "product {}: category_id {} outside [0, {})",
                self.product_id, self.category_id, num_categories
            ));
        }
        if self.vendor_id >= vendor_count {
            violations.push(format!(
                "product {}: vendor_id {} outside [0, {})",
                self.product_id, self.vendor_id, vendor_count
            ));
        }
        if !(MIN_PRICE..=MAX_PRICE).contains(&self.price) {
            violations.push(format!(
                "product {}: price {} outside [{}, {}]",
                self.product_id, self.price, MIN_PRICE, MAX_PRICE
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            violations.push(format!(
                "product {}: rating {} outside [{}, {}]",
                self.product_id, self.rating, MIN_RATING, MAX_RATING
            ));
        }
        if self.attributes.len() != attributes_per_product {
            violations.push(format!(
                "product {}: {} attributes, expected {}",
                self.product_id,
                self.attributes.len(),
                attributes_per_product
            ));
        }

        violations
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            name: "Smart Home Device".to_string(),
            price: 129.99,
            rating: 4.5,
            attributes: vec![
                Attribute::new("RAM", "16GB"),
                Attribute::new("Storage", "512GB SSD"),
                Attribute::new("Color", "Silver"),
            ],
            category_id: 7,
            vendor_id: 42,
            product_id: 1001,
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();

        for field in [
            "name",
            "price",
            "rating",
            "attributes",
            "category_id",
            "vendor_id",
            "product_id",
        ] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(json["attributes"][1]["k"], "Storage");
        assert_eq!(json["attributes"][1]["v"], "512GB SSD");
    }

    #[test]
    fn test_valid_product_has_no_violations() {
        assert!(sample().range_violations(100, 100, 3).is_empty());
    }

    #[test]
    fn test_reports_each_violation() {
        let mut product = sample();
        product.category_id = 100;
        product.price = 5000.01;
        product.attributes.pop();

        let violations = product.range_violations(100, 100, 3);
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(4.26, 1), 4.3);
        assert_eq!(round_to(3.0, 1), 3.0);
    }
}
