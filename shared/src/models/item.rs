//! Catalog items and SKU variants
//!
//! An item carries a set of color groups; each color group carries size
//! entries, and each size entry is a SKU with its own stock count. Stock is
//! mutated only through [`SizeVariant::set_stock`], which keeps the derived
//! `is_out_of_stock` flag consistent, and only ever inside an order-writing
//! transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item with color/size SKU variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Maximum retail price
    pub mrp: Decimal,
    /// Effective selling price
    pub discounted_price: Decimal,
    pub color_groups: Vec<ColorGroup>,
    /// Quantity-tiered pricing for partner bulk orders (PPQ breakpoints)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ppq_tiers: Vec<PriceTier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// All size entries of an item in one color
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorGroup {
    pub color: String,
    pub sizes: Vec<SizeVariant>,
}

/// A single SKU: one (item, color, size) combination with its own stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub size: String,
    pub sku: String,
    pub stock: u32,
    pub is_out_of_stock: bool,
}

impl SizeVariant {
    pub fn new(size: impl Into<String>, sku: impl Into<String>, stock: u32) -> Self {
        Self {
            size: size.into(),
            sku: sku.into(),
            stock,
            is_out_of_stock: stock == 0,
        }
    }

    /// The only stock mutator; keeps `is_out_of_stock` derived from stock
    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
        self.is_out_of_stock = stock == 0;
    }
}

/// Price-per-quantity breakpoint for partner bulk pricing
///
/// The tier with the largest `min_quantity` not exceeding the ordered
/// quantity applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub min_quantity: u32,
    pub unit_price: Decimal,
}

impl Item {
    /// Look up the SKU variant for a color/size pair
    pub fn variant(&self, color: &str, size: &str) -> Option<&SizeVariant> {
        self.color_groups
            .iter()
            .find(|g| g.color == color)?
            .sizes
            .iter()
            .find(|s| s.size == size)
    }

    /// Mutable lookup of the SKU variant for a color/size pair
    pub fn variant_mut(&mut self, color: &str, size: &str) -> Option<&mut SizeVariant> {
        self.color_groups
            .iter_mut()
            .find(|g| g.color == color)?
            .sizes
            .iter_mut()
            .find(|s| s.size == size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt() -> Item {
        Item {
            id: "item-1".into(),
            name: "Oxford Shirt".into(),
            mrp: Decimal::from(999),
            discounted_price: Decimal::from(799),
            color_groups: vec![
                ColorGroup {
                    color: "Blue".into(),
                    sizes: vec![
                        SizeVariant::new("M", "SKU-BLU-M", 10),
                        SizeVariant::new("L", "SKU-BLU-L", 0),
                    ],
                },
                ColorGroup {
                    color: "White".into(),
                    sizes: vec![SizeVariant::new("M", "SKU-WHT-M", 3)],
                },
            ],
            ppq_tiers: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_variant_lookup() {
        let item = shirt();
        assert_eq!(item.variant("Blue", "M").unwrap().sku, "SKU-BLU-M");
        assert_eq!(item.variant("White", "M").unwrap().stock, 3);
        assert!(item.variant("Blue", "XXL").is_none());
        assert!(item.variant("Green", "M").is_none());
    }

    #[test]
    fn test_set_stock_derives_out_of_stock() {
        let mut item = shirt();
        let v = item.variant_mut("Blue", "M").unwrap();
        assert!(!v.is_out_of_stock);
        v.set_stock(0);
        assert!(v.is_out_of_stock);
        v.set_stock(5);
        assert!(!v.is_out_of_stock);
        assert_eq!(v.stock, 5);
    }

    #[test]
    fn test_zero_stock_variant_starts_out_of_stock() {
        let item = shirt();
        assert!(item.variant("Blue", "L").unwrap().is_out_of_stock);
    }
}
