//! Per-actor carts
//!
//! One cart per actor. Lines reference an item + variant selection and a
//! quantity; partner cart lines additionally carry the server-computed
//! PPQ totals used by the checkout tamper check. Lines are reduced or
//! removed when an order is placed from them.

use super::actor::ActorRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A staged selection awaiting checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub actor: ActorRef,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

/// One cart line: item + variant + quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub color: String,
    pub size: String,
    pub sku: String,
    pub quantity: u32,
    /// Server-computed PPQ total quantity (partner carts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<u32>,
    /// Server-computed PPQ total price (partner carts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

impl Cart {
    pub fn new(actor: ActorRef) -> Self {
        Self {
            actor,
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Find the line matching an item + variant selection
    pub fn line(&self, item_id: &str, color: &str, size: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.item_id == item_id && l.color == color && l.size == size)
    }

    pub fn line_mut(&mut self, item_id: &str, color: &str, size: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.item_id == item_id && l.color == color && l.size == size)
    }

    /// Reduce a line by the purchased quantity; zero-quantity lines are
    /// removed entirely. Returns false when the line does not exist.
    pub fn reduce_line(&mut self, item_id: &str, color: &str, size: &str, by: u32) -> bool {
        let Some(idx) = self
            .lines
            .iter()
            .position(|l| l.item_id == item_id && l.color == color && l.size == size)
        else {
            return false;
        };
        let line = &mut self.lines[idx];
        if line.quantity <= by {
            self.lines.remove(idx);
        } else {
            line.quantity -= by;
        }
        self.updated_at = Utc::now();
        true
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_with_line(quantity: u32) -> Cart {
        let mut cart = Cart::new(ActorRef::user("u1"));
        cart.lines.push(CartLine {
            item_id: "item-1".into(),
            color: "Blue".into(),
            size: "M".into(),
            sku: "SKU-BLU-M".into(),
            quantity,
            total_quantity: None,
            total_price: None,
        });
        cart
    }

    #[test]
    fn test_reduce_line_partial() {
        let mut cart = cart_with_line(5);
        assert!(cart.reduce_line("item-1", "Blue", "M", 2));
        assert_eq!(cart.line("item-1", "Blue", "M").unwrap().quantity, 3);
    }

    #[test]
    fn test_reduce_line_to_zero_removes() {
        let mut cart = cart_with_line(2);
        assert!(cart.reduce_line("item-1", "Blue", "M", 2));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_reduce_missing_line() {
        let mut cart = cart_with_line(2);
        assert!(!cart.reduce_line("item-2", "Blue", "M", 1));
        assert_eq!(cart.lines.len(), 1);
    }
}
