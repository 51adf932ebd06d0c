//! Quantity-tiered pricing for partner bulk orders
//!
//! Partners buy at price-per-quantity (PPQ) tiers defined on the item.
//! The client sends the totals it showed the partner; the server recomputes
//! them from the catalog and rejects any mismatch, so a tampered payload
//! can never change what is charged.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Item;
use shared::order::dto::OrderDetail;

/// Unit price for a given quantity: the highest tier breakpoint not
/// exceeding the quantity, falling back to the item's discounted price
/// when no tier applies.
pub fn tier_unit_price(item: &Item, quantity: u32) -> Decimal {
    item.ppq_tiers
        .iter()
        .filter(|t| t.min_quantity <= quantity)
        .max_by_key(|t| t.min_quantity)
        .map(|t| t.unit_price)
        .unwrap_or(item.discounted_price)
}

/// Check partner-declared line totals against the server's own math
pub fn verify_declared_totals(detail: &OrderDetail, item: &Item) -> AppResult<Decimal> {
    let unit_price = tier_unit_price(item, detail.quantity);
    let expected_total = unit_price * Decimal::from(detail.quantity);

    if let Some(declared_qty) = detail.total_quantity
        && declared_qty != detail.quantity
    {
        return Err(AppError::with_message(
            ErrorCode::PriceMismatch,
            format!(
                "Declared quantity {} does not match ordered quantity {} for item {}",
                declared_qty, detail.quantity, detail.item_id
            ),
        ));
    }

    if let Some(declared_price) = detail.total_price
        && declared_price != expected_total
    {
        return Err(AppError::with_message(
            ErrorCode::PriceMismatch,
            format!(
                "Declared price {} does not match computed price {} for item {}",
                declared_price, expected_total, detail.item_id
            ),
        )
        .with_detail("itemId", detail.item_id.clone())
        .with_detail("declared", declared_price.to_string())
        .with_detail("computed", expected_total.to_string()));
    }

    Ok(unit_price)
}
