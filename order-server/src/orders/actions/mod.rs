//! One module per order-mutating operation

pub mod admin_update;
pub mod cancel_order;
pub mod create_order;
pub mod credit_refund;
pub mod return_exchange;
pub mod return_refund;
pub mod verify_payment;

use redb::WriteTransaction;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ActorRef;
use shared::order::{Order, OrderLine, OrderStatus};

use crate::db::Store;

/// Load an order scoped to its owner. A foreign order id reads as not
/// found rather than leaking its existence.
pub(crate) fn load_order_for_actor(
    store: &Store,
    actor: &ActorRef,
    order_id: &str,
) -> AppResult<Order> {
    let order = store
        .get_order(order_id)?
        .filter(|o| &o.actor == actor)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(order)
}

pub(crate) fn load_order_txn(txn: &WriteTransaction, order_id: &str) -> AppResult<Order> {
    Store::get_order_txn(txn, order_id)?.ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
}

/// Put every line's quantity back into catalog stock
pub(crate) fn restore_stock_txn(txn: &WriteTransaction, lines: &[OrderLine]) -> AppResult<()> {
    for line in lines {
        let Some(mut item) = Store::get_item_txn(txn, &line.item_id)? else {
            // Item removed from the catalog since the order was placed
            continue;
        };
        if let Some(variant) = item.variant_mut(&line.color, &line.size) {
            variant.set_stock(variant.stock + line.quantity);
            Store::put_item_txn(txn, &item)?;
        }
    }
    Ok(())
}

/// Credit a partner wallet inside the caller's transaction, creating the
/// wallet if needed. Returns the ledger transaction id.
pub(crate) fn credit_wallet_txn(
    txn: &WriteTransaction,
    partner_id: &str,
    amount: rust_decimal::Decimal,
    order_id: &str,
    note: &str,
) -> AppResult<String> {
    let mut wallet = Store::get_wallet_txn(txn, partner_id)?
        .unwrap_or_else(|| shared::models::Wallet::new(partner_id));
    let entry_id = wallet
        .credit(amount, Some(order_id.to_string()), Some(note.to_string()))
        .id
        .clone();
    Store::put_wallet_txn(txn, &wallet)?;
    Ok(entry_id)
}

/// Fulfillment status after flagging lines for return/exchange
pub(crate) fn post_request_status(order: &Order, exchange_request: bool) -> OrderStatus {
    let all_flagged = order.lines.iter().all(|l| l.is_return || l.is_exchange);
    if all_flagged {
        let any_return = order.lines.iter().any(|l| l.is_return);
        if any_return {
            OrderStatus::Returned
        } else {
            OrderStatus::Exchanged
        }
    } else if exchange_request {
        OrderStatus::PartiallyExchanged
    } else {
        OrderStatus::PartiallyReturned
    }
}
