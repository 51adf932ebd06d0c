//! Order cancellation
//!
//! Allowed until dispatch. The gateway refund for a paid online
//! component is issued before the write transaction; the transaction
//! then re-checks cancellability and atomically marks the order
//! cancelled, records the refund, restores stock, and returns any
//! wallet amount used.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, ActorRef};
use shared::order::dto::CancelOrderRequest;
use shared::order::{
    Order, OrderStatus, PaymentStatus, RefundRecord, RefundStatus,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{credit_wallet_txn, load_order_for_actor, load_order_txn, restore_stock_txn};
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub refund: RefundRecord,
}

fn check_cancellable(order: &Order) -> AppResult<()> {
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::new(ErrorCode::OrderAlreadyCancelled));
    }
    if !order.status.is_cancellable() {
        return Err(AppError::with_message(
            ErrorCode::OrderNotCancellable,
            format!("Order cannot be cancelled in status '{}'", order.status),
        ));
    }
    Ok(())
}

pub async fn execute(
    wf: &OrderWorkflow,
    actor: &ActorRef,
    req: CancelOrderRequest,
) -> AppResult<CancelOrderResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = load_order_for_actor(&wf.store, actor, &req.order_id)?;
    check_cancellable(&order)?;

    // Paid online component: refund through the gateway first, while no
    // write transaction is open
    let mut gateway_refund_id = None;
    if order.payment.online > Decimal::ZERO && order.payment_status == PaymentStatus::Paid {
        let info = order
            .gateway
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::PaymentUnexpectedState))?;
        let refund_id = Uuid::new_v4().to_string();
        let id = wf
            .retry
            .run("refund", || {
                wf.gateway
                    .refund(&info.merchant_order_id, &refund_id, order.payment.online)
            })
            .await
            .map_err(|e| AppError::gateway_unavailable(e.to_string()))?;
        gateway_refund_id = Some(id);
    }

    let order = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, &req.order_id)?;
        check_cancellable(&order)?;

        restore_stock_txn(txn, &order.lines)?;

        let mut wallet_transaction_id = None;
        let mut refunded = Decimal::ZERO;
        if order.actor.kind == ActorKind::Partner && order.payment.wallet > Decimal::ZERO {
            let id = credit_wallet_txn(
                txn,
                &order.actor.id,
                order.payment.wallet,
                &order.order_id,
                "Refund for cancelled order",
            )?;
            wallet_transaction_id = Some(id);
            refunded += order.payment.wallet;
        }
        if gateway_refund_id.is_some() {
            refunded += order.payment.online;
        }

        order.status = OrderStatus::Cancelled;
        order.cancellation_refund = Some(RefundRecord {
            amount: refunded,
            method: order.payment_method,
            status: if gateway_refund_id.is_some() {
                RefundStatus::Processing
            } else {
                // Nothing captured yet (COD, cheque, unpaid online);
                // the wallet portion, if any, is already back
                RefundStatus::Completed
            },
            reason: req.reason.clone(),
            gateway_refund_id: gateway_refund_id.clone(),
            wallet_transaction_id,
            created_at: chrono::Utc::now(),
        });
        order.updated_at = chrono::Utc::now();
        Store::put_order_txn(txn, &order)?;
        Ok(order)
    })?;

    info!(
        order_id = %order.order_id,
        actor = %actor,
        "Order cancelled"
    );

    Ok(CancelOrderResponse {
        order_id: order.order_id.clone(),
        order_status: order.status,
        refund: order.cancellation_refund.clone().unwrap_or(RefundRecord {
            amount: Decimal::ZERO,
            method: order.payment_method,
            status: RefundStatus::Completed,
            reason: req.reason.clone(),
            gateway_refund_id: None,
            wallet_transaction_id: None,
            created_at: chrono::Utc::now(),
        }),
    })
}
