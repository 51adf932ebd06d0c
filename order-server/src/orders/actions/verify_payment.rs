//! Payment finalization
//!
//! Client-initiated verification and the gateway callback share one
//! finalization path. A terminal payment status short-circuits, so
//! replays and the verify/callback race are harmless. Unpaid sessions
//! older than the payment TTL expire lazily here; there is no
//! background sweeper.
//!
//! When the gateway reports COMPLETED for an order that was meanwhile
//! cancelled or expired, the captured funds are returned with a
//! best-effort compensating refund.

use chrono::Duration;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, ActorRef};
use shared::order::dto::VerifyPaymentRequest;
use shared::order::{
    GatewayState, Order, OrderStatus, PaymentMethod, PaymentStatus, RefundRecord, RefundStatus,
};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{credit_wallet_txn, load_order_for_actor, load_order_txn, restore_stock_txn};
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;

/// Unpaid checkout sessions expire after this many minutes
pub const PAYMENT_TTL_MINUTES: i64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// The gateway has not settled the session yet; nothing changed
    pub still_pending: bool,
}

fn response(order: &Order, still_pending: bool) -> PaymentStatusResponse {
    PaymentStatusResponse {
        order_id: order.order_id.clone(),
        order_status: order.status,
        payment_status: order.payment_status,
        still_pending,
    }
}

pub async fn execute(
    wf: &OrderWorkflow,
    actor: &ActorRef,
    req: VerifyPaymentRequest,
) -> AppResult<PaymentStatusResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = load_order_for_actor(&wf.store, actor, &req.order_id)?;
    let Some(info) = order.gateway.clone() else {
        return Err(AppError::with_message(
            ErrorCode::PaymentNotOnline,
            "Order has no online payment to verify",
        ));
    };

    if order.payment_status.is_terminal() {
        return Ok(response(&order, false));
    }

    let state = wf
        .retry
        .run("verify", || wf.gateway.verify(&info.merchant_order_id))
        .await
        .map_err(|e| AppError::gateway_unavailable(e.to_string()))?;

    finalize(wf, &order.order_id, state).await
}

/// Entry point for the gateway's server-to-server callback; the HTTP
/// layer has already checked the callback authorization digest.
pub async fn execute_callback(
    wf: &OrderWorkflow,
    merchant_order_id: &str,
    raw_state: &str,
) -> AppResult<PaymentStatusResponse> {
    let order_id = wf
        .store
        .order_id_for_merchant(merchant_order_id)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    finalize(wf, &order_id, GatewayState::parse(raw_state)).await
}

enum Outcome {
    Done(Order, bool),
    /// Funds were captured for an order that can no longer be fulfilled
    Compensate(Order),
}

pub(crate) async fn finalize(
    wf: &OrderWorkflow,
    order_id: &str,
    state: GatewayState,
) -> AppResult<PaymentStatusResponse> {
    let outcome = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, order_id)?;

        if order.payment_status.is_terminal() {
            if state == GatewayState::Completed && order.payment_status != PaymentStatus::Paid {
                return Ok(Outcome::Compensate(order));
            }
            return Ok(Outcome::Done(order, false));
        }

        let now = chrono::Utc::now();
        match state {
            GatewayState::Completed => {
                order.payment_status = PaymentStatus::Paid;
                order.updated_at = now;
                if order.status == OrderStatus::Cancelled {
                    Store::put_order_txn(txn, &order)?;
                    return Ok(Outcome::Compensate(order));
                }
                if order.status == OrderStatus::Initiated {
                    order.status = OrderStatus::Confirmed;
                }
                Store::put_order_txn(txn, &order)?;
                Ok(Outcome::Done(order, false))
            }
            GatewayState::Failed | GatewayState::AttemptFailed => {
                order.payment_status = PaymentStatus::Failed;
                fail_order_txn(txn, &mut order)?;
                order.updated_at = now;
                Store::put_order_txn(txn, &order)?;
                Ok(Outcome::Done(order, false))
            }
            GatewayState::Pending | GatewayState::Initiated => {
                if now - order.created_at > Duration::minutes(PAYMENT_TTL_MINUTES) {
                    order.payment_status = PaymentStatus::Expired;
                    fail_order_txn(txn, &mut order)?;
                    order.updated_at = now;
                    Store::put_order_txn(txn, &order)?;
                    Ok(Outcome::Done(order, false))
                } else {
                    // Still within the payment window; nothing changes
                    Ok(Outcome::Done(order, true))
                }
            }
            GatewayState::Other(raw) => Err(AppError::with_message(
                ErrorCode::PaymentUnexpectedState,
                format!("Gateway returned unexpected state: {raw}"),
            )
            .with_detail("state", raw)),
        }
    })?;

    match outcome {
        Outcome::Done(order, still_pending) => {
            if !still_pending {
                info!(
                    order_id = %order.order_id,
                    payment_status = %order.payment_status,
                    order_status = %order.status,
                    "Payment finalized"
                );
            }
            Ok(response(&order, still_pending))
        }
        Outcome::Compensate(order) => {
            warn!(
                order_id = %order.order_id,
                order_status = %order.status,
                "Payment completed for a dead order; issuing compensating refund"
            );
            compensate(wf, &order).await;
            Ok(response(&order, false))
        }
    }
}

/// Cancel an unpayable order: restore stock and return any wallet funds
fn fail_order_txn(txn: &redb::WriteTransaction, order: &mut Order) -> AppResult<()> {
    if order.status.can_transition_to(OrderStatus::Cancelled) {
        order.status = OrderStatus::Cancelled;
        restore_stock_txn(txn, &order.lines)?;
        if order.actor.kind == ActorKind::Partner && order.payment.wallet > rust_decimal::Decimal::ZERO
        {
            credit_wallet_txn(
                txn,
                &order.actor.id,
                order.payment.wallet,
                &order.order_id,
                "Refund of wallet amount for failed payment",
            )?;
        }
    }
    Ok(())
}

/// Best-effort refund of the online component; failures are logged, not
/// surfaced to the gateway
async fn compensate(wf: &OrderWorkflow, order: &Order) {
    let Some(info) = order.gateway.as_ref() else {
        return;
    };
    let refund_id = Uuid::new_v4().to_string();
    let result = wf
        .retry
        .run("refund", || {
            wf.gateway
                .refund(&info.merchant_order_id, &refund_id, order.payment.online)
        })
        .await;

    match result {
        Ok(gateway_refund_id) => {
            let record = RefundRecord {
                amount: order.payment.online,
                method: PaymentMethod::Online,
                status: RefundStatus::Processing,
                reason: None,
                gateway_refund_id: Some(gateway_refund_id),
                wallet_transaction_id: None,
                created_at: chrono::Utc::now(),
            };
            let write = wf.store.with_write(|txn| {
                let mut order = load_order_txn(txn, &order.order_id)?;
                order.cancellation_refund = Some(record.clone());
                order.updated_at = chrono::Utc::now();
                Store::put_order_txn(txn, &order)?;
                Ok(())
            });
            if let Err(e) = write {
                error!(order_id = %order.order_id, error = %e, "Failed to record compensating refund");
            }
        }
        Err(e) => {
            error!(
                order_id = %order.order_id,
                error = %e,
                "Compensating refund failed; manual reconciliation required"
            );
        }
    }
}
