//! Return with exchange
//!
//! Delivered lines can be exchanged for another color/size of the same
//! item at the same price, several lines per request with their own
//! replacement each. Replacement stock is checked at request time but
//! not reserved; the pick happens when the exchange is fulfilled.

use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, ActorRef};
use shared::order::dto::ReturnExchangeRequest;
use shared::order::{ExchangeInfo, OrderStatus, RefundStatus};
use tracing::info;
use validator::Validate;

use super::{load_order_for_actor, load_order_txn, post_request_status};
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;
use crate::pricing;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangedLine {
    pub sku: String,
    pub new_sku: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnExchangeResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub exchanges: Vec<ExchangedLine>,
}

/// Validated exchange target, resolved against the order and catalog
struct ExchangePlan {
    sku: String,
    new_color: String,
    new_size: String,
    new_sku: String,
    reason: String,
    specific_reason: Option<String>,
}

pub async fn execute(
    wf: &OrderWorkflow,
    actor: &ActorRef,
    req: ReturnExchangeRequest,
) -> AppResult<ReturnExchangeResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = load_order_for_actor(&wf.store, actor, &req.order_id)?;
    if !order.status.accepts_return_requests() {
        return Err(AppError::with_message(
            ErrorCode::OrderNotReturnable,
            format!("Order in status '{}' does not accept exchanges", order.status),
        ));
    }

    let pickup_address = wf
        .store
        .get_address(&req.pickup_address_id)?
        .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;
    if !pickup_address.is_owned_by(actor) {
        return Err(AppError::new(ErrorCode::AddressNotOwned));
    }

    let mut plans: Vec<ExchangePlan> = Vec::with_capacity(req.lines.len());
    for target in &req.lines {
        let line = order
            .line(&target.sku)
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
        if line.is_return {
            return Err(AppError::new(ErrorCode::ItemAlreadyInReturn));
        }
        if line.is_exchange {
            return Err(AppError::new(ErrorCode::ItemAlreadyInExchange));
        }

        let item = wf
            .store
            .get_item(&line.item_id)?
            .ok_or_else(|| AppError::new(ErrorCode::ItemNotFound))?;
        let replacement = item
            .variant(&target.new_color, &target.new_size)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::VariantNotFound,
                    format!(
                        "No {} / {} variant to exchange into",
                        target.new_color, target.new_size
                    ),
                )
            })?;
        if replacement.stock < line.quantity {
            return Err(AppError::insufficient_stock(
                &replacement.sku,
                replacement.stock,
                line.quantity,
            ));
        }

        // Exchanges are only for identical pricing; anything else is a
        // return plus a new order
        let current_price = match actor.kind {
            ActorKind::User => item.discounted_price,
            ActorKind::Partner => pricing::tier_unit_price(&item, line.quantity),
        };
        if current_price != line.unit_price {
            return Err(AppError::with_message(
                ErrorCode::ExchangePriceMismatch,
                format!(
                    "Current price {} differs from purchase price {}",
                    current_price, line.unit_price
                ),
            ));
        }

        plans.push(ExchangePlan {
            sku: target.sku.clone(),
            new_color: target.new_color.clone(),
            new_size: target.new_size.clone(),
            new_sku: replacement.sku.clone(),
            reason: target.reason.clone(),
            specific_reason: target.specific_reason.clone(),
        });
    }

    let order = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, &req.order_id)?;
        if !order.status.accepts_return_requests() {
            return Err(AppError::new(ErrorCode::OrderNotReturnable));
        }
        let now = chrono::Utc::now();
        for plan in &plans {
            let line = order
                .line_mut(&plan.sku)
                .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
            if line.is_return {
                return Err(AppError::new(ErrorCode::ItemAlreadyInReturn));
            }
            if line.is_exchange {
                return Err(AppError::new(ErrorCode::ItemAlreadyInExchange));
            }
            line.is_exchange = true;
            line.exchange_info = Some(ExchangeInfo {
                reason: plan.reason.clone(),
                specific_reason: plan.specific_reason.clone(),
                requested_at: now,
                pickup_address: pickup_address.clone(),
                exchange_amount: line.line_total,
                status: RefundStatus::Initiated,
                new_color: plan.new_color.clone(),
                new_size: plan.new_size.clone(),
                new_sku: plan.new_sku.clone(),
            });
        }

        let next = post_request_status(&order, true);
        if !order.status.can_transition_to(next) {
            return Err(AppError::new(ErrorCode::InvalidStatusTransition));
        }
        order.status = next;
        order.updated_at = now;
        Store::put_order_txn(txn, &order)?;
        Ok(order)
    })?;

    let exchanges: Vec<ExchangedLine> = plans
        .into_iter()
        .map(|p| ExchangedLine {
            sku: p.sku,
            new_sku: p.new_sku,
        })
        .collect();

    info!(
        order_id = %order.order_id,
        lines = exchanges.len(),
        status = %order.status,
        "Exchange request recorded"
    );

    Ok(ReturnExchangeResponse {
        order_id: order.order_id.clone(),
        order_status: order.status,
        exchanges,
    })
}
