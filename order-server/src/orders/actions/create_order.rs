//! Order creation
//!
//! Checkout must come from the actor's cart: every requested line has to
//! be present there with at least the requested quantity, which closes
//! the gap between what the client displayed and what it submits.
//! Validation and pricing run against a read snapshot first; the gateway
//! checkout session (online component) is created next, while no write
//! transaction is open; the write transaction then re-checks the cart,
//! stock and wallet balance before committing the order, the stock
//! decrements, the wallet debit and the cart reduction together. A
//! failed gateway call leaves no order behind; an aborted transaction
//! leaves an unpaid checkout session that lazily expires.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, ActorRef, Cart};
use shared::order::dto::{CreateOrderRequest, OrderDetail};
use shared::order::{
    GatewayInfo, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::db::Store;
use crate::orders::engine::OrderWorkflow;
use crate::pricing;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

/// Every requested line must sit in the cart with at least the
/// requested quantity
fn check_cart_holds(cart: &Cart, details: &[OrderDetail]) -> AppResult<()> {
    for detail in details {
        let line = cart
            .line(&detail.item_id, &detail.color, &detail.size)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::CartLineMissing,
                    format!(
                        "Item {} ({} / {}) is not in the cart",
                        detail.item_id, detail.color, detail.size
                    ),
                )
            })?;
        if line.quantity < detail.quantity {
            return Err(AppError::with_message(
                ErrorCode::CartQuantityExceeded,
                format!(
                    "Cart holds {} of {}, order requests {}",
                    line.quantity, line.sku, detail.quantity
                ),
            )
            .with_detail("sku", line.sku.clone()));
        }
    }
    Ok(())
}

pub async fn execute(
    wf: &OrderWorkflow,
    actor: &ActorRef,
    req: CreateOrderRequest,
) -> AppResult<CreateOrderResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let method = req.payment.validate(req.total_amount)?;
    if actor.kind == ActorKind::User
        && (req.payment.wallet > Decimal::ZERO || req.payment.cheque > Decimal::ZERO)
    {
        return Err(AppError::with_message(
            ErrorCode::PaymentMethodInvalid,
            "Wallet and cheque payments are available to partners only",
        ));
    }

    let address = wf
        .store
        .get_address(&req.shipping_address_id)?
        .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;
    if !address.is_owned_by(actor) {
        return Err(AppError::new(ErrorCode::AddressNotOwned));
    }

    let cart = wf
        .store
        .get_cart(actor)?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
    check_cart_holds(&cart, &req.order_details)?;

    // Read-phase pricing and stock validation
    let mut lines: Vec<OrderLine> = Vec::with_capacity(req.order_details.len());
    let mut computed_total = Decimal::ZERO;
    for detail in &req.order_details {
        let item = wf.store.get_item(&detail.item_id)?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ItemNotFound,
                format!("Item {} not found", detail.item_id),
            )
        })?;
        let variant = item.variant(&detail.color, &detail.size).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::VariantNotFound,
                format!(
                    "Item {} has no {} / {} variant",
                    detail.item_id, detail.color, detail.size
                ),
            )
        })?;
        if variant.stock < detail.quantity {
            return Err(AppError::insufficient_stock(
                &variant.sku,
                variant.stock,
                detail.quantity,
            ));
        }

        let unit_price = match actor.kind {
            ActorKind::User => item.discounted_price,
            ActorKind::Partner => pricing::verify_declared_totals(detail, &item)?,
        };
        let line_total = unit_price * Decimal::from(detail.quantity);
        computed_total += line_total;

        lines.push(OrderLine {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            color: detail.color.clone(),
            size: detail.size.clone(),
            sku: variant.sku.clone(),
            quantity: detail.quantity,
            unit_price,
            line_total,
            is_return: false,
            is_exchange: false,
            return_info: None,
            exchange_info: None,
        });
    }

    if computed_total != req.total_amount {
        return Err(AppError::with_message(
            ErrorCode::PriceMismatch,
            format!(
                "Declared total {} does not match computed total {}",
                req.total_amount, computed_total
            ),
        )
        .with_detail("declared", req.total_amount.to_string())
        .with_detail("computed", computed_total.to_string()));
    }

    if req.payment.wallet > Decimal::ZERO {
        let wallet = wf
            .store
            .get_wallet(&actor.id)?
            .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound))?;
        if wallet.total_balance < req.payment.wallet {
            return Err(AppError::new(ErrorCode::WalletInsufficientBalance));
        }
    }

    // Checkout session before the write transaction; initiate captures
    // no funds, so an abort below needs no compensation
    let mut gateway_info: Option<GatewayInfo> = None;
    if req.payment.online > Decimal::ZERO {
        let merchant_order_id = Uuid::new_v4().to_string();
        let session = wf
            .retry
            .run("initiate", || {
                wf.gateway
                    .initiate(&merchant_order_id, req.payment.online, &wf.redirect_url)
            })
            .await
            .map_err(|e| AppError::gateway_unavailable(e.to_string()))?;
        gateway_info = Some(GatewayInfo {
            gateway_order_id: session.gateway_order_id,
            merchant_order_id,
            checkout_url: session.checkout_url,
        });
    }

    let status = if gateway_info.is_some() {
        OrderStatus::Initiated
    } else {
        // COD, cheque and wallet-only orders skip the Initiated state
        OrderStatus::Confirmed
    };

    let order = wf.store.with_write(|txn| {
        let order_id = Store::next_order_id(txn)?;

        // Re-check and decrement stock atomically
        for line in &lines {
            let mut item = Store::get_item_txn(txn, &line.item_id)?.ok_or_else(|| {
                AppError::with_message(ErrorCode::ItemNotFound, "Item removed from catalog")
            })?;
            let variant = item
                .variant_mut(&line.color, &line.size)
                .ok_or_else(|| AppError::new(ErrorCode::VariantNotFound))?;
            if variant.stock < line.quantity {
                return Err(AppError::insufficient_stock(
                    &line.sku,
                    variant.stock,
                    line.quantity,
                ));
            }
            variant.set_stock(variant.stock - line.quantity);
            Store::put_item_txn(txn, &item)?;
        }

        // Wallet debit, paired with its ledger entry
        if req.payment.wallet > Decimal::ZERO {
            let mut wallet = Store::get_wallet_txn(txn, &actor.id)?
                .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound))?;
            wallet.debit(
                req.payment.wallet,
                Some(order_id.clone()),
                Some("Order payment".into()),
            )?;
            Store::put_wallet_txn(txn, &wallet)?;
        }

        // Re-check the cart, then reduce it by the purchased quantities
        let mut cart = Store::get_cart_txn(txn, actor)?
            .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
        check_cart_holds(&cart, &req.order_details)?;
        for line in &lines {
            cart.reduce_line(&line.item_id, &line.color, &line.size, line.quantity);
        }
        Store::put_cart_txn(txn, &cart)?;

        let now = chrono::Utc::now();
        let order = Order {
            order_id: order_id.clone(),
            actor: actor.clone(),
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: method,
            payment: req.payment.clone(),
            total_amount: req.total_amount,
            lines: lines.clone(),
            shipping_address: address.clone(),
            gateway: gateway_info.clone(),
            cancellation_refund: None,
            cheque_reference: req.cheque_reference.clone(),
            created_at: now,
            updated_at: now,
            delivery_date: None,
        };
        Store::put_order_txn(txn, &order)?;
        if let Some(info) = &order.gateway {
            Store::put_merchant_index_txn(txn, &info.merchant_order_id, &order_id)?;
        }

        Ok(order)
    })?;

    info!(
        order_id = %order.order_id,
        actor = %actor,
        method = ?method,
        total = %order.total_amount,
        "Order created"
    );

    Ok(CreateOrderResponse {
        order_id: order.order_id.clone(),
        status: order.status,
        payment_status: order.payment_status,
        total_amount: order.total_amount,
        checkout_url: order
            .gateway
            .as_ref()
            .and_then(|g| g.checkout_url.clone()),
    })
}
