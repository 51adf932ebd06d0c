//! Return with refund
//!
//! Delivered, paid lines can be returned for a refund. A single-line
//! order refunds the order total; a multi-line order refunds unit price
//! times quantity per returned line. COD refunds carry a fixed handling
//! deduction per returned line, floored at zero. Online refunds go back
//! through the gateway in one aggregate call; COD refunds wait for the
//! back office (bank transfer for users, wallet credit for partners).

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ActorRef;
use shared::order::dto::ReturnRefundRequest;
use shared::order::{
    Order, OrderStatus, PaymentMethod, PaymentStatus, RefundStatus, ReturnInfo,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{load_order_for_actor, load_order_txn, post_request_status};
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;

/// Fixed handling deduction per returned line on COD refunds, in
/// currency units
const COD_RETURN_DEDUCTION: i64 = 50;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRefundResponse {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub refund_amount: Decimal,
    pub refund_status: RefundStatus,
}

fn check_refundable(order: &Order) -> AppResult<()> {
    if !order.status.accepts_return_requests() {
        return Err(AppError::with_message(
            ErrorCode::OrderNotReturnable,
            format!("Order in status '{}' does not accept returns", order.status),
        ));
    }
    if order.payment_status != PaymentStatus::Paid {
        return Err(AppError::with_message(
            ErrorCode::PaymentPending,
            "Refunds require a settled payment",
        ));
    }
    Ok(())
}

fn check_line_available(order: &Order, sku: &str) -> AppResult<()> {
    let line = order
        .line(sku)
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
    if line.is_return {
        return Err(AppError::with_message(
            ErrorCode::ItemAlreadyInReturn,
            format!("{sku} already has a return request"),
        ));
    }
    if line.is_exchange {
        return Err(AppError::with_message(
            ErrorCode::ItemAlreadyInExchange,
            format!("{sku} already has an exchange request"),
        ));
    }
    Ok(())
}

pub async fn execute(
    wf: &OrderWorkflow,
    actor: &ActorRef,
    req: ReturnRefundRequest,
) -> AppResult<ReturnRefundResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = load_order_for_actor(&wf.store, actor, &req.order_id)?;
    check_refundable(&order)?;

    let pickup_address = wf
        .store
        .get_address(&req.pickup_address_id)?
        .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;
    if !pickup_address.is_owned_by(actor) {
        return Err(AppError::new(ErrorCode::AddressNotOwned));
    }

    if order.payment_method == PaymentMethod::Cod && req.bank_details.is_none() {
        return Err(AppError::validation(
            "Bank details are required for COD refunds",
        ));
    }

    for sku in &req.skus {
        check_line_available(&order, sku)?;
    }

    // Refund amounts: a single-line order refunds its full total, a
    // multi-line order refunds unit price x quantity per returned line
    let single_line_order = order.lines.len() == 1;
    let mut per_line: Vec<(String, Decimal)> = Vec::with_capacity(req.skus.len());
    for sku in &req.skus {
        let line = order
            .line(sku)
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
        let amount = if single_line_order {
            order.total_amount
        } else {
            line.unit_price * Decimal::from(line.quantity)
        };
        per_line.push((sku.clone(), amount));
    }

    // COD handling deduction, taken off each returned line and floored
    // at zero
    if order.payment_method == PaymentMethod::Cod {
        let deduction = Decimal::from(COD_RETURN_DEDUCTION);
        for (_, amount) in per_line.iter_mut() {
            *amount = (*amount - deduction).max(Decimal::ZERO);
        }
    }
    let refund_total: Decimal = per_line.iter().map(|(_, a)| *a).sum();

    // One aggregate gateway refund for the online component
    let mut gateway_refund_id = None;
    if order.payment_method == PaymentMethod::Online && refund_total > Decimal::ZERO {
        let gw = order
            .gateway
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::PaymentUnexpectedState))?;
        let refund_id = Uuid::new_v4().to_string();
        let id = wf
            .retry
            .run("refund", || {
                wf.gateway
                    .refund(&gw.merchant_order_id, &refund_id, refund_total)
            })
            .await
            .map_err(|e| AppError::gateway_unavailable(e.to_string()))?;
        gateway_refund_id = Some(id);
    }

    let refund_status = if gateway_refund_id.is_some() {
        RefundStatus::Processing
    } else {
        RefundStatus::Initiated
    };

    let order = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, &req.order_id)?;
        check_refundable(&order)?;
        for sku in &req.skus {
            check_line_available(&order, sku)?;
        }

        let now = chrono::Utc::now();
        for (sku, amount) in &per_line {
            let line = order
                .line_mut(sku)
                .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
            line.is_return = true;
            line.return_info = Some(ReturnInfo {
                reason: req.reason.clone(),
                specific_reason: req.specific_reason.clone(),
                requested_at: now,
                pickup_address: pickup_address.clone(),
                refund_amount: *amount,
                status: refund_status,
                refund_transaction_id: gateway_refund_id.clone(),
                bank_details: req.bank_details.clone(),
            });
        }

        let next = post_request_status(&order, false);
        if !order.status.can_transition_to(next) {
            return Err(AppError::new(ErrorCode::InvalidStatusTransition));
        }
        order.status = next;
        order.updated_at = now;
        Store::put_order_txn(txn, &order)?;
        Ok(order)
    })?;

    info!(
        order_id = %order.order_id,
        refund = %refund_total,
        status = %order.status,
        "Return request recorded"
    );

    Ok(ReturnRefundResponse {
        order_id: order.order_id.clone(),
        order_status: order.status,
        refund_amount: refund_total,
        refund_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::*;
    use serde_json::json;
    use shared::order::GatewayState;
    use shared::order::dto::{
        AdminOrderUpdateRequest, CreateOrderRequest, OrderDetail, VerifyPaymentRequest,
    };
    use shared::order::PaymentBreakdown;

    fn return_req(order_id: &str, skus: &[&str]) -> ReturnRefundRequest {
        ReturnRefundRequest {
            order_id: order_id.into(),
            skus: skus.iter().map(|s| s.to_string()).collect(),
            reason: "Damaged".into(),
            specific_reason: Some("Torn seam".into()),
            pickup_address_id: "addr-1".into(),
            bank_details: Some(json!({"account": "123", "ifsc": "ABC0001"})),
        }
    }

    async fn delivered_online_order(
        wf: &OrderWorkflow,
        actor: &ActorRef,
        details: Vec<OrderDetail>,
        total: Decimal,
    ) -> String {
        seed_item(wf, &shirt());
        seed_address(wf, actor, "addr-1");
        seed_cart(wf, actor, 5);
        let req = CreateOrderRequest {
            order_details: details,
            shipping_address_id: "addr-1".into(),
            payment: PaymentBreakdown::online_only(total),
            total_amount: total,
            cheque_reference: None,
        };
        let order_id = wf.create_order(actor, req).await.unwrap().order_id;
        wf.verify_payment(
            actor,
            VerifyPaymentRequest {
                order_id: order_id.clone(),
            },
        )
        .await
        .unwrap();
        deliver(wf, &order_id);
        order_id
    }

    fn two_lines() -> Vec<OrderDetail> {
        vec![
            OrderDetail {
                item_id: "item-1".into(),
                color: "Blue".into(),
                size: "M".into(),
                quantity: 2,
                total_quantity: None,
                total_price: None,
            },
            OrderDetail {
                item_id: "item-1".into(),
                color: "Blue".into(),
                size: "L".into(),
                quantity: 1,
                total_quantity: None,
                total_price: None,
            },
        ]
    }

    #[tokio::test]
    async fn test_single_line_refunds_order_total() {
        let (wf, gw) = workflow();
        let actor = ActorRef::user("u1");
        let order_id =
            delivered_online_order(&wf, &actor, vec![detail(2)], Decimal::from(800)).await;

        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap();

        assert_eq!(resp.refund_amount, Decimal::from(800));
        assert_eq!(resp.refund_status, RefundStatus::Processing);
        assert_eq!(resp.order_status, OrderStatus::Returned);
        assert_eq!(gw.refund_total(), Decimal::from(800));
        assert_eq!(gw.refund_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_return_refunds_line_amounts() {
        let (wf, gw) = workflow();
        let actor = ActorRef::user("u1");
        let order_id =
            delivered_online_order(&wf, &actor, two_lines(), Decimal::from(1200)).await;

        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-L"]))
            .await
            .unwrap();

        // 1 x 400, not the order total
        assert_eq!(resp.refund_amount, Decimal::from(400));
        assert_eq!(resp.order_status, OrderStatus::PartiallyReturned);
        assert_eq!(gw.refund_total(), Decimal::from(400));

        // Returning the remaining line completes the return
        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap();
        assert_eq!(resp.refund_amount, Decimal::from(800));
        assert_eq!(resp.order_status, OrderStatus::Returned);
    }

    #[tokio::test]
    async fn test_cod_deduction_applied() {
        let (wf, gw) = workflow();
        let actor = ActorRef::user("u1");
        seed_item(&wf, &shirt());
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let order_id = wf
            .create_order(&actor, cod_request(1, Decimal::from(400)))
            .await
            .unwrap()
            .order_id;
        deliver(&wf, &order_id);

        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap();

        assert_eq!(resp.refund_amount, Decimal::from(350));
        assert_eq!(resp.refund_status, RefundStatus::Initiated);
        // COD refunds never touch the gateway
        assert!(gw.refund_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cod_deduction_floors_at_zero() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        let mut cheap = shirt();
        cheap.discounted_price = Decimal::from(30);
        seed_item(&wf, &cheap);
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let order_id = wf
            .create_order(&actor, cod_request(1, Decimal::from(30)))
            .await
            .unwrap()
            .order_id;
        deliver(&wf, &order_id);

        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap();
        assert_eq!(resp.refund_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_cod_deduction_applies_to_each_line() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        seed_item(&wf, &shirt());
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let req = CreateOrderRequest {
            order_details: two_lines(),
            shipping_address_id: "addr-1".into(),
            payment: PaymentBreakdown::cod_only(Decimal::from(1200)),
            total_amount: Decimal::from(1200),
            cheque_reference: None,
        };
        let order_id = wf.create_order(&actor, req).await.unwrap().order_id;
        deliver(&wf, &order_id);

        // 2 x 400 - 50 for the M line, 1 x 400 - 50 for the L line
        let resp = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M", "SKU-BLU-L"]))
            .await
            .unwrap();
        assert_eq!(resp.refund_amount, Decimal::from(1100));

        let order = wf.get_order_for_actor(&actor, &order_id).unwrap();
        let m = order.line("SKU-BLU-M").unwrap().return_info.as_ref().unwrap();
        let l = order.line("SKU-BLU-L").unwrap().return_info.as_ref().unwrap();
        assert_eq!(m.refund_amount, Decimal::from(750));
        assert_eq!(l.refund_amount, Decimal::from(350));
    }

    #[tokio::test]
    async fn test_unpaid_delivered_order_rejected() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        seed_item(&wf, &shirt());
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let order_id = wf
            .create_order(&actor, cod_request(1, Decimal::from(400)))
            .await
            .unwrap()
            .order_id;

        // Delivered without the payment ever being marked Paid
        for status in [
            OrderStatus::ReadyForDispatch,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ] {
            wf.admin_update(AdminOrderUpdateRequest {
                order_id: order_id.clone(),
                status: Some(status),
                payment_status: None,
                delivery_date: None,
            })
            .unwrap();
        }

        let err = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentPending);
    }

    #[tokio::test]
    async fn test_cod_requires_bank_details() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        seed_item(&wf, &shirt());
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let order_id = wf
            .create_order(&actor, cod_request(1, Decimal::from(400)))
            .await
            .unwrap()
            .order_id;
        deliver(&wf, &order_id);

        let mut req = return_req(&order_id, &["SKU-BLU-M"]);
        req.bank_details = None;
        let err = wf.return_refund(&actor, req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_double_return_rejected() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        let order_id =
            delivered_online_order(&wf, &actor, two_lines(), Decimal::from(1200)).await;

        wf.return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap();
        let err = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemAlreadyInReturn);
    }

    #[tokio::test]
    async fn test_undelivered_order_not_returnable() {
        let (wf, _gw) = workflow();
        let actor = ActorRef::user("u1");
        seed_item(&wf, &shirt());
        seed_address(&wf, &actor, "addr-1");
        seed_cart(&wf, &actor, 5);
        let order_id = wf
            .create_order(&actor, cod_request(1, Decimal::from(400)))
            .await
            .unwrap()
            .order_id;

        let err = wf
            .return_refund(&actor, return_req(&order_id, &["SKU-BLU-M"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotReturnable);
    }
}
