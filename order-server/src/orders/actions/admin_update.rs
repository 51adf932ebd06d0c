//! Admin order update
//!
//! The back office moves orders along the fulfillment chain and marks
//! COD payments paid on delivery. Status changes go through the same
//! transition table as every other handler; there is no force override.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::dto::AdminOrderUpdateRequest;
use shared::order::{Order, OrderStatus};
use tracing::info;
use validator::Validate;

use super::load_order_txn;
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;

pub fn execute(wf: &OrderWorkflow, req: AdminOrderUpdateRequest) -> AppResult<Order> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, &req.order_id)?;

        if let Some(status) = req.status {
            if !order.status.can_transition_to(status) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusTransition,
                    format!("Cannot move order from '{}' to '{}'", order.status, status),
                )
                .with_detail("from", order.status.to_string())
                .with_detail("to", status.to_string()));
            }
            order.status = status;
            if status == OrderStatus::Delivered && order.delivery_date.is_none() {
                order.delivery_date = Some(chrono::Utc::now());
            }
        }
        if let Some(payment_status) = req.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(delivery_date) = req.delivery_date {
            order.delivery_date = Some(delivery_date);
        }

        order.updated_at = chrono::Utc::now();
        Store::put_order_txn(txn, &order)?;
        Ok(order)
    })?;

    info!(
        order_id = %order.order_id,
        status = %order.status,
        payment_status = %order.payment_status,
        "Order updated by admin"
    );
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::*;
    use rust_decimal::Decimal;
    use shared::models::ActorRef;
    use shared::order::PaymentStatus;

    fn update(order_id: &str, status: Option<OrderStatus>) -> AdminOrderUpdateRequest {
        AdminOrderUpdateRequest {
            order_id: order_id.into(),
            status,
            payment_status: None,
            delivery_date: None,
        }
    }

    async fn cod_order(wf: &OrderWorkflow) -> String {
        let actor = ActorRef::user("u1");
        seed_item(wf, &shirt());
        seed_address(wf, &actor, "addr-1");
        seed_cart(wf, &actor, 5);
        wf.create_order(&actor, cod_request(1, Decimal::from(400)))
            .await
            .unwrap()
            .order_id
    }

    #[tokio::test]
    async fn test_fulfillment_chain() {
        let (wf, _gw) = workflow();
        let order_id = cod_order(&wf).await;

        for status in [
            OrderStatus::ReadyForDispatch,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ] {
            let order = wf.admin_update(update(&order_id, Some(status))).unwrap();
            assert_eq!(order.status, status);
        }

        let order = wf
            .get_order_for_actor(&ActorRef::user("u1"), &order_id)
            .unwrap();
        assert!(order.delivery_date.is_some());
    }

    #[tokio::test]
    async fn test_skipping_states_rejected() {
        let (wf, _gw) = workflow();
        let order_id = cod_order(&wf).await;

        let err = wf
            .admin_update(update(&order_id, Some(OrderStatus::Delivered)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn test_cod_marked_paid_on_delivery() {
        let (wf, _gw) = workflow();
        let order_id = cod_order(&wf).await;
        deliver(&wf, &order_id);

        let order = wf
            .get_order_for_actor(&ActorRef::user("u1"), &order_id)
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (wf, _gw) = workflow();
        let err = wf
            .admin_update(update("ORD-MISSING", Some(OrderStatus::Confirmed)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}
