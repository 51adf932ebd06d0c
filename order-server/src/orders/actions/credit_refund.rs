//! Admin: credit pending return refunds to the partner wallet
//!
//! Collects every return refund on the order that has not yet been
//! completed, credits the partner wallet once per refund with the order
//! id on the ledger entry, and marks the sub-records completed with the
//! ledger transaction id. Re-invocation finds nothing pending and is
//! rejected, so a refund can never be credited twice.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ActorKind;
use shared::order::RefundStatus;
use shared::order::dto::CreditRefundRequest;
use tracing::info;
use validator::Validate;

use super::load_order_txn;
use crate::db::Store;
use crate::orders::engine::OrderWorkflow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRefundResponse {
    pub order_id: String,
    pub credited_amount: Decimal,
    pub credited_refunds: usize,
    pub wallet_balance: Decimal,
}

pub fn execute(wf: &OrderWorkflow, req: CreditRefundRequest) -> AppResult<CreditRefundResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let response = wf.store.with_write(|txn| {
        let mut order = load_order_txn(txn, &req.order_id)?;
        if order.actor.kind != ActorKind::Partner {
            return Err(AppError::invalid_request(
                "Wallet credits apply to partner orders only",
            ));
        }
        if order.pending_refunds().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RefundNothingPending,
                "No pending refunds on this order",
            ));
        }

        let mut wallet = Store::get_wallet_txn(txn, &order.actor.id)?
            .unwrap_or_else(|| shared::models::Wallet::new(&order.actor.id));

        let note = req
            .note
            .clone()
            .unwrap_or_else(|| "Return refund".to_string());
        let mut credited_amount = Decimal::ZERO;
        let mut credited_refunds = 0usize;
        let order_id = order.order_id.clone();

        for line in order.lines.iter_mut() {
            let Some(info) = line.return_info.as_mut() else {
                continue;
            };
            if info.status == RefundStatus::Completed {
                continue;
            }
            let entry_id = wallet
                .credit(info.refund_amount, Some(order_id.clone()), Some(note.clone()))
                .id
                .clone();
            info.status = RefundStatus::Completed;
            info.refund_transaction_id = Some(entry_id);
            credited_amount += info.refund_amount;
            credited_refunds += 1;
        }

        order.updated_at = chrono::Utc::now();
        Store::put_wallet_txn(txn, &wallet)?;
        Store::put_order_txn(txn, &order)?;

        Ok(CreditRefundResponse {
            order_id,
            credited_amount,
            credited_refunds,
            wallet_balance: wallet.total_balance,
        })
    })?;

    info!(
        order_id = %response.order_id,
        amount = %response.credited_amount,
        refunds = response.credited_refunds,
        "Refunds credited to wallet"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::testutil::*;
    use serde_json::json;
    use shared::models::ActorRef;
    use shared::order::PaymentBreakdown;
    use shared::order::dto::{CreateOrderRequest, OrderDetail, ReturnRefundRequest};

    fn credit_req(order_id: &str) -> CreditRefundRequest {
        CreditRefundRequest {
            order_id: order_id.into(),
            note: Some("Return settled".into()),
        }
    }

    async fn returned_partner_order(wf: &OrderWorkflow) -> (ActorRef, String) {
        let actor = ActorRef::partner("p1");
        seed_item(wf, &shirt());
        seed_address(wf, &actor, "addr-1");
        seed_cart(wf, &actor, 5);

        let req = CreateOrderRequest {
            order_details: vec![OrderDetail {
                item_id: "item-1".into(),
                color: "Blue".into(),
                size: "M".into(),
                quantity: 2,
                total_quantity: Some(2),
                total_price: Some(Decimal::from(800)),
            }],
            shipping_address_id: "addr-1".into(),
            payment: PaymentBreakdown::cod_only(Decimal::from(800)),
            total_amount: Decimal::from(800),
            cheque_reference: None,
        };
        let order_id = wf.create_order(&actor, req).await.unwrap().order_id;
        deliver(wf, &order_id);

        wf.return_refund(
            &actor,
            ReturnRefundRequest {
                order_id: order_id.clone(),
                skus: vec!["SKU-BLU-M".into()],
                reason: "Damaged".into(),
                specific_reason: None,
                pickup_address_id: "addr-1".into(),
                bank_details: Some(json!({"account": "1"})),
            },
        )
        .await
        .unwrap();

        (actor, order_id)
    }

    #[tokio::test]
    async fn test_credit_marks_refunds_completed() {
        let (wf, _gw) = workflow();
        let (actor, order_id) = returned_partner_order(&wf).await;

        let resp = wf.credit_refund(credit_req(&order_id)).unwrap();
        // 800 total minus the COD deduction of 50
        assert_eq!(resp.credited_amount, Decimal::from(750));
        assert_eq!(resp.credited_refunds, 1);
        assert_eq!(resp.wallet_balance, Decimal::from(750));

        let order = wf.get_order_for_actor(&actor, &order_id).unwrap();
        let info = order.line("SKU-BLU-M").unwrap().return_info.as_ref().unwrap();
        assert_eq!(info.status, RefundStatus::Completed);
        assert!(info.refund_transaction_id.is_some());

        let wallet = wf.get_wallet("p1").unwrap();
        assert_eq!(
            wallet.transactions.last().unwrap().order_id.as_deref(),
            Some(order_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_second_credit_rejected() {
        let (wf, _gw) = workflow();
        let (_actor, order_id) = returned_partner_order(&wf).await;

        wf.credit_refund(credit_req(&order_id)).unwrap();
        let err = wf.credit_refund(credit_req(&order_id)).unwrap_err();
        assert_eq!(err.code, ErrorCode::RefundNothingPending);

        // Balance unchanged by the rejected call
        assert_eq!(wf.get_wallet("p1").unwrap().total_balance, Decimal::from(750));
    }

    #[tokio::test]
    async fn test_user_order_rejected() {
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

        let err = wf.credit_refund(credit_req(&order_id)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
