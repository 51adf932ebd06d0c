//! Order documents
//!
//! The order is the ledger of record: line snapshots taken at creation
//! time, the payment breakdown, gateway identifiers, and embedded
//! return/exchange/cancellation sub-records. Item and address edits
//! after creation never affect an existing order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payment::{PaymentBreakdown, PaymentMethod};
use super::status::{OrderStatus, PaymentStatus};
use crate::models::{ActorRef, Address};

/// Progress of a refund or exchange sub-record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RefundStatus {
    Initiated,
    Processing,
    Completed,
}

/// Gateway identifiers attached to an online order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInfo {
    /// The gateway's own order id
    pub gateway_order_id: String,
    /// Our id for the checkout session, echoed back in callbacks
    pub merchant_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

/// Order-level refund issued on cancellation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRecord {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: RefundStatus,
    /// Customer-supplied cancellation reason, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_refund_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Return request embedded in an order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnInfo {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    /// Pickup address snapshot
    pub pickup_address: Address,
    pub refund_amount: Decimal,
    pub status: RefundStatus,
    /// Wallet transaction id once the refund is credited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_transaction_id: Option<String>,
    /// Opaque bank details for COD refunds paid outside the wallet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<Value>,
}

/// Exchange request embedded in an order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub pickup_address: Address,
    pub exchange_amount: Decimal,
    pub status: RefundStatus,
    pub new_color: String,
    pub new_size: String,
    pub new_sku: String,
}

/// Snapshot of one purchased line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: String,
    pub item_name: String,
    pub color: String,
    pub size: String,
    pub sku: String,
    pub quantity: u32,
    /// Price per unit actually charged (PPQ tier price for partners)
    pub unit_price: Decimal,
    pub line_total: Decimal,
    #[serde(default)]
    pub is_return: bool,
    #[serde(default)]
    pub is_exchange: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_info: Option<ReturnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_info: Option<ExchangeInfo>,
}

/// The order document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Human-readable id, e.g. `ORD20260823000042`
    pub order_id: String,
    pub actor: ActorRef,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment: PaymentBreakdown,
    pub total_amount: Decimal,
    pub lines: Vec<OrderLine>,
    /// Shipping address snapshot
    pub shipping_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayInfo>,
    /// Refund issued when the whole order is cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_refund: Option<RefundRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
}

impl Order {
    pub fn line(&self, sku: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.sku == sku)
    }

    pub fn line_mut(&mut self, sku: &str) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.sku == sku)
    }

    /// Lines not yet consumed by a return or exchange request
    pub fn open_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.lines.iter().filter(|l| !l.is_return && !l.is_exchange)
    }

    /// Refund amounts approved but not yet credited to the wallet
    pub fn pending_refunds(&self) -> Vec<(&str, Decimal)> {
        self.lines
            .iter()
            .filter_map(|l| {
                let info = l.return_info.as_ref()?;
                (info.status != RefundStatus::Completed).then(|| (l.sku.as_str(), info.refund_amount))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_address() -> Address {
        Address {
            id: "addr-1".into(),
            actor: ActorRef::user("u1"),
            name: "Asha".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
            phone: "9999999999".into(),
        }
    }

    fn sample_line(sku: &str) -> OrderLine {
        OrderLine {
            item_id: "item-1".into(),
            item_name: "Oxford Shirt".into(),
            color: "Blue".into(),
            size: "M".into(),
            sku: sku.into(),
            quantity: 2,
            unit_price: Decimal::from(400),
            line_total: Decimal::from(800),
            is_return: false,
            is_exchange: false,
            return_info: None,
            exchange_info: None,
        }
    }

    fn sample_order() -> Order {
        Order {
            order_id: "ORD20260823000001".into(),
            actor: ActorRef::user("u1"),
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Online,
            payment: PaymentBreakdown::online_only(Decimal::from(800)),
            total_amount: Decimal::from(800),
            lines: vec![sample_line("SKU-A"), sample_line("SKU-B")],
            shipping_address: sample_address(),
            gateway: None,
            cancellation_refund: None,
            cheque_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivery_date: None,
        }
    }

    #[test]
    fn test_line_lookup() {
        let order = sample_order();
        assert!(order.line("SKU-A").is_some());
        assert!(order.line("SKU-Z").is_none());
    }

    #[test]
    fn test_pending_refunds() {
        let mut order = sample_order();
        order.line_mut("SKU-A").unwrap().return_info = Some(ReturnInfo {
            reason: "Damaged".into(),
            specific_reason: None,
            requested_at: Utc::now(),
            pickup_address: sample_address(),
            refund_amount: Decimal::from(800),
            status: RefundStatus::Initiated,
            refund_transaction_id: None,
            bank_details: None,
        });
        order.line_mut("SKU-A").unwrap().is_return = true;

        let pending = order.pending_refunds();
        assert_eq!(pending, vec![("SKU-A", Decimal::from(800))]);
        assert_eq!(order.open_lines().count(), 1);

        order
            .line_mut("SKU-A")
            .unwrap()
            .return_info
            .as_mut()
            .unwrap()
            .status = RefundStatus::Completed;
        assert!(order.pending_refunds().is_empty());
    }
}
