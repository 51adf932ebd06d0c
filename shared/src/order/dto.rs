//! Request DTOs
//!
//! Declarative field constraints live on the DTOs via `validator`;
//! domain rules (stock, pricing, state transitions) are enforced by the
//! workflow actions after this first validation pass.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::payment::PaymentBreakdown;
use super::status::{OrderStatus, PaymentStatus};

/// One requested line in an order-creation call
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub size: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    /// Partner-declared PPQ quantity, verified against the server's math
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<u32>,
    /// Partner-declared PPQ price, verified against the server's math
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1), nested)]
    pub order_details: Vec<OrderDetail>,
    #[validate(length(min = 1))]
    pub shipping_address_id: String,
    pub payment: PaymentBreakdown,
    pub total_amount: Decimal,
    /// Reference to an uploaded cheque image (partner cheque payments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
}

/// Body of the gateway's server-to-server callback
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCallbackPayload {
    pub merchant_order_id: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRefundRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    /// SKUs of the lines being returned
    #[validate(length(min = 1))]
    pub skus: Vec<String>,
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_reason: Option<String>,
    #[validate(length(min = 1))]
    pub pickup_address_id: String,
    /// Required for COD orders; passed through opaquely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<Value>,
}

/// One exchange target: an order line plus the desired replacement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeLine {
    #[validate(length(min = 1))]
    pub sku: String,
    #[validate(length(min = 1))]
    pub new_color: String,
    #[validate(length(min = 1))]
    pub new_size: String,
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReturnExchangeRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<ExchangeLine>,
    #[validate(length(min = 1))]
    pub pickup_address_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreditRefundRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderUpdateRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartLineRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub size: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLineRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub size: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLineRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub size: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 4, max = 10))]
    pub pincode: String,
    #[validate(length(min = 8, max = 15))]
    pub phone: String,
}
