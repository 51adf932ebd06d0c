//! Order domain types
//!
//! - [`status`] - fulfillment and payment state machines
//! - [`payment`] - payment breakdown matrix and gateway states
//! - [`model`] - the order document and its embedded sub-records
//! - [`dto`] - request payloads with declarative validation

pub mod dto;
pub mod model;
pub mod payment;
pub mod status;

pub use model::{
    ExchangeInfo, GatewayInfo, Order, OrderLine, RefundRecord, RefundStatus, ReturnInfo,
};
pub use payment::{GatewayState, PaymentBreakdown, PaymentMethod};
pub use status::{OrderStatus, PaymentStatus};
