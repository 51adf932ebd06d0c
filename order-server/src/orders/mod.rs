//! Order workflow engine
//!
//! One action module per order-mutating operation; [`engine`] owns the
//! store and gateway handles and exposes the operation surface the API
//! layer calls.

pub mod actions;
pub mod engine;

pub use engine::OrderWorkflow;
