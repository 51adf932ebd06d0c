//! Shared types for the marketplace order backend
//!
//! Common types used across crates: the unified error system, domain
//! models (items, carts, addresses, wallets) and the order domain
//! (order documents, status state machine, payment breakdown, DTOs).

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
