//! Order Server - marketplace order processing service
//!
//! # Module structure
//!
//! ```text
//! order-server/src/
//! ├── core/      # config, logging, state, http server
//! ├── db/        # embedded redb storage
//! ├── gateway/   # payment gateway client and retry policy
//! ├── orders/    # order workflow engine and actions
//! ├── pricing    # partner tier pricing
//! └── api/       # HTTP routes and handlers
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod gateway;
pub mod orders;
pub mod pricing;

pub use crate::core::config::Config;
pub use crate::core::state::ServerState;
pub use orders::OrderWorkflow;
