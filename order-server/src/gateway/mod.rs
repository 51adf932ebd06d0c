//! Payment gateway integration
//!
//! The gateway is driven through its REST API directly (no SDK). All
//! workflow-side calls go through [`retry::RetryPolicy`]; the gateway is
//! never called while a store write transaction is open.

pub mod client;
pub mod retry;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use shared::order::GatewayState;
use thiserror::Error;

/// Gateway call errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected the request: {0}")]
    Api(String),

    #[error("Gateway response missing field: {0}")]
    MalformedResponse(&'static str),

    #[error("Gateway call timed out: {0}")]
    Timeout(&'static str),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A created checkout session
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub gateway_order_id: String,
    pub checkout_url: Option<String>,
}

/// The three gateway operations the workflow engine needs
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session for the online component of an order.
    /// No funds are captured until the customer completes the session.
    async fn initiate(
        &self,
        merchant_order_id: &str,
        amount: Decimal,
        redirect_url: &str,
    ) -> GatewayResult<CheckoutSession>;

    /// Query the current payment state of a checkout session
    async fn verify(&self, merchant_order_id: &str) -> GatewayResult<GatewayState>;

    /// Issue a refund against a completed payment; returns the gateway's
    /// refund id
    async fn refund(
        &self,
        merchant_order_id: &str,
        refund_id: &str,
        amount: Decimal,
    ) -> GatewayResult<String>;
}

/// Verify the callback `authorization` header
///
/// The gateway sends `SHA256(username:password)` hex-encoded; both sides
/// share the credentials out of band.
pub fn verify_callback_authorization(username: &str, password: &str, header: &str) -> bool {
    let digest = Sha256::digest(format!("{username}:{password}").as_bytes());
    hex::encode(digest) == header.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_authorization() {
        // SHA256("merchant:secret")
        let header = "f3024bed84a483dcf89ba6f691c2d86d89155b5d16665fcd41d2986cfc276415";
        assert!(verify_callback_authorization("merchant", "secret", header));
        assert!(verify_callback_authorization(
            "merchant",
            "secret",
            &format!(" {} ", header.to_uppercase())
        ));
        assert!(!verify_callback_authorization("merchant", "wrong", header));
        assert!(!verify_callback_authorization("merchant", "secret", "junk"));
    }
}
