//! Unified error codes for the marketplace order backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog / stock errors
//! - 65xx: Cart errors
//! - 7xxx: Address errors
//! - 8xxx: Wallet errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient
/// serialization and cross-language compatibility with API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Permission denied (actor does not own the resource)
    PermissionDenied = 6,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4002,
    /// Order is not cancellable from its current status
    OrderNotCancellable = 4003,
    /// Order is not in a returnable state
    OrderNotReturnable = 4004,
    /// Order line item not found
    OrderItemNotFound = 4005,
    /// Illegal order status transition
    InvalidStatusTransition = 4006,
    /// Item already has a return in progress
    ItemAlreadyInReturn = 4007,
    /// Item already has an exchange in progress
    ItemAlreadyInExchange = 4008,
    /// Replacement price differs from the original item price
    ExchangePriceMismatch = 4009,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment-method combination is not allowed
    PaymentMethodInvalid = 5002,
    /// Payment-method amounts do not sum to the order total
    PaymentAmountMismatch = 5003,
    /// Payment is still pending at the gateway
    PaymentPending = 5004,
    /// Payment window has expired
    PaymentExpired = 5005,
    /// Gateway returned an unexpected verification state
    PaymentUnexpectedState = 5006,
    /// Refund has already been completed
    RefundAlreadyCompleted = 5007,
    /// Order has no pending refund to credit
    RefundNothingPending = 5008,
    /// Order was not paid online
    PaymentNotOnline = 5009,

    // ==================== 6xxx: Catalog / Stock ====================
    /// Item not found
    ItemNotFound = 6001,
    /// Requested color/size variant does not exist
    VariantNotFound = 6002,
    /// Insufficient stock for the requested quantity
    InsufficientStock = 6003,
    /// Declared price disagrees with the server-computed price
    PriceMismatch = 6004,

    // ==================== 65xx: Cart ====================
    /// Cart not found
    CartNotFound = 6501,
    /// Requested line is not in the cart
    CartLineMissing = 6502,
    /// Requested quantity exceeds the cart-held quantity
    CartQuantityExceeded = 6503,

    // ==================== 7xxx: Address ====================
    /// Address not found
    AddressNotFound = 7001,
    /// Address does not belong to the requesting actor
    AddressNotOwned = 7002,

    // ==================== 8xxx: Wallet ====================
    /// Wallet not found
    WalletNotFound = 8001,
    /// Wallet balance is insufficient
    WalletInsufficientBalance = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Payment gateway unavailable (retries exhausted)
    GatewayUnavailable = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Callback authentication failed
    CallbackUnauthorized = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::PermissionDenied => "Permission denied",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderNotReturnable => "Order is not in a returnable state",
            ErrorCode::OrderItemNotFound => "Order line item not found",
            ErrorCode::InvalidStatusTransition => "Illegal order status transition",
            ErrorCode::ItemAlreadyInReturn => "Item already has a return in progress",
            ErrorCode::ItemAlreadyInExchange => "Item already has an exchange in progress",
            ErrorCode::ExchangePriceMismatch => {
                "Exchange is only permitted at equal price"
            }

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentMethodInvalid => "Payment-method combination is not allowed",
            ErrorCode::PaymentAmountMismatch => {
                "Payment-method amounts do not sum to the order total"
            }
            ErrorCode::PaymentPending => "Payment is still pending, try again later",
            ErrorCode::PaymentExpired => "Payment window has expired",
            ErrorCode::PaymentUnexpectedState => "Gateway returned an unexpected state",
            ErrorCode::RefundAlreadyCompleted => "Refund has already been completed",
            ErrorCode::RefundNothingPending => "Order has no pending refund to credit",
            ErrorCode::PaymentNotOnline => "Order was not paid online",

            // Catalog / Stock
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::VariantNotFound => "Requested color/size variant does not exist",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::PriceMismatch => "Declared price disagrees with the server price",

            // Cart
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::CartLineMissing => "Requested line is not in the cart",
            ErrorCode::CartQuantityExceeded => {
                "Requested quantity exceeds the cart-held quantity"
            }

            // Address
            ErrorCode::AddressNotFound => "Address not found",
            ErrorCode::AddressNotOwned => "Address does not belong to the requesting actor",

            // Wallet
            ErrorCode::WalletNotFound => "Wallet not found",
            ErrorCode::WalletInsufficientBalance => "Wallet balance is insufficient",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::GatewayUnavailable => "Payment gateway unavailable",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::CallbackUnauthorized => "Callback authentication failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::PermissionDenied,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadyCancelled,
            4003 => Self::OrderNotCancellable,
            4004 => Self::OrderNotReturnable,
            4005 => Self::OrderItemNotFound,
            4006 => Self::InvalidStatusTransition,
            4007 => Self::ItemAlreadyInReturn,
            4008 => Self::ItemAlreadyInExchange,
            4009 => Self::ExchangePriceMismatch,

            5001 => Self::PaymentFailed,
            5002 => Self::PaymentMethodInvalid,
            5003 => Self::PaymentAmountMismatch,
            5004 => Self::PaymentPending,
            5005 => Self::PaymentExpired,
            5006 => Self::PaymentUnexpectedState,
            5007 => Self::RefundAlreadyCompleted,
            5008 => Self::RefundNothingPending,
            5009 => Self::PaymentNotOnline,

            6001 => Self::ItemNotFound,
            6002 => Self::VariantNotFound,
            6003 => Self::InsufficientStock,
            6004 => Self::PriceMismatch,

            6501 => Self::CartNotFound,
            6502 => Self::CartLineMissing,
            6503 => Self::CartQuantityExceeded,

            7001 => Self::AddressNotFound,
            7002 => Self::AddressNotOwned,

            8001 => Self::WalletNotFound,
            8002 => Self::WalletInsufficientBalance,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::GatewayUnavailable,
            9004 => Self::TimeoutError,
            9005 => Self::ConfigError,
            9006 => Self::CallbackUnauthorized,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::WalletInsufficientBalance.code(), 8002);
    }

    #[test]
    fn test_roundtrip_through_u16() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::OrderNotCancellable,
            ErrorCode::PaymentAmountMismatch,
            ErrorCode::CartQuantityExceeded,
            ErrorCode::GatewayUnavailable,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "6003");
        let back: ErrorCode = serde_json::from_str("6003").unwrap();
        assert_eq!(back, ErrorCode::InsufficientStock);
    }
}
