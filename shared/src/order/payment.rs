//! Payment breakdown and gateway state parsing
//!
//! An order's payment is a breakdown across four components: wallet,
//! online, cash on delivery and cheque. The allowed combinations:
//! exactly one of {online, cod, cheque} non-zero, optionally topped up
//! from the wallet; wallet alone only when it covers the full total.
//! Components always sum to the order total exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// The dominant (non-wallet) payment method of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Online,
    Cod,
    Cheque,
    Wallet,
}

/// How an order's total splits across payment components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    #[serde(default)]
    pub wallet: Decimal,
    #[serde(default)]
    pub online: Decimal,
    #[serde(default)]
    pub cod: Decimal,
    #[serde(default)]
    pub cheque: Decimal,
}

impl PaymentBreakdown {
    pub fn online_only(amount: Decimal) -> Self {
        Self {
            wallet: Decimal::ZERO,
            online: amount,
            cod: Decimal::ZERO,
            cheque: Decimal::ZERO,
        }
    }

    pub fn cod_only(amount: Decimal) -> Self {
        Self {
            wallet: Decimal::ZERO,
            online: Decimal::ZERO,
            cod: amount,
            cheque: Decimal::ZERO,
        }
    }

    /// Validate the combination matrix against the order total
    pub fn validate(&self, total: Decimal) -> AppResult<PaymentMethod> {
        for (name, amount) in [
            ("wallet", self.wallet),
            ("online", self.online),
            ("cod", self.cod),
            ("cheque", self.cheque),
        ] {
            if amount < Decimal::ZERO {
                return Err(AppError::with_message(
                    ErrorCode::PaymentMethodInvalid,
                    format!("Payment component '{}' cannot be negative", name),
                ));
            }
        }

        let sum = self.wallet + self.online + self.cod + self.cheque;
        if sum != total {
            return Err(AppError::with_message(
                ErrorCode::PaymentAmountMismatch,
                format!(
                    "Payment components sum to {} but order total is {}",
                    sum, total
                ),
            )
            .with_detail("componentSum", sum.to_string())
            .with_detail("totalAmount", total.to_string()));
        }

        let nonzero_primary = [
            (PaymentMethod::Online, self.online),
            (PaymentMethod::Cod, self.cod),
            (PaymentMethod::Cheque, self.cheque),
        ]
        .into_iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .collect::<Vec<_>>();

        match nonzero_primary.as_slice() {
            [(method, _)] => Ok(*method),
            [] if self.wallet == total && total > Decimal::ZERO => Ok(PaymentMethod::Wallet),
            [] => Err(AppError::with_message(
                ErrorCode::PaymentMethodInvalid,
                "No payment method selected",
            )),
            _ => Err(AppError::with_message(
                ErrorCode::PaymentMethodInvalid,
                "Only one of online, COD or cheque may be used per order",
            )),
        }
    }
}

/// Payment state as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayState {
    Completed,
    Failed,
    AttemptFailed,
    Pending,
    Initiated,
    /// Any state string this backend does not recognize
    Other(String),
}

impl GatewayState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "ATTEMPT_FAILED" => Self::AttemptFailed,
            "PENDING" => Self::Pending,
            "INITIATED" => Self::Initiated,
            other => Self::Other(other.to_string()),
        }
    }
}
