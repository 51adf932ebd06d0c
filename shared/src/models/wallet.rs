//! Partner wallet ledger
//!
//! Each partner has one wallet. The balance is only ever changed through
//! [`Wallet::credit`] and [`Wallet::debit`], both of which append a ledger
//! transaction in the same step, so the balance always has a matching
//! transaction trail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult, ErrorCode};

/// Direction of a wallet ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// One ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A partner's wallet: running balance plus full transaction history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub partner_id: String,
    pub total_balance: Decimal,
    pub transactions: Vec<WalletTransaction>,
}

impl Wallet {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            total_balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Add funds, appending a CREDIT ledger entry
    pub fn credit(
        &mut self,
        amount: Decimal,
        order_id: Option<String>,
        note: Option<String>,
    ) -> &WalletTransaction {
        self.total_balance += amount;
        self.push_entry(TransactionKind::Credit, amount, order_id, note)
    }

    /// Remove funds, appending a DEBIT ledger entry
    ///
    /// Fails without mutating anything when the balance does not cover the
    /// amount.
    pub fn debit(
        &mut self,
        amount: Decimal,
        order_id: Option<String>,
        note: Option<String>,
    ) -> AppResult<&WalletTransaction> {
        if self.total_balance < amount {
            return Err(AppError::with_message(
                ErrorCode::WalletInsufficientBalance,
                format!(
                    "Wallet balance {} does not cover {}",
                    self.total_balance, amount
                ),
            )
            .with_detail("balance", self.total_balance.to_string())
            .with_detail("requested", amount.to_string()));
        }
        self.total_balance -= amount;
        Ok(self.push_entry(TransactionKind::Debit, amount, order_id, note))
    }

    fn push_entry(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        order_id: Option<String>,
        note: Option<String>,
    ) -> &WalletTransaction {
        self.transactions.push(WalletTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            amount,
            order_id,
            note,
            timestamp: Utc::now(),
        });
        self.transactions.last().unwrap()
    }
}
