//! Order and payment status state machines
//!
//! Every status change in the backend goes through
//! [`OrderStatus::can_transition_to`], including the admin force-update
//! path. The wire representation uses the human-readable strings the
//! storefront displays ("Ready for Dispatch", "Partially Returned").

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Initiated,
    Confirmed,
    #[serde(rename = "Ready for Dispatch")]
    ReadyForDispatch,
    Dispatched,
    Delivered,
    Cancelled,
    Returned,
    #[serde(rename = "Partially Returned")]
    PartiallyReturned,
    Exchanged,
    #[serde(rename = "Partially Exchanged")]
    PartiallyExchanged,
}

impl OrderStatus {
    /// Transition table for the fulfillment lifecycle
    ///
    /// Forward chain: Initiated -> Confirmed -> ReadyForDispatch ->
    /// Dispatched -> Delivered. Cancellation branches off any
    /// pre-dispatch state. Post-delivery, orders move into the
    /// return/exchange states; partial states absorb further requests
    /// until the order is fully returned or exchanged.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Initiated, Confirmed)
                | (Initiated, Cancelled)
                | (Confirmed, ReadyForDispatch)
                | (Confirmed, Cancelled)
                | (ReadyForDispatch, Dispatched)
                | (ReadyForDispatch, Cancelled)
                | (Dispatched, Delivered)
                | (Delivered, Returned)
                | (Delivered, PartiallyReturned)
                | (Delivered, Exchanged)
                | (Delivered, PartiallyExchanged)
                | (PartiallyReturned, Returned)
                | (PartiallyReturned, PartiallyReturned)
                | (PartiallyReturned, PartiallyExchanged)
                | (PartiallyExchanged, Exchanged)
                | (PartiallyExchanged, PartiallyExchanged)
                | (PartiallyExchanged, PartiallyReturned)
                | (PartiallyExchanged, Returned)
                | (PartiallyReturned, Exchanged)
        )
    }

    /// Whether the customer (or partner) may still cancel
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::Initiated | Self::Confirmed | Self::ReadyForDispatch
        )
    }

    /// Whether return/exchange requests are accepted in this state
    pub fn accepts_return_requests(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::PartiallyReturned | Self::PartiallyExchanged
        )
    }

    /// No further transitions leave these states
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned | Self::Exchanged)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initiated => "Initiated",
            Self::Confirmed => "Confirmed",
            Self::ReadyForDispatch => "Ready for Dispatch",
            Self::Dispatched => "Dispatched",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::PartiallyReturned => "Partially Returned",
            Self::Exchanged => "Exchanged",
            Self::PartiallyExchanged => "Partially Exchanged",
        };
        f.write_str(s)
    }
}

/// Payment status of an order, independent of fulfillment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    /// Terminal payment states short-circuit re-verification
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Expired => "Expired",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_forward_chain() {
        assert!(Initiated.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(ReadyForDispatch));
        assert!(ReadyForDispatch.can_transition_to(Dispatched));
        assert!(Dispatched.can_transition_to(Delivered));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!Initiated.can_transition_to(Dispatched));
        assert!(!Confirmed.can_transition_to(Delivered));
        assert!(!Initiated.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancellation_window() {
        assert!(Initiated.is_cancellable());
        assert!(Confirmed.is_cancellable());
        assert!(ReadyForDispatch.is_cancellable());
        assert!(!Dispatched.is_cancellable());
        assert!(!Delivered.is_cancellable());
        assert!(!Cancelled.is_cancellable());
        assert!(!Returned.is_cancellable());

        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Dispatched.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn test_return_states() {
        assert!(Delivered.can_transition_to(PartiallyReturned));
        assert!(Delivered.can_transition_to(Returned));
        assert!(PartiallyReturned.can_transition_to(Returned));
        assert!(PartiallyReturned.can_transition_to(PartiallyReturned));
        assert!(PartiallyExchanged.can_transition_to(Exchanged));
        // Mixed return/exchange requests on one order
        assert!(PartiallyExchanged.can_transition_to(PartiallyReturned));
        assert!(PartiallyExchanged.can_transition_to(Returned));
        assert!(!Returned.can_transition_to(Delivered));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Cancelled.is_terminal());
        assert!(Returned.is_terminal());
        assert!(Exchanged.is_terminal());
        assert!(!PartiallyReturned.is_terminal());
        assert!(!Delivered.is_terminal());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&ReadyForDispatch).unwrap();
        assert_eq!(json, "\"Ready for Dispatch\"");
        let json = serde_json::to_string(&PartiallyReturned).unwrap();
        assert_eq!(json, "\"Partially Returned\"");
    }

    #[test]
    fn test_payment_status_terminal() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Expired.is_terminal());
    }
}
