//! Actor references
//!
//! Every cart, address and order belongs to an actor: an end customer
//! ("user") or a bulk-buying seller ("partner"). Authentication itself is
//! handled upstream; the backend only scopes data by actor reference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of actor owning a resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorKind {
    User,
    Partner,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Partner => "partner",
        }
    }
}

/// Reference to an actor (kind + id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub kind: ActorKind,
    pub id: String,
}

impl ActorRef {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::User,
            id: id.into(),
        }
    }

    pub fn partner(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Partner,
            id: id.into(),
        }
    }

    /// Storage key for per-actor documents (carts)
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
