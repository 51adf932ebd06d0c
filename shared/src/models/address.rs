//! Shipping addresses

use super::actor::ActorRef;
use serde::{Deserialize, Serialize};

/// A saved shipping address owned by an actor
///
/// Orders snapshot the address at creation time; editing an address later
/// never changes an already-placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub actor: ActorRef,
    pub name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

impl Address {
    pub fn is_owned_by(&self, actor: &ActorRef) -> bool {
        &self.actor == actor
    }
}
