//! HTTP API
//!
//! - [`orders`] - order lifecycle endpoints (user and partner scoped)
//! - [`carts`] - cart management
//! - [`addresses`] - saved addresses
//! - [`wallets`] - partner wallet
//! - [`admin`] - back-office endpoints
//! - [`health`] - health check
//!
//! Role scoping works by path prefix: the same handlers serve
//! `/api/user/...` and `/api/partner/...` with the actor kind injected
//! per subtree. Upstream authentication resolves the caller and passes
//! the actor id in the `x-actor-id` header.

pub mod addresses;
pub mod admin;
pub mod carts;
pub mod health;
pub mod orders;
pub mod wallets;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Extension, Router};
use shared::error::AppError;
use shared::models::ActorKind;

use crate::core::state::ServerState;

/// Caller identity from the `x-actor-id` header
pub struct ActorId(pub String);

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| ActorId(s.to_string()))
            .ok_or_else(|| AppError::permission_denied("Missing x-actor-id header"))
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api/user", actor_router(ActorKind::User))
        .nest(
            "/api/partner",
            actor_router(ActorKind::Partner)
                .route("/wallet", get(wallets::get_wallet)),
        )
        .nest("/api/admin", admin::router())
        .with_state(state)
}

fn actor_router(kind: ActorKind) -> Router<ServerState> {
    Router::new()
        .route("/order/create", post(orders::create))
        .route("/order/verify-payment", post(orders::verify_payment))
        .route("/order/gateway/callback", post(orders::gateway_callback))
        .route("/order/cancel", post(orders::cancel))
        .route("/order/return-refund", post(orders::return_refund))
        .route("/order/return-exchange", post(orders::return_exchange))
        .route("/order/{id}", get(orders::get_order))
        .route("/orders", get(orders::list_orders))
        .route("/cart", get(carts::get_cart))
        .route("/cart/add", post(carts::add_line))
        .route("/cart/update", post(carts::update_line))
        .route("/cart/remove", post(carts::remove_line))
        .route("/address", post(addresses::create))
        .route("/addresses", get(addresses::list))
        .layer(Extension(kind))
}
