//! Cart endpoints

use axum::extract::State;
use axum::{Extension, Json};
use shared::error::{ApiResponse, AppResult};
use shared::models::{ActorKind, ActorRef, Cart};
use shared::order::dto::{AddCartLineRequest, RemoveCartLineRequest, UpdateCartLineRequest};

use super::ActorId;
use crate::core::state::ServerState;

pub async fn get_cart(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
) -> AppResult<ApiResponse<Cart>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(state.workflow.get_cart(&actor)?))
}

pub async fn add_line(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<AddCartLineRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(state.workflow.add_cart_line(&actor, req)?))
}

pub async fn update_line(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<UpdateCartLineRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(
        state.workflow.update_cart_line(&actor, req)?,
    ))
}

pub async fn remove_line(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<RemoveCartLineRequest>,
) -> AppResult<ApiResponse<Cart>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(
        state.workflow.remove_cart_line(&actor, req)?,
    ))
}
