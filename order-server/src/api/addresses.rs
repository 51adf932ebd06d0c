//! Address endpoints

use axum::extract::State;
use axum::{Extension, Json};
use shared::error::{ApiResponse, AppResult};
use shared::models::{ActorKind, ActorRef, Address};
use shared::order::dto::CreateAddressRequest;

use super::ActorId;
use crate::core::state::ServerState;

pub async fn create(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<CreateAddressRequest>,
) -> AppResult<ApiResponse<Address>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(
        state.workflow.create_address(&actor, req)?,
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
) -> AppResult<ApiResponse<Vec<Address>>> {
    let actor = ActorRef { kind, id };
    Ok(ApiResponse::success(state.workflow.list_addresses(&actor)?))
}
