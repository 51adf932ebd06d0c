//! Partner wallet endpoint

use axum::extract::State;
use shared::error::{ApiResponse, AppResult};
use shared::models::Wallet;

use super::ActorId;
use crate::core::state::ServerState;

pub async fn get_wallet(
    State(state): State<ServerState>,
    ActorId(id): ActorId,
) -> AppResult<ApiResponse<Wallet>> {
    Ok(ApiResponse::success(state.workflow.get_wallet(&id)?))
}
