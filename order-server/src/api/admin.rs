//! Back-office endpoints
//!
//! These sit behind an internal gateway; no actor scoping applies here.

use axum::Json;
use axum::extract::State;
use axum::routing::post;
use axum::Router;
use shared::error::{ApiResponse, AppResult};
use shared::order::Order;
use shared::order::dto::{AdminOrderUpdateRequest, CreditRefundRequest};

use crate::core::state::ServerState;
use crate::orders::actions::credit_refund::CreditRefundResponse;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/order/update", post(update_order))
        .route("/order/credit-refund", post(credit_refund))
}

async fn update_order(
    State(state): State<ServerState>,
    Json(req): Json<AdminOrderUpdateRequest>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ApiResponse::success(state.workflow.admin_update(req)?))
}

async fn credit_refund(
    State(state): State<ServerState>,
    Json(req): Json<CreditRefundRequest>,
) -> AppResult<ApiResponse<CreditRefundResponse>> {
    Ok(ApiResponse::success(state.workflow.credit_refund(req)?))
}
