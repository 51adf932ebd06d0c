//! Order lifecycle endpoints

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{ActorKind, ActorRef};
use shared::order::Order;
use shared::order::dto::{
    CancelOrderRequest, CreateOrderRequest, GatewayCallbackPayload, ReturnExchangeRequest,
    ReturnRefundRequest, VerifyPaymentRequest,
};

use super::ActorId;
use crate::core::state::ServerState;
use crate::gateway::verify_callback_authorization;
use crate::orders::actions::cancel_order::CancelOrderResponse;
use crate::orders::actions::create_order::CreateOrderResponse;
use crate::orders::actions::return_exchange::ReturnExchangeResponse;
use crate::orders::actions::return_refund::ReturnRefundResponse;
use crate::orders::actions::verify_payment::PaymentStatusResponse;

pub async fn create(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    let actor = ActorRef { kind, id };
    let resp = state.workflow.create_order(&actor, req).await?;
    Ok(ApiResponse::success(resp))
}

pub async fn verify_payment(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<VerifyPaymentRequest>,
) -> AppResult<ApiResponse<PaymentStatusResponse>> {
    let actor = ActorRef { kind, id };
    let resp = state.workflow.verify_payment(&actor, req).await?;
    Ok(ApiResponse::success(resp))
}

/// Server-to-server payment notification from the gateway
pub async fn gateway_callback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<GatewayCallbackPayload>,
) -> AppResult<ApiResponse<PaymentStatusResponse>> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !verify_callback_authorization(
        &state.config.callback_username,
        &state.config.callback_password,
        auth,
    ) {
        return Err(AppError::with_message(
            ErrorCode::CallbackUnauthorized,
            "Invalid callback authorization",
        ));
    }

    let resp = state
        .workflow
        .gateway_callback(&payload.merchant_order_id, &payload.state)
        .await?;
    Ok(ApiResponse::success(resp))
}

pub async fn cancel(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<CancelOrderRequest>,
) -> AppResult<ApiResponse<CancelOrderResponse>> {
    let actor = ActorRef { kind, id };
    let resp = state.workflow.cancel_order(&actor, req).await?;
    Ok(ApiResponse::success(resp))
}

pub async fn return_refund(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<ReturnRefundRequest>,
) -> AppResult<ApiResponse<ReturnRefundResponse>> {
    let actor = ActorRef { kind, id };
    let resp = state.workflow.return_refund(&actor, req).await?;
    Ok(ApiResponse::success(resp))
}

pub async fn return_exchange(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Json(req): Json<ReturnExchangeRequest>,
) -> AppResult<ApiResponse<ReturnExchangeResponse>> {
    let actor = ActorRef { kind, id };
    let resp = state.workflow.return_exchange(&actor, req).await?;
    Ok(ApiResponse::success(resp))
}

pub async fn get_order(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
    Path(order_id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let actor = ActorRef { kind, id };
    let order = state.workflow.get_order_for_actor(&actor, &order_id)?;
    Ok(ApiResponse::success(order))
}

pub async fn list_orders(
    State(state): State<ServerState>,
    Extension(kind): Extension<ActorKind>,
    ActorId(id): ActorId,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let actor = ActorRef { kind, id };
    let orders = state.workflow.list_orders(&actor)?;
    Ok(ApiResponse::success(orders))
}
