use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use super::error_response;
use crate::models::transfers::NewTransfer;
use crate::services::transfers::TransferServiceRequest;

pub async fn execute_transfer(
    State(state): State<super::AppState>,
    Json(req): Json<NewTransfer>,
) -> impl IntoResponse {
    let (transfer_tx, transfer_rx) = oneshot::channel();

    let send_result = state
        .transfer_channel
        .send(TransferServiceRequest::Execute {
            new_transfer: req,
            response: transfer_tx,
        })
        .await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match transfer_rx.await {
        Ok(Ok(transfer)) => (StatusCode::CREATED, Json(json!(transfer))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn get_history(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (transfer_tx, transfer_rx) = oneshot::channel();

    let send_result = state
        .transfer_channel
        .send(TransferServiceRequest::History {
            user_id,
            response: transfer_tx,
        })
        .await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match transfer_rx.await {
        Ok(Ok(history)) => (StatusCode::OK, Json(json!(history))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}
