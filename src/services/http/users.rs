use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use super::error_response;
use crate::models::users::NewUser;
use crate::services::users::UserRequest;

pub async fn create_user(
    State(state): State<super::AppState>,
    Json(req): Json<NewUser>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::CreateUser {
            new_user: req,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match user_rx.await {
        Ok(Ok(user)) => (StatusCode::CREATED, Json(json!(user))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn get_user(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::GetUser {
            id: user_id,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match user_rx.await {
        Ok(Ok(Some(user))) => (StatusCode::OK, Json(json!(user))),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"description": "User not found."})),
        ),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn list_users(State(state): State<super::AppState>) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::ListUsers { response: user_tx })
        .await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match user_rx.await {
        Ok(Ok(users)) => (StatusCode::OK, Json(json!(users))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}
