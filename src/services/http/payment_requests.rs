use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::error_response;
use crate::models::payment_requests::{NewPaymentRequest, PaymentRequest};
use crate::services::payment_requests::PaymentRequestServiceRequest;
use crate::services::ServiceError;

type Responder<T> = oneshot::Sender<Result<T, ServiceError>>;

#[derive(Deserialize)]
pub struct PayRequestBody {
    pub payer_id: String,
}

async fn round_trip(
    state: &super::AppState,
    build: impl FnOnce(Responder<PaymentRequest>) -> PaymentRequestServiceRequest,
    success: StatusCode,
) -> (StatusCode, Json<serde_json::Value>) {
    let (request_tx, request_rx) = oneshot::channel();

    let send_result = state.payment_request_channel.send(build(request_tx)).await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match request_rx.await {
        Ok(Ok(request)) => (success, Json(json!(request))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

async fn list_round_trip(
    state: &super::AppState,
    build: impl FnOnce(Responder<Vec<PaymentRequest>>) -> PaymentRequestServiceRequest,
) -> (StatusCode, Json<serde_json::Value>) {
    let (request_tx, request_rx) = oneshot::channel();

    let send_result = state.payment_request_channel.send(build(request_tx)).await;
    if let Err(e) = send_result {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to process request: {}", e)})),
        );
    }

    match request_rx.await {
        Ok(Ok(requests)) => (StatusCode::OK, Json(json!(requests))),
        Ok(Err(service_error)) => error_response(&service_error),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"description": format!("Failed to receive response: {}", e)})),
        ),
    }
}

pub async fn create_request(
    State(state): State<super::AppState>,
    Json(req): Json<NewPaymentRequest>,
) -> impl IntoResponse {
    round_trip(
        &state,
        |response| PaymentRequestServiceRequest::Create {
            new_request: req,
            response,
        },
        StatusCode::CREATED,
    )
    .await
}

pub async fn get_request(
    State(state): State<super::AppState>,
    Path(request_id): Path<String>,
) -> impl IntoResponse {
    round_trip(
        &state,
        |response| PaymentRequestServiceRequest::Get {
            id: request_id,
            response,
        },
        StatusCode::OK,
    )
    .await
}

pub async fn list_requests(State(state): State<super::AppState>) -> impl IntoResponse {
    list_round_trip(&state, |response| PaymentRequestServiceRequest::ListAll {
        response,
    })
    .await
}

pub async fn list_requested(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    list_round_trip(&state, |response| {
        PaymentRequestServiceRequest::ListByRequester { user_id, response }
    })
    .await
}

pub async fn list_to_pay(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    list_round_trip(&state, |response| {
        PaymentRequestServiceRequest::ListByPayer { user_id, response }
    })
    .await
}

pub async fn pay_request(
    State(state): State<super::AppState>,
    Path(request_id): Path<String>,
    Json(body): Json<PayRequestBody>,
) -> impl IntoResponse {
    round_trip(
        &state,
        |response| PaymentRequestServiceRequest::Pay {
            id: request_id,
            payer_id: body.payer_id,
            response,
        },
        StatusCode::OK,
    )
    .await
}

pub async fn reject_request(
    State(state): State<super::AppState>,
    Path(request_id): Path<String>,
) -> impl IntoResponse {
    round_trip(
        &state,
        |response| PaymentRequestServiceRequest::Reject {
            id: request_id,
            response,
        },
        StatusCode::OK,
    )
    .await
}

pub async fn delete_request(
    State(state): State<super::AppState>,
    Path(request_id): Path<String>,
) -> impl IntoResponse {
    round_trip(
        &state,
        |response| PaymentRequestServiceRequest::Delete {
            id: request_id,
            response,
        },
        StatusCode::OK,
    )
    .await
}
