use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use super::payment_requests::PaymentRequestServiceRequest;
use super::transfers::TransferServiceRequest;
use super::users::UserRequest;
use super::ServiceError;
use crate::repositories::LedgerError;

mod payment_requests;
mod transfers;
mod users;

#[derive(Clone)]
struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    transfer_channel: mpsc::Sender<TransferServiceRequest>,
    payment_request_channel: mpsc::Sender<PaymentRequestServiceRequest>,
}

fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Ledger(e) => match e {
            LedgerError::UserNotFound(_) | LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::InsufficientBalance { .. }
            | LedgerError::WrongPayer { .. }
            | LedgerError::AlreadyPaid(_)
            | LedgerError::RequestClosed { .. } => StatusCode::CONFLICT,
            LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
        ServiceError::Communication(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    (
        status_for(error),
        Json(json!({"description": error.to_string()})),
    )
}

pub async fn start_http_server(
    bind: &str,
    user_channel: mpsc::Sender<UserRequest>,
    transfer_channel: mpsc::Sender<TransferServiceRequest>,
    payment_request_channel: mpsc::Sender<PaymentRequestServiceRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        user_channel,
        transfer_channel,
        payment_request_channel,
    };

    let app = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/transfers", get(transfers::get_history))
        .route(
            "/users/{user_id}/payment_requests/requested",
            get(payment_requests::list_requested),
        )
        .route(
            "/users/{user_id}/payment_requests/to_pay",
            get(payment_requests::list_to_pay),
        )
        .route("/transfers", post(transfers::execute_transfer))
        .route(
            "/payment_requests",
            post(payment_requests::create_request).get(payment_requests::list_requests),
        )
        .route(
            "/payment_requests/{request_id}",
            get(payment_requests::get_request).delete(payment_requests::delete_request),
        )
        .route(
            "/payment_requests/{request_id}/pay",
            post(payment_requests::pay_request),
        )
        .route(
            "/payment_requests/{request_id}/reject",
            post(payment_requests::reject_request),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    println!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
