use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::repositories::LedgerError;
use crate::settings::Settings;

pub mod http;
pub mod payment_requests;
pub mod transfers;
pub mod users;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (transfer_tx, mut transfer_rx) = mpsc::channel(512);
    let (payment_request_tx, mut payment_request_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut transfer_service = transfers::TransferService::new();
    let mut payment_request_service = payment_requests::PaymentRequestService::new();

    let min_amount = settings.transfers.min_amount;
    let due_days = settings.payment_requests.due_days;

    println!("[*] Starting user service.");
    let user_pool = pool.clone();
    tokio::spawn(async move {
        user_service
            .run(users::UserRequestHandler::new(user_pool), &mut user_rx)
            .await;
    });

    println!("[*] Starting transfer service.");
    let transfer_pool = pool.clone();
    tokio::spawn(async move {
        transfer_service
            .run(
                transfers::TransferRequestHandler::new(transfer_pool, min_amount),
                &mut transfer_rx,
            )
            .await;
    });

    log::info!("Starting payment request service.");
    let payment_request_pool = pool.clone();
    tokio::spawn(async move {
        payment_request_service
            .run(
                payment_requests::PaymentRequestHandler::new(
                    payment_request_pool,
                    min_amount,
                    due_days,
                ),
                &mut payment_request_rx,
            )
            .await;
    });

    println!("[*] Starting HTTP server.");
    http::start_http_server(&settings.http.bind, user_tx, transfer_tx, payment_request_tx).await?;

    Ok(())
}
