use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::transfers::{merge_history, HistoryEntry, NewTransfer, Transfer};
use crate::repositories::transfers::TransferRepository;

pub enum TransferServiceRequest {
    Execute {
        new_transfer: NewTransfer,
        response: oneshot::Sender<Result<Transfer, ServiceError>>,
    },
    History {
        user_id: String,
        response: oneshot::Sender<Result<Vec<HistoryEntry>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct TransferRequestHandler {
    repository: TransferRepository,
}

impl TransferRequestHandler {
    pub fn new(sql_conn: PgPool, min_amount: i64) -> Self {
        let repository = TransferRepository::new(sql_conn, min_amount);

        TransferRequestHandler { repository }
    }

    async fn execute(&self, new_transfer: NewTransfer) -> Result<Transfer, ServiceError> {
        Ok(self.repository.execute_transfer(new_transfer).await?)
    }

    /// Sent and received transfers merged into one newest-first list.
    async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, ServiceError> {
        let sent = self.repository.get_by_sender_id(user_id).await?;
        let received = self.repository.get_by_receiver_id(user_id).await?;

        Ok(merge_history(sent, received))
    }
}

#[async_trait]
impl RequestHandler<TransferServiceRequest> for TransferRequestHandler {
    async fn handle_request(&self, request: TransferServiceRequest) {
        match request {
            TransferServiceRequest::Execute {
                new_transfer,
                response,
            } => {
                let transfer = self.execute(new_transfer).await;
                let _ = response.send(transfer);
            }
            TransferServiceRequest::History { user_id, response } => {
                let history = self.history(&user_id).await;
                let _ = response.send(history);
            }
        }
    }
}

pub struct TransferService;

impl TransferService {
    pub fn new() -> Self {
        TransferService {}
    }
}

#[async_trait]
impl Service<TransferServiceRequest, TransferRequestHandler> for TransferService {}
