use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::payment_requests::{NewPaymentRequest, PaymentRequest};
use crate::repositories::payment_requests::PaymentRequestRepository;
use crate::repositories::transfers::TransferRepository;

pub enum PaymentRequestServiceRequest {
    Create {
        new_request: NewPaymentRequest,
        response: oneshot::Sender<Result<PaymentRequest, ServiceError>>,
    },
    Get {
        id: String,
        response: oneshot::Sender<Result<PaymentRequest, ServiceError>>,
    },
    ListAll {
        response: oneshot::Sender<Result<Vec<PaymentRequest>, ServiceError>>,
    },
    ListByRequester {
        user_id: String,
        response: oneshot::Sender<Result<Vec<PaymentRequest>, ServiceError>>,
    },
    ListByPayer {
        user_id: String,
        response: oneshot::Sender<Result<Vec<PaymentRequest>, ServiceError>>,
    },
    Pay {
        id: String,
        payer_id: String,
        response: oneshot::Sender<Result<PaymentRequest, ServiceError>>,
    },
    Reject {
        id: String,
        response: oneshot::Sender<Result<PaymentRequest, ServiceError>>,
    },
    Delete {
        id: String,
        response: oneshot::Sender<Result<PaymentRequest, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct PaymentRequestHandler {
    repository: PaymentRequestRepository,
}

impl PaymentRequestHandler {
    pub fn new(sql_conn: PgPool, min_amount: i64, due_days: i64) -> Self {
        let transfers = TransferRepository::new(sql_conn.clone(), min_amount);
        let repository = PaymentRequestRepository::new(sql_conn, transfers, due_days);

        PaymentRequestHandler { repository }
    }

    async fn create(&self, new_request: NewPaymentRequest) -> Result<PaymentRequest, ServiceError> {
        Ok(self.repository.create(new_request).await?)
    }

    async fn get(&self, id: &str) -> Result<PaymentRequest, ServiceError> {
        Ok(self.repository.get(id).await?)
    }

    // Listing paths run the expiry sweep so callers always see fresh states.

    async fn list_all(&self) -> Result<Vec<PaymentRequest>, ServiceError> {
        let requests = self.repository.get_all().await?;
        Ok(self.repository.scan_overdue(requests).await)
    }

    async fn list_by_requester(&self, user_id: &str) -> Result<Vec<PaymentRequest>, ServiceError> {
        let requests = self.repository.get_by_requester_id(user_id).await?;
        Ok(self.repository.scan_overdue(requests).await)
    }

    async fn list_by_payer(&self, user_id: &str) -> Result<Vec<PaymentRequest>, ServiceError> {
        let requests = self.repository.get_by_payer_id(user_id).await?;
        Ok(self.repository.scan_overdue(requests).await)
    }

    async fn pay(&self, id: &str, payer_id: &str) -> Result<PaymentRequest, ServiceError> {
        Ok(self.repository.pay(id, payer_id).await?)
    }

    async fn reject(&self, id: &str) -> Result<PaymentRequest, ServiceError> {
        Ok(self.repository.reject(id).await?)
    }

    async fn delete(&self, id: &str) -> Result<PaymentRequest, ServiceError> {
        Ok(self.repository.delete(id).await?)
    }
}

#[async_trait]
impl RequestHandler<PaymentRequestServiceRequest> for PaymentRequestHandler {
    async fn handle_request(&self, request: PaymentRequestServiceRequest) {
        match request {
            PaymentRequestServiceRequest::Create {
                new_request,
                response,
            } => {
                let result = self.create(new_request).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::Get { id, response } => {
                let result = self.get(&id).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::ListAll { response } => {
                let result = self.list_all().await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::ListByRequester { user_id, response } => {
                let result = self.list_by_requester(&user_id).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::ListByPayer { user_id, response } => {
                let result = self.list_by_payer(&user_id).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::Pay {
                id,
                payer_id,
                response,
            } => {
                let result = self.pay(&id, &payer_id).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::Reject { id, response } => {
                let result = self.reject(&id).await;
                let _ = response.send(result);
            }
            PaymentRequestServiceRequest::Delete { id, response } => {
                let result = self.delete(&id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct PaymentRequestService;

impl PaymentRequestService {
    pub fn new() -> Self {
        PaymentRequestService {}
    }
}

#[async_trait]
impl Service<PaymentRequestServiceRequest, PaymentRequestHandler> for PaymentRequestService {}
