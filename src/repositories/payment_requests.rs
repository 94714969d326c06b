use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::transfers::TransferRepository;
use super::LedgerError;
use crate::models::payment_requests::{NewPaymentRequest, PaymentRequest, RequestState};
use crate::models::transfers::NewTransfer;

/// The payment-request engine: creation, payer binding, payment (which runs
/// the transfer engine inside the same database transaction), lazy expiry,
/// rejection and deletion.
#[derive(Clone)]
pub struct PaymentRequestRepository {
    conn: PgPool,
    transfers: TransferRepository,
    due_days: i64,
}

impl PaymentRequestRepository {
    pub fn new(conn: PgPool, transfers: TransferRepository, due_days: i64) -> Self {
        PaymentRequestRepository {
            conn,
            transfers,
            due_days,
        }
    }

    pub async fn create(
        &self,
        new_request: NewPaymentRequest,
    ) -> Result<PaymentRequest, LedgerError> {
        validate_new_request(&new_request, self.transfers.min_amount())?;

        let request_id = Uuid::new_v4().hyphenated().to_string();
        let due_date = Utc::now() + Duration::days(self.due_days);

        let request = sqlx::query_as::<_, PaymentRequest>(
            r#"
                INSERT INTO payment_requests (id, requester_id, payer_id, amount, message, due_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            "#,
        )
        .bind(&request_id)
        .bind(&new_request.requester_id)
        .bind(&new_request.payer_id)
        .bind(new_request.amount)
        .bind(&new_request.message)
        .bind(due_date)
        .fetch_one(&self.conn)
        .await?;

        Ok(request)
    }

    pub async fn get(&self, request_id: &str) -> Result<PaymentRequest, LedgerError> {
        let request =
            sqlx::query_as::<_, PaymentRequest>("SELECT * FROM payment_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.conn)
                .await?;

        request.ok_or_else(|| LedgerError::NotFound(request_id.to_string()))
    }

    pub async fn get_all(&self) -> Result<Vec<PaymentRequest>, LedgerError> {
        let requests = sqlx::query_as::<_, PaymentRequest>(
            "SELECT * FROM payment_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(requests)
    }

    pub async fn get_by_requester_id(
        &self,
        user_id: &str,
    ) -> Result<Vec<PaymentRequest>, LedgerError> {
        let requests = sqlx::query_as::<_, PaymentRequest>(
            "SELECT * FROM payment_requests WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(requests)
    }

    pub async fn get_by_payer_id(&self, user_id: &str) -> Result<Vec<PaymentRequest>, LedgerError> {
        let requests = sqlx::query_as::<_, PaymentRequest>(
            "SELECT * FROM payment_requests WHERE payer_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(requests)
    }

    /// Pay a request. Binds the payer on first payment of an open request,
    /// marks the request paid and executes the funding transfer; everything
    /// commits or rolls back together, so a request is never left `paid`
    /// without its transfer.
    pub async fn pay(
        &self,
        request_id: &str,
        payer_id: &str,
    ) -> Result<PaymentRequest, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let request = sqlx::query_as::<_, PaymentRequest>(
            "SELECT * FROM payment_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound(request_id.to_string()))?;

        check_payable(&request, payer_id)?;

        let paid = sqlx::query_as::<_, PaymentRequest>(
            "UPDATE payment_requests SET payer_id = $1, state = 'paid' WHERE id = $2 RETURNING *",
        )
        .bind(payer_id)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        self.transfers
            .execute_within(
                &mut tx,
                &NewTransfer {
                    sender_id: payer_id.to_string(),
                    receiver_id: request.requester_id.clone(),
                    amount: request.amount,
                    message: None,
                },
            )
            .await?;

        tx.commit().await?;

        log::info!(
            "payment request {} paid by {} ({})",
            paid.id,
            payer_id,
            paid.amount
        );

        Ok(paid)
    }

    /// Best-effort expiry sweep over an already-fetched batch. Requests that
    /// fail to update keep their input row and the sweep carries on; invoked
    /// by the listing paths, never by a background scheduler.
    pub async fn scan_overdue(&self, requests: Vec<PaymentRequest>) -> Vec<PaymentRequest> {
        let now = Utc::now();
        let mut refreshed = Vec::with_capacity(requests.len());

        for request in requests {
            if !request.is_expired(now) {
                refreshed.push(request);
                continue;
            }

            match self.mark_overdue(&request.id).await {
                Ok(Some(updated)) => refreshed.push(updated),
                Ok(None) => refreshed.push(request),
                Err(e) => {
                    log::warn!("could not mark payment request {} overdue: {}", request.id, e);
                    refreshed.push(request);
                }
            }
        }

        refreshed
    }

    async fn mark_overdue(&self, request_id: &str) -> Result<Option<PaymentRequest>, LedgerError> {
        let request = sqlx::query_as::<_, PaymentRequest>(
            "UPDATE payment_requests SET state = 'overdue' WHERE id = $1 AND state = 'pending' RETURNING *",
        )
        .bind(request_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(request)
    }

    pub async fn reject(&self, request_id: &str) -> Result<PaymentRequest, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let request = sqlx::query_as::<_, PaymentRequest>(
            "SELECT * FROM payment_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| LedgerError::NotFound(request_id.to_string()))?;

        check_rejectable(&request)?;

        let rejected = sqlx::query_as::<_, PaymentRequest>(
            "UPDATE payment_requests SET state = 'rejected' WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rejected)
    }

    pub async fn delete(&self, request_id: &str) -> Result<PaymentRequest, LedgerError> {
        let request = sqlx::query_as::<_, PaymentRequest>(
            "DELETE FROM payment_requests WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_optional(&self.conn)
        .await?;

        request.ok_or_else(|| LedgerError::NotFound(request_id.to_string()))
    }
}

fn validate_new_request(
    new_request: &NewPaymentRequest,
    min_amount: i64,
) -> Result<(), LedgerError> {
    if new_request.amount < min_amount {
        return Err(LedgerError::InvalidAmount {
            amount: new_request.amount,
            min: min_amount,
        });
    }

    if new_request.requester_id.is_empty() {
        return Err(LedgerError::MissingRequester);
    }

    if let Some(payer_id) = &new_request.payer_id {
        if *payer_id == new_request.requester_id {
            return Err(LedgerError::SameParty(payer_id.clone()));
        }
    }

    Ok(())
}

/// Payment guards, in order: payer present, payer binding respected, state
/// still payable. Overdue requests stay payable (late payments are accepted);
/// paid and rejected are terminal.
fn check_payable(request: &PaymentRequest, payer_id: &str) -> Result<(), LedgerError> {
    if payer_id.is_empty() {
        return Err(LedgerError::MissingPayer);
    }

    match &request.payer_id {
        Some(expected) if expected != payer_id => {
            return Err(LedgerError::WrongPayer {
                id: request.id.clone(),
                expected: expected.clone(),
                actual: payer_id.to_string(),
            });
        }
        Some(_) => {}
        None => {
            if payer_id == request.requester_id {
                return Err(LedgerError::SameParty(payer_id.to_string()));
            }
        }
    }

    match request.state {
        RequestState::Paid => Err(LedgerError::AlreadyPaid(request.id.clone())),
        RequestState::Rejected => Err(LedgerError::RequestClosed {
            id: request.id.clone(),
            state: request.state,
        }),
        RequestState::Pending | RequestState::Overdue => Ok(()),
    }
}

fn check_rejectable(request: &PaymentRequest) -> Result<(), LedgerError> {
    match request.state {
        RequestState::Pending => Ok(()),
        RequestState::Paid => Err(LedgerError::AlreadyPaid(request.id.clone())),
        RequestState::Rejected | RequestState::Overdue => Err(LedgerError::RequestClosed {
            id: request.id.clone(),
            state: request.state,
        }),
    }
}
