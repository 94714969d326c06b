use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use super::users::UserRepository;
use super::LedgerError;
use crate::models::transfers::{NewTransfer, Transfer};

/// The transfer engine: moves funds between two users and appends a ledger
/// entry, all inside one database transaction.
#[derive(Clone)]
pub struct TransferRepository {
    conn: PgPool,
    min_amount: i64,
}

impl TransferRepository {
    pub fn new(conn: PgPool, min_amount: i64) -> Self {
        TransferRepository { conn, min_amount }
    }

    pub(crate) fn min_amount(&self) -> i64 {
        self.min_amount
    }

    pub async fn execute_transfer(
        &self,
        new_transfer: NewTransfer,
    ) -> Result<Transfer, LedgerError> {
        let mut tx = self.conn.begin().await?;
        let transfer = self.execute_within(&mut tx, &new_transfer).await?;
        tx.commit().await?;

        log::info!(
            "transfer {} executed: {} -> {} ({})",
            transfer.id,
            transfer.sender_id,
            transfer.receiver_id,
            transfer.amount
        );

        Ok(transfer)
    }

    /// Run the debit / credit / ledger-append sequence on an already-open
    /// transaction. The payment-request engine calls this when a request is
    /// paid so that the funds movement and the state transition commit
    /// together.
    pub(crate) async fn execute_within(
        &self,
        conn: &mut PgConnection,
        new_transfer: &NewTransfer,
    ) -> Result<Transfer, LedgerError> {
        validate_transfer(new_transfer, self.min_amount)?;

        let sender = UserRepository::lock_user(&mut *conn, &new_transfer.sender_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(new_transfer.sender_id.clone()))?;

        UserRepository::lock_user(&mut *conn, &new_transfer.receiver_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(new_transfer.receiver_id.clone()))?;

        if sender.balance < new_transfer.amount {
            return Err(LedgerError::InsufficientBalance {
                user: sender.id,
                balance: sender.balance,
                amount: new_transfer.amount,
            });
        }

        // The conditional update is the second line of defense; with the row
        // locked above it cannot miss.
        let debited = UserRepository::debit(&mut *conn, &sender.id, new_transfer.amount).await?;
        if debited.is_none() {
            return Err(LedgerError::InsufficientBalance {
                user: sender.id,
                balance: sender.balance,
                amount: new_transfer.amount,
            });
        }

        UserRepository::credit(&mut *conn, &new_transfer.receiver_id, new_transfer.amount).await?;

        let transfer_id = Uuid::new_v4().hyphenated().to_string();
        let transfer = sqlx::query_as::<_, Transfer>(
            r#"
                INSERT INTO transfers (id, sender_id, receiver_id, amount, message)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            "#,
        )
        .bind(&transfer_id)
        .bind(&new_transfer.sender_id)
        .bind(&new_transfer.receiver_id)
        .bind(new_transfer.amount)
        .bind(&new_transfer.message)
        .fetch_one(&mut *conn)
        .await?;

        Ok(transfer)
    }

    pub async fn get_by_sender_id(&self, user_id: &str) -> Result<Vec<Transfer>, LedgerError> {
        let transfers = sqlx::query_as::<_, Transfer>(
            "SELECT * FROM transfers WHERE sender_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(transfers)
    }

    pub async fn get_by_receiver_id(&self, user_id: &str) -> Result<Vec<Transfer>, LedgerError> {
        let transfers = sqlx::query_as::<_, Transfer>(
            "SELECT * FROM transfers WHERE receiver_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(transfers)
    }
}

fn validate_transfer(new_transfer: &NewTransfer, min_amount: i64) -> Result<(), LedgerError> {
    if new_transfer.amount < min_amount {
        return Err(LedgerError::InvalidAmount {
            amount: new_transfer.amount,
            min: min_amount,
        });
    }

    if new_transfer.sender_id.is_empty() || new_transfer.receiver_id.is_empty() {
        return Err(LedgerError::UserNotFound(String::new()));
    }

    if new_transfer.sender_id == new_transfer.receiver_id {
        return Err(LedgerError::SelfTransfer(new_transfer.sender_id.clone()));
    }

    Ok(())
}
