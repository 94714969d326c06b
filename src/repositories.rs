use thiserror::Error;

use crate::models::payment_requests::RequestState;

pub mod payment_requests;
pub mod transfers;
pub mod users;

/// Failures raised by the transfer and payment-request engines.
///
/// Every failure is raised immediately to the caller with a readable message;
/// nothing is retried. Store failures are wrapped, everything else is a
/// domain rule violation.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transfer amount must be at least {min}, got {amount}")]
    InvalidAmount { amount: i64, min: i64 },

    #[error("cannot transfer to the same user: {0}")]
    SelfTransfer(String),

    #[error("requester and payer are the same user: {0}")]
    SameParty(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("payment request not found: {0}")]
    NotFound(String),

    #[error("insufficient balance for user {user}: balance {balance}, requested {amount}")]
    InsufficientBalance {
        user: String,
        balance: i64,
        amount: i64,
    },

    #[error("requester id must not be empty")]
    MissingRequester,

    #[error("payer id must not be empty")]
    MissingPayer,

    #[error("payment request {id} can only be paid by {expected}, not {actual}")]
    WrongPayer {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("payment request {0} is already paid")]
    AlreadyPaid(String),

    #[error("payment request {id} is {state} and can no longer be changed")]
    RequestClosed { id: String, state: RequestState },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}
