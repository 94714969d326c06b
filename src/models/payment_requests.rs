use serde::{Deserialize, Serialize};

/// Lifecycle state of a payment request.
///
/// `pending` is the initial state. `paid` and `rejected` are terminal.
/// `overdue` is entered lazily by the expiry scan and can still transition to
/// `paid` (late payments are accepted).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[sqlx(type_name = "request_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Rejected,
    Paid,
    Overdue,
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestState::Pending => "pending",
            RequestState::Rejected => "rejected",
            RequestState::Paid => "paid",
            RequestState::Overdue => "overdue",
        };
        write!(f, "{}", name)
    }
}

/// A solicitation for funds that becomes a transfer once paid.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct PaymentRequest {
    pub id: String,
    pub requester_id: String,
    pub payer_id: Option<String>,
    pub amount: i64,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub state: RequestState,
}

impl PaymentRequest {
    /// A pending request whose due date has lapsed is ready to be marked overdue.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.state == RequestState::Pending && self.due_date < now
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPaymentRequest {
    pub requester_id: String,
    pub payer_id: Option<String>,
    pub amount: i64,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request(state: RequestState, due_offset: Duration) -> PaymentRequest {
        let now = Utc::now();
        PaymentRequest {
            id: "req-1".to_string(),
            requester_id: "r".to_string(),
            payer_id: None,
            amount: 100,
            message: None,
            created_at: now,
            due_date: now + due_offset,
            state,
        }
    }

    #[test]
    fn pending_past_due_is_expired() {
        let req = request(RequestState::Pending, Duration::hours(-1));
        assert!(req.is_expired(Utc::now()));
    }

    #[test]
    fn pending_before_due_is_not_expired() {
        let req = request(RequestState::Pending, Duration::hours(1));
        assert!(!req.is_expired(Utc::now()));
    }

    #[test]
    fn non_pending_states_never_expire() {
        for state in [
            RequestState::Paid,
            RequestState::Rejected,
            RequestState::Overdue,
        ] {
            let req = request(state, Duration::hours(-1));
            assert!(!req.is_expired(Utc::now()));
        }
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestState::Overdue).unwrap(),
            "\"overdue\""
        );
        assert_eq!(RequestState::Paid.to_string(), "paid");
    }
}
