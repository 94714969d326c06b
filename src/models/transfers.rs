use serde::{Deserialize, Serialize};

/// A completed, immutable movement of funds between two users.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: i64,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTransfer {
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: i64,
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Sent,
    Received,
}

/// One row of a user's unified transfer history.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub direction: TransferDirection,
    #[serde(flatten)]
    pub transfer: Transfer,
}

/// Merge sent and received transfers into one newest-first history.
pub fn merge_history(sent: Vec<Transfer>, received: Vec<Transfer>) -> Vec<HistoryEntry> {
    let mut history: Vec<HistoryEntry> = sent
        .into_iter()
        .map(|transfer| HistoryEntry {
            direction: TransferDirection::Sent,
            transfer,
        })
        .chain(received.into_iter().map(|transfer| HistoryEntry {
            direction: TransferDirection::Received,
            transfer,
        }))
        .collect();

    history.sort_by(|a, b| b.transfer.created_at.cmp(&a.transfer.created_at));
    history
}
