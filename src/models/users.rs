use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub balance: i64,
    pub icon_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub icon_url: Option<String>,
}
