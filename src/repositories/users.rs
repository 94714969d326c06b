use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use super::LedgerError;
use crate::models::users::{NewUser, User};

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_user(&self, new_user: NewUser) -> Result<User, LedgerError> {
        let user_id = Uuid::new_v4().hyphenated().to_string();

        let user = sqlx::query_as::<_, User>(
            r#"
                INSERT INTO users (id, name, balance, icon_url)
                VALUES ($1, $2, 0, $3)
                RETURNING *
            "#,
        )
        .bind(&user_id)
        .bind(&new_user.name)
        .bind(&new_user.icon_url)
        .fetch_one(&self.conn)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, LedgerError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(user)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, LedgerError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.conn)
            .await?;

        Ok(users)
    }

    /// Load a user row with a row lock, serializing concurrent balance updates
    /// against the same account.
    pub(crate) async fn lock_user(
        conn: &mut PgConnection,
        user_id: &str,
    ) -> Result<Option<User>, LedgerError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(user)
    }

    /// Conditional debit; returns `None` when the balance would go negative.
    pub(crate) async fn debit(
        conn: &mut PgConnection,
        user_id: &str,
        amount: i64,
    ) -> Result<Option<User>, LedgerError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET balance = balance - $1 WHERE id = $2 AND balance >= $1 RETURNING *",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    pub(crate) async fn credit(
        conn: &mut PgConnection,
        user_id: &str,
        amount: i64,
    ) -> Result<User, LedgerError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET balance = balance + $1 WHERE id = $2 RETURNING *",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }
}
