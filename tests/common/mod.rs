use peerpay::models::users::User;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Connect to the database named by `DATABASE_URL` and apply migrations.
/// The ignored tests that use this expect a disposable database.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("set DATABASE_URL to run the ignored tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("could not connect to the test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("could not run migrations");

    pool
}

pub async fn seed_user(pool: &PgPool, name: &str, balance: i64) -> User {
    let id = Uuid::new_v4().hyphenated().to_string();

    sqlx::query_as::<_, User>("INSERT INTO users (id, name, balance) VALUES ($1, $2, $3) RETURNING *")
        .bind(&id)
        .bind(name)
        .bind(balance)
        .fetch_one(pool)
        .await
        .expect("could not seed user")
}

pub async fn balance_of(pool: &PgPool, user_id: &str) -> i64 {
    let balance: i64 = sqlx::query_scalar("SELECT balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("could not read balance");

    balance
}

pub async fn transfer_count_from(pool: &PgPool, sender_id: &str) -> i64 {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM transfers WHERE sender_id = $1")
        .bind(sender_id)
        .fetch_one(pool)
        .await
        .expect("could not count transfers");

    count
}
