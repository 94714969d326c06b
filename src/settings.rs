use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub bind: String,
}

#[derive(Debug, Deserialize)]
pub struct Transfers {
    pub min_amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequests {
    pub due_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub http: Http,
    pub transfers: Transfers,
    pub payment_requests: PaymentRequests,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("postgres.max_connections", 5)?
            .set_default("http.bind", "0.0.0.0:8080")?
            .set_default("transfers.min_amount", 1)?
            .set_default("payment_requests.due_days", 7)?
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("PEERPAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
