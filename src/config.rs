use std::env;

/// Runtime configuration, collected from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub mongo_url: String,
    pub mongo_db: String,
    pub allowed_origin: Option<String>,
    pub horizon_days: u32,
    pub reminder_interval_minutes: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parsed("PORT", 8000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://./data/valiant.db".to_string()),
            mongo_url: env::var("MONGO_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db: env::var("MONGO_DB").unwrap_or_else(|_| "valiant".to_string()),
            allowed_origin: env::var("ALLOWED_ORIGIN").ok(),
            horizon_days: parsed("HORIZON_DAYS", 7),
            reminder_interval_minutes: parsed("REMINDER_INTERVAL_MINUTES", 60),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
