use std::{env, fs, path::Path};

use sqlx::SqlitePool;

use crate::models::{new_id, Owner};
use crate::store::{EntityStore, StoreError};

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Seeds a default owner account on first start so the admin endpoints are
/// reachable on a fresh deployment.
pub async fn seed_default_owner(store: &dyn EntityStore) -> Result<(), StoreError> {
    let username = env::var("OWNER_USER").unwrap_or_else(|_| "owner".to_string());
    if store.find_owner(&username).await?.is_some() {
        return Ok(());
    }

    let password = env::var("OWNER_PASSWORD").unwrap_or_else(|_| "owner".to_string());
    if password == "owner" {
        log::warn!("OWNER_PASSWORD not set. Using default password 'owner'. Set OWNER_PASSWORD in production.");
    }

    store
        .insert_owner(&Owner {
            id: new_id(),
            username,
            password,
        })
        .await
}
