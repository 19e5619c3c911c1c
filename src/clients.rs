use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{ClientRow, ClientStatus, new_id};
use crate::store::StoreError;

/// Relational client store. Clients live in SQLite with a unique index on
/// email; the index, not application code, is what keeps concurrent
/// first-time bookings from minting two records for one person.
#[derive(Clone)]
pub struct ClientStore {
    pool: SqlitePool,
}

impl ClientStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<ClientRow>, StoreError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, phone, address, status, created_at FROM clients ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ClientRow>, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, phone, address, status, created_at FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ClientRow>, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, email, phone, address, status, created_at FROM clients WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
    ) -> Result<ClientRow, StoreError> {
        let id = new_id();
        let created_at = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO clients (id, name, email, phone, address, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(ClientStatus::New.as_str())
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    return StoreError::Duplicate(email.to_string());
                }
            }
            StoreError::Sql(err)
        })?;

        Ok(ClientRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.map(str::to_string),
            status: ClientStatus::New.as_str().to_string(),
            created_at,
        })
    }

    pub async fn update_contact(
        &self,
        id: &str,
        name: &str,
        phone: &str,
        address: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE clients SET name = ?, phone = ?, address = COALESCE(?, address) WHERE id = ?",
        )
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Lifecycle update driven by reservation transitions. Returns false
    /// when the row no longer exists, which callers treat as fine: the
    /// reservation keeps its contact snapshot.
    pub async fn set_status(&self, id: &str, status: ClientStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE clients SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
