//! mysql-adapter — MySQL implementation of the ContactBackend port.
//!
//! Purpose
//! - Persist contacts in a single `Contacts` table (`id` auto-increment
//!   primary key plus the four attribute columns).
//! - All access goes through parameterized statements; user input is never
//!   concatenated into SQL.
//!
//! Notes
//! - Zero rows returned or affected is reported as `BackendError::NotFound`,
//!   distinct from a driver failure (`BackendError::Store`).
//! - The sqlx pool is the only connection management; the gateway adds no
//!   pooling or retry of its own.

use domain::{BackendError, Contact, ContactBackend, ContactUpdate, NewContact};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

/// MySQL-backed contact store, constructed once at startup.
#[derive(Clone)]
pub struct MysqlStore {
    pool: MySqlPool,
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    mobile_number: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            mobile_number: row.mobile_number,
        }
    }
}

fn map_dberr(e: sqlx::Error) -> BackendError {
    BackendError::Store(format!("database error: {e}"))
}

impl MysqlStore {
    /// Connect to the database and ensure the `Contacts` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, BackendError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_dberr)?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), BackendError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Contacts (
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                first_name VARCHAR(255) NOT NULL,
                last_name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                mobile_number VARCHAR(64) NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_dberr)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContactBackend for MysqlStore {
    async fn create(&self, new: &NewContact) -> Result<Contact, BackendError> {
        let result = sqlx::query(
            "INSERT INTO Contacts (first_name, last_name, email, mobile_number) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.mobile_number)
        .execute(&self.pool)
        .await
        .map_err(map_dberr)?;

        Ok(Contact {
            id: result.last_insert_id() as i64,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            mobile_number: new.mobile_number.clone(),
        })
    }

    async fn get(&self, id: i64) -> Result<Contact, BackendError> {
        let row: Option<ContactRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, mobile_number \
             FROM Contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_dberr)?;

        row.map(Contact::from).ok_or(BackendError::NotFound)
    }

    async fn update(
        &self,
        id: i64,
        changes: &ContactUpdate,
    ) -> Result<Option<Contact>, BackendError> {
        let result = sqlx::query("UPDATE Contacts SET email = ?, mobile_number = ? WHERE id = ?")
            .bind(&changes.email)
            .bind(&changes.mobile_number)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_dberr)?;

        if result.rows_affected() == 0 {
            return Err(BackendError::NotFound);
        }
        // The database confirms without echoing the record.
        Ok(None)
    }

    async fn delete(&self, id: i64) -> Result<(), BackendError> {
        let result = sqlx::query("DELETE FROM Contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_dberr)?;

        if result.rows_affected() == 0 {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}
