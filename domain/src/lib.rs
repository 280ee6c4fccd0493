//! Domain library for the Contact Gateway.
//!
//! Holds the contact types, the per-request backend selector, the backend
//! port (trait), and error definitions. Keep adapter and IO concerns out of
//! this crate; the CRM and MySQL adapters live in their own crates.

use serde::{Deserialize, Serialize};

/// Per-request backend selector. The gateway recognizes exactly two values;
/// anything else is rejected before any backend is touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataStore {
    Crm,
    Database,
}

impl DataStore {
    /// Parse the `data_store` field of a request body. Absent or unrecognized
    /// values yield `None`.
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s {
            Some("CRM") => Some(Self::Crm),
            Some("DATABASE") => Some(Self::Database),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crm => "CRM",
            Self::Database => "DATABASE",
        }
    }

    /// Human-readable backend name used in confirmation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Crm => "CRM",
            Self::Database => "Database",
        }
    }
}

/// A stored contact record. The id is assigned by whichever backend created
/// the record; the two backends' identifier spaces are not unified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
}

/// Input data for creating a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
}

/// Mutable attributes for an update. Names are never changed by an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactUpdate {
    pub email: String,
    pub mobile_number: String,
}

/// Backend port for the four contact operations.
///
/// `update` returns `Some(contact)` when the backend echoes the updated
/// record (the CRM does) and `None` when it only confirms the write (the
/// database does). Callers turn `None` into a confirmation message.
#[async_trait::async_trait]
pub trait ContactBackend: Send + Sync {
    async fn create(&self, new: &NewContact) -> Result<Contact, BackendError>;
    async fn get(&self, id: i64) -> Result<Contact, BackendError>;
    async fn update(&self, id: i64, changes: &ContactUpdate)
        -> Result<Option<Contact>, BackendError>;
    async fn delete(&self, id: i64) -> Result<(), BackendError>;
}

/// Errors surfaced by a backend call.
///
/// `NotFound` is produced only by database-style backends (zero rows
/// returned or affected). The CRM does not get a distinct not-found: any
/// failure of the outbound call, including a remote 404, arrives as
/// `Upstream` with the failure's message relayed verbatim.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Contact not found")]
    NotFound,
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Store(String),
}

pub mod adapters;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_store_parses_exact_values_only() {
        assert_eq!(DataStore::parse(Some("CRM")), Some(DataStore::Crm));
        assert_eq!(DataStore::parse(Some("DATABASE")), Some(DataStore::Database));
        assert_eq!(DataStore::parse(Some("crm")), None);
        assert_eq!(DataStore::parse(Some("database")), None);
        assert_eq!(DataStore::parse(Some("S3")), None);
        assert_eq!(DataStore::parse(Some("")), None);
        assert_eq!(DataStore::parse(None), None);
    }

    #[test]
    fn data_store_labels() {
        assert_eq!(DataStore::Crm.label(), "CRM");
        assert_eq!(DataStore::Database.label(), "Database");
    }

    #[test]
    fn backend_error_messages_are_verbatim() {
        let e = BackendError::Upstream("CRM request failed with status 404: {}".into());
        assert_eq!(e.to_string(), "CRM request failed with status 404: {}");
        assert_eq!(BackendError::NotFound.to_string(), "Contact not found");
    }
}
