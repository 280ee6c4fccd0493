use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{BackendError, Contact, ContactBackend, ContactUpdate, NewContact};

/// Simple in-memory store for tests and local development. Ids are assigned
/// from a monotonically increasing counter, mirroring an auto-increment
/// primary key. Not intended for production use.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    contacts: BTreeMap<i64, Contact>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                contacts: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> BackendError {
    BackendError::Store("mutex poisoned".into())
}

#[async_trait::async_trait]
impl ContactBackend for MemoryStore {
    async fn create(&self, new: &NewContact) -> Result<Contact, BackendError> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        let id = inner.next_id;
        inner.next_id += 1;
        let contact = Contact {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            mobile_number: new.mobile_number.clone(),
        };
        inner.contacts.insert(id, contact.clone());
        Ok(contact)
    }

    async fn get(&self, id: i64) -> Result<Contact, BackendError> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;
        inner.contacts.get(&id).cloned().ok_or(BackendError::NotFound)
    }

    async fn update(
        &self,
        id: i64,
        changes: &ContactUpdate,
    ) -> Result<Option<Contact>, BackendError> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        let contact = inner.contacts.get_mut(&id).ok_or(BackendError::NotFound)?;
        contact.email = changes.email.clone();
        contact.mobile_number = changes.mobile_number.clone();
        // Database-style backends confirm without echoing the record.
        Ok(None)
    }

    async fn delete(&self, id: i64) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        match inner.contacts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact() -> NewContact {
        NewContact {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            mobile_number: "555-0100".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.create(&new_contact()).await.expect("create");
        let b = store.create(&new_contact()).await.expect("create");
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get(42).await, Err(BackendError::NotFound)));
    }

    #[tokio::test]
    async fn update_changes_only_email_and_mobile() {
        let store = MemoryStore::new();
        let created = store.create(&new_contact()).await.expect("create");
        let changes = ContactUpdate {
            email: "ada@newmail.com".into(),
            mobile_number: "555-0199".into(),
        };
        let echoed = store.update(created.id, &changes).await.expect("update");
        assert!(echoed.is_none());

        let after = store.get(created.id).await.expect("get");
        assert_eq!(after.first_name, "Ada");
        assert_eq!(after.last_name, "Lovelace");
        assert_eq!(after.email, "ada@newmail.com");
        assert_eq!(after.mobile_number, "555-0199");
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let changes = ContactUpdate {
            email: "x@example.com".into(),
            mobile_number: "555-0000".into(),
        };
        assert!(matches!(
            store.update(7, &changes).await,
            Err(BackendError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_row_and_is_not_repeatable() {
        let store = MemoryStore::new();
        let created = store.create(&new_contact()).await.expect("create");
        store.delete(created.id).await.expect("delete");
        assert!(matches!(
            store.get(created.id).await,
            Err(BackendError::NotFound)
        ));
        assert!(matches!(
            store.delete(created.id).await,
            Err(BackendError::NotFound)
        ));
    }
}
