use std::sync::{Mutex, MutexGuard};

use super::{AddressStore, append_existing, append_new, now_millis, replace_by_id};
use crate::error::StoreError;
use crate::model::address::{Address, AddressId, NewAddress};

/// In-process store. Used by tests and as the session-only fallback when the
/// on-disk store cannot be read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    addresses: Mutex<Vec<Address>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_addresses(addresses: Vec<Address>) -> Self {
        Self {
            addresses: Mutex::new(addresses),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<Address>>, StoreError> {
        self.addresses.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl AddressStore for MemoryStore {
    fn list(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self.guard()?.clone())
    }

    fn create(&self, draft: NewAddress) -> Result<Address, StoreError> {
        append_new(&mut *self.guard()?, draft, now_millis())
    }

    fn update(&self, id: AddressId, record: Address) -> Result<(), StoreError> {
        replace_by_id(self.guard()?.as_mut_slice(), id, record)
    }

    fn modify_record<E, F>(&self, id: AddressId, f: F) -> Result<Address, E>
    where
        E: From<StoreError>,
        F: FnOnce(&[Address]) -> Result<Address, E>,
    {
        let mut guard = self.guard()?;
        let next = f(guard.as_slice())?;
        replace_by_id(guard.as_mut_slice(), id, next.clone())?;
        Ok(next)
    }

    fn import(&self, records: Vec<Address>) -> Result<usize, StoreError> {
        append_existing(&mut *self.guard()?, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .create(NewAddress::new(format!("Rua {i}"), "T1"))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.list().unwrap().len(), 8);
    }

    #[test]
    fn modify_record_failure_leaves_collection_untouched() {
        let store = MemoryStore::new();
        let created = store.create(NewAddress::new("Rua A", "T1")).unwrap();

        let err = store
            .modify_record(created.id, |all| {
                let mut next = all[0].clone();
                next.territory = String::new();
                Ok::<_, StoreError>(next)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get(created.id).unwrap(), created);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get(AddressId(3)),
            Err(StoreError::NotFound { id: AddressId(3) })
        ));
    }
}
