//! The address store: the canonical owner of the address collection.
//!
//! Every implementation keeps insertion order, assigns ids on create, and
//! treats update as a full replace of the record with the same id.

use std::collections::HashSet;

use crate::error::{StoreError, ValidationError};
use crate::model::address::{Address, AddressId, NewAddress};

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Key under which the address collection lives in the key-value directory.
pub const ADDRESSES_KEY: &str = "addresses";

/// Durable address collection.
pub trait AddressStore {
    /// Every persisted record, in insertion order.
    fn list(&self) -> Result<Vec<Address>, StoreError>;

    /// Records assigned to `email`, in insertion order.
    fn filter_by_assignee(&self, email: &str) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|addr| addr.assigned_to_email == email)
            .collect())
    }

    fn get(&self, id: AddressId) -> Result<Address, StoreError> {
        self.list()?
            .into_iter()
            .find(|addr| addr.id == id)
            .ok_or(StoreError::NotFound { id })
    }

    /// Assign a fresh id, persist, and return the stored record.
    fn create(&self, draft: NewAddress) -> Result<Address, StoreError>;

    /// Replace the record whose id is `id` with `record`.
    fn update(&self, id: AddressId, record: Address) -> Result<(), StoreError>;

    /// Read-modify-write of one record as a single serialized step.
    ///
    /// `f` sees the whole collection and returns the replacement for `id`.
    /// Nothing is written when `f` fails.
    fn modify_record<E, F>(&self, id: AddressId, f: F) -> Result<Address, E>
    where
        E: From<StoreError>,
        F: FnOnce(&[Address]) -> Result<Address, E>;

    /// Append records that already carry ids. All-or-nothing.
    fn import(&self, records: Vec<Address>) -> Result<usize, StoreError>;
}

impl<S: AddressStore + ?Sized> AddressStore for &S {
    fn list(&self) -> Result<Vec<Address>, StoreError> {
        (**self).list()
    }

    fn filter_by_assignee(&self, email: &str) -> Result<Vec<Address>, StoreError> {
        (**self).filter_by_assignee(email)
    }

    fn get(&self, id: AddressId) -> Result<Address, StoreError> {
        (**self).get(id)
    }

    fn create(&self, draft: NewAddress) -> Result<Address, StoreError> {
        (**self).create(draft)
    }

    fn update(&self, id: AddressId, record: Address) -> Result<(), StoreError> {
        (**self).update(id, record)
    }

    fn modify_record<E, F>(&self, id: AddressId, f: F) -> Result<Address, E>
    where
        E: From<StoreError>,
        F: FnOnce(&[Address]) -> Result<Address, E>,
    {
        (**self).modify_record(id, f)
    }

    fn import(&self, records: Vec<Address>) -> Result<usize, StoreError> {
        (**self).import(records)
    }
}

/// Next id: the current time in ms, bumped past the largest id in use.
///
/// Fails when the largest id in use is `i64::MAX`.
pub fn next_id(existing: &[Address], now_ms: i64) -> Result<AddressId, ValidationError> {
    let last = existing.iter().map(|addr| addr.id.0).max();
    match last {
        Some(last) if last >= now_ms => last.checked_add(1).map(AddressId).ok_or_else(|| {
            ValidationError::new("id", format!("no id left above the stored id {last}"))
        }),
        _ => Ok(AddressId(now_ms)),
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// The collection mutations below are shared by every backend; each
// backend wraps them in its own serialization (file lock or mutex).

pub(crate) fn append_new(
    collection: &mut Vec<Address>,
    draft: NewAddress,
    now_ms: i64,
) -> Result<Address, StoreError> {
    draft.validate()?;
    let id = next_id(collection, now_ms)?;
    let record = Address::from_draft(id, draft);
    collection.push(record.clone());
    Ok(record)
}

pub(crate) fn replace_by_id(
    collection: &mut [Address],
    id: AddressId,
    record: Address,
) -> Result<(), StoreError> {
    if record.id != id {
        return Err(ValidationError::new(
            "id",
            format!("record id {} does not match target id {id}", record.id),
        )
        .into());
    }
    record.validate()?;
    let slot = collection
        .iter_mut()
        .find(|addr| addr.id == id)
        .ok_or(StoreError::NotFound { id })?;
    *slot = record;
    Ok(())
}

pub(crate) fn append_existing(
    collection: &mut Vec<Address>,
    records: Vec<Address>,
) -> Result<usize, StoreError> {
    let mut seen: HashSet<AddressId> = collection.iter().map(|addr| addr.id).collect();
    for record in &records {
        record.validate()?;
        if !seen.insert(record.id) {
            return Err(StoreError::DuplicateId { id: record.id });
        }
    }
    let count = records.len();
    collection.extend(records);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ids(ids: &[i64]) -> Vec<Address> {
        ids.iter()
            .map(|&id| Address::from_draft(AddressId(id), NewAddress::new("Rua", "T1")))
            .collect()
    }

    #[test]
    fn next_id_uses_clock_when_ahead() {
        assert_eq!(next_id(&with_ids(&[10, 20]), 100).unwrap(), AddressId(100));
        assert_eq!(next_id(&[], 5).unwrap(), AddressId(5));
    }

    #[test]
    fn next_id_bumps_past_existing_when_clock_lags() {
        assert_eq!(next_id(&with_ids(&[10, 200]), 100).unwrap(), AddressId(201));
        assert_eq!(next_id(&with_ids(&[100]), 100).unwrap(), AddressId(101));
    }

    #[test]
    fn next_id_at_the_top_of_the_range_is_rejected() {
        let err = next_id(&with_ids(&[i64::MAX]), 100).unwrap_err();
        assert_eq!(err.field, "id");

        let mut collection = with_ids(&[i64::MAX]);
        let err = append_new(&mut collection, NewAddress::new("Rua", "T1"), 100).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref v) if v.field == "id"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn replace_rejects_mismatched_record_id() {
        let mut collection = with_ids(&[1, 2]);
        let record = collection[0].clone();
        let err = replace_by_id(&mut collection, AddressId(2), record).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref v) if v.field == "id"));
    }

    #[test]
    fn append_existing_rejects_collisions_within_batch() {
        let mut collection = with_ids(&[1]);
        let err = append_existing(&mut collection, with_ids(&[2, 2])).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { id: AddressId(2) }));
        assert_eq!(collection.len(), 1);
    }
}
