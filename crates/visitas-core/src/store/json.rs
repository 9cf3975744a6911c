//! File-backed key-value store.
//!
//! # Layout
//!
//! ```text
//! .visitas/
//!   store/
//!     addresses.json    # key "addresses": JSON array, rewritten on every write
//!   lock                # advisory lock shared by all `vt` processes
//! ```
//!
//! # Invariants
//!
//! - A missing blob reads as an empty collection.
//! - Reads hold a shared lock; each read-modify-write holds an exclusive lock
//!   from the read through the rename.
//! - Writes go to a sibling temp file, are synced, then renamed over the blob,
//!   so a crash leaves either the old or the new collection.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::{ADDRESSES_KEY, AddressStore, append_existing, append_new, now_millis, replace_by_id};
use crate::error::StoreError;
use crate::lock::StoreLock;
use crate::model::address::{Address, AddressId, NewAddress};

/// Default time to wait for another process to release the store lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Address store persisted as a JSON blob inside a project directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    store_dir: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Store rooted at a `.visitas/` project directory.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref();
        Self {
            store_dir: project_dir.join("store"),
            lock_path: project_dir.join("lock"),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the blob holding the address collection.
    #[must_use]
    pub fn blob_path(&self) -> PathBuf {
        self.store_dir.join(format!("{ADDRESSES_KEY}.json"))
    }

    /// Write an empty collection if none exists yet.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        let _lock = StoreLock::exclusive(&self.lock_path, self.lock_timeout)?;
        if !self.blob_path().exists() {
            self.write_blob(&[])?;
        }
        Ok(())
    }

    fn read_blob(&self) -> Result<Vec<Address>, StoreError> {
        let path = self.blob_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "address blob missing; treating as empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Unavailable { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let addresses: Vec<Address> = serde_json::from_str(&content)
            .map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), count = addresses.len(), "read address blob");
        Ok(addresses)
    }

    fn write_blob(&self, addresses: &[Address]) -> Result<(), StoreError> {
        let path = self.blob_path();
        let unavailable = |source: io::Error| StoreError::Unavailable {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.store_dir).map_err(unavailable)?;

        let tmp_path = self.store_dir.join(format!(".{ADDRESSES_KEY}.json.tmp"));
        {
            let file = File::create(&tmp_path).map_err(unavailable)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, addresses)
                .map_err(|err| unavailable(io::Error::other(err)))?;
            writer.write_all(b"\n").map_err(unavailable)?;
            let file = writer
                .into_inner()
                .map_err(|err| unavailable(err.into_error()))?;
            file.sync_all().map_err(unavailable)?;
        }
        fs::rename(&tmp_path, &path).map_err(unavailable)?;
        debug!(path = %path.display(), count = addresses.len(), "wrote address blob");
        Ok(())
    }

    /// Run `f` over the collection under the exclusive lock and persist the
    /// result only if `f` succeeds.
    fn modify<T, E>(
        &self,
        f: impl FnOnce(&mut Vec<Address>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _lock =
            StoreLock::exclusive(&self.lock_path, self.lock_timeout).map_err(StoreError::from)?;
        let mut addresses = self.read_blob()?;
        let out = f(&mut addresses)?;
        self.write_blob(&addresses)?;
        Ok(out)
    }
}

impl AddressStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Address>, StoreError> {
        let _lock = StoreLock::shared(&self.lock_path, self.lock_timeout)?;
        self.read_blob()
    }

    fn create(&self, draft: NewAddress) -> Result<Address, StoreError> {
        let record = self.modify(|addresses| append_new(addresses, draft, now_millis()))?;
        info!(id = %record.id, territory = %record.territory, "created address");
        Ok(record)
    }

    fn update(&self, id: AddressId, record: Address) -> Result<(), StoreError> {
        self.modify(|addresses| replace_by_id(addresses, id, record))?;
        info!(%id, "updated address");
        Ok(())
    }

    fn modify_record<E, F>(&self, id: AddressId, f: F) -> Result<Address, E>
    where
        E: From<StoreError>,
        F: FnOnce(&[Address]) -> Result<Address, E>,
    {
        let record = self.modify(|addresses| {
            let next = f(addresses.as_slice())?;
            replace_by_id(addresses, id, next.clone())?;
            Ok::<_, E>(next)
        })?;
        info!(%id, "updated address");
        Ok(record)
    }

    fn import(&self, records: Vec<Address>) -> Result<usize, StoreError> {
        let count = self.modify(|addresses| append_existing(addresses, records))?;
        info!(count, "imported addresses");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Status;
    use std::collections::HashSet;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join(".visitas"))
            .with_lock_timeout(Duration::from_millis(100))
    }

    #[test]
    fn missing_blob_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn create_then_list_includes_exactly_one_fresh_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = store.create(NewAddress::new("Rua A, 1", "T1")).unwrap();
        let before: HashSet<_> = store.list().unwrap().iter().map(|a| a.id).collect();

        let second = store.create(NewAddress::new("Rua B, 2", "T1")).unwrap();
        let after = store.list().unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert!(!before.contains(&second.id));
        assert_ne!(first.id, second.id);
        assert_eq!(after.iter().filter(|a| a.id == second.id).count(), 1);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for street in ["Rua C", "Rua A", "Rua B"] {
            store.create(NewAddress::new(street, "T1")).unwrap();
        }
        let streets: Vec<_> = store.list().unwrap().into_iter().map(|a| a.address).collect();
        assert_eq!(streets, ["Rua C", "Rua A", "Rua B"]);
    }

    #[test]
    fn create_rejects_empty_territory_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let err = store.create(NewAddress::new("Rua A", " ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref v) if v.field == "territory"));
        assert!(!store.blob_path().exists());
    }

    #[test]
    fn update_replaces_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let created = store.create(NewAddress::new("Rua A", "T1")).unwrap();

        let mut replacement = created.clone();
        replacement.status = Status::Pregado;
        replacement.phone = Some("555-0101".into());
        store.update(created.id, replacement.clone()).unwrap();

        assert_eq!(store.get(created.id).unwrap(), replacement);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let created = store.create(NewAddress::new("Rua A", "T1")).unwrap();
        let mut ghost = created;
        ghost.id = AddressId(1);
        let err = store.update(AddressId(1), ghost).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: AddressId(1) }));
    }

    #[test]
    fn filter_by_assignee_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for (street, who) in [("A", "ana@x"), ("B", "rui@x"), ("C", "ana@x")] {
            let mut draft = NewAddress::new(street, "T1");
            draft.assigned_to_email = Some(who.into());
            store.create(draft).unwrap();
        }
        let mine: Vec<_> = store
            .filter_by_assignee("ana@x")
            .unwrap()
            .into_iter()
            .map(|a| a.address)
            .collect();
        assert_eq!(mine, ["A", "C"]);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.blob_path().parent().unwrap()).unwrap();
        fs::write(store.blob_path(), "{not json").unwrap();
        assert!(matches!(store.list(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn reads_browser_local_storage_dump() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.blob_path().parent().unwrap()).unwrap();
        fs::write(
            store.blob_path(),
            r#"[{"address":"Rua X","territory":"T9","status":"pregado","contact_name":"",
                "phone":"","observations":"","best_time":"","last_visit_date":"2025-03-01",
                "visit_count":2,"assigned_to_email":"user@example.com","id":1740000000000}]"#,
        )
        .unwrap();
        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].visit_count, 2);
        assert_eq!(all[0].status, Status::Pregado);

        let next = store.create(NewAddress::new("Rua Y", "T9")).unwrap();
        assert!(next.id > all[0].id);
    }

    #[test]
    fn import_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let existing = store.create(NewAddress::new("Rua A", "T1")).unwrap();

        let fresh = Address::from_draft(AddressId(7), NewAddress::new("Rua B", "T2"));
        let err = store.import(vec![fresh, existing.clone()]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { id } if id == existing.id));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn modify_record_writes_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let created = store.create(NewAddress::new("Rua A", "T1")).unwrap();

        let err = store
            .modify_record(created.id, |_| {
                Err::<Address, _>(StoreError::NotFound { id: AddressId(1) })
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.get(created.id).unwrap(), created);

        let updated = store
            .modify_record(created.id, |all| {
                let mut next = all[0].clone();
                next.visit_count += 1;
                Ok::<_, StoreError>(next)
            })
            .unwrap();
        assert_eq!(updated.visit_count, 1);
        assert_eq!(store.get(created.id).unwrap(), updated);
    }

    #[test]
    fn write_fails_with_lock_contention_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_initialized().unwrap();
        let _held = StoreLock::exclusive(&dir.path().join(".visitas/lock"), Duration::from_millis(50))
            .unwrap();
        let err = store.create(NewAddress::new("Rua A", "T1")).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::LockContention);
    }
}
