//! Application service: an injected store and directory, scoped to one viewer.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::authz;
use crate::derive::all_complete;
use crate::directory::Directory;
use crate::error::{StoreError, VisitasError};
use crate::model::address::{Address, AddressId, AddressPatch, NewAddress};
use crate::model::user::User;
use crate::store::AddressStore;
use crate::workflow;

pub struct Tracker<S, D> {
    store: S,
    directory: D,
    viewer: User,
    stamp_on_create: bool,
}

impl<S: AddressStore, D: Directory> Tracker<S, D> {
    /// Bind a store and directory to the directory's current user.
    pub fn new(store: S, directory: D) -> Result<Self, VisitasError> {
        let viewer = directory
            .current_user()
            .ok_or(VisitasError::MissingIdentity)?;
        debug!(email = %viewer.email, role = %viewer.role, "tracker bound to viewer");
        Ok(Self {
            store,
            directory,
            viewer,
            stamp_on_create: true,
        })
    }

    #[must_use]
    pub const fn with_stamp_on_create(mut self, enabled: bool) -> Self {
        self.stamp_on_create = enabled;
        self
    }

    /// The collection this viewer owns: everything for admins, only their
    /// own assignments otherwise.
    pub fn load(&self) -> Result<Vec<Address>, StoreError> {
        if authz::is_admin(&self.viewer) {
            self.store.list()
        } else {
            self.store.filter_by_assignee(&self.viewer.email)
        }
    }

    fn can_see(&self, addr: &Address) -> bool {
        authz::is_admin(&self.viewer) || addr.assigned_to_email == self.viewer.email
    }

    /// `load` over an already-read collection.
    fn scope(&self, all: &[Address]) -> Vec<Address> {
        all.iter().filter(|addr| self.can_see(addr)).cloned().collect()
    }

    pub fn create(&self, mut draft: NewAddress, today: NaiveDate) -> Result<Address, VisitasError> {
        let assignee = draft
            .assigned_to_email
            .take()
            .unwrap_or_else(|| self.viewer.email.clone());
        self.check_assignee(&assignee)?;
        draft.assigned_to_email = Some(assignee);

        if self.stamp_on_create {
            draft = workflow::stamp_on_create(draft, today);
        }
        Ok(self.store.create(draft)?)
    }

    /// Mark an address visited, subject to the workflow gate evaluated over
    /// this viewer's whole collection.
    ///
    /// The gate check and the write happen in one store step, so concurrent
    /// calls cannot both pass the gate on the same stale record.
    pub fn mark_done(&self, id: AddressId, today: NaiveDate) -> Result<Address, VisitasError> {
        let mut new_round = false;
        let next = self
            .store
            .modify_record(id, |all| -> Result<Address, VisitasError> {
                let collection = self.scope(all);
                let current = collection
                    .iter()
                    .find(|addr| addr.id == id)
                    .ok_or(StoreError::NotFound { id })?;
                new_round = all_complete(&collection);
                Ok(workflow::mark_done(current, new_round, today)?)
            })?;
        info!(%id, visit_count = next.visit_count, new_round, "marked address visited");
        Ok(next)
    }

    /// Apply `patch` to a visible address and write back the full record.
    pub fn edit(&self, id: AddressId, patch: AddressPatch) -> Result<Address, VisitasError> {
        self.store
            .modify_record(id, |all| -> Result<Address, VisitasError> {
                let current = all
                    .iter()
                    .find(|addr| addr.id == id && self.can_see(addr))
                    .ok_or(StoreError::NotFound { id })?;
                if let Some(email) = patch.assigned_to_email.as_deref() {
                    if email != current.assigned_to_email {
                        self.check_assignee(email)?;
                    }
                }
                Ok(current.patched(patch))
            })
    }

    /// Append pre-identified records, e.g. a browser export.
    pub fn import(&self, records: Vec<Address>) -> Result<usize, VisitasError> {
        authz::require_admin(&self.viewer, "importing addresses")?;
        Ok(self.store.import(records)?)
    }

    /// Users an admin can assign addresses to.
    pub fn directory_users(&self) -> Result<Vec<User>, VisitasError> {
        authz::require_admin(&self.viewer, "listing users")?;
        Ok(self.directory.list_users())
    }

    /// Members may only assign to themselves; admins may assign to anyone in
    /// the directory.
    fn check_assignee(&self, email: &str) -> Result<(), VisitasError> {
        if email == self.viewer.email {
            return Ok(());
        }
        authz::require_admin(&self.viewer, "assigning addresses to other users")?;
        if self.directory.find(email).is_none() {
            return Err(VisitasError::UnknownAssignee {
                email: email.to_string(),
            });
        }
        Ok(())
    }
}
