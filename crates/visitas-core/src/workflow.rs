//! Visit workflow: `falta_pregar -> pregado` and its side effects.
//!
//! The mark-done gate is open while an address is pending, and also once the
//! whole collection is visited. The second clause lets a finished sweep start
//! a new round by re-marking addresses that are already `pregado`.

use chrono::NaiveDate;

use crate::model::address::{Address, AddressId, NewAddress, Status};

/// Mark-done was refused by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("address {id} is already visited and the round is not complete")]
pub struct VisitGated {
    pub id: AddressId,
}

/// Whether the mark-done action is enabled for `address`.
///
/// `collection_complete` must be [`crate::derive::all_complete`] over the
/// owning (unfiltered) collection.
#[must_use]
pub fn can_mark_done(address: &Address, collection_complete: bool) -> bool {
    address.status == Status::FaltaPregar || collection_complete
}

/// Apply the transition: status becomes `pregado`, the visit date becomes
/// `today`, and the visit counter goes up by one.
pub fn mark_done(
    address: &Address,
    collection_complete: bool,
    today: NaiveDate,
) -> Result<Address, VisitGated> {
    if !can_mark_done(address, collection_complete) {
        return Err(VisitGated { id: address.id });
    }
    let mut next = address.clone();
    next.status = Status::Pregado;
    next.last_visit_date = Some(today);
    next.visit_count = address.visit_count.saturating_add(1);
    Ok(next)
}

/// Make a draft created as already visited look like one visit happened.
#[must_use]
pub fn stamp_on_create(mut draft: NewAddress, today: NaiveDate) -> NewAddress {
    if draft.status == Status::Pregado {
        draft.visit_count = draft.visit_count.max(1);
        if draft.last_visit_date.is_none() {
            draft.last_visit_date = Some(today);
        }
    }
    draft
}
