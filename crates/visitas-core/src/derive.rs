//! Pure views over an in-memory address collection.
//!
//! Nothing here touches the store. Callers load the collection once and
//! recompute these views after every mutation.

use indexmap::IndexMap;
use serde::Serialize;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::model::address::{Address, Status};

/// Status filter; `"all"` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    fn matches(self, addr: &Address) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => addr.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Territory filter; `"all"` disables it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TerritoryFilter {
    #[default]
    All,
    Only(String),
}

impl TerritoryFilter {
    fn matches(&self, addr: &Address) -> bool {
        match self {
            Self::All => true,
            Self::Only(territory) => addr.territory == *territory,
        }
    }
}

impl From<&str> for TerritoryFilter {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    pub status: StatusFilter,
    pub territory: TerritoryFilter,
    pub search: String,
}

impl Filters {
    fn search_matches(&self, addr: &Address) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        addr.address.to_lowercase().contains(&needle)
            || addr
                .contact_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }

    #[must_use]
    pub fn matches(&self, addr: &Address) -> bool {
        self.status.matches(addr) && self.territory.matches(addr) && self.search_matches(addr)
    }
}

/// Records passing every filter, in input order.
#[must_use]
pub fn apply_filters<'a>(addresses: &'a [Address], filters: &Filters) -> Vec<&'a Address> {
    addresses.iter().filter(|addr| filters.matches(addr)).collect()
}

/// Group by territory. Keys iterate in order of first appearance.
#[must_use]
pub fn group_by_territory<'a, I>(addresses: I) -> IndexMap<&'a str, Vec<&'a Address>>
where
    I: IntoIterator<Item = &'a Address>,
{
    let mut groups: IndexMap<&'a str, Vec<&'a Address>> = IndexMap::new();
    for addr in addresses {
        groups.entry(addr.territory.as_str()).or_default().push(addr);
    }
    groups
}

/// True iff the collection is non-empty and every address in every territory
/// is visited. Pass the full unfiltered collection.
#[must_use]
pub fn all_complete(addresses: &[Address]) -> bool {
    if addresses.is_empty() {
        return false;
    }
    group_by_territory(addresses)
        .values()
        .all(|group| group.iter().all(|addr| addr.status.is_done()))
}

/// Distinct non-empty territory names in order of first appearance.
#[must_use]
pub fn territories(addresses: &[Address]) -> Vec<&str> {
    group_by_territory(addresses)
        .into_keys()
        .filter(|name| !name.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerritoryProgress {
    pub territory: String,
    pub total: usize,
    pub done: usize,
    pub complete: bool,
}

/// Per-territory completion in group order.
#[must_use]
pub fn territory_progress(addresses: &[Address]) -> Vec<TerritoryProgress> {
    group_by_territory(addresses)
        .into_iter()
        .map(|(territory, group)| {
            let done = group.iter().filter(|addr| addr.status.is_done()).count();
            TerritoryProgress {
                territory: territory.to_string(),
                total: group.len(),
                done,
                complete: done == group.len(),
            }
        })
        .collect()
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub done_count: usize,
    pub pending_count: usize,
    pub territory_count: usize,
    pub all_complete: bool,
}

#[must_use]
pub fn compute_stats(addresses: &[Address]) -> Stats {
    let done_count = addresses
        .iter()
        .filter(|addr| addr.status == Status::Pregado)
        .count();
    let pending_count = addresses
        .iter()
        .filter(|addr| addr.status == Status::FaltaPregar)
        .count();
    Stats {
        total: addresses.len(),
        done_count,
        pending_count,
        territory_count: group_by_territory(addresses).len(),
        all_complete: all_complete(addresses),
    }
}
