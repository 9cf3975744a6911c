use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// Address identifier: the creation timestamp in milliseconds, kept strictly
/// increasing by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub i64);

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AddressId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ValidationError::new("id", format!("'{s}' is not a numeric address id")))
    }
}

/// Visit status of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Pending: not yet visited in the current round.
    #[default]
    FaltaPregar,
    /// Visited.
    Pregado,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FaltaPregar => "falta_pregar",
            Self::Pregado => "pregado",
        }
    }

    /// Short label for human output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FaltaPregar => "pending",
            Self::Pregado => "visited",
        }
    }

    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Pregado)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "falta_pregar" | "pending" => Ok(Self::FaltaPregar),
            "pregado" | "visited" | "done" => Ok(Self::Pregado),
            other => Err(ValidationError::new(
                "status",
                format!("'{other}' is not one of falta_pregar, pregado"),
            )),
        }
    }
}

/// A persisted address record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub address: String,
    pub territory: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub observations: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub best_time: Option<String>,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub visit_count: u32,
    #[serde(default)]
    pub assigned_to_email: String,
}

impl Address {
    /// Attach an id to a draft.
    #[must_use]
    pub fn from_draft(id: AddressId, draft: NewAddress) -> Self {
        Self {
            id,
            address: draft.address,
            territory: draft.territory,
            status: draft.status,
            contact_name: draft.contact_name,
            phone: draft.phone,
            observations: draft.observations,
            best_time: draft.best_time,
            last_visit_date: draft.last_visit_date,
            visit_count: draft.visit_count,
            assigned_to_email: draft.assigned_to_email.unwrap_or_default(),
        }
    }

    /// Check the fields every persisted record must carry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("address", &self.address)?;
        require_text("territory", &self.territory)?;
        Ok(())
    }

    /// Apply an edit on top of this record.
    ///
    /// Reverting `status` leaves `visit_count` and `last_visit_date` as they were.
    #[must_use]
    pub fn patched(&self, patch: AddressPatch) -> Self {
        let mut next = self.clone();
        if let Some(address) = patch.address {
            next.address = address;
        }
        if let Some(territory) = patch.territory {
            next.territory = territory;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(contact_name) = patch.contact_name {
            next.contact_name = non_blank(contact_name);
        }
        if let Some(phone) = patch.phone {
            next.phone = non_blank(phone);
        }
        if let Some(observations) = patch.observations {
            next.observations = non_blank(observations);
        }
        if let Some(best_time) = patch.best_time {
            next.best_time = non_blank(best_time);
        }
        if let Some(email) = patch.assigned_to_email {
            next.assigned_to_email = email;
        }
        next
    }
}

/// A record submitted for creation; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub address: String,
    pub territory: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub best_time: Option<String>,
    #[serde(default)]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub visit_count: u32,
    /// `None` lets the tracker fill in the submitting user.
    #[serde(default)]
    pub assigned_to_email: Option<String>,
}

impl NewAddress {
    #[must_use]
    pub fn new(address: impl Into<String>, territory: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            territory: territory.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("address", &self.address)?;
        require_text("territory", &self.territory)?;
        if let Some(email) = &self.assigned_to_email {
            require_text("assigned_to_email", email)?;
        }
        Ok(())
    }
}

/// Field changes for an edit. `Some("")` clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    pub address: Option<String>,
    pub territory: Option<String>,
    pub status: Option<Status>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub observations: Option<String>,
    pub best_time: Option<String>,
    pub assigned_to_email: Option<String>,
}

impl AddressPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.territory.is_none()
            && self.status.is_none()
            && self.contact_name.is_none()
            && self.phone.is_none()
            && self.observations.is_none()
            && self.best_time.is_none()
            && self.assigned_to_email.is_none()
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// Browser dumps store untouched form fields as "".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(non_blank))
}

fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
