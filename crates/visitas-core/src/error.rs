use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::lock::LockError;
use crate::model::address::AddressId;
use crate::workflow::VisitGated;

/// Machine-readable error codes for scripts and agents driving `vt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    AlreadyInitialized,
    ConfigParseError,
    AddressNotFound,
    VisitGated,
    ValidationFailed,
    DuplicateId,
    CorruptStore,
    PermissionDenied,
    UnknownAssignee,
    MissingIdentity,
    StorageUnavailable,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::AlreadyInitialized => "E1003",
            Self::ConfigParseError => "E1002",
            Self::AddressNotFound => "E2001",
            Self::VisitGated => "E2002",
            Self::ValidationFailed => "E2005",
            Self::DuplicateId => "E2006",
            Self::CorruptStore => "E3001",
            Self::PermissionDenied => "E4001",
            Self::UnknownAssignee => "E4002",
            Self::MissingIdentity => "E4003",
            Self::StorageUnavailable => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::AlreadyInitialized => "Project already initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::AddressNotFound => "Address not found",
            Self::VisitGated => "Address already visited",
            Self::ValidationFailed => "Invalid address record",
            Self::DuplicateId => "Duplicate address ID",
            Self::CorruptStore => "Corrupt address store",
            Self::PermissionDenied => "Permission denied",
            Self::UnknownAssignee => "Unknown assignee",
            Self::MissingIdentity => "No current user",
            Self::StorageUnavailable => "Storage unavailable",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `vt init` to create a .visitas/ project here."),
            Self::AlreadyInitialized => Some("Use `vt init --force` to rewrite config.toml."),
            Self::ConfigParseError => Some("Fix syntax in .visitas/config.toml and retry."),
            Self::AddressNotFound => Some("Check the address ID with `vt list`."),
            Self::VisitGated => Some(
                "Only pending addresses can be marked; every address must be visited before a new round.",
            ),
            Self::ValidationFailed => Some("Provide a non-empty --address and --territory."),
            Self::DuplicateId => Some("Remove records whose IDs already exist before importing."),
            Self::CorruptStore => {
                Some("Restore .visitas/store/addresses.json from a `vt export` backup.")
            }
            Self::PermissionDenied => Some("Ask an admin listed in .visitas/config.toml."),
            Self::UnknownAssignee => Some("Pick an email shown by `vt users`."),
            Self::MissingIdentity => {
                Some("Pass --user, set VISITAS_USER, or set [identity] email in .visitas/config.toml.")
            }
            Self::StorageUnavailable => Some("Check disk space and write permissions on .visitas/."),
            Self::LockContention => Some("Retry after the other `vt` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A record failed a store-boundary check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised at the address store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("address {id} not found")]
    NotFound { id: AddressId },

    #[error("address id {id} already exists")]
    DuplicateId { id: AddressId },

    #[error("storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stored collection at {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("in-memory store mutex poisoned")]
    Poisoned,
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::AddressNotFound,
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::Unavailable { .. } => ErrorCode::StorageUnavailable,
            Self::Corrupt { .. } => ErrorCode::CorruptStore,
            Self::Lock(err) => err.code(),
            Self::Poisoned => ErrorCode::InternalUnexpected,
        }
    }

    /// True when the persistence layer itself is out of reach, as opposed to
    /// a bad request against a healthy store.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Lock(LockError::IoError(_))
        )
    }
}

/// Top-level error for tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum VisitasError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    VisitGated(#[from] VisitGated),

    #[error("{action} requires the admin role")]
    PermissionDenied { action: &'static str },

    #[error("unknown assignee '{email}'")]
    UnknownAssignee { email: String },

    #[error("no current user could be resolved")]
    MissingIdentity,
}

impl VisitasError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Store(err) => err.code(),
            Self::VisitGated(_) => ErrorCode::VisitGated,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::UnknownAssignee { .. } => ErrorCode::UnknownAssignee,
            Self::MissingIdentity => ErrorCode::MissingIdentity,
        }
    }

    /// Remediation text, falling back to the generic code message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}
