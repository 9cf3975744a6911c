//! visitas-core library.
//!
//! Address store, derived views and the visit workflow behind the `vt` CLI.
//!
//! # Conventions
//!
//! - **Errors**: Typed errors (`StoreError`, `VisitasError`) at the library
//!   boundary; `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod authz;
pub mod config;
pub mod derive;
pub mod directory;
pub mod error;
pub mod lock;
pub mod model;
pub mod store;
pub mod tracker;
pub mod workflow;

pub use error::{ErrorCode, StoreError, VisitasError};
pub use tracker::Tracker;
