//! Command handlers for `vt`, plus the project context they share.

pub mod add;
pub mod completions;
pub mod done;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod show;
pub mod stats;
pub mod territories;
pub mod users;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::warn;
use visitas_core::config::{self, ProjectConfig, UserConfig};
use visitas_core::directory::ConfigDirectory;
use visitas_core::error::{ErrorCode, VisitasError};
use visitas_core::model::address::Address;
use visitas_core::store::{AddressStore, JsonFileStore, MemoryStore};
use visitas_core::tracker::Tracker;

use crate::identity::{self, IdentitySources};
use crate::output::{CliError, OutputMode, render_error};

/// Marker for failures already rendered to stderr.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("command failed")
    }
}

impl std::error::Error for Reported {}

/// Render `error` and return an error `main` will not print again.
pub fn fail(output: OutputMode, error: &CliError) -> anyhow::Error {
    match render_error(output, error) {
        Ok(()) => Reported.into(),
        Err(render_err) => render_err,
    }
}

/// Render a tracker error.
pub fn fail_with(output: OutputMode, error: &VisitasError) -> anyhow::Error {
    fail(output, &CliError::from(error))
}

/// Invocation-wide settings resolved in `main`.
pub struct Context<'a> {
    pub output: OutputMode,
    pub user_flag: Option<&'a str>,
    pub user_config: &'a UserConfig,
    pub cwd: &'a Path,
    pub quiet: bool,
}

impl Context<'_> {
    /// Locate and load the enclosing `.visitas/` project.
    pub fn project(&self) -> anyhow::Result<Project> {
        let Some(dir) = config::find_project_dir(self.cwd) else {
            return Err(fail(
                self.output,
                &CliError::from_code(
                    ErrorCode::NotInitialized,
                    format!("no {} directory found from {}", config::PROJECT_DIR, self.cwd.display()),
                ),
            ));
        };

        let config = match config::load_project_config(&dir) {
            Ok(config) => config,
            Err(err) => {
                return Err(fail(
                    self.output,
                    &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
                ));
            }
        };

        Ok(Project { dir, config })
    }

    /// Print a stderr notice unless `--quiet` was given.
    pub fn notice(&self, message: &str) {
        if !self.quiet {
            eprintln!("note: {message}");
        }
    }
}

/// A discovered project: its `.visitas/` directory and parsed config.
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.dir).with_lock_timeout(self.config.store.lock_timeout())
    }

    pub fn directory(&self, ctx: &Context<'_>) -> ConfigDirectory {
        let email = identity::resolve_email(
            ctx.user_flag,
            IdentitySources {
                user_config: ctx.user_config.email.as_deref(),
                project_config: self.config.identity.email.as_deref(),
            },
        );
        ConfigDirectory::new(email, self.config.users.clone())
    }

    /// A tracker over `store` for the resolved current user.
    pub fn tracker<S: AddressStore>(
        &self,
        ctx: &Context<'_>,
        store: S,
    ) -> anyhow::Result<Tracker<S, ConfigDirectory>> {
        Tracker::new(store, self.directory(ctx))
            .map(|tracker| tracker.with_stamp_on_create(self.config.visits.stamp_on_create))
            .map_err(|err| fail_with(ctx.output, &err))
    }

    /// The viewer's collection for read-only views.
    ///
    /// An unreachable store is not fatal here: the view continues over an
    /// empty in-memory session.
    pub fn load_view(&self, ctx: &Context<'_>) -> anyhow::Result<Vec<Address>> {
        let store = self.store();
        let tracker = self.tracker(ctx, &store)?;
        match tracker.load() {
            Ok(addresses) => Ok(addresses),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "address store unavailable; using an empty session");
                ctx.notice(&format!("{err}; showing an empty session"));
                let session = MemoryStore::new();
                self.tracker(ctx, &session)?
                    .load()
                    .map_err(|err| fail_with(ctx.output, &err.into()))
            }
            Err(err) => Err(fail_with(ctx.output, &err.into())),
        }
    }
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `-` in place of a missing value, for human output.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
