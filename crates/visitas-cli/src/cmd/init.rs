//! `vt init` — create a `.visitas/` project in the current directory.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;
use visitas_core::config::{IdentityConfig, PROJECT_DIR};
use visitas_core::error::ErrorCode;
use visitas_core::model::user::{Role, User};
use visitas_core::store::JsonFileStore;

use crate::cmd::{Context, fail};
use crate::output::{CliError, pretty_kv, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite config.toml even if `.visitas/` already exists. Stored
    /// addresses are kept.
    #[arg(long)]
    pub force: bool,

    /// Register this email as the project admin and default identity.
    #[arg(long, value_name = "EMAIL")]
    pub admin: Option<String>,

    /// Display name for `--admin`.
    #[arg(long, value_name = "NAME", requires = "admin")]
    pub name: Option<String>,
}

const CONFIG_HEADER: &str = "# visitas project config\n\
    \n\
    [store]\n\
    lock_timeout_ms = 2000\n\
    \n\
    [visits]\n\
    # Count one visit when an address is created already visited.\n\
    stamp_on_create = true\n";

const USERS_HINT: &str = "\n\
    # Users addresses can be assigned to.\n\
    # [[users]]\n\
    # email = \"someone@example.com\"\n\
    # display_name = \"Someone\"\n\
    # role = \"member\"\n";

/// The admin seed appended below the header.
#[derive(Serialize)]
struct AdminSeed {
    identity: IdentityConfig,
    users: Vec<User>,
}

fn config_template(admin: Option<&str>, name: Option<&str>) -> Result<String> {
    let mut out = String::from(CONFIG_HEADER);
    if let Some(email) = admin {
        let seed = AdminSeed {
            identity: IdentityConfig {
                email: Some(email.to_string()),
            },
            users: vec![User {
                email: email.to_string(),
                display_name: name.unwrap_or(email).to_string(),
                role: Role::Admin,
            }],
        };
        out.push('\n');
        out.push_str(&toml::to_string(&seed).context("Failed to encode the admin seed")?);
    }
    out.push_str(USERS_HINT);
    Ok(out)
}

#[derive(Debug, Serialize)]
struct InitReport {
    ok: bool,
    project_dir: String,
    admin: Option<String>,
}

/// Execute `vt init`. Creates the project skeleton:
///
/// ```text
/// .visitas/
///   config.toml
///   store/addresses.json   (empty collection)
/// ```
///
/// # Errors
///
/// Returns an error if `.visitas/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, ctx: &Context<'_>) -> Result<()> {
    let project_dir = ctx.cwd.join(PROJECT_DIR);

    if project_dir.exists() && !args.force {
        return Err(fail(
            ctx.output,
            &CliError::from_code(
                ErrorCode::AlreadyInitialized,
                format!("{PROJECT_DIR}/ already exists in {}", ctx.cwd.display()),
            ),
        ));
    }

    std::fs::create_dir_all(&project_dir)
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;
    write_config(&project_dir, args)?;

    JsonFileStore::new(&project_dir)
        .ensure_initialized()
        .context("Failed to initialize the address store")?;
    info!(path = %project_dir.display(), "initialized project");

    let report = InitReport {
        ok: true,
        project_dir: project_dir.display().to_string(),
        admin: args.admin.clone(),
    };
    let quiet = ctx.quiet;
    render(ctx.output, &report, |report, w| {
        writeln!(w, "✓ Initialized {PROJECT_DIR}/ project structure.")?;
        if quiet {
            return Ok(());
        }
        writeln!(w)?;
        pretty_kv(w, "Config", format!("{PROJECT_DIR}/config.toml"))?;
        if let Some(admin) = &report.admin {
            pretty_kv(w, "Admin", admin)?;
        }
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  export VISITAS_USER=you@example.com")?;
        writeln!(w, "  vt add --address \"Rua das Flores, 12\" --territory T1")
    })
}

fn write_config(project_dir: &Path, args: &InitArgs) -> Result<()> {
    let config_path = project_dir.join("config.toml");
    let content = config_template(args.admin.as_deref(), args.name.as_deref())?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitas_core::config::load_project_config;
    use visitas_core::model::user::Role;

    #[test]
    fn template_without_admin_parses_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = InitArgs {
            force: false,
            admin: None,
            name: None,
        };
        write_config(dir.path(), &args).expect("write");

        let cfg = load_project_config(dir.path()).expect("template must parse");
        assert!(cfg.identity.email.is_none());
        assert!(cfg.users.is_empty());
        assert!(cfg.visits.stamp_on_create);
    }

    #[test]
    fn admin_is_written_as_identity_and_user() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = InitArgs {
            force: false,
            admin: Some("ana@example.com".into()),
            name: Some("Ana \"A\" Lima".into()),
        };
        write_config(dir.path(), &args).expect("write");

        let cfg = load_project_config(dir.path()).expect("parse");
        assert_eq!(cfg.identity.email.as_deref(), Some("ana@example.com"));
        assert_eq!(cfg.users.len(), 1);
        assert_eq!(cfg.users[0].role, Role::Admin);
        assert_eq!(cfg.users[0].display_name, "Ana \"A\" Lima");
    }

    #[test]
    fn admin_name_with_control_and_combining_chars_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let name = "Ana\u{0303} \u{7}Lima\ttab\\slash";
        let args = InitArgs {
            force: false,
            admin: Some("ana@example.com".into()),
            name: Some(name.into()),
        };
        write_config(dir.path(), &args).expect("write");

        let cfg = load_project_config(dir.path()).expect("seeded config must parse");
        assert_eq!(cfg.users[0].display_name, name);
        assert!(cfg.store.lock_timeout_ms > 0);
    }

    #[test]
    fn init_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: InitArgs,
        }
        let w = Wrapper::parse_from(["test", "--admin", "ana@example.com", "--force"]);
        assert!(w.args.force);
        assert_eq!(w.args.admin.as_deref(), Some("ana@example.com"));
        assert!(Wrapper::try_parse_from(["test", "--name", "Ana"]).is_err());
    }
}
