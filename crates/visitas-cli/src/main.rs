#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use visitas_core::config::{UserConfig, load_user_config};
use visitas_core::error::ErrorCode;

#[derive(Parser, Debug)]
#[command(
    name = "vt",
    author,
    version,
    about = "visitas: territory address-visitation tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (same as `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (skips env and config resolution).
    #[arg(long, global = true, value_name = "EMAIL")]
    user: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, user_config: &UserConfig) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, user_config.output.as_deref())
    }

    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a visitas project",
        long_about = "Create .visitas/ with a config template and an empty address store.",
        after_help = "EXAMPLES:\n    # Initialize with yourself as admin\n    vt init --admin ana@example.com --name Ana"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Addresses",
        about = "Add an address",
        after_help = "EXAMPLES:\n    vt add --address \"Rua das Flores, 12\" --territory T1\n\n    # Assign to another user (admins)\n    vt add --address \"Rua B, 3\" --territory T2 --assign-to rui@example.com"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Addresses",
        about = "List addresses grouped by territory",
        after_help = "EXAMPLES:\n    # Pending addresses in one territory\n    vt list --status falta_pregar --territory T1\n\n    # Search address or contact name\n    vt list --search flores --flat"
    )]
    List(cmd::list::ListArgs),

    #[command(next_help_heading = "Addresses", about = "Show one address")]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Visits",
        about = "Mark an address as visited",
        long_about = "Mark an address as visited. A visited address can be marked again only \
                      once every address in your collection is visited, which starts a new round."
    )]
    Done(cmd::done::DoneArgs),

    #[command(next_help_heading = "Addresses", about = "Edit an address")]
    Edit(cmd::edit::EditArgs),

    #[command(next_help_heading = "Reports", about = "Visit totals and per-territory progress")]
    Stats(cmd::stats::StatsArgs),

    #[command(next_help_heading = "Reports", about = "List territories with progress")]
    Territories(cmd::territories::TerritoriesArgs),

    #[command(next_help_heading = "Project", about = "List assignable users (admins)")]
    Users(cmd::users::UsersArgs),

    #[command(
        next_help_heading = "Interoperability",
        about = "Export addresses as JSON",
        after_help = "EXAMPLES:\n    vt export --output backup.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Interoperability",
        about = "Import addresses from a JSON array (admins)",
        after_help = "EXAMPLES:\n    # Import the browser app's saved addresses\n    vt import --input addresses.json"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Project",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    vt completions bash > /etc/bash_completion.d/vt"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VISITAS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "visitas=debug,vt=debug,info"
        } else {
            "visitas=info,vt=info,warn"
        })
    });

    let format = env::var("VISITAS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, ctx: &cmd::Context<'_>) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, ctx),
        Commands::Add(args) => cmd::add::run_add(args, ctx),
        Commands::List(args) => cmd::list::run_list(args, ctx),
        Commands::Show(args) => cmd::show::run_show(args, ctx),
        Commands::Done(args) => cmd::done::run_done(args, ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, ctx),
        Commands::Stats(args) => cmd::stats::run_stats(args, ctx),
        Commands::Territories(args) => cmd::territories::run_territories(args, ctx),
        Commands::Users(args) => cmd::users::run_users(args, ctx),
        Commands::Export(args) => cmd::export::run_export(args, ctx),
        Commands::Import(args) => cmd::import::run_import(args, ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_config = load_user_config().unwrap_or_else(|err| {
        warn!(error = %format!("{err:#}"), "ignoring unreadable user config");
        UserConfig::default()
    });
    let output = cli.output_mode(&user_config);
    debug!(?output, command = ?cli.command, "starting");

    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            let _ = render_error(
                output,
                &CliError::from_code(ErrorCode::InternalUnexpected, format!("cannot read cwd: {err}")),
            );
            return ExitCode::FAILURE;
        }
    };

    let ctx = cmd::Context {
        output,
        user_flag: cli.user_flag(),
        user_config: &user_config,
        cwd: &cwd,
        quiet: cli.quiet,
    };

    match run(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<cmd::Reported>().is_none() {
                let _ = render_error(
                    output,
                    &CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}")),
                );
            }
            ExitCode::FAILURE
        }
    }
}
