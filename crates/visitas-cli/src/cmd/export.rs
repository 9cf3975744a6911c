use anyhow::{Context as _, Result};
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use visitas_core::model::address::Address;

use crate::cmd::{Context, fail_with};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output JSON path (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Write the viewer's collection as the same JSON array the store keeps.
///
/// Always JSON, whatever the output mode.
pub fn run_export(args: &ExportArgs, ctx: &Context<'_>) -> Result<()> {
    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;
    let addresses = tracker
        .load()
        .map_err(|err| fail_with(ctx.output, &err.into()))?;

    let mut out: Box<dyn Write> = match args.output.as_ref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    write_collection(&mut out, &addresses)?;
    out.flush()?;

    if let Some(path) = &args.output {
        info!(count = addresses.len(), path = %path.display(), "exported addresses");
        ctx.notice(&format!("exported {} addresses to {}", addresses.len(), path.display()));
    }
    Ok(())
}

fn write_collection(out: &mut dyn Write, addresses: &[Address]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, addresses).context("failed to serialize addresses")?;
    writeln!(out)?;
    Ok(())
}
