//! `vt import` — append records from a JSON array (admins only).
//!
//! Accepts the browser app's `addresses` localStorage value as-is: empty
//! strings in optional fields read as absent.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use visitas_core::error::ErrorCode;
use visitas_core::model::address::Address;

use crate::cmd::{Context, fail, fail_with};
use crate::output::{CliError, render};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding an array of address records.
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    imported: usize,
}

fn read_records(path: &Path) -> Result<Vec<Address>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of addresses", path.display()))
}

pub fn run_import(args: &ImportArgs, ctx: &Context<'_>) -> Result<()> {
    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;

    let records = read_records(&args.input).map_err(|err| {
        fail(
            ctx.output,
            &CliError::from_code(ErrorCode::ValidationFailed, format!("{err:#}")),
        )
    })?;

    let imported = tracker
        .import(records)
        .map_err(|err| fail_with(ctx.output, &err))?;

    render(ctx.output, &ImportReport { imported }, |report, w| {
        writeln!(w, "✓ Imported {} addresses", report.imported)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_browser_dump_with_blank_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dump.json");
        std::fs::write(
            &path,
            r#"[{"id":1718000000000,"address":"Rua A","territory":"T1","status":"pregado",
                 "contact_name":"","phone":"","observations":"","best_time":"",
                 "last_visit_date":"","visit_count":1,"assigned_to_email":"ana@example.com"}]"#,
        )
        .expect("write");

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].phone.is_none());
        assert!(records[0].last_visit_date.is_none());
    }

    #[test]
    fn non_array_input_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dump.json");
        std::fs::write(&path, r#"{"addresses": []}"#).expect("write");
        assert!(read_records(&path).is_err());
    }
}
