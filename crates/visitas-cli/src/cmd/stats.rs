//! `vt stats` — dashboard totals for the viewer's collection.

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use visitas_core::derive::{Stats, TerritoryProgress, compute_stats, territory_progress};
use visitas_core::model::address::Address;

use crate::cmd::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `vt stats`.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: Stats,
    pub territories: Vec<TerritoryProgress>,
}

impl StatsReport {
    #[must_use]
    pub fn from_collection(collection: &[Address]) -> Self {
        Self {
            stats: compute_stats(collection),
            territories: territory_progress(collection),
        }
    }
}

/// Execute `vt stats`.
pub fn run_stats(_args: &StatsArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let collection = project.load_view(ctx)?;
    let report = StatsReport::from_collection(&collection);

    render_mode(ctx.output, &report, render_text, render_pretty)
}

fn render_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    writeln!(
        w,
        "total={} done={} pending={} territories={} all_complete={}",
        s.total, s.done_count, s.pending_count, s.territory_count, s.all_complete
    )
}

fn render_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let s = &report.stats;
    pretty_section(w, "Visits")?;
    pretty_kv(w, "Total", s.total.to_string())?;
    pretty_kv(w, "Visited", s.done_count.to_string())?;
    pretty_kv(w, "Pending", s.pending_count.to_string())?;
    pretty_kv(w, "Territories", s.territory_count.to_string())?;
    pretty_kv(w, "All complete", if s.all_complete { "yes" } else { "no" })?;

    if !report.territories.is_empty() {
        writeln!(w)?;
        pretty_section(w, "By territory")?;
        for progress in &report.territories {
            writeln!(
                w,
                "{:<20} {:>4}/{:<4} {}",
                progress.territory,
                progress.done,
                progress.total,
                if progress.complete { "✓" } else { "" }
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitas_core::model::address::{AddressId, NewAddress, Status};

    #[test]
    fn empty_collection_reports_zeroes_and_incomplete() {
        let report = StatsReport::from_collection(&[]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["total"], 0);
        assert_eq!(value["all_complete"], false);
        assert_eq!(value["territories"], serde_json::json!([]));
    }

    #[test]
    fn text_line_summarizes_counts() {
        let mut draft = NewAddress::new("Rua A", "T1");
        draft.status = Status::Pregado;
        let collection = vec![
            Address::from_draft(AddressId(1), draft),
            Address::from_draft(AddressId(2), NewAddress::new("Rua B", "T2")),
        ];
        let mut buf = Vec::new();
        render_text(&StatsReport::from_collection(&collection), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "total=2 done=1 pending=1 territories=2 all_complete=false\n"
        );
    }
}
