//! `vt territories` — distinct territories with their progress.

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use visitas_core::derive::{TerritoryProgress, territory_progress};

use crate::cmd::Context;
use crate::output::{Renderable, render_list};

#[derive(Args, Debug, Default)]
pub struct TerritoriesArgs {}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct TerritoryRow(TerritoryProgress);

impl Renderable for TerritoryRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let p = &self.0;
        let mark = if p.complete { "✓" } else { " " };
        writeln!(w, "[{mark}] {}  {}/{} visited", p.territory, p.done, p.total)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let p = &self.0;
        writeln!(w, "{}  {}  {}  {}", p.territory, p.total, p.done, p.complete)
    }

    fn table_headers() -> &'static [&'static str] {
        &["TERRITORY", "TOTAL", "DONE", "COMPLETE"]
    }
}

pub fn run_territories(_args: &TerritoriesArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let collection = project.load_view(ctx)?;
    let rows: Vec<TerritoryRow> = territory_progress(&collection)
        .into_iter()
        .filter(|p| !p.territory.is_empty())
        .map(TerritoryRow)
        .collect();

    render_list(&rows, ctx.output)
}
