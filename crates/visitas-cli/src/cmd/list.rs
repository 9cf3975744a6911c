//! `vt list` — filtered, territory-grouped address view.

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use visitas_core::derive::{Filters, StatusFilter, TerritoryFilter, all_complete, apply_filters, group_by_territory};
use visitas_core::error::{StoreError, VisitasError};
use visitas_core::model::address::{Address, AddressId};

use crate::cmd::{Context, fail_with, or_dash};
use crate::output::{pretty_rule, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by status: all, falta_pregar, pregado.
    #[arg(short, long, default_value = "all")]
    pub status: String,

    /// Filter by territory name, or `all`.
    #[arg(short, long, default_value = "all")]
    pub territory: String,

    /// Case-insensitive match on address or contact name.
    #[arg(long, default_value = "")]
    pub search: String,

    /// One line per address instead of territory sections.
    #[arg(long)]
    pub flat: bool,
}

impl ListArgs {
    fn filters(&self) -> Result<Filters, VisitasError> {
        let status = self
            .status
            .parse::<StatusFilter>()
            .map_err(StoreError::from)?;
        Ok(Filters {
            status,
            territory: TerritoryFilter::from(self.territory.as_str()),
            search: self.search.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GroupReport {
    territory: String,
    count: usize,
    done: usize,
    ids: Vec<AddressId>,
}

#[derive(Debug, Serialize)]
struct ListReport<'a> {
    /// Size of the viewer's whole collection.
    total: usize,
    /// Size of the filtered view.
    count: usize,
    all_complete: bool,
    addresses: Vec<&'a Address>,
    groups: Vec<GroupReport>,
}

fn build_report<'a>(collection: &'a [Address], filters: &Filters) -> ListReport<'a> {
    let visible = apply_filters(collection, filters);
    let groups = group_by_territory(visible.iter().copied())
        .into_iter()
        .map(|(territory, members)| GroupReport {
            territory: territory.to_string(),
            count: members.len(),
            done: members.iter().filter(|addr| addr.status.is_done()).count(),
            ids: members.iter().map(|addr| addr.id).collect(),
        })
        .collect();

    ListReport {
        total: collection.len(),
        count: visible.len(),
        // Completion is always judged on the unfiltered collection.
        all_complete: all_complete(collection),
        addresses: visible,
        groups,
    }
}

pub fn run_list(args: &ListArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let filters = args.filters().map_err(|err| fail_with(ctx.output, &err))?;
    let project = ctx.project()?;
    let collection = project.load_view(ctx)?;
    let report = build_report(&collection, &filters);
    let flat = args.flat;

    render_mode(
        ctx.output,
        &report,
        |report, w| {
            for addr in &report.addresses {
                write_row(w, addr)?;
            }
            Ok(())
        },
        |report, w| render_pretty(report, flat, w),
    )
}

fn write_row(w: &mut dyn Write, addr: &Address) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}  {}  {}",
        addr.id, addr.status, addr.territory, addr.address, addr.assigned_to_email
    )
}

fn render_pretty(report: &ListReport<'_>, flat: bool, w: &mut dyn Write) -> io::Result<()> {
    if report.addresses.is_empty() {
        writeln!(w, "No addresses match ({} in total).", report.total)?;
        return Ok(());
    }

    if flat {
        for addr in &report.addresses {
            write_row(w, addr)?;
        }
    } else {
        for group in &report.groups {
            pretty_section(
                w,
                &format!("{}  ({}/{} visited)", group.territory, group.done, group.count),
            )?;
            for addr in report
                .addresses
                .iter()
                .filter(|addr| addr.territory == group.territory)
            {
                let mark = if addr.status.is_done() { "✓" } else { " " };
                writeln!(
                    w,
                    "[{mark}] {}  {}  ({})",
                    addr.id,
                    addr.address,
                    or_dash(addr.contact_name.as_deref())
                )?;
            }
            writeln!(w)?;
        }
    }

    pretty_rule(w)?;
    writeln!(w, "{} of {} shown", report.count, report.total)?;
    if report.all_complete {
        writeln!(w, "Every address is visited: a new round can start.")?;
    }
    Ok(())
}
