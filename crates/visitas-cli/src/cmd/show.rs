//! `vt show` — one address, plus whether it can be marked visited now.

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use visitas_core::derive::all_complete;
use visitas_core::error::{StoreError, VisitasError};
use visitas_core::model::address::{Address, AddressId};
use visitas_core::workflow::can_mark_done;

use crate::cmd::{Context, fail_with, or_dash};
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Address ID.
    pub id: AddressId,
}

#[derive(Debug, Serialize)]
pub struct ShowReport {
    #[serde(flatten)]
    pub address: Address,
    pub mark_done_enabled: bool,
}

/// Find `id` in the viewer's collection and evaluate the gate over it.
pub fn show_report(collection: Vec<Address>, id: AddressId) -> Result<ShowReport, VisitasError> {
    let complete = all_complete(&collection);
    let address = collection
        .into_iter()
        .find(|addr| addr.id == id)
        .ok_or(StoreError::NotFound { id })?;
    Ok(ShowReport {
        mark_done_enabled: can_mark_done(&address, complete),
        address,
    })
}

pub fn run_show(args: &ShowArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;

    let report = tracker
        .load()
        .map_err(VisitasError::from)
        .and_then(|collection| show_report(collection, args.id))
        .map_err(|err| fail_with(ctx.output, &err))?;

    render_mode(
        ctx.output,
        &report,
        |report, w| {
            let addr = &report.address;
            writeln!(
                w,
                "{}  {}  {}  {}  visits={}  mark_done={}",
                addr.id,
                addr.status,
                addr.territory,
                addr.address,
                addr.visit_count,
                report.mark_done_enabled
            )
        },
        render_pretty,
    )
}

fn render_pretty(report: &ShowReport, w: &mut dyn Write) -> io::Result<()> {
    let addr = &report.address;
    pretty_section(w, &format!("Address {}", addr.id))?;
    pretty_kv(w, "Address", &addr.address)?;
    pretty_kv(w, "Territory", &addr.territory)?;
    pretty_kv(w, "Status", format!("{} ({})", addr.status, addr.status.label()))?;
    pretty_kv(w, "Contact", or_dash(addr.contact_name.as_deref()))?;
    pretty_kv(w, "Phone", or_dash(addr.phone.as_deref()))?;
    pretty_kv(w, "Best time", or_dash(addr.best_time.as_deref()))?;
    pretty_kv(w, "Observations", or_dash(addr.observations.as_deref()))?;
    pretty_kv(
        w,
        "Last visit",
        addr.last_visit_date
            .map_or_else(|| "-".to_string(), |date| date.to_string()),
    )?;
    pretty_kv(w, "Visits", addr.visit_count.to_string())?;
    pretty_kv(w, "Assigned to", &addr.assigned_to_email)?;
    pretty_kv(
        w,
        "Mark done",
        if report.mark_done_enabled {
            "enabled"
        } else {
            "disabled until every address is visited"
        },
    )
}
