//! `vt done` — mark an address visited.

use clap::Args;
use std::io::Write;
use visitas_core::model::address::AddressId;

use crate::cmd::{Context, fail_with, today};
use crate::output::render_mode;

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Address ID to mark as visited.
    pub id: AddressId,
}

pub fn run_done(args: &DoneArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;

    let updated = tracker
        .mark_done(args.id, today())
        .map_err(|err| fail_with(ctx.output, &err))?;

    render_mode(
        ctx.output,
        &updated,
        |addr, w| writeln!(w, "{}  {}  visits={}", addr.id, addr.status, addr.visit_count),
        |addr, w| {
            writeln!(
                w,
                "✓ Marked {} ({}) as visited. Visit #{} on {}.",
                addr.id,
                addr.address,
                addr.visit_count,
                addr.last_visit_date
                    .map_or_else(|| "-".to_string(), |date| date.to_string())
            )
        },
    )
}
