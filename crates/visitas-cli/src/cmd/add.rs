//! `vt add` — create an address.

use clap::Args;
use std::io::Write;
use visitas_core::error::{StoreError, ValidationError, VisitasError};
use visitas_core::model::address::{Address, NewAddress, Status};

use crate::cmd::{Context, fail_with, today};
use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Street address.
    #[arg(long)]
    pub address: String,

    /// Territory the address belongs to.
    #[arg(long)]
    pub territory: String,

    /// Initial status: falta_pregar (default) or pregado.
    #[arg(long, default_value = "falta_pregar")]
    pub status: String,

    #[arg(long)]
    pub contact_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub observations: Option<String>,

    /// Free-text best time to visit.
    #[arg(long)]
    pub best_time: Option<String>,

    /// Date of a visit made before the address was recorded (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub last_visit_date: Option<String>,

    /// Email of the user to assign to (admins only; defaults to you).
    #[arg(long, value_name = "EMAIL")]
    pub assign_to: Option<String>,
}

impl AddArgs {
    fn to_draft(&self) -> Result<NewAddress, ValidationError> {
        let last_visit_date = self
            .last_visit_date
            .as_deref()
            .map(|raw| {
                chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                    ValidationError::new("last_visit_date", format!("'{raw}' is not YYYY-MM-DD"))
                })
            })
            .transpose()?;

        Ok(NewAddress {
            address: self.address.clone(),
            territory: self.territory.clone(),
            status: self.status.parse::<Status>()?,
            contact_name: self.contact_name.clone(),
            phone: self.phone.clone(),
            observations: self.observations.clone(),
            best_time: self.best_time.clone(),
            last_visit_date,
            visit_count: 0,
            assigned_to_email: self.assign_to.clone(),
        })
    }
}

pub fn run_add(args: &AddArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let draft = args
        .to_draft()
        .map_err(|err| fail_with(ctx.output, &VisitasError::from(StoreError::from(err))))?;

    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;
    let created = tracker
        .create(draft, today())
        .map_err(|err| fail_with(ctx.output, &err))?;

    render_created(ctx.output, &created)
}

fn render_created(output: OutputMode, created: &Address) -> anyhow::Result<()> {
    render_mode(
        output,
        created,
        |addr, w| writeln!(w, "{}", addr.id),
        |addr, w| {
            writeln!(w, "✓ Added address {}", addr.id)?;
            pretty_kv(w, "Address", &addr.address)?;
            pretty_kv(w, "Territory", &addr.territory)?;
            pretty_kv(w, "Status", addr.status.as_str())?;
            pretty_kv(w, "Assigned to", &addr.assigned_to_email)
        },
    )
}
