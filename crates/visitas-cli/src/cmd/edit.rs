//! `vt edit` — rewrite fields of an existing address.

use clap::Args;
use std::io::Write;
use visitas_core::error::{StoreError, ValidationError, VisitasError};
use visitas_core::model::address::{AddressId, AddressPatch, Status};

use crate::cmd::{Context, fail_with};
use crate::output::{pretty_kv, render_mode};

/// Fields left out keep their current value. An empty string clears an
/// optional field. Changing `--status` back to `falta_pregar` keeps the visit
/// history.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Address ID to edit.
    pub id: AddressId,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub territory: Option<String>,

    /// falta_pregar or pregado.
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub contact_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub observations: Option<String>,

    #[arg(long)]
    pub best_time: Option<String>,

    /// Reassign to another user (admins only).
    #[arg(long, value_name = "EMAIL")]
    pub assign_to: Option<String>,
}

impl EditArgs {
    fn to_patch(&self) -> Result<AddressPatch, ValidationError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<Status>)
            .transpose()?;
        let patch = AddressPatch {
            address: self.address.clone(),
            territory: self.territory.clone(),
            status,
            contact_name: self.contact_name.clone(),
            phone: self.phone.clone(),
            observations: self.observations.clone(),
            best_time: self.best_time.clone(),
            assigned_to_email: self.assign_to.clone(),
        };
        if patch.is_empty() {
            return Err(ValidationError::new("edit", "no fields given to change"));
        }
        Ok(patch)
    }
}

pub fn run_edit(args: &EditArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let patch = args
        .to_patch()
        .map_err(|err| fail_with(ctx.output, &VisitasError::from(StoreError::from(err))))?;

    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;
    let updated = tracker
        .edit(args.id, patch)
        .map_err(|err| fail_with(ctx.output, &err))?;

    render_mode(
        ctx.output,
        &updated,
        |addr, w| writeln!(w, "{}  {}  {}  {}", addr.id, addr.status, addr.territory, addr.address),
        |addr, w| {
            writeln!(w, "✓ Updated address {}", addr.id)?;
            pretty_kv(w, "Address", &addr.address)?;
            pretty_kv(w, "Territory", &addr.territory)?;
            pretty_kv(w, "Status", addr.status.as_str())?;
            pretty_kv(w, "Visits", addr.visit_count.to_string())
        },
    )
}
