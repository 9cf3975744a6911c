//! `vt users` — the assignable user directory (admins only).

use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use visitas_core::model::user::User;

use crate::cmd::{Context, fail_with};
use crate::output::{Renderable, render_list};

#[derive(Args, Debug, Default)]
pub struct UsersArgs {}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct UserRow(User);

impl Renderable for UserRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{} <{}>  {}", self.0.name(), self.0.email, self.0.role)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  {}  {}", self.0.email, self.0.role, self.0.name())
    }

    fn table_headers() -> &'static [&'static str] {
        &["EMAIL", "ROLE", "NAME"]
    }
}

pub fn run_users(_args: &UsersArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let project = ctx.project()?;
    let store = project.store();
    let tracker = project.tracker(ctx, &store)?;
    let users = tracker
        .directory_users()
        .map_err(|err| fail_with(ctx.output, &err))?;

    let rows: Vec<UserRow> = users.into_iter().map(UserRow).collect();
    render_list(&rows, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_row_leads_with_email() {
        let row = UserRow(User::member("rui@example.com"));
        let mut buf = Vec::new();
        row.render_table(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "rui@example.com  member  rui@example.com\n"
        );
    }
}
