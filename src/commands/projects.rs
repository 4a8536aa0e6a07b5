use clap::Args;
use color_eyre::Result;
use std::io::Write;

use crate::cospend::types::ProjectSummary;
use crate::output::Table;

use super::connect;

#[derive(Args, Debug)]
pub struct ProjectsArgs {
  /// Include archived projects
  #[arg(short, long)]
  pub all: bool,
}

pub async fn run(args: ProjectsArgs) -> Result<()> {
  let (_, client) = connect()?;
  let projects = client.get_projects().await?;

  let stdout = std::io::stdout();
  write_projects(&mut stdout.lock(), &projects, args.all)
}

fn write_projects(out: &mut impl Write, projects: &[ProjectSummary], all: bool) -> Result<()> {
  let visible: Vec<&ProjectSummary> = projects
    .iter()
    .filter(|p| all || !p.is_archived())
    .collect();

  if visible.is_empty() {
    writeln!(out, "No projects found.")?;
    return Ok(());
  }

  let mut table = Table::new(["ID", "NAME", "CURRENCY"]);
  for project in &visible {
    let currency = if project.currency_name.is_empty() {
      "-"
    } else {
      project.currency_name.as_str()
    };
    table.add_row([project.id.as_str(), project.name.as_str(), currency]);
  }

  table.render(out)?;
  writeln!(out)?;
  writeln!(out, "Total: {} project(s)", visible.len())?;
  Ok(())
}
