use clap::Args;
use color_eyre::Result;
use std::io::Write;

use crate::config::normalize_url;
use crate::cospend::types::{Project, UserInfo};
use crate::output::Table;

use super::{connect, Context};

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  cospend info
  cospend info -p myproject --cached")]
pub struct InfoArgs {
  /// Use cached data when available instead of refreshing
  #[arg(long)]
  pub cached: bool,
}

pub async fn run(args: InfoArgs, ctx: &Context) -> Result<()> {
  let (config, client) = connect()?;

  let user_info = if args.cached {
    client.get_user_info().await?
  } else {
    client.refresh_user_info().await?
  };

  let project = match ctx.project.as_deref().filter(|p| !p.is_empty()) {
    Some(project_id) if args.cached => Some(client.get_project(project_id).await?),
    Some(project_id) => Some(client.refresh_project(project_id).await?),
    None => None,
  };

  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  write_user(&mut out, &normalize_url(&config.domain), &config.user, &user_info)?;
  if let Some(project) = &project {
    write_project(&mut out, project)?;
  }
  Ok(())
}

fn or_dash(s: &str) -> &str {
  if s.is_empty() {
    "-"
  } else {
    s
  }
}

fn write_user(out: &mut impl Write, server: &str, user: &str, info: &UserInfo) -> Result<()> {
  writeln!(out, "Server:   {}", server)?;
  writeln!(out, "User:     {}", user)?;
  writeln!(out, "Locale:   {}", or_dash(&info.locale))?;
  writeln!(out, "Language: {}", or_dash(&info.language))?;
  Ok(())
}

fn write_project(out: &mut impl Write, project: &Project) -> Result<()> {
  writeln!(out)?;
  writeln!(out, "Project:  {} ({})", project.name, project.id)?;
  writeln!(out, "Currency: {}", or_dash(&project.currency_name))?;

  writeln!(out)?;
  writeln!(out, "Members:")?;
  let mut members = Table::new(["ID", "Name", "UserID"]);
  for member in &project.members {
    members.add_row([
      member.id.to_string(),
      member.name.clone(),
      or_dash(&member.user_id).to_string(),
    ]);
  }
  members.render(out)?;

  if !project.categories.is_empty() {
    writeln!(out)?;
    writeln!(out, "Categories:")?;
    let mut table = Table::new(["ID", "Icon", "Name"]);
    for category in &project.categories {
      table.add_row([
        category.id.to_string(),
        category.icon.clone(),
        category.name.clone(),
      ]);
    }
    table.render(out)?;
  }

  if !project.payment_modes.is_empty() {
    writeln!(out)?;
    writeln!(out, "Payment Modes:")?;
    let mut table = Table::new(["ID", "Icon", "Name"]);
    for mode in &project.payment_modes {
      table.add_row([mode.id.to_string(), mode.icon.clone(), mode.name.clone()]);
    }
    table.render(out)?;
  }

  if !project.currencies.is_empty() {
    writeln!(out)?;
    writeln!(out, "Currencies:")?;
    let mut table = Table::new(["ID", "Name", "Exchange Rate"]);
    for currency in &project.currencies {
      table.add_row([
        currency.id.to_string(),
        currency.name.clone(),
        currency.exchange_rate.to_string(),
      ]);
    }
    table.render(out)?;
  }

  Ok(())
}
