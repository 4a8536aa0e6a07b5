use chrono::NaiveDate;
use clap::Args;
use color_eyre::{eyre::eyre, Result};

use crate::cospend::types::{NewBill, Project};

use super::{connect, Context};

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  cospend add \"Groceries\" 25.50 -p myproject
  cospend add \"Dinner\" 45.00 -p myproject -c restaurant -b alice -f bob -f charlie")]
pub struct AddArgs {
  /// Expense name
  pub name: String,

  /// Amount in the project currency (or the --convert currency)
  #[arg(value_parser = parse_amount, allow_negative_numbers = true)]
  pub amount: f64,

  /// Category by ID or name
  #[arg(short, long)]
  pub category: Option<String>,

  /// Paying member (defaults to the configured user)
  #[arg(short = 'b', long = "by")]
  pub paid_by: Option<String>,

  /// Owed member (repeatable; defaults to the payer only)
  #[arg(short = 'f', long = "for")]
  pub paid_for: Vec<String>,

  /// Currency the amount is given in
  #[arg(short = 'C', long)]
  pub convert: Option<String>,

  /// Payment method by ID or name
  #[arg(short = 'm', long = "method")]
  pub payment_method: Option<String>,

  /// Additional details about the bill
  #[arg(short = 'o', long)]
  pub comment: Option<String>,
}

fn parse_amount(s: &str) -> Result<f64, String> {
  s.trim()
    .parse::<f64>()
    .ok()
    .filter(|amount| amount.is_finite())
    .ok_or_else(|| format!("invalid amount: {}", s))
}

pub async fn run(args: AddArgs, ctx: &Context) -> Result<()> {
  let project_id = ctx.project()?;
  let (config, client) = connect()?;

  let project = client.get_project(project_id).await?;
  let today = chrono::Local::now().date_naive();
  let bill = build_bill(&project, &args, &config.user, today)?;

  tracing::debug!(?bill, project_id, "Creating bill");
  client.create_bill(project_id, &bill).await?;

  println!(
    "Successfully added expense: {} ({:.2})",
    args.name, args.amount
  );
  Ok(())
}

/// Resolve every reference in `args` before anything is sent.
fn build_bill(project: &Project, args: &AddArgs, user: &str, today: NaiveDate) -> Result<NewBill> {
  let payer = args.paid_by.as_deref().unwrap_or(user);
  let payer_id = project
    .resolve_member(payer)
    .map_err(|e| eyre!("resolving payer: {}", e))?;

  let owed_to = if args.paid_for.is_empty() {
    vec![payer_id]
  } else {
    args
      .paid_for
      .iter()
      .map(|token| project.resolve_member(token))
      .collect::<Result<Vec<_>, _>>()
      .map_err(|e| eyre!("resolving owed member: {}", e))?
  };

  let category_id = args
    .category
    .as_deref()
    .map(|token| project.resolve_category(token))
    .transpose()
    .map_err(|e| eyre!("resolving category: {}", e))?;

  let payment_mode_id = args
    .payment_method
    .as_deref()
    .map(|token| project.resolve_payment_mode(token))
    .transpose()
    .map_err(|e| eyre!("resolving payment method: {}", e))?;

  let original_currency_id = args
    .convert
    .as_deref()
    .map(|token| project.resolve_currency(token))
    .transpose()
    .map_err(|e| eyre!("resolving currency: {}", e))?;

  Ok(NewBill {
    what: args.name.clone(),
    amount: args.amount,
    payer_id,
    owed_to,
    date: today.format("%Y-%m-%d").to_string(),
    comment: args.comment.clone().filter(|c| !c.is_empty()),
    payment_mode_id,
    category_id,
    original_currency_id,
  })
}
