use clap::Args;
use color_eyre::Result;

use crate::cospend::types::UserInfo;
use crate::filter::ListFilters;
use crate::output::{self, AmountFormatter, OutputFormat, DEFAULT_LOCALE};

use super::{connect, Context};

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  cospend list -p myproject
  cospend list -p myproject -b alice
  cospend list -p myproject --amount \">50\" -n dinner
  cospend list -p myproject --date \">=2026-01-01\"
  cospend list -p myproject --this-week
  cospend list -p myproject --recent 2w")]
pub struct ListArgs {
  /// Filter by paying member
  #[arg(short = 'b', long = "by")]
  pub paid_by: Option<String>,

  /// Filter by owed member (repeatable; all must be owers)
  #[arg(short = 'f', long = "for")]
  pub paid_for: Vec<String>,

  /// Filter by amount (e.g. 50, >30, <=100, =25)
  #[arg(short, long, allow_hyphen_values = true)]
  pub amount: Option<String>,

  /// Filter by name (case-insensitive, contains)
  #[arg(short, long)]
  pub name: Option<String>,

  /// Filter by payment method
  #[arg(short = 'm', long = "method")]
  pub payment_method: Option<String>,

  /// Filter by category
  #[arg(short, long)]
  pub category: Option<String>,

  /// Filter by date (e.g. 2026-01-15, >=2026-01-01, <=01-15)
  #[arg(long)]
  pub date: Option<String>,

  /// Only bills dated today
  #[arg(long)]
  pub today: bool,

  /// Only bills from the current month
  #[arg(long)]
  pub this_month: bool,

  /// Only bills from the current calendar week (Monday to Sunday)
  #[arg(long)]
  pub this_week: bool,

  /// Only recent bills (e.g. 7d, 2w, 1m)
  #[arg(long)]
  pub recent: Option<String>,

  /// Maximum number of bills to show (0 = no limit)
  #[arg(short, long, default_value_t = 0)]
  pub limit: usize,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
  pub format: OutputFormat,
}

impl ListArgs {
  /// An empty flag value counts as not given.
  fn filters(&self) -> ListFilters {
    let given = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    ListFilters {
      paid_by: given(&self.paid_by),
      paid_for: self.paid_for.clone(),
      amount: given(&self.amount),
      name: given(&self.name),
      payment_method: given(&self.payment_method),
      category: given(&self.category),
      date: given(&self.date),
      today: self.today,
      this_month: self.this_month,
      this_week: self.this_week,
      recent: given(&self.recent),
    }
  }
}

pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
  let project_id = ctx.project()?;

  // Malformed expressions fail before any I/O
  let today = chrono::Local::now().date_naive();
  let plan = args.filters().parse(today)?;

  let (_, client) = connect()?;
  let project = client.get_project(project_id).await?;
  let mut bills = client.get_bills(project_id).await?;

  let user_info = match client.get_user_info().await {
    Ok(info) => Some(info),
    Err(e) => {
      tracing::warn!(error = %e, "Failed to fetch user info");
      None
    }
  };
  let locale = locale_for(user_info.as_ref());

  let filters = plan.build(&project)?;
  let total = bills.len();
  bills = filters.apply(bills);
  tracing::debug!(total, matched = bills.len(), filters = filters.len(), "Filtered bills");

  output::sort_and_limit(&mut bills, args.limit);
  let rows = output::resolve_rows(&project, &bills);

  let formatter = AmountFormatter::new(locale, &project.currency_name);
  tracing::debug!(locale, currency = %project.currency_name, symbol = formatter.has_symbol(), "Amount format");

  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  output::write_bills(&mut out, args.format, &rows, &formatter)
}

fn locale_for(info: Option<&UserInfo>) -> &str {
  info
    .and_then(UserInfo::effective_locale)
    .unwrap_or(DEFAULT_LOCALE)
}
