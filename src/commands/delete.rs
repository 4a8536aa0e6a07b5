use clap::Args;
use color_eyre::Result;

use super::{connect, Context};

#[derive(Args, Debug)]
#[command(after_help = "Example:\n  cospend delete 123 -p myproject")]
pub struct DeleteArgs {
  /// ID of the bill to delete
  #[arg(value_parser = parse_bill_id)]
  pub bill_id: i64,
}

fn parse_bill_id(s: &str) -> Result<i64, String> {
  s.trim()
    .parse()
    .map_err(|_| format!("invalid bill ID: {}", s))
}

pub async fn run(args: DeleteArgs, ctx: &Context) -> Result<()> {
  let project_id = ctx.project()?;
  let (_, client) = connect()?;

  client.delete_bill(project_id, args.bill_id).await?;

  println!("Successfully deleted bill #{}", args.bill_id);
  Ok(())
}
