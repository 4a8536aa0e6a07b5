mod cache;
mod commands;
mod config;
mod cospend;
mod currency;
mod filter;
mod logging;
mod output;
mod resolve;

use clap::Parser;
use color_eyre::Result;

use commands::{Command, Context};

#[derive(Parser, Debug)]
#[command(name = "cospend")]
#[command(about = "A command-line client for Nextcloud Cospend")]
#[command(version)]
struct Cli {
  /// Cospend project ID
  #[arg(short, long, global = true)]
  project: Option<String>,

  /// Enable debug logging to stderr
  #[arg(short, long, global = true)]
  debug: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse();
  let _guard = logging::init(cli.debug);

  let ctx = Context {
    project: cli.project,
  };
  cli.command.run(&ctx).await
}
