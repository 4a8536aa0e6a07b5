//! Subcommands of the `cospend` binary.

mod add;
mod delete;
mod info;
mod init;
mod list;
mod projects;

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};

use crate::config::Config;
use crate::cospend::cached_client::CachedCospendClient;

pub use add::AddArgs;
pub use delete::DeleteArgs;
pub use info::InfoArgs;
pub use init::InitArgs;
pub use list::ListArgs;
pub use projects::ProjectsArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Add an expense to a Cospend project
  Add(AddArgs),
  /// List expenses in a Cospend project
  #[command(visible_alias = "ls")]
  List(ListArgs),
  /// Delete an expense from a Cospend project
  #[command(visible_alias = "rm")]
  Delete(DeleteArgs),
  /// List Cospend projects
  #[command(visible_alias = "proj")]
  Projects(ProjectsArgs),
  /// Show account and project information
  Info(InfoArgs),
  /// Create a configuration file interactively
  Init(InitArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct Context {
  pub project: Option<String>,
}

impl Context {
  /// The `--project` value, required by project-scoped commands.
  pub fn project(&self) -> Result<&str> {
    self
      .project
      .as_deref()
      .filter(|p| !p.is_empty())
      .ok_or_else(|| eyre!("project is required (use -p or --project)"))
  }
}

impl Command {
  pub async fn run(self, ctx: &Context) -> Result<()> {
    match self {
      Self::Add(args) => add::run(args, ctx).await,
      Self::List(args) => list::run(args, ctx).await,
      Self::Delete(args) => delete::run(args, ctx).await,
      Self::Projects(args) => projects::run(args).await,
      Self::Info(args) => info::run(args, ctx).await,
      Self::Init(args) => init::run(args).await,
    }
  }
}

/// Load the configuration and build a cached client.
fn connect() -> Result<(Config, CachedCospendClient)> {
  let config = Config::load()?;
  let client = CachedCospendClient::new(&config)?;
  Ok((config, client))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_project_required() {
    let err = Context::default().project().unwrap_err();
    assert_eq!(err.to_string(), "project is required (use -p or --project)");

    let ctx = Context {
      project: Some(String::new()),
    };
    assert!(ctx.project().is_err());

    let ctx = Context {
      project: Some("trip".into()),
    };
    assert_eq!(ctx.project().unwrap(), "trip");
  }
}
