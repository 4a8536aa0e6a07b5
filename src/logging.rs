use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive when neither `--debug` nor an env override is given
const DEFAULT_DIRECTIVE: &str = "warn";
const DEBUG_DIRECTIVE: &str = "warn,cospend=debug";

/// Install the global subscriber writing to stderr.
///
/// `COSPEND_LOG`, then `RUST_LOG`, take precedence over `debug`. The returned
/// guard flushes buffered lines when dropped and must outlive `main`'s work.
pub fn init(debug: bool) -> WorkerGuard {
  let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

  let _ = tracing_subscriber::registry()
    .with(filter(debug, |name| std::env::var(name).ok()))
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .without_time(),
    )
    .try_init();

  guard
}

fn filter(debug: bool, env: impl Fn(&str) -> Option<String>) -> EnvFilter {
  let from_env = ["COSPEND_LOG", "RUST_LOG"]
    .into_iter()
    .filter_map(|name| env(name).filter(|v| !v.trim().is_empty()))
    .find_map(|directives| EnvFilter::try_new(directives).ok());

  from_env.unwrap_or_else(|| {
    EnvFilter::new(if debug {
      DEBUG_DIRECTIVE
    } else {
      DEFAULT_DIRECTIVE
    })
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_filter() {
    assert_eq!(filter(false, |_| None).to_string(), "warn");
    let debug = filter(true, |_| None).to_string();
    assert!(debug.contains("cospend=debug"));
    assert!(debug.contains("warn"));
  }

  #[test]
  fn test_env_overrides_debug_flag() {
    let env = |name: &str| (name == "RUST_LOG").then(|| "info".to_string());
    assert_eq!(filter(true, env).to_string(), "info");

    let env = |name: &str| match name {
      "COSPEND_LOG" => Some("trace".to_string()),
      "RUST_LOG" => Some("info".to_string()),
      _ => None,
    };
    assert_eq!(filter(false, env).to_string(), "trace");
  }

  #[test]
  fn test_blank_env_is_ignored() {
    let env = |_: &str| Some("  ".to_string());
    assert_eq!(filter(false, env).to_string(), "warn");
  }
}
