use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the file writer flushing until the process exits
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Default directives when RUST_LOG is unset
fn default_directives(verbose: bool) -> &'static str {
  if verbose {
    "greenhouse_jobs=debug"
  } else {
    "greenhouse_jobs=info"
  }
}

fn log_dir() -> Option<PathBuf> {
  dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .map(|p| p.join("greenhouse-jobs").join("logs"))
}

/// Install the global subscriber.
///
/// Console output goes to stderr so stdout only ever carries rendered markup.
/// A daily-rolling log file is added when the log directory is writable.
pub fn init(verbose: bool) -> Result<()> {
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

  let file_layer = log_dir()
    .and_then(|dir| {
      std::fs::create_dir_all(&dir).ok()?;
      RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("greenhouse-jobs")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&dir)
        .ok()
    })
    .map(|appender| {
      let (non_blocking, guard) = tracing_appender::non_blocking(appender);
      let _ = GUARD.set(guard);
      fmt::layer().with_writer(non_blocking).with_ansi(false)
    });

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(())
}
