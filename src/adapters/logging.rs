//! Process Log - tracing subscriber setup
//!
//! One explicit call from the binary installs the global subscriber: a
//! file layer (truncated at each start) plus a stderr mirror. Library code
//! only emits `tracing` events and never configures logging itself.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{BotConfig, LogFormat};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Errors
/// Fails if the log file cannot be created or a subscriber is already set.
pub fn init_logging(config: &BotConfig) -> Result<()> {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

  let file = create_log_file(Path::new(&config.log_file))?;

  tracing_subscriber::registry()
    .with(file_layer(file, config.log_format))
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init()
    .context("Failed to install tracing subscriber")?;

  Ok(())
}

/// Create (or truncate) the process log.
fn create_log_file(path: &Path) -> Result<File> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
  }
  File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))
}

fn file_layer(file: File, format: LogFormat) -> BoxedLayer {
  let writer = Mutex::new(file);
  match format {
    LogFormat::Text => fmt::layer()
      .with_writer(writer)
      .with_ansi(false)
      .with_target(false)
      .boxed(),
    LogFormat::Json => fmt::layer()
      .json()
      .with_writer(writer)
      .with_current_span(false)
      .boxed(),
  }
}
