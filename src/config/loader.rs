//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use super::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content)
    .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Load `path` if it exists, otherwise fall back to defaults.
///
/// Logging is not initialised yet when this runs, so the caller reports
/// which source was used.
pub fn load_config_or_default(path: &Path) -> Result<(AppConfig, bool)> {
  if path.exists() {
    Ok((load_config(path)?, true))
  } else {
    let config = AppConfig::default();
    validate_config(&config)?;
    Ok((config, false))
  }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Logging
  anyhow::ensure!(
    LOG_LEVELS.contains(&config.bot.log_level.to_ascii_lowercase().as_str()),
    "log_level must be one of {LOG_LEVELS:?}, got '{}'",
    config.bot.log_level
  );
  anyhow::ensure!(
    !config.bot.log_file.trim().is_empty(),
    "log_file must not be empty"
  );

  // Venue
  let base_url = config.venue.resolved_base_url();
  anyhow::ensure!(
    base_url.starts_with("http://") || base_url.starts_with("https://"),
    "venue base_url must be an http(s) URL, got '{base_url}'"
  );
  anyhow::ensure!(
    config.venue.timeout_seconds > 0,
    "venue timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.venue.recv_window_ms > 0 && config.venue.recv_window_ms <= 60_000,
    "venue recv_window_ms must be in (0, 60000], got {}",
    config.venue.recv_window_ms
  );
  anyhow::ensure!(
    config.venue.max_requests_per_minute > 0,
    "venue max_requests_per_minute must be positive"
  );

  // Orders
  anyhow::ensure!(
    config.orders.max_attempts > 0,
    "orders max_attempts must be at least 1"
  );
  anyhow::ensure!(
    !config.orders.quote_asset.trim().is_empty(),
    "orders quote_asset must not be empty"
  );
  anyhow::ensure!(
    config.orders.default_quantity > Decimal::ZERO,
    "orders default_quantity must be positive, got {}",
    config.orders.default_quantity
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Environment, LogFormat};
  use rust_decimal_macros::dec;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config(Path::new("nonexistent.toml"));
    assert!(result.is_err());
  }

  #[test]
  fn test_missing_file_falls_back_to_defaults() {
    let (config, from_file) =
      load_config_or_default(Path::new("definitely-not-here.toml")).unwrap();
    assert!(!from_file);
    assert_eq!(config.orders.max_attempts, 3);
  }

  #[test]
  fn test_empty_document_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.bot.log_file, "bot.log");
    assert_eq!(config.bot.log_format, LogFormat::Text);
  }

  #[test]
  fn test_partial_document() {
    let config = parse_config(
      r#"
        [venue]
        environment = "production"

        [orders]
        max_attempts = 5
        retry_delay_ms = 250
        default_quantity = "0.002"
      "#,
    )
    .unwrap();
    assert_eq!(config.venue.environment, Environment::Production);
    assert_eq!(config.venue.resolved_base_url(), "https://fapi.binance.com");
    assert_eq!(config.orders.max_attempts, 5);
    assert_eq!(config.orders.retry_delay_ms, 250);
    assert_eq!(config.orders.default_quantity, dec!(0.002));
    assert_eq!(config.orders.quote_asset, "USDT");
  }

  #[test]
  fn test_shipped_config_matches_defaults() {
    let config = parse_config(include_str!("../../config.toml")).unwrap();
    assert_eq!(config.venue.environment, Environment::Testnet);
    assert_eq!(config.orders.retry_delay_ms, 2_000);
    assert_eq!(config.orders.default_quantity, dec!(0.01));
  }

  #[test]
  fn test_rejects_zero_attempts() {
    let err = parse_config("[orders]\nmax_attempts = 0\n").unwrap_err();
    assert!(format!("{err:#}").contains("max_attempts"));
  }

  #[test]
  fn test_rejects_bad_log_level() {
    assert!(parse_config("[bot]\nlog_level = \"loud\"\n").is_err());
  }

  #[test]
  fn test_rejects_non_http_base_url() {
    assert!(parse_config("[venue]\nbase_url = \"\"\n").is_err());
    assert!(parse_config("[venue]\nbase_url = \"ftp://x\"\n").is_err());
  }
}
