//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml`. Every field has
//! a default, so a missing file or a partial file is fine. Credentials
//! are NOT configured here; they come from the form, CLI flags or env.

pub mod loader;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Bot identity and logging.
  pub bot: BotConfig,
  /// Venue endpoint and transport settings.
  pub venue: VenueConfig,
  /// Order placement policy and form defaults.
  pub orders: OrderConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Process log file, truncated at every start.
  pub log_file: String,
  /// Line format of the log.
  pub log_format: LogFormat,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: "futures-testnet-bot".to_string(),
      log_level: default_log_level(),
      log_file: "bot.log".to_string(),
      log_format: LogFormat::Text,
    }
  }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// `timestamp LEVEL target: message fields`
  Text,
  /// One JSON object per line.
  Json,
}

/// Which venue deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  /// Futures testnet (paper money).
  Testnet,
  /// Live futures API (real money).
  Production,
}

impl Environment {
  /// REST base URL for this deployment.
  pub fn base_url(self) -> &'static str {
    match self {
      Self::Testnet => "https://testnet.binancefuture.com",
      Self::Production => "https://fapi.binance.com",
    }
  }
}

/// Venue endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
  /// Deployment to connect to.
  pub environment: Environment,
  /// Explicit REST base URL; overrides `environment` when set.
  pub base_url: Option<String>,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
  /// Signed request validity window (ms).
  pub recv_window_ms: u64,
  /// Client-side request budget.
  pub max_requests_per_minute: u32,
}

impl Default for VenueConfig {
  fn default() -> Self {
    Self {
      environment: Environment::Testnet,
      base_url: None,
      timeout_seconds: 10,
      recv_window_ms: 5_000,
      max_requests_per_minute: 1_200,
    }
  }
}

impl VenueConfig {
  /// Base URL actually used for requests.
  pub fn resolved_base_url(&self) -> String {
    self
      .base_url
      .clone()
      .unwrap_or_else(|| self.environment.base_url().to_string())
  }
}

/// Order placement policy and form defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
  /// Submission tries per order.
  pub max_attempts: u32,
  /// Fixed pause between tries (milliseconds).
  pub retry_delay_ms: u64,
  /// Asset that margins MARKET orders in the sufficiency check.
  pub quote_asset: String,
  /// Symbol pre-filled in the form.
  pub default_symbol: String,
  /// Quantity pre-filled in the form.
  pub default_quantity: Decimal,
}

impl Default for OrderConfig {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      retry_delay_ms: 2_000,
      quote_asset: "USDT".to_string(),
      default_symbol: "BTCUSDT".to_string(),
      default_quantity: dec!(0.01),
    }
  }
}

impl OrderConfig {
  /// Pause between retries.
  pub fn retry_delay(&self) -> Duration {
    Duration::from_millis(self.retry_delay_ms)
  }
}

fn default_log_level() -> String {
  "info".to_string()
}
