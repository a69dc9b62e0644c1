//! Futures REST API Response Types
//!
//! Wire types that are not domain types. Balances and order
//! acknowledgements decode straight into `crate::domain`.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
  /// Venue error code (negative numbers).
  pub code: i64,
  /// Human-readable message.
  pub msg: String,
}

/// `GET /fapi/v1/ticker/price` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
  /// Symbol the price is for.
  pub symbol: String,
  /// Latest price.
  pub price: Decimal,
  /// Transaction time (Unix ms).
  #[serde(default)]
  pub time: Option<i64>,
}

/// `GET /fapi/v1/ping` returns an empty object.
#[derive(Debug, Clone, Deserialize)]
pub struct Pong {}

/// Request weight usage reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightUsage {
  /// Weight consumed in the current one-minute window.
  pub used_1m: u32,
}
