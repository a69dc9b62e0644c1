//! Venue Port - Exchange Call Interface
//!
//! The four calls the order desk needs from the trading venue. The
//! REST adapter implements this against the futures API; tests mock it.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{AssetBalance, OrderAck, OrderSubmission};

/// Trait for trading venue providers.
///
/// Implementors handle transport, signing and rate limits. Errors come
/// back as `anyhow::Error` and are classified by the caller.
#[async_trait]
pub trait Venue: Send + Sync + 'static {
  /// Liveness check. Fails when the venue is unreachable.
  async fn ping(&self) -> anyhow::Result<()>;

  /// Futures account balance, one entry per asset.
  async fn account_balances(&self) -> anyhow::Result<Vec<AssetBalance>>;

  /// Latest traded price for `symbol`.
  async fn ticker_price(&self, symbol: &str) -> anyhow::Result<Decimal>;

  /// Submit a new order.
  ///
  /// # Errors
  /// Returns error on transport failure or venue rejection.
  async fn create_order(&self, submission: &OrderSubmission) -> anyhow::Result<OrderAck>;
}
