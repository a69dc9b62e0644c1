//! Order Desk Port - What the front end drives
//!
//! The console form only needs two actions from a connected bot and a way
//! to obtain one from credentials. Keeping this behind traits lets the
//! form be tested without a venue.

use async_trait::async_trait;

use crate::domain::{BalanceSnapshot, BotError, Credentials, OrderAck, OrderRequest};

/// A connected order desk.
#[async_trait]
pub trait OrderDesk: Send + Sync {
  /// Fetch the account balance.
  async fn get_balance(&self) -> Result<BalanceSnapshot, BotError>;

  /// Place an order with the configured retry budget.
  async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BotError>;
}

/// Builds a connected desk from credentials.
#[async_trait]
pub trait DeskConnector: Send + Sync {
  /// # Errors
  /// `BotError::Connection` when the venue cannot be reached or the
  /// credentials are refused.
  async fn connect(&self, credentials: Credentials) -> Result<Box<dyn OrderDesk>, BotError>;
}
