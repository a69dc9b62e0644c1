//! Trading Bot - Balance lookup, sufficiency gate, retried placement
//!
//! Wraps a `Venue` with the two pieces of local logic the order desk
//! owns:
//! - MARKET orders must be covered by the quote-asset balance at the
//!   current price before anything is submitted
//! - submissions are retried a fixed number of times with a fixed pause
//!
//! Placement states: `Gating → {Rejected, Attempting}`,
//! `Attempting → {Succeeded, Attempting, ExhaustedFailed}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::api::{FuturesClient, FuturesClientConfig, FuturesVenue};
use crate::adapters::pause::TokioPause;
use crate::config::{AppConfig, OrderConfig};
use crate::domain::{
  BalanceSnapshot, BotError, Credentials, OrderAck, OrderKind, OrderRequest, OrderSubmission,
  Sufficiency,
};
use crate::ports::desk::{DeskConnector, OrderDesk};
use crate::ports::pause::Pause;
use crate::ports::venue::Venue;

/// Retry budget and sufficiency settings.
#[derive(Debug, Clone)]
pub struct OrderPolicy {
  /// Submission tries per order.
  pub max_attempts: u32,
  /// Fixed pause between tries.
  pub retry_delay: Duration,
  /// Asset whose balance must cover MARKET orders.
  pub quote_asset: String,
}

impl Default for OrderPolicy {
  fn default() -> Self {
    Self::from(&OrderConfig::default())
  }
}

impl From<&OrderConfig> for OrderPolicy {
  fn from(config: &OrderConfig) -> Self {
    Self {
      max_attempts: config.max_attempts,
      retry_delay: config.retry_delay(),
      quote_asset: config.quote_asset.clone(),
    }
  }
}

/// Connected order desk over a venue.
pub struct TradingBot<V: Venue, P: Pause = TokioPause> {
  /// Venue port.
  venue: Arc<V>,
  /// Delay between retries.
  pause: P,
  /// Retry and gate settings.
  policy: OrderPolicy,
}

impl TradingBot<FuturesVenue, TokioPause> {
  /// Build the REST venue for the configured environment and connect.
  ///
  /// # Errors
  /// `BotError::Connection` if the client cannot be built or the venue
  /// does not answer the ping.
  pub async fn connect(credentials: Credentials, config: &AppConfig) -> Result<Self, BotError> {
    let client = FuturesClient::new(credentials, FuturesClientConfig::from_venue(&config.venue))
      .map_err(|e| {
        error!(error = %e, "Error initializing client");
        BotError::Connection(format!("{e:#}"))
      })?;

    info!(
      environment = ?config.venue.environment,
      base_url = %client.base_url(),
      "Connecting to venue"
    );

    Self::with_venue(
      Arc::new(FuturesVenue::new(client)),
      TokioPause,
      OrderPolicy::from(&config.orders),
    )
    .await
  }
}

impl<V: Venue, P: Pause> TradingBot<V, P> {
  /// Wrap an existing venue and verify it is reachable.
  ///
  /// The ping is not retried: a refused credential will not heal.
  ///
  /// # Errors
  /// `BotError::Connection` when the ping fails.
  pub async fn with_venue(venue: Arc<V>, pause: P, policy: OrderPolicy) -> Result<Self, BotError> {
    if let Err(e) = venue.ping().await {
      error!(error = %format!("{e:#}"), "Error initializing client");
      return Err(BotError::Connection(format!("{e:#}")));
    }
    info!("Client initialized successfully");
    Ok(Self {
      venue,
      pause,
      policy,
    })
  }

  /// Fetch the futures account balance.
  ///
  /// # Errors
  /// `BotError::BalanceFetch` on any transport or venue failure. Callers
  /// must read this as "unknown", never as a zero balance.
  #[instrument(skip(self))]
  pub async fn get_balance(&self) -> Result<BalanceSnapshot, BotError> {
    match self.venue.account_balances().await {
      Ok(entries) => {
        info!(assets = entries.len(), "Balance fetched successfully");
        for entry in &entries {
          info!("{}: {}", entry.asset, entry.balance);
        }
        Ok(BalanceSnapshot::from(entries))
      }
      Err(e) => {
        error!(error = %format!("{e:#}"), "Error fetching balance");
        Err(BotError::BalanceFetch(format!("{e:#}")))
      }
    }
  }

  /// Compare the quote-asset balance against `price × quantity`.
  ///
  /// # Errors
  /// `BotError::BalanceFetch` when the balance is empty or unavailable,
  /// the price cannot be fetched, or `price × quantity` overflows.
  pub async fn check_sufficiency(
    &self,
    symbol: &str,
    quantity: Decimal,
  ) -> Result<Sufficiency, BotError> {
    let snapshot = self.get_balance().await?;
    if snapshot.is_empty() {
      return Err(BotError::BalanceFetch("venue returned no balances".into()));
    }
    let available = snapshot.amount_of(&self.policy.quote_asset);

    let price = self.venue.ticker_price(symbol).await.map_err(|e| {
      error!(symbol, error = %format!("{e:#}"), "Error fetching current price");
      BotError::BalanceFetch(format!("{e:#}"))
    })?;

    Sufficiency::evaluate(available, price, quantity).ok_or_else(|| {
      error!(symbol, %price, %quantity, "Required amount overflows");
      BotError::BalanceFetch(format!("required amount {price} x {quantity} overflows"))
    })
  }

  /// Point-in-time check that the quote-asset balance covers the order.
  ///
  /// Never errors: any failure to fetch balance or price yields `false`.
  /// Nothing holds between this check and a later submission.
  #[instrument(skip(self))]
  pub async fn has_sufficient_balance(&self, symbol: &str, quantity: Decimal) -> bool {
    match self.check_sufficiency(symbol, quantity).await {
      Ok(s) if s.is_covered() => true,
      Ok(s) => {
        warn!(
          "Insufficient {} balance: {} < {}",
          self.policy.quote_asset, s.available, s.required
        );
        false
      }
      Err(_) => false,
    }
  }

  /// Place an order with the configured retry budget.
  ///
  /// # Errors
  /// See [`Self::place_order_with_attempts`].
  pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BotError> {
    self
      .place_order_with_attempts(request, self.policy.max_attempts)
      .await
  }

  /// Place an order, trying the submission up to `max_attempts` times.
  ///
  /// MARKET orders are gated on [`Self::has_sufficient_balance`]; LIMIT
  /// orders are not. Every failure, including a LIMIT order without a
  /// price, consumes an attempt. Consecutive attempts are separated by
  /// the policy's fixed pause. One client order id is shared by all
  /// attempts of a call.
  ///
  /// # Errors
  /// - `BotError::InsufficientBalance` when the gate rejects (nothing sent)
  /// - `BotError::AttemptsExhausted` after the last failed attempt
  #[instrument(skip(self, request), fields(symbol = %request.symbol, side = %request.side, kind = %request.kind))]
  pub async fn place_order_with_attempts(
    &self,
    request: &OrderRequest,
    max_attempts: u32,
  ) -> Result<OrderAck, BotError> {
    if request.kind == OrderKind::Market
      && !self
        .has_sufficient_balance(&request.symbol, request.quantity)
        .await
    {
      error!("Not enough balance to place market order");
      return Err(BotError::InsufficientBalance {
        symbol: request.symbol.clone(),
      });
    }

    let client_order_id = Uuid::new_v4().to_string();
    let mut last_error = String::from("no attempts made");

    for attempt in 1..=max_attempts {
      if attempt > 1 {
        self.pause.pause(self.policy.retry_delay).await;
      }

      match self.submit(request, &client_order_id).await {
        Ok(ack) => {
          info!(
            order_id = ack.order_id,
            client_order_id = %client_order_id,
            attempt,
            updated_at = ?ack.updated_at(),
            "Order placed successfully: {}",
            ack.order_id
          );
          return Ok(ack);
        }
        Err(e) => {
          error!(attempt, max_attempts, "Attempt {attempt} failed: {e}");
          last_error = e.to_string();
        }
      }
    }

    error!(attempts = max_attempts, "All attempts to place order failed");
    Err(BotError::AttemptsExhausted {
      attempts: max_attempts,
      last_error,
    })
  }

  /// One attempt: build the submission, then send it.
  async fn submit(&self, request: &OrderRequest, client_order_id: &str) -> Result<OrderAck, BotError> {
    let submission = OrderSubmission::build(request, client_order_id)?;
    self
      .venue
      .create_order(&submission)
      .await
      .map_err(|e| BotError::Submission(format!("{e:#}")))
  }
}

#[async_trait]
impl<V: Venue, P: Pause + 'static> OrderDesk for TradingBot<V, P> {
  async fn get_balance(&self) -> Result<BalanceSnapshot, BotError> {
    Self::get_balance(self).await
  }

  async fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, BotError> {
    Self::place_order(self, request).await
  }
}

/// Connects REST-backed bots using the application config.
pub struct FuturesConnector {
  config: AppConfig,
}

impl FuturesConnector {
  pub fn new(config: AppConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl DeskConnector for FuturesConnector {
  async fn connect(&self, credentials: Credentials) -> Result<Box<dyn OrderDesk>, BotError> {
    let bot = TradingBot::connect(credentials, &self.config).await?;
    Ok(Box::new(bot))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use anyhow::anyhow;
  use rust_decimal_macros::dec;

  use crate::domain::{AssetBalance, Side};

  /// Hand-written venue: fixed balance and price, order calls counted.
  struct StubVenue {
    ping_ok: bool,
    balances: Option<Vec<AssetBalance>>,
    price: Option<Decimal>,
    fail_orders: usize,
    order_calls: AtomicUsize,
    price_calls: AtomicUsize,
  }

  impl StubVenue {
    fn new() -> Self {
      Self {
        ping_ok: true,
        balances: Some(vec![AssetBalance::new("USDT", dec!(1000))]),
        price: Some(dec!(50000)),
        fail_orders: 0,
        order_calls: AtomicUsize::new(0),
        price_calls: AtomicUsize::new(0),
      }
    }
  }

  #[async_trait]
  impl Venue for StubVenue {
    async fn ping(&self) -> anyhow::Result<()> {
      if self.ping_ok { Ok(()) } else { Err(anyhow!("connection refused")) }
    }

    async fn account_balances(&self) -> anyhow::Result<Vec<AssetBalance>> {
      self.balances.clone().ok_or_else(|| anyhow!("timeout"))
    }

    async fn ticker_price(&self, _symbol: &str) -> anyhow::Result<Decimal> {
      self.price_calls.fetch_add(1, Ordering::SeqCst);
      self.price.ok_or_else(|| anyhow!("invalid symbol"))
    }

    async fn create_order(&self, submission: &OrderSubmission) -> anyhow::Result<OrderAck> {
      let n = self.order_calls.fetch_add(1, Ordering::SeqCst);
      if n < self.fail_orders {
        return Err(anyhow!("venue error -1001: disconnected"));
      }
      Ok(OrderAck {
        order_id: 42,
        symbol: submission.symbol.clone(),
        client_order_id: Some(submission.client_order_id.clone()),
        side: Some(submission.side),
        kind: Some(submission.kind),
        status: Some("NEW".into()),
        orig_qty: Some(submission.quantity),
        price: submission.price,
        time_in_force: submission.time_in_force.map(|t| t.to_string()),
        update_time: None,
      })
    }
  }

  #[derive(Default)]
  struct RecordingPause(Mutex<Vec<Duration>>);

  #[async_trait]
  impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
      self.0.lock().unwrap().push(duration);
    }
  }

  async fn bot(venue: StubVenue) -> TradingBot<StubVenue, RecordingPause> {
    TradingBot::with_venue(Arc::new(venue), RecordingPause::default(), OrderPolicy::default())
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_failed_ping_is_connection_error() {
    let venue = StubVenue {
      ping_ok: false,
      ..StubVenue::new()
    };
    let result =
      TradingBot::with_venue(Arc::new(venue), RecordingPause::default(), OrderPolicy::default())
        .await;
    assert!(matches!(result, Err(BotError::Connection(_))));
  }

  #[tokio::test]
  async fn test_empty_balance_is_not_sufficient() {
    let b = bot(StubVenue {
      balances: Some(vec![]),
      ..StubVenue::new()
    })
    .await;
    assert!(!b.has_sufficient_balance("BTCUSDT", dec!(0.001)).await);
    assert_eq!(b.venue.price_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_missing_quote_asset_counts_as_zero() {
    let b = bot(StubVenue {
      balances: Some(vec![AssetBalance::new("BNB", dec!(10))]),
      ..StubVenue::new()
    })
    .await;
    let s = b.check_sufficiency("BTCUSDT", dec!(0.01)).await.unwrap();
    assert_eq!(s.available, Decimal::ZERO);
    assert!(!s.is_covered());
  }

  #[tokio::test]
  async fn test_retry_then_success_pauses_between_attempts() {
    let b = bot(StubVenue {
      fail_orders: 2,
      ..StubVenue::new()
    })
    .await;
    let req = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.01), Some(dec!(45000))).unwrap();

    let ack = b.place_order(&req).await.unwrap();
    assert_eq!(ack.order_id, 42);
    assert_eq!(ack.time_in_force.as_deref(), Some("GTC"));
    assert_eq!(b.venue.order_calls.load(Ordering::SeqCst), 3);
    assert_eq!(*b.pause.0.lock().unwrap(), vec![Duration::from_secs(2); 2]);
  }

  #[tokio::test]
  async fn test_zero_attempts_sends_nothing() {
    let b = bot(StubVenue::new()).await;
    let req = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.01), Some(dec!(1))).unwrap();
    let err = b.place_order_with_attempts(&req, 0).await.unwrap_err();
    assert!(matches!(err, BotError::AttemptsExhausted { attempts: 0, .. }));
    assert_eq!(b.venue.order_calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_policy_from_config() {
    let config = OrderConfig {
      max_attempts: 7,
      retry_delay_ms: 10,
      quote_asset: "USDC".into(),
      ..OrderConfig::default()
    };
    let policy = OrderPolicy::from(&config);
    assert_eq!(policy.max_attempts, 7);
    assert_eq!(policy.retry_delay, Duration::from_millis(10));
    assert_eq!(policy.quote_asset, "USDC");
  }
}
