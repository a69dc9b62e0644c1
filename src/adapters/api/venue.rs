//! Futures Venue — `Venue` port over the REST client
//!
//! Maps the four port calls onto USDT-M futures endpoints. All HTTP goes
//! through the shared `FuturesClient` (signing + rate limiting).

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::client::FuturesClient;
use super::types::{Pong, TickerPrice};
use crate::domain::{AssetBalance, OrderAck, OrderSubmission};
use crate::ports::venue::Venue;

const PING_PATH: &str = "/fapi/v1/ping";
const BALANCE_PATH: &str = "/fapi/v2/balance";
const TICKER_PRICE_PATH: &str = "/fapi/v1/ticker/price";
const ORDER_PATH: &str = "/fapi/v1/order";

/// USDT-M futures venue backed by the signed REST client.
pub struct FuturesVenue {
    client: FuturesClient,
}

impl FuturesVenue {
    pub fn new(client: FuturesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Venue for FuturesVenue {
    #[instrument(skip(self), fields(base_url = %self.client.base_url()))]
    async fn ping(&self) -> Result<()> {
        let _: Pong = self
            .client
            .get_public(PING_PATH, &[])
            .await
            .context("Ping failed")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn account_balances(&self) -> Result<Vec<AssetBalance>> {
        let balances: Vec<AssetBalance> = self
            .client
            .get_signed(BALANCE_PATH, &[])
            .await
            .context("Failed to fetch futures account balance")?;

        if let Some(weight) = self.client.weight_usage().await {
            debug!(used_weight_1m = weight.used_1m, "Venue weight usage");
        }
        Ok(balances)
    }

    #[instrument(skip(self))]
    async fn ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker: TickerPrice = self
            .client
            .get_public(TICKER_PRICE_PATH, &[("symbol", symbol.to_string())])
            .await
            .with_context(|| format!("Failed to fetch ticker price for {symbol}"))?;
        Ok(ticker.price)
    }

    #[instrument(skip(self, submission), fields(symbol = %submission.symbol, side = %submission.side, kind = %submission.kind))]
    async fn create_order(&self, submission: &OrderSubmission) -> Result<OrderAck> {
        self.client
            .post_signed(ORDER_PATH, &submission.to_params())
            .await
            .context("Failed to place order")
    }
}
