//! Order domain types.
//!
//! An `OrderRequest` is what the user asked for; an `OrderSubmission` is
//! the venue-ready form of it. Building the submission is where a LIMIT
//! request without a price is rejected, so the check happens once per
//! placement attempt rather than when the form is filled in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BotError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(BotError::Validation(format!(
                "unknown side '{other}', expected BUY or SELL"
            ))),
        }
    }
}

/// Order kind. MARKET fills at the best available price, LIMIT rests at
/// the given price or better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Market,
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

impl FromStr for OrderKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(Self::Market),
            "LIMIT" => Ok(Self::Limit),
            other => Err(BotError::Validation(format!(
                "unknown order type '{other}', expected MARKET or LIMIT"
            ))),
        }
    }
}

/// Time-in-force policy. Only good-til-cancelled is ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    #[serde(rename = "GTC")]
    GoodTilCancelled,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodTilCancelled => write!(f, "GTC"),
        }
    }
}

/// A user's order as entered in the form. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    /// Required for LIMIT; ignored for MARKET.
    pub price: Option<Decimal>,
}

impl OrderRequest {
    /// Build a request, normalizing the symbol.
    ///
    /// # Errors
    /// `BotError::Validation` for an empty symbol, a non-positive quantity
    /// or a non-positive price. A LIMIT request without a price is accepted
    /// here and rejected by [`OrderSubmission::build`].
    pub fn new(
        symbol: &str,
        side: Side,
        kind: OrderKind,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<Self, BotError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(BotError::Validation("symbol must not be empty".into()));
        }
        if quantity <= Decimal::ZERO {
            return Err(BotError::Validation(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        if let Some(p) = price {
            if p <= Decimal::ZERO {
                return Err(BotError::Validation(format!(
                    "price must be positive, got {p}"
                )));
            }
        }
        Ok(Self {
            symbol,
            side,
            kind,
            quantity,
            price,
        })
    }

    pub fn market(symbol: &str, side: Side, quantity: Decimal) -> Result<Self, BotError> {
        Self::new(symbol, side, OrderKind::Market, quantity, None)
    }

    pub fn limit(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<Self, BotError> {
        Self::new(symbol, side, OrderKind::Limit, quantity, price)
    }
}

/// Venue-ready order parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    pub client_order_id: String,
}

impl OrderSubmission {
    /// Turn a request into submission parameters.
    ///
    /// MARKET carries symbol/side/quantity only. LIMIT adds the price and
    /// GTC time-in-force.
    ///
    /// # Errors
    /// `BotError::Validation` when a LIMIT request has no price.
    pub fn build(request: &OrderRequest, client_order_id: &str) -> Result<Self, BotError> {
        let (price, time_in_force) = match request.kind {
            OrderKind::Market => (None, None),
            OrderKind::Limit => {
                let price = request.price.ok_or_else(|| {
                    BotError::Validation("price must be specified for LIMIT order".into())
                })?;
                (Some(price), Some(TimeInForce::GoodTilCancelled))
            }
        };

        Ok(Self {
            symbol: request.symbol.clone(),
            side: request.side,
            kind: request.kind,
            quantity: request.quantity,
            price,
            time_in_force,
            client_order_id: client_order_id.to_string(),
        })
    }

    /// Query parameters in the order the venue documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.to_string()),
            ("type", self.kind.to_string()),
        ];
        if let Some(tif) = self.time_in_force {
            params.push(("timeInForce", tif.to_string()));
        }
        params.push(("quantity", self.quantity.normalize().to_string()));
        if let Some(price) = self.price {
            params.push(("price", price.normalize().to_string()));
        }
        params.push(("newClientOrderId", self.client_order_id.clone()));
        params
    }
}

/// The venue's acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: i64,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OrderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_qty: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
    /// Venue update time, Unix ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
}

impl OrderAck {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_time.and_then(DateTime::from_timestamp_millis)
    }
}
