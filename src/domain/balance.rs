//! Account balance snapshot and the sufficiency arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset line of the futures account balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub balance: Decimal,
    /// Margin available for new orders, when the venue reports it.
    #[serde(
        rename = "availableBalance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub available_balance: Option<Decimal>,
}

impl AssetBalance {
    pub fn new(asset: &str, balance: Decimal) -> Self {
        Self {
            asset: asset.to_string(),
            balance,
            available_balance: None,
        }
    }
}

/// Balances as returned by the venue, in venue order. Fetched fresh for
/// every query and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(pub Vec<AssetBalance>);

impl BalanceSnapshot {
    pub fn entries(&self) -> &[AssetBalance] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Balance of `asset`, or zero when the venue did not list it.
    pub fn amount_of(&self, asset: &str) -> Decimal {
        self.0
            .iter()
            .find(|b| b.asset == asset)
            .map_or(Decimal::ZERO, |b| b.balance)
    }
}

impl From<Vec<AssetBalance>> for BalanceSnapshot {
    fn from(entries: Vec<AssetBalance>) -> Self {
        Self(entries)
    }
}

/// Outcome of a sufficiency check that could be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sufficiency {
    pub available: Decimal,
    pub required: Decimal,
}

impl Sufficiency {
    /// `required = price × quantity`. `None` when the product does not
    /// fit in a `Decimal`.
    pub fn evaluate(available: Decimal, price: Decimal, quantity: Decimal) -> Option<Self> {
        Some(Self {
            available,
            required: price.checked_mul(quantity)?,
        })
    }

    pub fn is_covered(&self) -> bool {
        self.available >= self.required
    }
}
