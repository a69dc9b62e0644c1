//! Error taxonomy for the order desk.

use thiserror::Error;

/// Typed failures returned by the trading bot.
///
/// Only `Connection` stops the bot from being constructed. Every other
/// variant is returned from an individual operation and rendered by the
/// front end as "no result".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("balance fetch failed: {0}")]
    BalanceFetch(String),

    #[error("invalid order: {0}")]
    Validation(String),

    #[error("order submission failed: {0}")]
    Submission(String),

    #[error("insufficient balance for MARKET order on {symbol}")]
    InsufficientBalance { symbol: String },

    #[error("all {attempts} attempts to place order failed, last error: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}
