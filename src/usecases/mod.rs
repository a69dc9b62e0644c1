//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `TradingBot`: Balance lookup, sufficiency gate, retried placement

pub mod trading_bot;

pub use trading_bot::{FuturesConnector, OrderPolicy, TradingBot};
