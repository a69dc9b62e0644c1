//! Domain layer - Core order-desk types.
//!
//! No I/O in here (hexagonal architecture inner ring). Orders,
//! balances, credentials and the error taxonomy are testable in isolation.

pub mod balance;
pub mod credentials;
pub mod error;
pub mod order;

// Re-export core types for convenience
pub use balance::{AssetBalance, BalanceSnapshot, Sufficiency};
pub use credentials::Credentials;
pub use error::BotError;
pub use order::{OrderAck, OrderKind, OrderRequest, OrderSubmission, Side, TimeInForce};
