//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `Venue`: Exchange calls (ping, balances, ticker price, order)
//! - `Pause`: Delay between order retries
//! - `OrderDesk` / `DeskConnector`: What the front end drives

pub mod desk;
pub mod pause;
pub mod venue;
