//! Futures REST API Adapter
//!
//! Implements the HTTP side of the `Venue` port: request signing,
//! rate limiting, response decoding.
//!
//! Sub-modules:
//! - `auth`: HMAC-SHA256 query signing
//! - `client`: HTTP client with rate limiting and error decoding
//! - `types`: Response types that are not domain types
//! - `venue`: `Venue` implementation over the client

pub mod auth;
pub mod client;
pub mod types;
pub mod venue;

pub use client::{FuturesClient, FuturesClientConfig};
pub use venue::FuturesVenue;
