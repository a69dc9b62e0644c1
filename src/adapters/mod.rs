//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP, timers, terminal I/O, log files).
//!
//! Adapter categories:
//! - `api`: Futures REST client, signing, `Venue` implementation
//! - `console`: Interactive form driving an `OrderDesk`
//! - `logging`: Process log subscriber setup
//! - `pause`: Tokio timer behind the `Pause` port

pub mod api;
pub mod console;
pub mod logging;
pub mod pause;
