//! Pause Port - Injected delay between retry attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait. Production uses tokio's timer; tests record
/// the requested durations without waiting.
#[async_trait]
pub trait Pause: Send + Sync {
  async fn pause(&self, duration: Duration);
}
