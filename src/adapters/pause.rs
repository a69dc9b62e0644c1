//! Tokio-backed `Pause`.

use std::time::Duration;

use async_trait::async_trait;

use crate::ports::pause::Pause;

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
