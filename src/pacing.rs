//! Pauses between scripts
//!
//! The grading service needs a moment between scripts before it accepts the
//! next one. Waiting goes through [`Pacer`] so tests can skip it.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real wall-clock waiting
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::debug!(secs = duration.as_secs_f64(), "pausing before next script");
        tokio::time::sleep(duration).await;
    }
}
