//! Step transition effects.

use std::time::Duration;

use async_trait::async_trait;

/// An awaitable visual effect played around step changes.
///
/// `exit` is awaited before the step index moves; `enter` runs once the new
/// step is current. Neither result affects control flow.
#[async_trait]
pub trait Transition: Send + Sync {
    async fn exit(&self);
    async fn enter(&self);
}

/// Resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instant;

#[async_trait]
impl Transition for Instant {
    async fn exit(&self) {}
    async fn enter(&self) {}
}

/// Sleeps for a fixed time on each phase.
#[derive(Debug, Clone, Copy)]
pub struct Timed {
    pub exit: Duration,
    pub enter: Duration,
}

impl Default for Timed {
    fn default() -> Self {
        Self {
            exit: Duration::from_millis(320),
            enter: Duration::from_millis(450),
        }
    }
}

#[async_trait]
impl Transition for Timed {
    async fn exit(&self) {
        tokio::time::sleep(self.exit).await;
    }

    async fn enter(&self) {
        tokio::time::sleep(self.enter).await;
    }
}
