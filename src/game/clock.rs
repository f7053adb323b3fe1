//! Cancellable fixed-delay tick timer
//!
//! The timer holds at most one pending tick. It is armed with a delay, fires
//! once, and stays quiet until it is armed again, so the next delay only
//! starts after the previous tick's work is done.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Sleep, sleep};

#[derive(Debug, Default)]
pub struct TickTimer {
    pending: Option<Pin<Box<Sleep>>>,
}

impl TickTimer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule a single tick `delay` from now, replacing any pending one
    pub fn arm(&mut self, delay: Duration) {
        self.pending = Some(Box::pin(sleep(delay)));
    }

    /// Drop the pending tick, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves when the pending tick fires; never resolves while disarmed.
    ///
    /// Cancel safe: dropping the future before it completes keeps the tick
    /// pending.
    pub async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.pending = None;
            }
            None => pending::<()>().await,
        }
    }
}
