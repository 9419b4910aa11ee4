//! Rate limiting for outbound page fetches.

use crate::utils::fmt_duration;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::debug;

/// Runs network-bound tasks one at a time, keeping at least `min_interval`
/// between the end of one task and the start of the next.
///
/// Work that never touches the network simply isn't submitted, so it costs
/// no delay; nothing waits after the final task either.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_finished: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: None,
        }
    }

    /// Wait for the next free slot, then run `task` to completion.
    pub async fn run<F>(&mut self, task: F) -> F::Output
    where
        F: Future,
    {
        if let Some(last) = self.last_finished {
            let ready_at = last + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                debug!(wait = fmt_duration(ready_at - now), "Pacing before next request");
                time::sleep_until(ready_at).await;
            }
        }

        let output = task.await;
        self.last_finished = Some(Instant::now());
        output
    }
}
