/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Spacing of consecutive requests issued by one session.

use crate::rest::DEFAULT_REQUEST_DELAY_MS;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum delay between two dispatches.
///
/// The delay is measured between dispatch attempts, not completions. There is no
/// coordination between pacers, each session owns its own.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    delay: Duration,
    last_dispatch: Option<Instant>,
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REQUEST_DELAY_MS))
    }
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_dispatch: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// When the previous dispatch was recorded
    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Earliest instant the next dispatch may happen, if one has happened before
    pub fn next_permitted(&self) -> Option<Instant> {
        self.last_dispatch.map(|last| last + self.delay)
    }

    /// Waits until the next dispatch is permitted and records it.
    ///
    /// Returns the recorded dispatch instant.
    pub async fn wait(&mut self) -> Instant {
        if let Some(deadline) = self.next_permitted() {
            // Woken early: recompute the remainder and keep waiting
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                log::debug!("Waiting {:?} before next request", deadline - now);
                sleep_until(deadline).await;
            }
        }
        let now = Instant::now();
        self.last_dispatch = Some(now);
        now
    }
}
