//! Process-wide sliding window rate limiter

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Admits at most `max_requests` within any trailing `window`
///
/// Timestamps of admitted requests are kept oldest-first behind a mutex;
/// pruning and admission happen in one critical section.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    admitted: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            admitted: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.window(), config.max_requests)
    }

    /// Try to admit a request now
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Try to admit a request at `now`
    ///
    /// Rejected requests are not recorded, so they do not extend the window.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut admitted = self.admitted.lock();

        while let Some(oldest) = admitted.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() >= self.max_requests {
            return false;
        }

        admitted.push_back(now);
        true
    }

    /// Requests currently counted against the window
    pub fn in_flight_window(&self) -> usize {
        self.admitted.lock().len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}
