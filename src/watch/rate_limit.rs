use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// Minimum gap between two saves unless configured otherwise.
pub const DEFAULT_MIN_SAVE_INTERVAL: Duration = Duration::from_secs(3);

/// Throttles saves. The first save is always allowed; later ones only once
/// `min_interval` has passed since the last allowed save.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SAVE_INTERVAL)
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Claim a save slot at the current time.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Claim a save slot at `now`. The slot is only consumed when granted.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let allowed = match *last {
            None => true,
            Some(prev) => now.saturating_duration_since(prev) >= self.min_interval,
        };
        if allowed {
            *last = Some(now);
        }
        allowed
    }

    /// Forget the last save so the next one goes through.
    pub fn reset(&self) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/watch/rate_limit.rs"]
mod tests;
