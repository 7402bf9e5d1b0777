use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WINDOW_SECONDS: i64 = 300;

/// Lockout applied once `max_attempts` is reached. Independent of the window.
pub const LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug, Default)]
struct LimiterState {
    attempts: HashMap<String, Vec<DateTime<Utc>>>,
    blocks: HashMap<String, DateTime<Utc>>,
    last_sweep: Option<DateTime<Utc>>,
}

impl LimiterState {
    /// Drops keys whose newest failure is at or before `window_start` and expired lockouts.
    /// Runs at most once per window so a login stays O(1) between sweeps.
    fn sweep(&mut self, now: DateTime<Utc>, window: Duration) {
        if self.last_sweep.is_some_and(|last| now - last < window) {
            return;
        }
        let window_start = now - window;
        let before = self.attempts.len() + self.blocks.len();
        self.attempts
            .retain(|_, attempts| attempts.last().is_some_and(|t| *t > window_start));
        self.blocks.retain(|_, until| now < *until);
        self.last_sweep = Some(now);

        let dropped = before - (self.attempts.len() + self.blocks.len());
        if dropped > 0 {
            tracing::debug!(dropped, "Stale rate-limit keys removed");
        }
    }
}

/// Throttles repeated authentication failures per key (IP or user id).
///
/// Failures are counted inside a sliding window of `window_seconds`; reaching
/// `max_attempts` locks the key out for [`LOCKOUT_MINUTES`]. State lives in
/// process memory only and is lost on restart.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    lockout: Duration,
    state: Mutex<LimiterState>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECONDS)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_seconds: i64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            window: Duration::seconds(window_seconds),
            lockout: Duration::minutes(LOCKOUT_MINUTES),
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// `(blocked, seconds_remaining)` for `key`.
    pub fn is_blocked(&self, key: &str) -> (bool, i64) {
        self.is_blocked_at(key, Utc::now())
    }

    pub fn is_blocked_at(&self, key: &str, now: DateTime<Utc>) -> (bool, i64) {
        let mut state = self.lock();
        state.sweep(now, self.window);

        match state.blocks.get(key).copied() {
            Some(until) if now < until => (true, (until - now).num_seconds()),
            Some(_) => {
                state.blocks.remove(key);
                tracing::debug!(key, "Lockout expired");
                (false, 0)
            }
            None => (false, 0),
        }
    }

    /// Records an authentication attempt and returns `(blocked, attempts_left)`.
    pub fn record_attempt(&self, key: &str, success: bool) -> (bool, u32) {
        self.record_attempt_at(key, success, Utc::now())
    }

    pub fn record_attempt_at(&self, key: &str, success: bool, now: DateTime<Utc>) -> (bool, u32) {
        let mut state = self.lock();
        state.sweep(now, self.window);

        if success {
            state.attempts.remove(key);
            return (false, self.max_attempts);
        }

        let window_start = now - self.window;
        let attempts = state.attempts.entry(key.to_string()).or_default();
        attempts.retain(|t| *t > window_start);
        attempts.push(now);

        let count = u32::try_from(attempts.len()).unwrap_or(u32::MAX);
        if count >= self.max_attempts {
            state.attempts.remove(key);
            let until = now + self.lockout;
            state.blocks.insert(key.to_string(), until);
            tracing::warn!(key, %until, "Rate limit exceeded, key locked out");
            return (true, 0);
        }

        (false, self.max_attempts - count)
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        // A poisoned lock only means a panic mid-update; the maps stay usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        let state = self.lock();
        state.attempts.len() + state.blocks.len()
    }
}
