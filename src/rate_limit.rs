use dashmap::DashMap;
use std::time::{Duration, Instant};

// Rate limit entry - tracks admissions for one key in the current window
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

// Fixed-window admission gate for expensive calls, keyed by
// "{operation}-{user}". Per-process only: horizontally scaled
// instances each count independently, which is accepted best-effort
// behavior. Entries for abandoned keys linger until overwritten.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    // Returns true if the caller may proceed. Total over any key;
    // a missing entry is the normal first-call case, not an error.
    // The DashMap entry guard holds the shard lock across the whole
    // read-modify-write, so concurrent callers cannot interleave.
    pub fn check_and_admit(&self, key: &str) -> bool {
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // Window expired? Start a fresh one with this admission
        if entry.window_start.elapsed() >= self.window {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        // Under the limit? Count it and allow
        if entry.count < self.max_requests {
            entry.count += 1;
            return true;
        }

        // Over the limit - entry left untouched
        false
    }

    // Drops any state for the key so the next check gets a fresh
    // window. No-op for unknown keys.
    pub fn reset(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn admits_up_to_capacity_then_rejects() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        for i in 0..10 {
            assert!(limiter.check_and_admit("analyze-u1"), "call {} rejected", i + 1);
        }
        assert!(!limiter.check_and_admit("analyze-u1"));
        assert!(!limiter.check_and_admit("analyze-u1"));
    }

    #[test]
    fn keys_are_isolated() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check_and_admit("analyze-a"));
        assert!(limiter.check_and_admit("analyze-a"));
        assert!(!limiter.check_and_admit("analyze-a"));

        // Exhausting "a" must not touch "b"
        assert!(limiter.check_and_admit("analyze-b"));
        assert!(limiter.check_and_admit("analyze-b"));
        assert!(!limiter.check_and_admit("analyze-b"));
    }

    #[test]
    fn window_rollover_grants_fresh_budget() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        assert!(limiter.check_and_admit("k"));
        assert!(limiter.check_and_admit("k"));
        assert!(!limiter.check_and_admit("k"));

        sleep(Duration::from_millis(80));

        // Rollover admits and restarts the count at 1
        assert!(limiter.check_and_admit("k"));
        assert!(limiter.check_and_admit("k"));
        assert!(!limiter.check_and_admit("k"));
    }

    #[test]
    fn reset_is_idempotent_and_grants_fresh_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check_and_admit("k"));
        assert!(!limiter.check_and_admit("k"));

        limiter.reset("k");
        assert!(limiter.check_and_admit("k"));

        // Resetting keys that do not exist is a no-op
        limiter.reset("k");
        limiter.reset("never-seen");
    }
}
