//! A per-key token bucket, shared by the HTTP front door and the
//! per-connection input stream. Thread-safe: one mutex guards the whole
//! bucket map, since the map itself is membership-only state, so a
//! single short-held lock per call is cheap.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Wall-clock time, seconds, as an `f64` so callers can pass
/// `Instant::elapsed().as_secs_f64()` or a synthetic clock in tests
/// without this crate depending on `std::time` directly.
pub type Seconds = f64;

struct Bucket {
    tokens: f64,
    last_refill: Seconds,
}

/// Token-bucket rate limiter keyed by `K`. `allow` is the only entry
/// point: on the first call for a key the bucket starts full.
pub struct RateLimiter<K> {
    max_tokens: f64,
    refill_per_second: f64,
    buckets: Mutex<FxHashMap<K, Bucket>>,
}

impl<K: Eq + Hash + Clone> RateLimiter<K> {
    #[must_use]
    pub fn new(max_tokens: u32, refill_per_second: f64) -> Self {
        Self {
            max_tokens: f64::from(max_tokens),
            refill_per_second,
            buckets: Mutex::new(FxHashMap::default()),
        }
    }

    /// Attempts to consume one token from `key`'s bucket at time `now`
    /// (seconds, monotonically non-decreasing for a given key). Refills
    /// the bucket by elapsed time since the last call before checking,
    /// capped at `max_tokens`. Returns `true` and consumes a token if at
    /// least one was available.
    pub fn allow(&self, key: K, now: Seconds) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            tokens: self.max_tokens,
            last_refill: now,
        });

        let elapsed = (now - bucket.last_refill).max(0.0);
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_second).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops a key's bucket, e.g. when a connection closes. Not
    /// strictly necessary for correctness (an idle bucket just sits
    /// there refilling), but keeps the map from growing unboundedly
    /// under long-running processes with many short-lived keys.
    pub fn remove(&self, key: &K) {
        self.buckets.lock().remove(key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full_and_drains() {
        let limiter = RateLimiter::new(3, 1.0);
        assert!(limiter.allow("a", 0.0));
        assert!(limiter.allow("a", 0.0));
        assert!(limiter.allow("a", 0.0));
        assert!(!limiter.allow("a", 0.0));
    }

    #[test]
    fn refills_over_time() {
        let limiter = RateLimiter::new(1, 2.0);
        assert!(limiter.allow("a", 0.0));
        assert!(!limiter.allow("a", 0.1));
        assert!(limiter.allow("a", 1.0));
    }

    #[test]
    fn refill_never_exceeds_max_tokens() {
        let limiter = RateLimiter::new(2, 100.0);
        assert!(limiter.allow("a", 0.0));
        assert!(limiter.allow("a", 1000.0));
        assert!(limiter.allow("a", 1000.0));
        assert!(!limiter.allow("a", 1000.0));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1, 0.0);
        assert!(limiter.allow("a", 0.0));
        assert!(limiter.allow("b", 0.0));
        assert!(!limiter.allow("a", 0.0));
    }

    #[test]
    fn remove_resets_the_bucket() {
        let limiter = RateLimiter::new(1, 0.0);
        assert!(limiter.allow("a", 0.0));
        assert!(!limiter.allow("a", 0.0));
        limiter.remove(&"a");
        assert!(limiter.allow("a", 0.0));
    }
}
