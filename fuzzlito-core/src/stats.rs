use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing how a [`MatchCache`](crate::MatchCache) is being used.
///
/// A lookup that finds a resident automaton is a hit; one that does not is a
/// miss. Every call into the compiler is counted as a compile, which includes
/// lookups made while caching is disabled and redundant compiles caused by
/// two threads missing on the same key at once.
///
/// All counters use `Relaxed` atomics; they are diagnostics, not
/// synchronization.
///
/// # Examples
///
/// ```
/// use fuzzlito_core::CacheStats;
///
/// let stats = CacheStats::new();
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
/// stats.record_compile();
///
/// assert_eq!(stats.total_lookups(), 3);
/// assert_eq!(stats.compiles(), 1);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    compiles: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` with every counter at zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// assert_eq!(stats.hits(), 0);
    /// assert_eq!(stats.evictions(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            compiles: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Records a lookup that found a resident automaton.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup that found nothing and went on to compile.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one call into the compiler, whether or not it succeeded.
    #[inline]
    pub fn record_compile(&self) {
        self.compiles.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` entries dropped to make room for an insert.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_evictions(2);
    /// stats.record_evictions(0);
    /// assert_eq!(stats.evictions(), 2);
    /// ```
    #[inline]
    pub fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the number of cache hits.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_hit();
    /// assert_eq!(stats.hits(), 2);
    /// ```
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_miss();
    /// assert_eq!(stats.misses(), 1);
    /// ```
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of times the compiler was invoked.
    #[inline]
    pub fn compiles(&self) -> u64 {
        self.compiles.load(Ordering::Relaxed)
    }

    /// Number of entries dropped by FIFO eviction.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Cached lookups (hits + misses). Lookups made while caching is
    /// disabled are not counted here.
    #[inline]
    pub fn total_lookups(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Ratio of hits to lookups, or 0.0 before the first lookup.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Ratio of misses to lookups, or 1.0 before the first lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_miss();
    /// stats.record_miss();
    /// stats.record_miss();
    /// assert!((stats.miss_rate() - 0.75).abs() < f64::EPSILON);
    /// ```
    #[inline]
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Resets all counters to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_compile();
    /// stats.reset();
    /// assert_eq!(stats.total_lookups(), 0);
    /// assert_eq!(stats.compiles(), 0);
    /// ```
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.compiles.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            compiles: AtomicU64::new(self.compiles()),
            evictions: AtomicU64::new(self.evictions()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.compiles(), 0);
        assert_eq!(stats.evictions(), 0);
    }

    #[test]
    fn test_rates() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.total_lookups(), 3);
        assert!((stats.hit_rate() - 0.3333).abs() < 0.001);
        assert!((stats.miss_rate() - 0.6666).abs() < 0.001);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 1.0);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_compile();
        stats.record_evictions(1);

        stats.reset();
        assert_eq!(stats.total_lookups(), 0);
        assert_eq!(stats.compiles(), 0);
        assert_eq!(stats.evictions(), 0);
    }

    #[test]
    fn test_clone_is_a_snapshot() {
        let stats = CacheStats::new();
        stats.record_compile();

        let cloned = stats.clone();
        stats.record_compile();
        assert_eq!(stats.compiles(), 2);
        assert_eq!(cloned.compiles(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(CacheStats::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_hit();
                    }
                    for _ in 0..50 {
                        stats.record_miss();
                        stats.record_compile();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.hits(), 1000);
        assert_eq!(stats.misses(), 500);
        assert_eq!(stats.compiles(), 500);
    }
}
