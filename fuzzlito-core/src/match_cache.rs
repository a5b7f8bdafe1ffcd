use log::{debug, trace};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use crate::automaton::{AutomatonCompiler, LevenshteinCompiler, SharedAutomaton};
#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::Result;

/// Capacity used when none is given.
pub const DEFAULT_CACHE_SIZE: isize = 50;

static DEFAULT_CACHE: Lazy<MatchCache> = Lazy::new(MatchCache::default);

/// Returns the process-wide cache used by the convenience constructors.
///
/// Tests that need isolation should build their own [`MatchCache`] instead.
pub fn default_cache() -> &'static MatchCache {
    &DEFAULT_CACHE
}

/// Identifies one compiled automaton: the word and the edit distance it was
/// compiled for.
///
/// Lookups never build one; keys are only created for insertion and for
/// reporting resident entries through [`MatchCache::keys`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub max_distance: usize,
    pub word: String,
}

impl CacheKey {
    pub fn new(word: &str, max_distance: usize) -> Self {
        Self {
            max_distance,
            word: word.to_string(),
        }
    }
}

/// The map and its insertion order, always mutated together.
///
/// The map is keyed by distance, then word, so a lookup can borrow the word.
/// Every key in `order` is present in `map` and vice versa, and no distance
/// bucket is left empty.
#[derive(Default)]
struct Entries {
    map: HashMap<usize, HashMap<String, SharedAutomaton>>,
    order: VecDeque<CacheKey>,
}

impl Entries {
    fn get(&self, word: &str, max_distance: usize) -> Option<&SharedAutomaton> {
        self.map.get(&max_distance)?.get(word)
    }

    fn remove(&mut self, key: &CacheKey) {
        if let Some(words) = self.map.get_mut(&key.max_distance) {
            words.remove(&key.word);
            if words.is_empty() {
                self.map.remove(&key.max_distance);
            }
        }
    }

    /// Evicts oldest entries until there is room, then stores `automaton`.
    ///
    /// Returns the number of evicted entries. A key that is already resident
    /// keeps its queue position and has its value replaced.
    fn insert(&mut self, key: CacheKey, automaton: SharedAutomaton, capacity: usize) -> usize {
        let resident = self
            .map
            .get_mut(&key.max_distance)
            .and_then(|words| words.get_mut(&key.word));
        if let Some(slot) = resident {
            *slot = automaton;
            return 0;
        }

        let mut evicted = 0;
        while self.order.len() >= capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    debug!(
                        "evicting automaton for {:?} within {} edits",
                        oldest.word, oldest.max_distance
                    );
                    self.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }

        self.map
            .entry(key.max_distance)
            .or_default()
            .insert(key.word.clone(), automaton);
        self.order.push_back(key);
        evicted
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// A bounded, thread-safe cache of compiled automata keyed by
/// `(max_distance, word)`.
///
/// # Eviction
///
/// Entries are evicted first-in, first-out: a hit never changes an entry's
/// position, and the earliest inserted key is the first to go once the cache
/// is full. A capacity of zero or less disables caching, and every lookup
/// calls the compiler.
///
/// # Thread Safety
///
/// The map and its insertion order live behind one `parking_lot::RwLock`.
/// Hits only take the read lock, so concurrent readers never block each other.
/// On a miss the automaton is compiled with no lock held and the write lock is
/// taken only to evict and insert. Two threads missing on the same key may
/// both compile; only one result stays resident and both callers get a valid
/// automaton.
///
/// # Examples
///
/// ```
/// use fuzzlito_core::{Automaton, LevenshteinCompiler, MatchCache};
///
/// let cache = MatchCache::with_capacity(2, LevenshteinCompiler::new());
///
/// let first = cache.resolve("hello", 1).unwrap();
/// assert!(first.accepts("helo"));
///
/// cache.resolve("world", 1).unwrap();
/// cache.resolve("rust", 1).unwrap(); // evicts "hello"
///
/// assert!(!cache.contains("hello", 1));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct MatchCache<C = LevenshteinCompiler> {
    entries: RwLock<Entries>,
    cache_size: AtomicIsize,
    compiler: C,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<C: AutomatonCompiler> MatchCache<C> {
    /// Creates a cache holding up to [`DEFAULT_CACHE_SIZE`] automata.
    pub fn new(compiler: C) -> Self {
        Self::with_capacity(DEFAULT_CACHE_SIZE, compiler)
    }

    /// Creates a cache holding up to `cache_size` automata.
    ///
    /// A size of zero or less disables caching.
    pub fn with_capacity(cache_size: isize, compiler: C) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            cache_size: AtomicIsize::new(cache_size),
            compiler,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Returns the automaton for `word` within `max_distance` edits,
    /// compiling it on a miss.
    ///
    /// Compiler errors are returned unchanged and nothing is stored.
    pub fn resolve(&self, word: &str, max_distance: usize) -> Result<SharedAutomaton> {
        if self.cache_size() <= 0 {
            return self.compile(word, max_distance);
        }

        {
            let entries = self.entries.read();
            if let Some(automaton) = entries.get(word, max_distance) {
                trace!("automaton cache hit for {:?} within {}", word, max_distance);
                #[cfg(feature = "stats")]
                self.stats.record_hit();
                return Ok(Arc::clone(automaton));
            }
        } // Read lock released here

        #[cfg(feature = "stats")]
        self.stats.record_miss();

        let compiled = self.compile(word, max_distance)?;

        let mut entries = self.entries.write();
        // The size may have changed while compiling.
        let capacity = self.cache_size();
        if capacity <= 0 {
            return Ok(compiled);
        }
        let key = CacheKey::new(word, max_distance);
        let _evicted = entries.insert(key, Arc::clone(&compiled), capacity as usize);
        #[cfg(feature = "stats")]
        self.stats.record_evictions(_evicted as u64);
        Ok(compiled)
    }

    fn compile(&self, word: &str, max_distance: usize) -> Result<SharedAutomaton> {
        #[cfg(feature = "stats")]
        self.stats.record_compile();
        self.compiler.compile(word, max_distance)
    }
}

impl<C> MatchCache<C> {
    /// The configured capacity. Zero or less means caching is disabled.
    pub fn cache_size(&self) -> isize {
        self.cache_size.load(Ordering::Relaxed)
    }

    /// Changes the capacity.
    ///
    /// Shrinking does not evict anything immediately; the new bound is
    /// enforced on the next insertion.
    pub fn set_cache_size(&self, cache_size: isize) {
        self.cache_size.store(cache_size, Ordering::Relaxed);
    }

    /// Returns the compiler used on misses.
    ///
    /// Runtime settings of the compiler can be changed through this reference;
    /// they apply to future compiles only.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{LevenshteinCompiler, MatchCache};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// assert!(cache.compiler().use_hopcroft_karp());
    ///
    /// cache.compiler().set_use_hopcroft_karp(false);
    /// assert!(!cache.compiler().use_hopcroft_karp());
    /// ```
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Number of resident automata.
    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    /// Returns `true` if no automaton is resident.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{LevenshteinCompiler, MatchCache};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// assert!(cache.is_empty());
    ///
    /// cache.resolve("apple", 1).unwrap();
    /// assert!(!cache.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an automaton for `(word, max_distance)` is resident.
    pub fn contains(&self, word: &str, max_distance: usize) -> bool {
        self.entries.read().get(word, max_distance).is_some()
    }

    /// Resident keys, oldest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{CacheKey, LevenshteinCompiler, MatchCache};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// cache.resolve("apple", 1).unwrap();
    /// cache.resolve("apple", 2).unwrap();
    ///
    /// assert_eq!(
    ///     cache.keys(),
    ///     vec![CacheKey::new("apple", 1), CacheKey::new("apple", 2)]
    /// );
    /// ```
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.read().order.iter().cloned().collect()
    }

    /// Drops every resident automaton. Automata held by live matchers stay valid.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the cache's hit, miss, compile, and eviction counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{LevenshteinCompiler, MatchCache};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// cache.resolve("apple", 1).unwrap();
    /// cache.resolve("apple", 1).unwrap();
    ///
    /// assert_eq!(cache.stats().misses(), 1);
    /// assert_eq!(cache.stats().hits(), 1);
    /// ```
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new(LevenshteinCompiler::new())
    }
}
