use std::fmt;

use crate::automaton::{AutomatonCompiler, SharedAutomaton};
use crate::match_cache::{default_cache, MatchCache};
use crate::Result;

/// Edit distance bound to a matcher when none is given.
pub const DEFAULT_MAX_DISTANCE: usize = 1;

/// Tests candidates against one `(word, max_distance)` pair.
///
/// The automaton is resolved through a [`MatchCache`] once, at construction;
/// after that `matches` is a pure lookup and the matcher can be shared freely
/// between threads.
///
/// # Examples
///
/// ```
/// use fuzzlito_core::FuzzyMatcher;
///
/// let matcher = FuzzyMatcher::new("kitten", 3).unwrap();
/// assert!(matcher.matches("sitting"));
/// assert!(!matcher.matches("venture"));
///
/// assert!(FuzzyMatcher::is_match("hello", "hallo", 1).unwrap());
/// ```
#[derive(Clone)]
pub struct FuzzyMatcher {
    word: String,
    max_distance: usize,
    automaton: SharedAutomaton,
}

impl FuzzyMatcher {
    /// Binds a matcher using the process-wide default cache.
    pub fn new(word: &str, max_distance: usize) -> Result<Self> {
        Self::with_cache(default_cache(), word, max_distance)
    }

    /// Binds a matcher for `word` within [`DEFAULT_MAX_DISTANCE`] edits.
    pub fn with_default_distance(word: &str) -> Result<Self> {
        Self::new(word, DEFAULT_MAX_DISTANCE)
    }

    /// Binds a matcher resolved through `cache`.
    pub fn with_cache<C: AutomatonCompiler>(
        cache: &MatchCache<C>,
        word: &str,
        max_distance: usize,
    ) -> Result<Self> {
        let automaton = cache.resolve(word, max_distance)?;
        Ok(Self {
            word: word.to_string(),
            max_distance,
            automaton,
        })
    }

    /// Whether `candidate` is within `max_distance` edits of the bound word.
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        self.automaton.accepts(candidate)
    }

    /// One-shot test through the default cache.
    pub fn is_match(word: &str, candidate: &str, max_distance: usize) -> Result<bool> {
        Self::is_match_with(default_cache(), word, candidate, max_distance)
    }

    /// One-shot test through `cache`.
    pub fn is_match_with<C: AutomatonCompiler>(
        cache: &MatchCache<C>,
        word: &str,
        candidate: &str,
        max_distance: usize,
    ) -> Result<bool> {
        Ok(Self::with_cache(cache, word, max_distance)?.matches(candidate))
    }

    /// Returns the word candidates are compared against.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{FuzzyMatcher, LevenshteinCompiler, MatchCache};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// let matcher = FuzzyMatcher::with_cache(&cache, "kitten", 2).unwrap();
    /// assert_eq!(matcher.word(), "kitten");
    /// ```
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Returns the number of edits a candidate may be away from the word.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{FuzzyMatcher, LevenshteinCompiler, MatchCache, DEFAULT_MAX_DISTANCE};
    ///
    /// let cache = MatchCache::new(LevenshteinCompiler::new());
    /// let matcher = FuzzyMatcher::with_cache(&cache, "kitten", 2).unwrap();
    /// assert_eq!(matcher.max_distance(), 2);
    ///
    /// let matcher = FuzzyMatcher::with_default_distance("kitten").unwrap();
    /// assert_eq!(matcher.max_distance(), DEFAULT_MAX_DISTANCE);
    /// ```
    pub fn max_distance(&self) -> usize {
        self.max_distance
    }
}

impl fmt::Debug for FuzzyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyMatcher")
            .field("word", &self.word)
            .field("max_distance", &self.max_distance)
            .finish_non_exhaustive()
    }
}
