//! # Fuzzlito Core
//!
//! Compiled Levenshtein automata and the cache that keeps them around.
//!
//! Building a Levenshtein automaton is expensive compared to running one, so
//! matchers resolve their automaton through a bounded [`MatchCache`] keyed by
//! `(max_distance, word)`. Repeated queries for the same parameters reuse the
//! compiled automaton instead of rebuilding it.
//!
//! ## Module Organization
//!
//! - [`automaton`] - The [`Automaton`] and [`AutomatonCompiler`] capabilities,
//!   the built-in [`LevenshteinCompiler`], and the [`LevenshteinDfa`] and
//!   [`LevenshteinNfa`] it produces
//! - [`match_cache`] - FIFO cache of compiled automata behind a `parking_lot::RwLock`
//! - [`matcher`] - [`FuzzyMatcher`], a handle bound to one word and distance
//! - [`error`] - Error type shared by the whole crate family
//!
//! ## Example
//!
//! ```
//! use fuzzlito_core::{FuzzyMatcher, LevenshteinCompiler, MatchCache};
//!
//! let cache = MatchCache::with_capacity(16, LevenshteinCompiler::new());
//! let matcher = FuzzyMatcher::with_cache(&cache, "lucene", 1).unwrap();
//!
//! assert!(matcher.matches("lucena"));
//! assert!(!matcher.matches("solr"));
//! assert_eq!(cache.len(), 1);
//! ```
pub mod automaton;
pub mod error;
pub mod match_cache;
pub mod matcher;

#[cfg(feature = "stats")]
mod stats;

pub use automaton::{
    Automaton, AutomatonCompiler, LevenshteinCompiler, LevenshteinDfa, LevenshteinNfa,
    SharedAutomaton, DEFAULT_DFA_BUDGET,
};
pub use error::{Error, Result};
pub use match_cache::{default_cache, CacheKey, MatchCache, DEFAULT_CACHE_SIZE};
pub use matcher::{FuzzyMatcher, DEFAULT_MAX_DISTANCE};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
