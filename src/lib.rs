//! # Fuzzlito
//!
//! Fuzzy term lookup over sorted term indexes.
//!
//! Given a query term and a similarity floor, [`FuzzyTermEnum`] walks a sorted
//! [`TermSource`] and yields every term within the tolerated edit distance.
//! The Levenshtein automaton that does the matching is compiled once per
//! `(word, distance)` pair and kept in a bounded [`MatchCache`], so repeated
//! queries for the same word skip the expensive construction step.
//!
//! ## Features
//!
//! - **Compiled automata**: Subset construction with optional Hopcroft minimization
//! - **Bounded cache**: FIFO eviction, capacity adjustable at runtime, zero disables it
//! - **Thread-safe**: Cache hits only take a shared read lock; compiles run unlocked
//! - **Prefix pruning**: Enumeration ends at the first term past the required prefix
//! - **Statistics**: Hit, miss, compile, and eviction counters (`stats` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use fuzzlito::{FuzzyMatcher, FuzzyOptions, FuzzyTermEnum, SortedTerms, Term};
//!
//! // One-off checks go through the process-wide cache
//! assert!(FuzzyMatcher::is_match("kitten", "sitting", 3).unwrap());
//!
//! // Enumerate a sorted term list
//! let source = SortedTerms::from_texts("body", ["hello", "help", "helmet", "world"]);
//! let options = FuzzyOptions::default().with_prefix_length(2);
//! let fuzzy = FuzzyTermEnum::new(source, Term::new("body", "hello"), options).unwrap();
//!
//! let matches: Vec<String> = fuzzy.map(|m| m.term.text().to_string()).collect();
//! assert_eq!(matches, vec!["hello", "help"]);
//! ```
//!
//! ## Isolated Caches
//!
//! The convenience constructors share one process-wide cache. Pass an explicit
//! [`MatchCache`] to keep independent components (or tests) apart:
//!
//! ```rust
//! use fuzzlito::{FuzzyOptions, FuzzyTermEnum, LevenshteinCompiler, MatchCache, SortedTerms, Term};
//!
//! let cache = MatchCache::with_capacity(8, LevenshteinCompiler::new());
//! let source = SortedTerms::from_texts("body", ["kitten", "sitting"]);
//! let fuzzy = FuzzyTermEnum::with_cache(&cache, source, Term::new("body", "kitten"), FuzzyOptions::default()).unwrap();
//!
//! assert_eq!(fuzzy.count(), 2);
//! assert_eq!(cache.len(), 1);
//! ```
mod fuzzy_enum;
mod term;

pub use fuzzy_enum::{
    max_edit_distance, FuzzyMatch, FuzzyOptions, FuzzyTermEnum, DEFAULT_MINIMUM_SIMILARITY,
    DEFAULT_PREFIX_LENGTH,
};
pub use term::{SortedTerms, Term, TermSource};

pub use fuzzlito_core::{
    default_cache, Automaton, AutomatonCompiler, CacheKey, Error, FuzzyMatcher,
    LevenshteinCompiler, LevenshteinDfa, LevenshteinNfa, MatchCache, Result, SharedAutomaton,
    DEFAULT_CACHE_SIZE, DEFAULT_DFA_BUDGET, DEFAULT_MAX_DISTANCE,
};

#[cfg(feature = "stats")]
pub use fuzzlito_core::CacheStats;
