//! Error types for fuzzlito

use thiserror::Error;

/// Result type alias for fuzzlito operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring matchers or compiling automata.
///
/// Compilation failures are passed through the cache and matcher unchanged,
/// and are never stored in the cache.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Minimum similarity outside `[0, 1)`
    #[error("minimum similarity must be in [0, 1), got {0}")]
    InvalidSimilarity(f32),

    /// Determinization produced more states than the compiler allows
    #[error("automaton for {word:?} within distance {max_distance} exceeds {limit} states")]
    AutomatonTooLarge {
        word: String,
        max_distance: usize,
        limit: usize,
    },
}
