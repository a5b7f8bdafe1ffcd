use fuzzlito_core::{default_cache, AutomatonCompiler, Error, FuzzyMatcher, MatchCache, Result};
use log::{debug, trace};

use crate::term::{Term, TermSource};

/// Similarity floor used when none is given.
pub const DEFAULT_MINIMUM_SIMILARITY: f32 = 0.5;

/// Required common prefix length used when none is given.
pub const DEFAULT_PREFIX_LENGTH: usize = 0;

/// Parameters of a fuzzy term query.
///
/// # Examples
///
/// ```
/// use fuzzlito::FuzzyOptions;
///
/// let options = FuzzyOptions::default()
///     .with_minimum_similarity(0.7)
///     .with_prefix_length(2);
///
/// assert!(options.validate().is_ok());
/// assert!(FuzzyOptions::default().with_minimum_similarity(1.0).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyOptions {
    /// Similarity floor in `[0, 1)`.
    pub minimum_similarity: f32,
    /// Number of leading characters every candidate must share with the query.
    pub prefix_length: usize,
}

impl FuzzyOptions {
    pub fn with_minimum_similarity(mut self, minimum_similarity: f32) -> Self {
        self.minimum_similarity = minimum_similarity;
        self
    }

    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Rejects a similarity floor outside `[0, 1)`, NaN included.
    pub fn validate(&self) -> Result<()> {
        if (0.0..1.0).contains(&self.minimum_similarity) {
            Ok(())
        } else {
            Err(Error::InvalidSimilarity(self.minimum_similarity))
        }
    }
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            minimum_similarity: DEFAULT_MINIMUM_SIMILARITY,
            prefix_length: DEFAULT_PREFIX_LENGTH,
        }
    }
}

/// Largest edit distance that still satisfies `minimum_similarity`.
///
/// `other_len` is the length of the term being compared against; the
/// enumerator passes the query remainder's own length so a single automaton
/// serves every candidate.
pub fn max_edit_distance(
    minimum_similarity: f32,
    remainder_len: usize,
    other_len: usize,
    prefix_len: usize,
) -> usize {
    let span = (remainder_len.min(other_len) + prefix_len) as f32;
    ((1.0 - minimum_similarity) * span).floor() as usize
}

/// A term accepted by [`FuzzyTermEnum`] together with its scaled score.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyMatch {
    pub term: Term,
    pub difference: f32,
}

/// Walks a sorted [`TermSource`] and yields the terms within the query's
/// similarity floor, in ascending order.
///
/// Every candidate must carry the query's field and its first
/// `prefix_length` characters. Because the source is sorted, the first term
/// that does not is past every possible match, and enumeration ends there.
/// The remaining suffix is tested with a [`FuzzyMatcher`] compiled once for
/// the query remainder.
///
/// # Examples
///
/// ```
/// use fuzzlito::{FuzzyOptions, FuzzyTermEnum, SortedTerms, Term};
///
/// let source = SortedTerms::from_texts("body", ["apple", "kitten", "sitting", "venture", "zebra"]);
/// let fuzzy = FuzzyTermEnum::new(source, Term::new("body", "kitten"), FuzzyOptions::default()).unwrap();
///
/// let texts: Vec<String> = fuzzy.map(|m| m.term.text().to_string()).collect();
/// assert_eq!(texts, vec!["kitten", "sitting"]);
/// ```
pub struct FuzzyTermEnum<S: TermSource> {
    source: Option<S>,
    search_term: Option<Term>,
    field: String,
    prefix: String,
    matcher: FuzzyMatcher,
    minimum_similarity: f32,
    scale_factor: f32,
    similarity: f32,
    end_enum: bool,
}

impl<S: TermSource> FuzzyTermEnum<S> {
    /// Creates an enumerator that resolves its automaton through the
    /// process-wide default cache.
    pub fn new(source: S, term: Term, options: FuzzyOptions) -> Result<Self> {
        Self::with_cache(default_cache(), source, term, options)
    }

    /// Creates an enumerator that resolves its automaton through `cache`.
    ///
    /// A `prefix_length` longer than the query text is clamped to it.
    pub fn with_cache<C: AutomatonCompiler>(
        cache: &MatchCache<C>,
        mut source: S,
        term: Term,
        options: FuzzyOptions,
    ) -> Result<Self> {
        options.validate()?;

        let text_len = term.text().chars().count();
        let prefix_len = options.prefix_length.min(text_len);
        let split = term
            .text()
            .char_indices()
            .nth(prefix_len)
            .map_or(term.text().len(), |(i, _)| i);
        let (prefix, remainder) = term.text().split_at(split);
        let remainder_len = text_len - prefix_len;

        let max_distance = max_edit_distance(
            options.minimum_similarity,
            remainder_len,
            remainder_len,
            prefix_len,
        );
        let matcher = FuzzyMatcher::with_cache(cache, remainder, max_distance)?;
        debug!(
            "fuzzy enumeration for {} with prefix {:?} within {} edits",
            term, prefix, max_distance
        );

        let prefix = prefix.to_string();
        let field = term.field().to_string();
        source.seek(&Term::new(field.as_str(), prefix.as_str()));

        Ok(Self {
            source: Some(source),
            search_term: Some(term),
            field,
            prefix,
            matcher,
            minimum_similarity: options.minimum_similarity,
            scale_factor: 1.0 / (1.0 - options.minimum_similarity),
            similarity: options.minimum_similarity,
            end_enum: false,
        })
    }

    /// Decides whether `term` is a match, ending the enumeration when it
    /// leaves the query's field or prefix.
    pub fn term_compare(&mut self, term: &Term) -> bool {
        if term.field() == self.field {
            if let Some(suffix) = term.text().strip_prefix(self.prefix.as_str()) {
                if self.matcher.matches(suffix) {
                    self.similarity = 1.0;
                    return true;
                }
                self.similarity = self.minimum_similarity;
                return false;
            }
        }
        trace!("fuzzy enumeration ends at {}", term);
        self.similarity = self.minimum_similarity;
        self.end_enum = true;
        false
    }

    /// Score of the last compared term, rescaled so the similarity floor maps
    /// to zero.
    pub fn difference(&self) -> f32 {
        (self.similarity - self.minimum_similarity) * self.scale_factor
    }

    /// Whether no further term can match.
    pub fn end_enum(&self) -> bool {
        self.end_enum
    }

    /// Edit distance the remainder automaton was compiled for.
    pub fn max_distance(&self) -> usize {
        self.matcher.max_distance()
    }

    /// The literal prefix every match shares with the query.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The query term, or `None` once closed.
    pub fn term(&self) -> Option<&Term> {
        self.search_term.as_ref()
    }

    /// Releases the query term and the source. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
        self.search_term = None;
        self.end_enum = true;
    }
}

impl<S: TermSource> Iterator for FuzzyTermEnum<S> {
    type Item = FuzzyMatch;

    fn next(&mut self) -> Option<FuzzyMatch> {
        while !self.end_enum {
            let Some(term) = self.source.as_mut().and_then(|s| s.next_term()) else {
                self.end_enum = true;
                break;
            };
            if self.term_compare(&term) {
                return Some(FuzzyMatch {
                    term,
                    difference: self.difference(),
                });
            }
        }
        None
    }
}

impl<S: TermSource> Drop for FuzzyTermEnum<S> {
    fn drop(&mut self) {
        self.close();
    }
}
