use std::fmt;

/// A term in an index: a text value within a field.
///
/// Terms order by field first, then by text, which is the order a
/// [`TermSource`] iterates in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    field: String,
    text: String,
}

impl Term {
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

/// A sorted stream of terms that can be repositioned.
///
/// # Ordering precondition
///
/// After `seek(target)`, `next_term` must yield every term `>= target` in
/// ascending order. Fuzzy enumeration stops at the first term that leaves the
/// query's field or prefix, so a source that breaks this order silently
/// produces incomplete results. The order is trusted, never checked.
pub trait TermSource {
    /// Positions the source so the next term returned is the first one
    /// greater than or equal to `target`.
    fn seek(&mut self, target: &Term);

    /// Returns the next term, or `None` once the source is exhausted.
    fn next_term(&mut self) -> Option<Term>;

    /// Releases any resources held by the source. Called at most once.
    fn close(&mut self) {}
}

/// An in-memory [`TermSource`] over a sorted, de-duplicated list of terms.
///
/// # Examples
///
/// ```
/// use fuzzlito::{SortedTerms, Term, TermSource};
///
/// let mut terms = SortedTerms::from_texts("body", ["zebra", "apple", "kitten"]);
/// terms.seek(&Term::new("body", "b"));
///
/// assert_eq!(terms.next_term(), Some(Term::new("body", "kitten")));
/// assert_eq!(terms.next_term(), Some(Term::new("body", "zebra")));
/// assert_eq!(terms.next_term(), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SortedTerms {
    terms: Vec<Term>,
    position: usize,
}

impl SortedTerms {
    /// Sorts and de-duplicates `terms`, positioning the source at the start.
    pub fn new(mut terms: Vec<Term>) -> Self {
        terms.sort();
        terms.dedup();
        Self { terms, position: 0 }
    }

    /// Builds a source of terms that all live in `field`.
    pub fn from_texts<I, S>(field: &str, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Term::new(field, t)).collect())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl TermSource for SortedTerms {
    fn seek(&mut self, target: &Term) {
        self.position = self.terms.partition_point(|t| t < target);
    }

    fn next_term(&mut self) -> Option<Term> {
        let term = self.terms.get(self.position)?.clone();
        self.position += 1;
        Some(term)
    }

    fn close(&mut self) {
        self.position = self.terms.len();
    }
}

impl<T: TermSource + ?Sized> TermSource for Box<T> {
    fn seek(&mut self, target: &Term) {
        (**self).seek(target)
    }

    fn next_term(&mut self) -> Option<Term> {
        (**self).next_term()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
