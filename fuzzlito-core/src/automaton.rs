use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Error, Result};

/// A compiled acceptor that answers membership queries for candidate strings.
///
/// Implementations are immutable once built and are shared between every
/// matcher resolved for the same `(word, distance)` pair, so they must be
/// safe to query from many threads at once.
pub trait Automaton: Send + Sync {
    /// Returns `true` if `candidate` belongs to the accepted language.
    fn accepts(&self, candidate: &str) -> bool;
}

/// Shared handle to a compiled automaton.
pub type SharedAutomaton = Arc<dyn Automaton>;

/// Builds automata accepting every string within `max_distance` edits of `word`.
///
/// The cache calls this on a miss, outside of any lock. Errors are returned to
/// the caller unchanged.
pub trait AutomatonCompiler: Send + Sync {
    fn compile(&self, word: &str, max_distance: usize) -> Result<SharedAutomaton>;
}

/// Number of DFA states [`LevenshteinCompiler`] builds before it stops
/// determinizing and matches with the NFA instead.
pub const DEFAULT_DFA_BUDGET: usize = 10_000;

/// Compiles Levenshtein automata by subset construction, optionally followed
/// by Hopcroft minimization.
///
/// The deterministic automaton grows exponentially with the distance. When
/// determinization passes the DFA budget, the compiler hands out the
/// [`LevenshteinNfa`] for the same language instead, so long queries at large
/// distances still compile. Setting [`with_max_states`](Self::with_max_states)
/// makes compiles strict: they always determinize, and fail once the cap is
/// passed.
///
/// # Examples
///
/// ```
/// use fuzzlito_core::{Automaton, LevenshteinCompiler};
///
/// let compiler = LevenshteinCompiler::new();
/// let dfa = compiler.build("kitten", 3).unwrap();
///
/// assert!(dfa.accepts("sitting"));
/// assert!(!dfa.accepts("venture"));
/// ```
#[derive(Debug)]
pub struct LevenshteinCompiler {
    use_hopcroft_karp: AtomicBool,
    dfa_budget: usize,
    max_states: Option<usize>,
}

impl LevenshteinCompiler {
    /// Creates a compiler with minimization enabled, the default DFA budget,
    /// and no state cap.
    pub fn new() -> Self {
        Self {
            use_hopcroft_karp: AtomicBool::new(true),
            dfa_budget: DEFAULT_DFA_BUDGET,
            max_states: None,
        }
    }

    /// Sets how many DFA states a compile may build before falling back to
    /// NFA matching.
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{AutomatonCompiler, LevenshteinCompiler};
    ///
    /// let compiler = LevenshteinCompiler::new().with_dfa_budget(1);
    /// assert_eq!(compiler.dfa_budget(), 1);
    ///
    /// // Too large for the budget, still matched exactly
    /// let automaton = compiler.compile("kitten", 2).unwrap();
    /// assert!(automaton.accepts("kiten"));
    /// assert!(!automaton.accepts("sitting"));
    /// ```
    pub fn with_dfa_budget(mut self, dfa_budget: usize) -> Self {
        self.dfa_budget = dfa_budget;
        self
    }

    pub fn dfa_budget(&self) -> usize {
        self.dfa_budget
    }

    /// Caps the number of DFA states a compile may produce.
    ///
    /// With a cap set, compiles never fall back to NFA matching: automata
    /// that would exceed it fail with [`Error::AutomatonTooLarge`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fuzzlito_core::{Error, LevenshteinCompiler};
    ///
    /// let compiler = LevenshteinCompiler::new().with_max_states(4);
    /// assert_eq!(compiler.max_states(), Some(4));
    ///
    /// let err = compiler.build("abcdefgh", 3).unwrap_err();
    /// assert!(matches!(err, Error::AutomatonTooLarge { limit: 4, .. }));
    /// ```
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    /// The state cap, or `None` when compiles are uncapped.
    pub fn max_states(&self) -> Option<usize> {
        self.max_states
    }

    /// Whether compiled automata are minimized after determinization.
    pub fn use_hopcroft_karp(&self) -> bool {
        self.use_hopcroft_karp.load(Ordering::Relaxed)
    }

    /// Enables or disables minimization for all future compiles.
    ///
    /// Automata that were already compiled (and possibly cached) are untouched.
    pub fn set_use_hopcroft_karp(&self, enabled: bool) {
        self.use_hopcroft_karp.store(enabled, Ordering::Relaxed);
    }

    /// Builds the full DFA for `word` within `max_distance` edits.
    ///
    /// Ignores the DFA budget. Only the state cap, when set, bounds the build.
    pub fn build(&self, word: &str, max_distance: usize) -> Result<LevenshteinDfa> {
        let limit = self.max_states.unwrap_or(usize::MAX);
        LevenshteinNfa::new(word, max_distance)
            .determinize(limit)
            .map(|dfa| self.finish(dfa))
            .ok_or_else(|| too_large(word, max_distance, limit))
    }

    fn finish(&self, dfa: LevenshteinDfa) -> LevenshteinDfa {
        if self.use_hopcroft_karp() {
            dfa.minimize()
        } else {
            dfa
        }
    }
}

impl Default for LevenshteinCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomatonCompiler for LevenshteinCompiler {
    fn compile(&self, word: &str, max_distance: usize) -> Result<SharedAutomaton> {
        let nfa = LevenshteinNfa::new(word, max_distance);
        let limit = self.max_states.unwrap_or(self.dfa_budget);
        match nfa.determinize(limit) {
            Some(dfa) => {
                let dfa = self.finish(dfa);
                debug!(
                    "compiled automaton for {:?} within {} edits ({} states)",
                    word,
                    max_distance,
                    dfa.state_count()
                );
                Ok(Arc::new(dfa))
            }
            None if self.max_states.is_some() => Err(too_large(word, max_distance, limit)),
            None => {
                debug!(
                    "automaton for {:?} within {} edits exceeds {} states, matching with the NFA",
                    word, max_distance, limit
                );
                Ok(Arc::new(nfa))
            }
        }
    }
}

fn too_large(word: &str, max_distance: usize, limit: usize) -> Error {
    Error::AutomatonTooLarge {
        word: word.to_string(),
        max_distance,
        limit,
    }
}

fn class_of(alphabet: &[char], c: char) -> usize {
    match alphabet.binary_search(&c) {
        Ok(class) => class,
        Err(_) => alphabet.len(),
    }
}

/// NFA state: characters of the word consumed, edits spent.
type Position = (usize, usize);

/// Nondeterministic Levenshtein automaton, matched by tracking the set of
/// live positions while reading the candidate.
///
/// This is the source [`LevenshteinDfa`] is determinized from. Matching
/// directly costs more per character but needs no table, so it serves
/// queries whose DFA would be too large to build.
///
/// # Examples
///
/// ```
/// use fuzzlito_core::{Automaton, LevenshteinNfa};
///
/// let nfa = LevenshteinNfa::new("internationalization", 10);
/// assert!(nfa.accepts("internationalisation"));
/// assert!(nfa.accepts("international"));
/// assert!(!nfa.accepts("intercontinental"));
/// ```
#[derive(Debug, Clone)]
pub struct LevenshteinNfa {
    /// Distinct characters of the word, sorted; index is the symbol class.
    alphabet: Vec<char>,
    /// Symbol class of each character of the word.
    classes: Vec<usize>,
    max_distance: usize,
}

impl LevenshteinNfa {
    pub fn new(word: &str, max_distance: usize) -> Self {
        let chars: Vec<char> = word.chars().collect();
        let mut alphabet = chars.clone();
        alphabet.sort_unstable();
        alphabet.dedup();

        let classes = chars.iter().map(|&c| class_of(&alphabet, c)).collect();
        Self {
            alphabet,
            classes,
            max_distance,
        }
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    fn len(&self) -> usize {
        self.classes.len()
    }

    fn start(&self) -> Vec<Position> {
        vec![(0, 0)]
    }

    fn step(&self, states: &[Position], class: usize) -> Vec<Position> {
        let (n, k) = (self.len(), self.max_distance);
        let mut next = Vec::with_capacity(states.len() * 3);
        for &(i, e) in states {
            // Match at the nearest position reachable by deleting word
            // characters; farther matches are subsumed by this one.
            if let Some(d) = (0..=(n - i).min(k - e))
                .find(|&d| i + d < n && self.classes[i + d] == class)
            {
                next.push((i + d + 1, e + d));
            }
            if e < k {
                // insertion
                next.push((i, e + 1));
                if i < n {
                    // substitution
                    next.push((i + 1, e + 1));
                }
            }
        }
        self.normalize(next)
    }

    /// Drops positions subsumed by a cheaper one: `(i, e)` covers `(j, f)`
    /// when `e < f` and `|i - j| <= f - e`. Deletions are taken inside
    /// `step` and `is_accepting`, so they never need to be stored. The result
    /// is sorted so it can key the subset table.
    fn normalize(&self, mut states: Vec<Position>) -> Vec<Position> {
        states.sort_unstable();
        states.dedup();

        states
            .iter()
            .copied()
            .filter(|&(j, f)| {
                !states
                    .iter()
                    .any(|&(i, e)| e < f && i.abs_diff(j) <= f - e)
            })
            .collect()
    }

    fn is_accepting(&self, states: &[Position]) -> bool {
        states
            .iter()
            .any(|&(i, e)| self.len() - i <= self.max_distance - e)
    }

    /// Subset construction over symbol classes. Returns `None` once more
    /// than `limit` states are needed.
    fn determinize(&self, limit: usize) -> Option<LevenshteinDfa> {
        let stride = self.alphabet.len() + 1;
        let mut ids: HashMap<Vec<Position>, u32> = HashMap::new();
        let mut sets: Vec<Vec<Position>> = Vec::new();
        // State 0 is the empty set: the only dead state.
        let dead = intern(&mut ids, &mut sets, Vec::new());
        let start = intern(&mut ids, &mut sets, self.start());

        let mut transitions = Vec::new();
        let mut accepting = Vec::new();
        let mut state = 0;
        while state < sets.len() {
            let current = sets[state].clone();
            accepting.push(self.is_accepting(&current));
            for class in 0..stride {
                let target = self.step(&current, class);
                transitions.push(intern(&mut ids, &mut sets, target));
            }
            if sets.len() > limit {
                return None;
            }
            state += 1;
        }

        Some(LevenshteinDfa {
            alphabet: self.alphabet.clone(),
            transitions,
            accepting,
            start,
            dead: Some(dead),
        })
    }
}

impl Automaton for LevenshteinNfa {
    fn accepts(&self, candidate: &str) -> bool {
        let mut states = self.start();
        for c in candidate.chars() {
            states = self.step(&states, class_of(&self.alphabet, c));
            if states.is_empty() {
                return false;
            }
        }
        self.is_accepting(&states)
    }
}

/// Deterministic Levenshtein automaton over the characters of one word.
///
/// Input characters are mapped to a symbol class: one class per distinct
/// character of the word plus a shared class for every other character.
#[derive(Debug, Clone)]
pub struct LevenshteinDfa {
    alphabet: Vec<char>,
    transitions: Vec<u32>,
    accepting: Vec<bool>,
    start: u32,
    dead: Option<u32>,
}

impl LevenshteinDfa {
    /// Merges equivalent states with Hopcroft's partition refinement.
    fn minimize(self) -> Self {
        let n = self.state_count();
        let stride = self.stride();

        let mut inverse: Vec<Vec<usize>> = vec![Vec::new(); n * stride];
        for s in 0..n {
            for class in 0..stride {
                let t = self.transitions[s * stride + class] as usize;
                inverse[t * stride + class].push(s);
            }
        }

        let (accepting, rejecting): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&s| self.accepting[s]);
        let mut blocks: Vec<Vec<usize>> = Vec::new();
        let mut block_of = vec![0usize; n];
        for group in [accepting, rejecting] {
            if !group.is_empty() {
                for &s in &group {
                    block_of[s] = blocks.len();
                }
                blocks.push(group);
            }
        }

        let mut worklist: Vec<usize> = (0..blocks.len()).collect();
        let mut in_worklist = vec![true; blocks.len()];
        let mut marked = vec![false; n];

        while let Some(splitter) = worklist.pop() {
            in_worklist[splitter] = false;
            let members = blocks[splitter].clone();

            for class in 0..stride {
                let mut touched: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for &t in &members {
                    for &p in &inverse[t * stride + class] {
                        if !marked[p] {
                            marked[p] = true;
                            touched.entry(block_of[p]).or_default().push(p);
                        }
                    }
                }

                for (&block, hits) in &touched {
                    if hits.len() == blocks[block].len() {
                        continue;
                    }
                    let (inside, outside): (Vec<usize>, Vec<usize>) =
                        blocks[block].iter().copied().partition(|&s| marked[s]);
                    let split = blocks.len();
                    for &s in &outside {
                        block_of[s] = split;
                    }
                    blocks[block] = inside;
                    blocks.push(outside);

                    if in_worklist[block] {
                        worklist.push(split);
                        in_worklist.push(true);
                    } else {
                        in_worklist.push(false);
                        let smaller = if blocks[block].len() <= blocks[split].len() {
                            block
                        } else {
                            split
                        };
                        worklist.push(smaller);
                        in_worklist[smaller] = true;
                    }
                }

                for hits in touched.values() {
                    for &p in hits {
                        marked[p] = false;
                    }
                }
            }
        }

        let mut transitions = vec![0u32; blocks.len() * stride];
        let mut accepting = vec![false; blocks.len()];
        for (id, block) in blocks.iter().enumerate() {
            let representative = block[0];
            accepting[id] = self.accepting[representative];
            for class in 0..stride {
                let target = self.transitions[representative * stride + class] as usize;
                transitions[id * stride + class] = block_of[target] as u32;
            }
        }

        Self {
            start: block_of[self.start as usize] as u32,
            dead: self.dead.map(|d| block_of[d as usize] as u32),
            alphabet: self.alphabet,
            transitions,
            accepting,
        }
    }

    /// Number of states, the dead state included.
    pub fn state_count(&self) -> usize {
        self.accepting.len()
    }

    fn stride(&self) -> usize {
        self.alphabet.len() + 1
    }

}

impl Automaton for LevenshteinDfa {
    fn accepts(&self, candidate: &str) -> bool {
        let stride = self.stride();
        let mut state = self.start;
        for c in candidate.chars() {
            state = self.transitions[state as usize * stride + class_of(&self.alphabet, c)];
            if Some(state) == self.dead {
                return false;
            }
        }
        self.accepting[state as usize]
    }
}

fn intern(
    ids: &mut HashMap<Vec<Position>, u32>,
    sets: &mut Vec<Vec<Position>>,
    set: Vec<Position>,
) -> u32 {
    if let Some(&id) = ids.get(&set) {
        return id;
    }
    let id = sets.len() as u32;
    sets.push(set.clone());
    ids.insert(set, id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levenshtein(a: &str, b: &str) -> usize {
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for (i, ca) in a.chars().enumerate() {
            let mut row = vec![i + 1];
            for (j, cb) in b.iter().enumerate() {
                let cost = if ca == *cb { 0 } else { 1 };
                row.push((prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost));
            }
            prev = row;
        }
        prev[b.len()]
    }

    fn all_strings(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut out = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for s in &frontier {
                for &c in alphabet {
                    let mut t = s.clone();
                    t.push(c);
                    next.push(t);
                }
            }
            out.extend(next.iter().cloned());
            frontier = next;
        }
        out
    }

    #[test]
    fn test_exact_match_with_zero_distance() {
        let dfa = LevenshteinCompiler::new().build("abc", 0).unwrap();
        assert!(dfa.accepts("abc"));
        assert!(!dfa.accepts("ab"));
        assert!(!dfa.accepts("abcd"));
        assert!(!dfa.accepts("abd"));
        assert!(!dfa.accepts(""));
    }

    #[test]
    fn test_empty_word() {
        let dfa = LevenshteinCompiler::new().build("", 1).unwrap();
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("x"));
        assert!(!dfa.accepts("xy"));
    }

    #[test]
    fn test_kitten_sitting() {
        let dfa = LevenshteinCompiler::new().build("kitten", 3).unwrap();
        assert!(dfa.accepts("kitten"));
        assert!(dfa.accepts("sitting"));
        assert!(!dfa.accepts("venture"));
        assert!(!dfa.accepts("apple"));
        assert!(!dfa.accepts("zebra"));
    }

    #[test]
    fn test_unicode_characters() {
        let dfa = LevenshteinCompiler::new().build("café", 1).unwrap();
        assert!(dfa.accepts("cafe"));
        assert!(dfa.accepts("café"));
        assert!(dfa.accepts("cafés"));
        assert!(!dfa.accepts("coffee"));
    }

    #[test]
    fn test_agrees_with_edit_distance() {
        let candidates = all_strings(&['a', 'b', 'c'], 5);
        for word in ["", "a", "abca", "bbb", "cab"] {
            for max_distance in 0..=2 {
                let nfa = LevenshteinNfa::new(word, max_distance);
                for candidate in &candidates {
                    assert_eq!(
                        nfa.accepts(candidate),
                        levenshtein(word, candidate) <= max_distance,
                        "nfa word={:?} candidate={:?} d={}",
                        word,
                        candidate,
                        max_distance
                    );
                }

                for minimize in [true, false] {
                    let compiler = LevenshteinCompiler::new();
                    compiler.set_use_hopcroft_karp(minimize);
                    let dfa = compiler.build(word, max_distance).unwrap();
                    for candidate in &candidates {
                        assert_eq!(
                            dfa.accepts(candidate),
                            levenshtein(word, candidate) <= max_distance,
                            "word={:?} candidate={:?} d={} minimize={}",
                            word,
                            candidate,
                            max_distance,
                            minimize
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_word_character_costs_one_edit() {
        for minimize in [true, false] {
            let compiler = LevenshteinCompiler::new();
            compiler.set_use_hopcroft_karp(minimize);

            let hello = compiler.build("hello", 1).unwrap();
            assert!(hello.accepts("helo"));
            assert!(hello.accepts("hell"));
            assert!(hello.accepts("ello"));
            assert!(!hello.accepts("heo"));

            let kitten = compiler.build("kitten", 1).unwrap();
            assert!(kitten.accepts("kiten"));
            assert!(kitten.accepts("itten"));
            assert!(!kitten.accepts("kien"));
        }
    }

    #[test]
    fn test_budget_overflow_falls_back_to_nfa() {
        let compiler = LevenshteinCompiler::new().with_dfa_budget(4);
        let automaton = compiler.compile("abcdefgh", 3).unwrap();

        assert!(automaton.accepts("abcdefgh"));
        assert!(automaton.accepts("abdefh"));
        assert!(automaton.accepts("xbcdefghy"));
        assert!(!automaton.accepts("abcd"));
        assert!(!automaton.accepts(""));
    }

    #[test]
    fn test_long_word_at_large_distance_compiles() {
        let automaton = LevenshteinCompiler::new()
            .compile("internationalization", 10)
            .unwrap();

        assert!(automaton.accepts("internationalization"));
        assert!(automaton.accepts("internationalisation"));
        assert!(automaton.accepts("international"));
        assert!(automaton.accepts("nationality"));
        assert!(!automaton.accepts("intercontinental"));
        assert!(!automaton.accepts("i18n"));
    }

    #[test]
    fn test_defaults_are_uncapped() {
        let compiler = LevenshteinCompiler::new();
        assert_eq!(compiler.max_states(), None);
        assert_eq!(compiler.dfa_budget(), DEFAULT_DFA_BUDGET);
    }

    #[test]
    fn test_minimization_never_adds_states() {
        let compiler = LevenshteinCompiler::new();
        let minimized = compiler.build("banana", 2).unwrap();
        compiler.set_use_hopcroft_karp(false);
        let raw = compiler.build("banana", 2).unwrap();

        assert!(minimized.state_count() <= raw.state_count());
        for candidate in ["banana", "bananas", "banan", "bnana", "ananas", "cabana"] {
            assert_eq!(minimized.accepts(candidate), raw.accepts(candidate));
        }
    }

    #[test]
    fn test_state_limit_is_reported() {
        let compiler = LevenshteinCompiler::new().with_max_states(4);
        let err = compiler.build("abcdefgh", 3).unwrap_err();
        assert_eq!(
            err,
            Error::AutomatonTooLarge {
                word: "abcdefgh".to_string(),
                max_distance: 3,
                limit: 4,
            }
        );
    }

    #[test]
    fn test_state_cap_disables_fallback() {
        let compiler = LevenshteinCompiler::new().with_max_states(4);
        let err = compiler.compile("abcdefgh", 3).err().unwrap();
        assert!(matches!(err, Error::AutomatonTooLarge { limit: 4, .. }));

        // Under the cap the DFA is returned as usual
        let automaton = compiler.compile("ab", 0).unwrap();
        assert!(automaton.accepts("ab"));
    }

    #[test]
    fn test_hopcroft_flag_defaults_on() {
        let compiler = LevenshteinCompiler::default();
        assert!(compiler.use_hopcroft_karp());
        compiler.set_use_hopcroft_karp(false);
        assert!(!compiler.use_hopcroft_karp());
    }

    #[test]
    fn test_compile_returns_shared_automaton() {
        let compiler = LevenshteinCompiler::new();
        let automaton = compiler.compile("hello", 1).unwrap();
        assert!(automaton.accepts("helo"));
        assert!(automaton.accepts("hallo"));
        assert!(automaton.accepts("hellos"));
        assert!(!automaton.accepts("world"));
    }
}
