use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzlito_core::{FuzzyMatcher, LevenshteinCompiler, MatchCache, DEFAULT_DFA_BUDGET};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

const WORDS: [&str; 8] = [
    "lucene", "search", "automaton", "levenshtein", "fuzzy", "index", "prefix", "suffix",
];

fn bench_resolve_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_hit");

    for distance in [1usize, 2, 3].iter() {
        let cache = MatchCache::new(LevenshteinCompiler::new());
        cache.resolve("levenshtein", *distance).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(distance), distance, |b, &d| {
            b.iter(|| black_box(cache.resolve(black_box("levenshtein"), d).unwrap()));
        });
    }

    group.finish();
}

fn bench_resolve_disabled(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_disabled");

    for distance in [1usize, 2].iter() {
        let cache = MatchCache::with_capacity(0, LevenshteinCompiler::new());

        group.bench_with_input(BenchmarkId::from_parameter(distance), distance, |b, &d| {
            b.iter(|| black_box(cache.resolve(black_box("levenshtein"), d).unwrap()));
        });
    }

    group.finish();
}

fn bench_minimization(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for minimize in [true, false] {
        let compiler = LevenshteinCompiler::new();
        compiler.set_use_hopcroft_karp(minimize);
        let label = if minimize { "hopcroft" } else { "subset_only" };

        group.bench_function(label, |b| {
            b.iter(|| black_box(compiler.build(black_box("automaton"), 2).unwrap()));
        });
    }

    group.finish();
}

fn bench_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("matches");

    // A budget of zero forces NFA matching for the same language
    for (label, budget) in [("dfa", DEFAULT_DFA_BUDGET), ("nfa", 0)] {
        let cache = MatchCache::new(LevenshteinCompiler::new().with_dfa_budget(budget));
        let matcher = FuzzyMatcher::with_cache(&cache, "levenshtein", 2).unwrap();

        group.bench_function(label, |b| {
            b.iter(|| {
                for word in WORDS.iter() {
                    black_box(matcher.matches(black_box(word)));
                }
            });
        });
    }

    group.finish();
}

fn bench_concurrent_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_resolve");

    for threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            threads,
            |b, &threads| {
                b.iter(|| {
                    let cache = Arc::new(MatchCache::with_capacity(4, LevenshteinCompiler::new()));
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let cache = Arc::clone(&cache);
                            thread::spawn(move || {
                                for i in 0..WORDS.len() {
                                    let word = WORDS[(i + t) % WORDS.len()];
                                    black_box(cache.resolve(word, 1).unwrap());
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_hit,
    bench_resolve_disabled,
    bench_minimization,
    bench_matches,
    bench_concurrent_resolve
);
criterion_main!(benches);
