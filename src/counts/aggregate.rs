//! Count aggregation over a document collection

use crate::counts::{BigramTable, UnigramTable, Vocabulary};
use itertools::Itertools;
use rayon::prelude::*;

/// Count occurrences of `needle` in `haystack`.
///
/// Matches are raw substrings found by a non-overlapping left-to-right scan,
/// so "aa" occurs once in "aaa" and "a" occurs twice in "aa". Token
/// boundaries are not respected. Unigram and bigram counting both use this.
pub fn count_occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u64
}

/// Sum per-pattern occurrence counts over all documents in parallel
fn count_patterns<S, P>(patterns: &[P], documents: &[S]) -> Vec<u64>
where
    S: AsRef<str> + Sync,
    P: AsRef<str> + Sync,
{
    let width = patterns.len();

    documents
        .par_iter()
        .fold(
            || vec![0u64; width],
            |mut local, doc| {
                let doc = doc.as_ref();
                for (slot, pattern) in local.iter_mut().zip(patterns) {
                    *slot += count_occurrences(doc, pattern.as_ref());
                }
                local
            },
        )
        .reduce(
            || vec![0u64; width],
            |mut left, right| {
                for (total, count) in left.iter_mut().zip(right) {
                    *total += count;
                }
                left
            },
        )
}

/// Count how often each vocabulary token occurs across all documents
pub fn count_unigrams<S>(vocabulary: &Vocabulary, documents: &[S]) -> UnigramTable
where
    S: AsRef<str> + Sync,
{
    log::info!(
        "Counting unigrams for {} tokens over {} documents",
        vocabulary.len(),
        documents.len()
    );

    let table = UnigramTable::from_counts(count_patterns(vocabulary.tokens(), documents));

    log::debug!(
        "Observed {} of {} tokens at least once",
        table.iter().filter(|&(_, count)| count > 0).count(),
        table.len()
    );

    table
}

/// Count the span "w1 w2" for every ordered pair of distinct vocabulary entries.
///
/// Every pair gets an entry, including pairs that never occur.
pub fn count_bigrams<S>(vocabulary: &Vocabulary, documents: &[S]) -> BigramTable
where
    S: AsRef<str> + Sync,
{
    let tokens = vocabulary.tokens();

    let pairs: Vec<(usize, usize)> = (0..tokens.len())
        .permutations(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    log::info!(
        "Counting {} ordered bigrams over {} documents",
        pairs.len(),
        documents.len()
    );

    let spans: Vec<String> = pairs
        .iter()
        .map(|&(src, dst)| format!("{} {}", tokens[src], tokens[dst]))
        .collect();

    let counts = count_patterns(&spans, documents);

    // permutations never yield src == dst
    let table = BigramTable::from_distinct_pairs(pairs.into_iter().zip(counts));

    log::debug!("Observed {} bigrams at least once", table.nonzero_count());

    table
}
