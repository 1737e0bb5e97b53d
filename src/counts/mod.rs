//! Unigram and bigram occurrence statistics over a vocabulary

pub mod aggregate;

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

pub use aggregate::{count_bigrams, count_occurrences, count_unigrams};

/// Ordered, duplicate-free token list. A token's position is its node index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Token strings in index order
    tokens: Vec<String>,

    /// Mapping from token strings to indices
    token_to_index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting empty tokens and duplicates
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut token_to_index = HashMap::with_capacity(tokens.len());

        for (idx, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(PipelineError::InvalidVocabulary {
                    reason: format!("entry {} is an empty string", idx),
                });
            }
            if let Some(first) = token_to_index.insert(token.clone(), idx) {
                return Err(PipelineError::InvalidVocabulary {
                    reason: format!(
                        "token {:?} appears at both index {} and index {}",
                        token, first, idx
                    ),
                });
            }
        }

        Ok(Self {
            tokens,
            token_to_index,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token string for a node index
    pub fn token(&self, idx: usize) -> Option<&str> {
        self.tokens.get(idx).map(String::as_str)
    }

    /// Node index for a token string
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.token_to_index.get(token).copied()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Occurrence count per vocabulary index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnigramTable {
    counts: Vec<u64>,
}

impl UnigramTable {
    /// Wrap counts supplied in vocabulary order (fresh or from a cache)
    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Count for `idx`, or 0 when the table has no entry for it
    pub fn get(&self, idx: usize) -> u64 {
        self.counts.get(idx).copied().unwrap_or(0)
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().copied().enumerate()
    }
}

/// Occurrence counts of the span "token_i token_j" for ordered pairs i != j.
///
/// Serialized as a map keyed by `"i,j"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<String, u64>", try_from = "BTreeMap<String, u64>")]
pub struct BigramTable {
    counts: HashMap<(usize, usize), u64>,
}

impl BigramTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    /// Build from pairs already known to satisfy src != dst
    pub(crate) fn from_distinct_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = ((usize, usize), u64)>,
    {
        let counts: HashMap<(usize, usize), u64> = pairs.into_iter().collect();
        debug_assert!(counts.keys().all(|&(src, dst)| src != dst));
        Self { counts }
    }

    /// Record the count for an ordered pair. Self-pairs have no entry.
    pub fn insert(&mut self, src: usize, dst: usize, count: u64) -> Result<()> {
        if src == dst {
            return Err(PipelineError::InvalidPairKey(pair_key(src, dst)));
        }
        self.counts.insert((src, dst), count);
        Ok(())
    }

    /// Count for the ordered pair, or 0 when absent
    pub fn get(&self, src: usize, dst: usize) -> u64 {
        self.counts.get(&(src, dst)).copied().unwrap_or(0)
    }

    pub fn contains(&self, src: usize, dst: usize) -> bool {
        self.counts.contains_key(&(src, dst))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of pairs observed at least once
    pub fn nonzero_count(&self) -> usize {
        self.counts.values().filter(|&&count| count > 0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), u64)> + '_ {
        self.counts.iter().map(|(&pair, &count)| (pair, count))
    }

    /// Highest index referenced by any pair
    pub fn max_index(&self) -> Option<usize> {
        self.counts.keys().map(|&(src, dst)| src.max(dst)).max()
    }
}

/// Format an ordered pair as a cache key
pub fn pair_key(src: usize, dst: usize) -> String {
    format!("{},{}", src, dst)
}

/// Parse a cache key produced by [`pair_key`]
pub fn parse_pair_key(key: &str) -> Result<(usize, usize)> {
    let invalid = || PipelineError::InvalidPairKey(key.to_string());

    let (src, dst) = key.split_once(',').ok_or_else(invalid)?;
    let src: usize = src.trim().parse().map_err(|_| invalid())?;
    let dst: usize = dst.trim().parse().map_err(|_| invalid())?;

    if src == dst {
        return Err(invalid());
    }
    Ok((src, dst))
}

impl From<BigramTable> for BTreeMap<String, u64> {
    fn from(table: BigramTable) -> Self {
        table
            .counts
            .into_iter()
            .map(|((src, dst), count)| (pair_key(src, dst), count))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, u64>> for BigramTable {
    type Error = PipelineError;

    fn try_from(raw: BTreeMap<String, u64>) -> Result<Self> {
        let mut table = BigramTable::with_capacity(raw.len());
        let mut seen = HashSet::with_capacity(raw.len());

        for (key, count) in raw {
            let (src, dst) = parse_pair_key(&key)?;
            // "1,2" and " 1,2" parse to the same pair
            if !seen.insert((src, dst)) {
                return Err(PipelineError::InvalidPairKey(key));
            }
            table.insert(src, dst, count)?;
        }

        Ok(table)
    }
}
