//! Cluster analysis module

pub mod detection;
pub mod metrics;

use crate::counts::Vocabulary;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use detection::{cluster_graph, cluster_graph_cancellable, cluster_vocabulary};
pub use metrics::ClusterStats;

/// Value stored for every partner in dictionary form
pub const PARTNER_MARKER: u8 = 1;

/// Node -> (partner -> marker) view of a clustering
pub type DictionaryMapping = BTreeMap<usize, BTreeMap<usize, u8>>;

/// Output shape requested from the clustering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterForm {
    /// Each node maps to a partner -> marker map
    #[default]
    Dictionary,
    /// Each node maps to its partner set
    Partners,
}

impl From<bool> for ClusterForm {
    fn from(dictionary_form: bool) -> Self {
        if dictionary_form {
            ClusterForm::Dictionary
        } else {
            ClusterForm::Partners
        }
    }
}

/// Partners discovered for every node of the graph.
///
/// Every node index 0..n is a key, including nodes without partners.
/// Membership is a boolean union over all examined matrix powers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMapping {
    partners: BTreeMap<usize, BTreeSet<usize>>,
}

impl ClusterMapping {
    /// Mapping over `node_count` nodes, all with empty partner sets
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            partners: (0..node_count).map(|node| (node, BTreeSet::new())).collect(),
        }
    }

    /// Mark `dst` as a partner of `src`; returns true if the relation is new
    pub fn record(&mut self, src: usize, dst: usize) -> bool {
        self.partners.entry(src).or_default().insert(dst)
    }

    pub fn partners(&self, node: usize) -> Option<&BTreeSet<usize>> {
        self.partners.get(&node)
    }

    pub fn node_count(&self) -> usize {
        self.partners.len()
    }

    /// Total number of recorded (node, partner) relations
    pub fn relationship_count(&self) -> usize {
        self.partners.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<usize>)> + '_ {
        self.partners.iter().map(|(&node, set)| (node, set))
    }

    /// True when every relation in `self` is also in `other`
    pub fn is_subset_of(&self, other: &ClusterMapping) -> bool {
        self.partners.iter().all(|(node, set)| {
            other
                .partners
                .get(node)
                .map_or(set.is_empty(), |other_set| set.is_subset(other_set))
        })
    }

    pub fn into_dictionary_form(self) -> DictionaryMapping {
        self.partners
            .into_iter()
            .map(|(node, set)| {
                let markers = set.into_iter().map(|p| (p, PARTNER_MARKER)).collect();
                (node, markers)
            })
            .collect()
    }

    /// Translate node indices back to vocabulary tokens
    pub fn to_tokens(&self, vocabulary: &Vocabulary) -> Result<BTreeMap<String, BTreeSet<String>>> {
        if self.node_count() != vocabulary.len() {
            return Err(PipelineError::DimensionMismatch {
                stage: "cluster token translation",
                expected: vocabulary.len(),
                actual: self.node_count(),
            });
        }

        let token = |idx: usize| {
            vocabulary
                .token(idx)
                .map(str::to_string)
                .ok_or(PipelineError::DimensionMismatch {
                    stage: "cluster token translation",
                    expected: vocabulary.len(),
                    actual: idx + 1,
                })
        };

        self.partners
            .iter()
            .map(|(&node, set)| -> Result<(String, BTreeSet<String>)> {
                let partners = set.iter().map(|&p| token(p)).collect::<Result<_>>()?;
                Ok((token(node)?, partners))
            })
            .collect()
    }
}

impl From<DictionaryMapping> for ClusterMapping {
    fn from(dictionary: DictionaryMapping) -> Self {
        Self {
            partners: dictionary
                .into_iter()
                .map(|(node, markers)| (node, markers.into_keys().collect()))
                .collect(),
        }
    }
}

/// Result of a clustering run in the requested form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterResult {
    Dictionary(DictionaryMapping),
    Partners(ClusterMapping),
}

impl ClusterResult {
    pub fn from_mapping(mapping: ClusterMapping, form: ClusterForm) -> Self {
        match form {
            ClusterForm::Dictionary => ClusterResult::Dictionary(mapping.into_dictionary_form()),
            ClusterForm::Partners => ClusterResult::Partners(mapping),
        }
    }

    pub fn form(&self) -> ClusterForm {
        match self {
            ClusterResult::Dictionary(_) => ClusterForm::Dictionary,
            ClusterResult::Partners(_) => ClusterForm::Partners,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            ClusterResult::Dictionary(map) => map.len(),
            ClusterResult::Partners(mapping) => mapping.node_count(),
        }
    }

    /// Partner sets regardless of form
    pub fn to_mapping(&self) -> ClusterMapping {
        match self {
            ClusterResult::Dictionary(map) => ClusterMapping::from(map.clone()),
            ClusterResult::Partners(mapping) => mapping.clone(),
        }
    }
}
