//! Cluster statistics and metrics

use crate::cluster::ClusterMapping;
use serde::{Deserialize, Serialize};

/// Summary figures for a cluster mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Nodes in the mapping
    pub node_count: usize,

    /// Nodes with at least one partner
    pub linked_nodes: usize,

    /// Total (node, partner) relations
    pub relationships: usize,

    /// Size of the largest partner set
    pub largest_partner_set: usize,

    /// Mean partner set size over all nodes
    pub mean_partners: f64,
}

impl ClusterStats {
    pub fn from_mapping(mapping: &ClusterMapping) -> Self {
        let node_count = mapping.node_count();
        let mut linked_nodes = 0;
        let mut relationships = 0;
        let mut largest_partner_set = 0;

        for (_, partners) in mapping.iter() {
            if !partners.is_empty() {
                linked_nodes += 1;
            }
            relationships += partners.len();
            largest_partner_set = largest_partner_set.max(partners.len());
        }

        let mean_partners = if node_count == 0 {
            0.0
        } else {
            relationships as f64 / node_count as f64
        };

        Self {
            node_count,
            linked_nodes,
            relationships,
            largest_partner_set,
            mean_partners,
        }
    }
}
