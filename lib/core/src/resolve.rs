//! Cluster resolution over the scored-edge graph
//!
//! Retains edges at or above the match threshold and partitions the record
//! universe into connected components. Components are order-independent, so
//! the resolution is deterministic regardless of edge processing order.

use crate::{RecordId, ScoredEdge};
use ordered_float::OrderedFloat;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of records resolved to one real-world entity
///
/// The cluster id is the smallest member id, making ids stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: RecordId,
    pub members: Vec<RecordId>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.members.binary_search(id).is_ok()
    }
}

/// A partition of the record universe into entity clusters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
}

impl ClusterSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// The cluster id a record was assigned to
    pub fn cluster_of(&self, id: &RecordId) -> Option<&RecordId> {
        self.clusters
            .iter()
            .find(|c| c.contains(id))
            .map(|c| &c.id)
    }

    /// Total number of records across all clusters
    pub fn record_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

/// Per-record view of the resolution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub record_id: RecordId,
    pub cluster_id: RecordId,
    /// Match weight of the strongest retained neighbor, if any edge survived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_match_weight: Option<f64>,
}

/// Output of the resolution phase
#[derive(Debug, Clone)]
pub struct ResolvedClusters {
    pub clusters: ClusterSet,
    pub assignments: Vec<ClusterAssignment>,
}

/// Connected-components cluster resolver with an inclusive threshold
#[derive(Debug, Clone, Copy)]
pub struct ClusterResolver {
    threshold: f64,
}

impl ClusterResolver {
    #[inline]
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Partition the universe into clusters
    ///
    /// `universe` lists every record id in node-index order; `edges` address
    /// records by those indices. Every record appears in exactly one cluster;
    /// a record untouched by any retained edge forms a singleton.
    pub fn resolve(&self, universe: &[RecordId], edges: &[ScoredEdge]) -> ResolvedClusters {
        let n = universe.len();
        let mut components: UnionFind<u32> = UnionFind::new(n);
        let mut best_weight: Vec<Option<f64>> = vec![None; n];

        for edge in edges {
            if !edge.retained_at(self.threshold) {
                continue;
            }
            components.union(edge.a, edge.b);
            for node in [edge.a as usize, edge.b as usize] {
                let current = best_weight[node].map(OrderedFloat).unwrap_or(OrderedFloat(f64::NEG_INFINITY));
                if OrderedFloat(edge.weight) > current {
                    best_weight[node] = Some(edge.weight);
                }
            }
        }

        let labels = components.into_labeling();
        let mut grouped: BTreeMap<u32, Vec<RecordId>> = BTreeMap::new();
        for (node, label) in labels.into_iter().enumerate() {
            grouped.entry(label).or_default().push(universe[node].clone());
        }

        let mut clusters: Vec<Cluster> = grouped
            .into_values()
            .map(|mut members| {
                members.sort();
                Cluster {
                    id: members[0].clone(),
                    members,
                }
            })
            .collect();
        clusters.sort_by(|a, b| a.id.cmp(&b.id));
        let clusters = ClusterSet { clusters };

        let mut assignments: Vec<ClusterAssignment> = universe
            .iter()
            .enumerate()
            .map(|(node, id)| ClusterAssignment {
                record_id: id.clone(),
                cluster_id: clusters
                    .cluster_of(id)
                    .cloned()
                    .unwrap_or_else(|| id.clone()),
                best_match_weight: best_weight[node],
            })
            .collect();
        assignments.sort_by(|a, b| a.record_id.cmp(&b.record_id));

        ResolvedClusters {
            clusters,
            assignments,
        }
    }
}
