//! # reclink Core
//!
//! Core library for the reclink record-linkage engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Record`] / [`RecordSet`] - identified rows of named fields
//! - [`BlockingIndex`] - candidate pair generation from blocking rules
//! - [`ScoredEdge`] - the weighted record-pair graph
//! - [`ClusterResolver`] - connected-components entity clustering
//!
//! ## Example
//!
//! ```rust
//! use reclink_core::{
//!     BlockingIndex, BlockingRule, ClusterResolver, Record, RecordId, RecordSet, ScoredEdge,
//! };
//! use serde_json::json;
//!
//! // Ingest records
//! let records = RecordSet::from_records(vec![
//!     Record::new(RecordId::Integer(0), json!({"name": "Jon Smith", "dob": "1990-01-01"})),
//!     Record::new(RecordId::Integer(1), json!({"name": "John Smith", "dob": "1990-01-01"})),
//! ]).unwrap();
//!
//! // Generate candidate pairs
//! let rules = vec![BlockingRule::on_field("dob")];
//! let index = BlockingIndex::build(&rules, &records, None).unwrap();
//! let pairs = index.candidate_pairs(1_000_000).unwrap();
//! assert_eq!(pairs.len(), 1);
//!
//! // Resolve clusters from scored edges (scoring lives in reclink-model)
//! let edges = vec![ScoredEdge::new(0, 1, 8.2, 0.997)];
//! let resolved = ClusterResolver::new(0.5).resolve(&records.ids(), &edges);
//! assert_eq!(resolved.clusters.len(), 1);
//! ```

pub mod blocking;
pub mod error;
pub mod graph;
pub mod record;
pub mod resolve;

pub use blocking::{BlockKey, BlockingIndex, BlockingRule, CandidatePair};
pub use error::{Error, Result};
pub use graph::ScoredEdge;
pub use record::{Record, RecordId, RecordSet};
pub use resolve::{Cluster, ClusterAssignment, ClusterResolver, ClusterSet, ResolvedClusters};
