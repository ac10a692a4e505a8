//! # reclink
//!
//! A probabilistic record linkage and deduplication engine.
//!
//! reclink takes one or two tabular record sets and a trained settings
//! artifact, scores candidate pairs with a Fellegi-Sunter model, and
//! partitions records into clusters believed to refer to the same
//! real-world entity.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install reclink
//! reclink --settings model.json --records people.csv --output clusters.json
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use reclink::prelude::*;
//! use serde_json::json;
//!
//! // A minimal trained model: block on dob, compare names
//! let settings = LinkageSettings::new(
//!     0.1,
//!     vec![BlockingRule::on_field("dob")],
//!     vec![ComparisonSpec::new(
//!         "name",
//!         vec![
//!             ComparisonLevel::new("exact", LevelTest::Exact, 0.7, 0.001),
//!             ComparisonLevel::new("close", LevelTest::JaroWinkler { at_least: 0.9 }, 0.2, 0.005),
//!             ComparisonLevel::new("other", LevelTest::Else, 0.1, 0.994),
//!         ],
//!     )],
//! );
//!
//! let records = RecordSet::from_records(vec![
//!     Record::new(RecordId::Integer(0), json!({"name": "Jon Smith", "dob": "1990-01-01"})),
//!     Record::new(RecordId::Integer(1), json!({"name": "John Smith", "dob": "1990-01-01"})),
//! ]).unwrap();
//!
//! let linker = Linker::new(settings).unwrap();
//! let output = linker.deduplicate_at(&records, 0.5).unwrap();
//! assert_eq!(output.clusters.len(), 1);
//! ```
//!
//! ## Crate Structure
//!
//! reclink is composed of several crates:
//!
//! - [`reclink-core`](https://docs.rs/reclink-core) - records, blocking, pair graph, cluster resolution
//! - [`reclink-model`](https://docs.rs/reclink-model) - settings, comparison vectors, Fellegi-Sunter scoring
//!
//! ## Features
//!
//! - **Blocking**: candidate pair generation without the O(n^2) scan
//! - **Leveled Comparisons**: exact, Jaro-Winkler, Levenshtein, numeric tolerances
//! - **Fellegi-Sunter Scoring**: log2-odds match weights from trained m/u probabilities
//! - **Connected-Components Clustering**: deterministic, order-independent partitions
//! - **Explainability**: per-comparison weight breakdown for any pair
//! - **u Estimation**: seeded random-sampling estimation of u probabilities

// Re-export core types
pub use reclink_core::{
    BlockKey, BlockingIndex, BlockingRule, CandidatePair, Cluster, ClusterAssignment,
    ClusterResolver, ClusterSet, Error, Record, RecordId, RecordSet, ResolvedClusters, Result,
    ScoredEdge,
};

// Re-export the comparison model
pub use reclink_model::{
    compare_pair, estimate_u_probabilities, explain_pair, probability_from_weight,
    ComparisonLevel, ComparisonSpec, ComparisonVector, CompiledModel, LevelTest, LinkError,
    LinkageOutput, LinkageSettings, Linker, MissingValuePolicy, PairExplanation, PairwiseScorer,
    SettingsError, TermContribution,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BlockKey, BlockingIndex, BlockingRule, CandidatePair, Cluster, ClusterAssignment,
        ClusterResolver, ClusterSet, ComparisonLevel, ComparisonSpec, ComparisonVector, Error,
        LevelTest, LinkError, LinkageOutput, LinkageSettings, Linker, MissingValuePolicy, Record,
        RecordId, RecordSet, Result, ScoredEdge,
    };
}
