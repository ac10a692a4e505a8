//! # reclink Model
//!
//! The probabilistic comparison model for the reclink record-linkage engine.
//!
//! This crate turns a trained settings artifact into match decisions:
//!
//! - **Linkage Settings**: declarative blocking rules, leveled field
//!   comparisons, and Fellegi-Sunter m/u probabilities
//! - **Comparison Vectors**: deterministic per-field level assignment
//! - **Pairwise Scoring**: log2-odds match weights, compiled once and
//!   applied in parallel
//! - **Explainability**: per-comparison contribution breakdown
//! - **u Estimation**: random-sampling estimation of u probabilities
//!
//! ## Example
//!
//! ```rust
//! use reclink_model::{
//!     ComparisonLevel, ComparisonSpec, LevelTest, LinkageSettings, Linker,
//! };
//! use reclink_core::{BlockingRule, Record, RecordId, RecordSet};
//! use serde_json::json;
//!
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
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Settings   │────>│  Blocking   │────>│  Candidate  │
//! │ (m/u model) │     │   Index     │     │    Pairs    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                        │
//!       │              ┌─────────────┐           │
//!       └─────────────>│  Pairwise   │<──────────┘
//!                      │   Scorer    │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │   Cluster   │
//!                      │  Resolver   │
//!                      └─────────────┘
//! ```

pub mod compare;
pub mod explain;
pub mod linker;
pub mod score;
pub mod settings;
pub mod similarity;
pub mod train;

// Re-export main types for convenience
pub use compare::{compare_pair, ComparisonVector, MISSING};
pub use explain::{explain_pair, PairExplanation, TermContribution};
pub use linker::{LinkError, LinkageOutput, Linker};
pub use score::{probability_from_weight, CompiledModel, PairwiseScorer};
pub use settings::{
    ComparisonLevel, ComparisonSpec, LevelTest, LinkageSettings, MissingValuePolicy, SettingsError,
};
pub use train::estimate_u_probabilities;
