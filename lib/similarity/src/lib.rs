//! # meshsim Similarity
//!
//! Semantic similarity between MeSH concepts, computed over a
//! [`Hierarchy`](meshsim_core::Hierarchy).
//!
//! ## Features
//!
//! - **Information content**: Resnik, Lin, Jiang and Rel scores from corpus frequencies
//! - **Path measures**: Wang semantic-value vectors and inverse shortest path length
//! - **Term comparison**: narrow concepts expanded to their broader main headings
//! - **Filtering**: drop ancestors or overly broad concepts from a hit list
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use meshsim_core::{Category, ConceptId, ConceptRecord, MemoryOntology, Navigator};
//! use meshsim_similarity::{EngineConfig, SimilarityMethod, TermSimilarity};
//!
//! let id = |s: &str| ConceptId::parse(s).unwrap();
//! let store = MemoryOntology::builder()
//!     .concept(ConceptRecord::new(id("D000001"), "Root").with_path_code("C01".parse().unwrap()))
//!     .concept(ConceptRecord::new(id("D000002"), "Left").with_path_code("C01.001".parse().unwrap()).with_frequency(0.4))
//!     .concept(ConceptRecord::new(id("D000003"), "Right").with_path_code("C01.002".parse().unwrap()).with_frequency(0.6))
//!     .edge(id("D000002"), id("D000001"), Category::C)
//!     .edge(id("D000003"), id("D000001"), Category::C)
//!     .build()
//!     .unwrap();
//!
//! let terms = TermSimilarity::new(Arc::new(Navigator::new(Arc::new(store))), EngineConfig::default()).unwrap();
//! let scores = terms
//!     .term_similarity(&id("D000002"), &id("D000003"), Category::C, SimilarityMethod::Wang)
//!     .unwrap();
//! assert_eq!(scores.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │  Navigator  │────>│  IC engine  │──┐
//! │ (closures)  │     └─────────────┘  │   ┌─────────────────┐
//! │             │     ┌─────────────┐  ├──>│ TermSimilarity  │──> ScoreObserver
//! │             │────>│ Path engine │──┘   └─────────────────┘
//! └─────────────┘     └─────────────┘
//! ```

pub mod config;
pub mod filter;
pub mod ic;
pub mod observer;
pub mod path;
pub mod score;
pub mod term;
mod validate;

#[cfg(test)]
mod fixtures;

pub use config::{EngineConfig, SubsumerStrategy, DEFAULT_DECAY, DEFAULT_MASS_TOLERANCE};
pub use filter::ConceptFilter;
pub use ic::{FrequencyDistribution, InformationContentEngine, LeastCommonSubsumer, MaxInformation};
pub use observer::{CollectingObserver, ScoreObserver, TracingObserver};
pub use path::{PathEngine, SemanticValueVector};
pub use score::{IcScores, PairScore, Similarity, SimilarityMethod};
pub use term::TermSimilarity;
