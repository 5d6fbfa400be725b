//! # meshsim
//!
//! Semantic similarity between MeSH concepts.
//!
//! meshsim loads a MeSH hierarchy snapshot (main headings with tree codes and
//! corpus frequencies, narrow concepts mapped to broader headings) and scores
//! concept pairs with information-content measures (Resnik, Lin, Jiang, Rel),
//! Wang's semantic-value method or inverse shortest path length.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! meshsim --snapshot mesh.json.gz --category C --method lin D003924 D001943
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use meshsim::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let ontology = meshsim::load_ontology(Path::new("mesh.json.gz"), None).unwrap();
//! let navigator = Arc::new(Navigator::new(Arc::new(ontology)));
//! let terms = TermSimilarity::new(navigator, EngineConfig::default()).unwrap();
//!
//! let a: ConceptId = "D003924".parse().unwrap();
//! let b: ConceptId = "D001943".parse().unwrap();
//! for score in terms.term_similarity(&a, &b, Category::C, SimilarityMethod::Lin).unwrap() {
//!     println!("{}", score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `meshsim-core` - identifiers, tree codes, the ontology store and the caching navigator
//! - `meshsim-similarity` - IC and path engines, term comparison, concept filters
//! - `meshsim-storage` - gzip JSON snapshots with SHA-256 checksums

// Re-export core types
pub use meshsim_core::{
    Category, Closure, ConceptId, ConceptKind, ConceptRecord, Error, Hierarchy, MemoryOntology,
    NarrowRecord, Navigator, OntologyBuilder, OntologyStore, PathCode, Result, Subsumer,
};

// Re-export similarity engines
pub use meshsim_similarity::{
    CollectingObserver, ConceptFilter, EngineConfig, IcScores, InformationContentEngine, PairScore,
    PathEngine, ScoreObserver, Similarity, SimilarityMethod, SubsumerStrategy, TermSimilarity,
    TracingObserver,
};

// Re-export storage
pub use meshsim_storage::{load_ontology, load_snapshot, save_snapshot, OntologySnapshot, SnapshotDescription};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Category, ConceptId, ConceptRecord, EngineConfig, Error, Hierarchy, MemoryOntology, NarrowRecord,
        Navigator, PairScore, PathCode, Result, Similarity, SimilarityMethod, TermSimilarity,
    };
}
