//! # meshsim Core
//!
//! Core library for the meshsim semantic-similarity engine.
//!
//! This crate provides the MeSH data model and hierarchy access:
//!
//! - [`ConceptId`], [`Category`], [`PathCode`] - validated identifiers and tree codes
//! - [`OntologyStore`] - read-only contract over the hierarchy tables
//! - [`MemoryOntology`] - in-memory store built by [`OntologyBuilder`]
//! - [`Navigator`] - cached ancestor/descendant closures and subsumer lookup
//! - [`SingleFlightCache`] - memo table with one computation per key
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use meshsim_core::{Category, ConceptId, ConceptRecord, Hierarchy, MemoryOntology, Navigator};
//!
//! let root = ConceptId::parse("D000001").unwrap();
//! let leaf = ConceptId::parse("D000002").unwrap();
//! let store = MemoryOntology::builder()
//!     .concept(ConceptRecord::new(root.clone(), "Diseases").with_path_code("C01".parse().unwrap()))
//!     .concept(ConceptRecord::new(leaf.clone(), "Infections").with_path_code("C01.001".parse().unwrap()))
//!     .edge(leaf.clone(), root.clone(), Category::C)
//!     .build()
//!     .unwrap();
//!
//! let navigator = Navigator::new(Arc::new(store));
//! let ancestors = navigator.ancestor_closure(&leaf, Category::C).unwrap();
//! assert!(ancestors.contains(&root));
//! ```

pub mod cache;
pub mod concept;
pub mod error;
pub mod navigator;
pub mod path_code;
pub mod store;

pub use cache::{CacheStats, SingleFlightCache};
pub use concept::{Category, ConceptId, ConceptKind, ConceptRecord, NarrowRecord};
pub use error::{Error, Result};
pub use navigator::{Closure, Hierarchy, Navigator, Subsumer};
pub use path_code::PathCode;
pub use store::{MemoryOntology, OntologyBuilder, OntologyStore};
