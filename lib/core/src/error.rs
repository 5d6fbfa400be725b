use thiserror::Error;

use crate::Category;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid MeSH identifier: {0}")]
    InvalidConceptId(String),

    #[error("Invalid tree code: {0}")]
    InvalidPathCode(String),

    #[error("Unknown category label: {0}")]
    UnknownCategory(String),

    #[error("Category {0} is not loaded in the ontology store")]
    CategoryNotLoaded(Category),

    #[error("Narrow concept {0} must be converted to its broader concepts first")]
    NarrowConcept(String),

    #[error("Concept not found: {0}")]
    ConceptNotFound(String),

    #[error("Narrow concept {0} has no broader concepts")]
    NoBroaderConcepts(String),

    #[error("Unknown similarity method: {0}")]
    UnknownMethod(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
