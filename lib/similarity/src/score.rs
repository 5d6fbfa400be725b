//! Score values, method names and per-pair reports.

use meshsim_core::{Category, ConceptId, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of comparing two concepts.
///
/// `NotComparable` is a legitimate result (a concept with no information
/// value, two concepts with no connecting path), not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Similarity {
    Score(f64),
    NotComparable,
}

impl Similarity {
    pub fn value(self) -> Option<f64> {
        match self {
            Similarity::Score(v) => Some(v),
            Similarity::NotComparable => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_comparable(self) -> bool {
        matches!(self, Similarity::Score(_))
    }

    /// Numeric form with -1 standing for "not comparable"
    pub fn as_legacy_f64(self) -> f64 {
        self.value().unwrap_or(-1.0)
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Score(v) => write!(f, "{:.6}", v),
            Similarity::NotComparable => f.write_str("n/a"),
        }
    }
}

/// The four information-content scores of one concept pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IcScores {
    pub resnik: f64,
    pub lin: f64,
    pub jiang: f64,
    pub rel: f64,
}

impl IcScores {
    pub const IDENTICAL: IcScores = IcScores {
        resnik: 1.0,
        lin: 1.0,
        jiang: 1.0,
        rel: 1.0,
    };

    /// The score of one IC method; `None` for non-IC methods
    pub fn get(&self, method: SimilarityMethod) -> Option<f64> {
        match method {
            SimilarityMethod::Resnik => Some(self.resnik),
            SimilarityMethod::Lin => Some(self.lin),
            SimilarityMethod::Jiang => Some(self.jiang),
            SimilarityMethod::Rel => Some(self.rel),
            SimilarityMethod::Wang | SimilarityMethod::Path => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    #[serde(alias = "res")]
    Resnik,
    Lin,
    Jiang,
    Rel,
    Wang,
    /// Inverse shortest path length
    Path,
}

impl SimilarityMethod {
    pub const ALL: [SimilarityMethod; 6] = [
        SimilarityMethod::Resnik,
        SimilarityMethod::Lin,
        SimilarityMethod::Jiang,
        SimilarityMethod::Rel,
        SimilarityMethod::Wang,
        SimilarityMethod::Path,
    ];

    #[inline]
    #[must_use]
    pub fn is_information_content(self) -> bool {
        matches!(
            self,
            SimilarityMethod::Resnik | SimilarityMethod::Lin | SimilarityMethod::Jiang | SimilarityMethod::Rel
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            SimilarityMethod::Resnik => "resnik",
            SimilarityMethod::Lin => "lin",
            SimilarityMethod::Jiang => "jiang",
            SimilarityMethod::Rel => "rel",
            SimilarityMethod::Wang => "wang",
            SimilarityMethod::Path => "path",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "resnik" | "res" => Ok(SimilarityMethod::Resnik),
            "lin" => Ok(SimilarityMethod::Lin),
            "jiang" => Ok(SimilarityMethod::Jiang),
            "rel" => Ok(SimilarityMethod::Rel),
            "wang" => Ok(SimilarityMethod::Wang),
            "path" => Ok(SimilarityMethod::Path),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

/// One scored pair from a term comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScore {
    /// Terms as the caller gave them (possibly narrow)
    pub query: (ConceptId, ConceptId),
    /// Main headings actually compared
    pub pair: (ConceptId, ConceptId),
    pub category: Category,
    pub method: SimilarityMethod,
    pub score: Similarity,
}
