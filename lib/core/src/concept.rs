//! MeSH concept identifiers, kinds and categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, PathCode, Result};

/// Kind of a MeSH concept, decided by its identifier prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptKind {
    /// Descriptor with a position in the tree (`D` prefix)
    MainHeading,
    /// Supplementary/narrow concept without a tree position (`C` prefix)
    Narrow,
}

/// A validated MeSH identifier: `C` or `D` followed by 6 or 9 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConceptId(String);

impl ConceptId {
    pub fn parse(s: &str) -> Result<Self> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidConceptId(s.to_string()))
        }
    }

    /// Old identifiers carry 6 digits, newer ones 9
    pub fn is_valid(s: &str) -> bool {
        let bytes = s.as_bytes();
        matches!(bytes.len(), 7 | 10)
            && matches!(bytes[0], b'C' | b'D')
            && bytes[1..].iter().all(u8::is_ascii_digit)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ConceptKind {
        if self.0.starts_with('D') {
            ConceptKind::MainHeading
        } else {
            ConceptKind::Narrow
        }
    }

    #[inline]
    #[must_use]
    pub fn is_narrow(&self) -> bool {
        self.kind() == ConceptKind::Narrow
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConceptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ConceptId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(Error::InvalidConceptId(s))
        }
    }
}

impl From<ConceptId> for String {
    fn from(id: ConceptId) -> Self {
        id.0
    }
}

/// MeSH tree categories plus the synthetic `all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, V, Z,
    All,
}

impl Category {
    /// Every real tree category, in MeSH order
    pub const TREES: [Category; 16] = [
        Category::A, Category::B, Category::C, Category::D,
        Category::E, Category::F, Category::G, Category::H,
        Category::I, Category::J, Category::K, Category::L,
        Category::M, Category::N, Category::V, Category::Z,
    ];

    /// Category of a tree letter; `None` for letters MeSH does not use
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::TREES.iter().copied().find(|c| c.letter() == Some(letter))
    }

    pub fn letter(self) -> Option<char> {
        let letter = match self {
            Category::A => 'A',
            Category::B => 'B',
            Category::C => 'C',
            Category::D => 'D',
            Category::E => 'E',
            Category::F => 'F',
            Category::G => 'G',
            Category::H => 'H',
            Category::I => 'I',
            Category::J => 'J',
            Category::K => 'K',
            Category::L => 'L',
            Category::M => 'M',
            Category::N => 'N',
            Category::V => 'V',
            Category::Z => 'Z',
            Category::All => return None,
        };
        Some(letter)
    }

    #[inline]
    #[must_use]
    pub fn is_all(self) -> bool {
        self == Category::All
    }

    /// Whether a tree code lives in this category (`all` admits every code)
    pub fn admits(self, code: &PathCode) -> bool {
        self.is_all() || code.category() == self
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(letter) => write!(f, "{}", letter),
            None => f.write_str("all"),
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Category::All);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter)
                .ok_or_else(|| Error::UnknownCategory(s.to_string())),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.to_string()
    }
}

/// Descriptor row: a main heading with its tree codes and corpus frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub id: ConceptId,
    pub name: String,
    #[serde(default)]
    pub path_codes: Vec<PathCode>,
    #[serde(default)]
    pub frequency: f64,
}

impl ConceptRecord {
    pub fn new(id: ConceptId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path_codes: Vec::new(),
            frequency: 0.0,
        }
    }

    #[must_use]
    pub fn with_path_code(mut self, code: PathCode) -> Self {
        self.path_codes.push(code);
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Categories derived from the first letter of each tree code
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.path_codes.iter().map(PathCode::category).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Narrow concept row with the main headings it maps to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrowRecord {
    pub id: ConceptId,
    pub name: String,
    pub broader: Vec<ConceptId>,
}
