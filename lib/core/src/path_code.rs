// MeSH tree codes: "C14.280.647" = category letter, 2-digit root, 3-digit steps
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::{Category, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathCode {
    category: Category,
    // segments[0] is the two-digit top-level number
    segments: SmallVec<[u16; 8]>,
}

impl PathCode {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPathCode(s.to_string());

        let mut parts = s.split('.');
        let head = parts.next().ok_or_else(invalid)?;
        let mut head_chars = head.chars();
        let letter = head_chars.next().ok_or_else(invalid)?;
        if !letter.is_ascii_uppercase() {
            return Err(invalid());
        }
        let category = Category::from_letter(letter).ok_or_else(invalid)?;

        let mut segments = SmallVec::new();
        segments.push(parse_digits(head_chars.as_str(), 2).ok_or_else(invalid)?);
        for part in parts {
            segments.push(parse_digits(part, 3).ok_or_else(invalid)?);
        }

        Ok(Self { category, segments })
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of segments; a category root has depth 1
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// The top-level code this one descends from
    pub fn root(&self) -> PathCode {
        self.truncated(1)
    }

    pub fn parent(&self) -> Option<PathCode> {
        if self.is_root() {
            None
        } else {
            Some(self.truncated(self.segments.len() - 1))
        }
    }

    pub fn is_prefix_of(&self, other: &PathCode) -> bool {
        self.category == other.category
            && self.segments.len() <= other.segments.len()
            && other.segments.starts_with(&self.segments)
    }

    /// Longest shared dot-prefix of two codes.
    ///
    /// `None` when the top-level segments differ: the codes only meet at the
    /// (code-less) category top.
    pub fn common_prefix(&self, other: &PathCode) -> Option<PathCode> {
        if self.category != other.category {
            return None;
        }
        let shared = self
            .segments
            .iter()
            .zip(other.segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if shared == 0 {
            None
        } else {
            Some(self.truncated(shared))
        }
    }

    fn truncated(&self, len: usize) -> PathCode {
        PathCode {
            category: self.category,
            segments: self.segments[..len].iter().copied().collect(),
        }
    }
}

fn parse_digits(s: &str, width: usize) -> Option<u16> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for PathCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = self.category.letter().unwrap_or('?');
        write!(f, "{}{:02}", letter, self.segments[0])?;
        for segment in &self.segments[1..] {
            write!(f, ".{:03}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for PathCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PathCode> for String {
    fn from(code: PathCode) -> Self {
        code.to_string()
    }
}
