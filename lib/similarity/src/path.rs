//! Path-based similarity: Wang semantic values and shortest paths.

use ahash::AHashMap;
use meshsim_core::{Category, ConceptId, Hierarchy, Result, SingleFlightCache};
use std::sync::Arc;
use tracing::debug;

use crate::config::{validate_decay, DEFAULT_DECAY};
use crate::score::Similarity;
use crate::validate::check_pair;

/// Decayed weights from a concept to itself and each of its ancestors
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticValueVector {
    weights: AHashMap<ConceptId, f64>,
}

impl SemanticValueVector {
    pub fn get(&self, id: &ConceptId) -> Option<f64> {
        self.weights.get(id).copied()
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConceptId, f64)> {
        self.weights.iter().map(|(id, w)| (id, *w))
    }
}

type VectorKey = (Category, ConceptId, u64);

pub struct PathEngine {
    hierarchy: Arc<dyn Hierarchy>,
    decay: f64,
    vectors: SingleFlightCache<VectorKey, SemanticValueVector>,
}

impl PathEngine {
    pub fn new(hierarchy: Arc<dyn Hierarchy>) -> Self {
        Self {
            hierarchy,
            decay: DEFAULT_DECAY,
            vectors: SingleFlightCache::new(),
        }
    }

    pub fn with_decay(hierarchy: Arc<dyn Hierarchy>, decay: f64) -> Result<Self> {
        validate_decay(decay)?;
        let mut engine = Self::new(hierarchy);
        engine.decay = decay;
        Ok(engine)
    }

    #[inline]
    #[must_use]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn semantic_value_vector(&self, id: &ConceptId, category: Category) -> Result<Arc<SemanticValueVector>> {
        self.semantic_value_vector_with_decay(id, category, self.decay)
    }

    /// An ancestor `k` hops above `id` weighs `decay^k`; when it is reachable
    /// along several routes the shortest one counts.
    pub fn semantic_value_vector_with_decay(
        &self,
        id: &ConceptId,
        category: Category,
        decay: f64,
    ) -> Result<Arc<SemanticValueVector>> {
        validate_decay(decay)?;
        self.vectors
            .get_or_try_insert_with((category, id.clone(), decay.to_bits()), || {
                let ancestors = self.hierarchy.ancestor_closure(id, category)?;
                let weights: AHashMap<ConceptId, f64> = ancestors
                    .iter()
                    .map(|(member, distance)| (member.clone(), decay.powi(distance as i32)))
                    .collect();
                debug!(concept = %id, %category, size = weights.len(), "semantic value vector computed");
                Ok(SemanticValueVector { weights })
            })
    }

    pub fn wang_similarity(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<f64> {
        check_pair(self.hierarchy.as_ref(), a, b, category)?;
        if a == b {
            return Ok(1.0);
        }

        let sv1 = self.semantic_value_vector(a, category)?;
        let sv2 = self.semantic_value_vector(b, category)?;
        // an empty `sum` would be -0.0
        let shared = sv1
            .iter()
            .filter_map(|(k, w1)| sv2.get(k).map(|w2| w1 + w2))
            .fold(0.0, |acc, w| acc + w);
        let total = sv1.total() + sv2.total();
        if total <= 0.0 {
            return Ok(0.0);
        }
        Ok(shared / total)
    }

    /// Shortest up-then-down path across every category
    pub fn shortest_path_length(&self, a: &ConceptId, b: &ConceptId) -> Result<Option<u32>> {
        self.shortest_path_length_in(a, b, Category::All)
    }

    /// Fewest edges from `a` up to a common ancestor and down to `b`
    pub fn shortest_path_length_in(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Option<u32>> {
        check_pair(self.hierarchy.as_ref(), a, b, category)?;
        if a == b {
            return Ok(Some(0));
        }

        let up_a = self.hierarchy.ancestor_closure(a, category)?;
        let up_b = self.hierarchy.ancestor_closure(b, category)?;
        let length = up_a
            .iter()
            .filter_map(|(ancestor, d1)| up_b.distance(ancestor).map(|d2| d1 + d2))
            .min();
        Ok(length)
    }

    pub fn path_similarity(&self, a: &ConceptId, b: &ConceptId) -> Result<Similarity> {
        self.path_similarity_in(a, b, Category::All)
    }

    /// `1 / length` of the shortest path; identical concepts score 1
    pub fn path_similarity_in(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Similarity> {
        Ok(match self.shortest_path_length_in(a, b, category)? {
            Some(0) => Similarity::Score(1.0),
            Some(length) => Similarity::Score(1.0 / f64::from(length)),
            None => Similarity::NotComparable,
        })
    }
}
