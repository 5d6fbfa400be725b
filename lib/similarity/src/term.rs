//! Term-level similarity over main headings and narrow concepts.
//!
//! Narrow concepts have no position in the hierarchy, so each side of a
//! comparison is first expanded to its broader main headings. Every pair of
//! the cartesian product is then scored by the engine the method belongs to.

use meshsim_core::{Category, ConceptId, Error, Hierarchy, Result};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineConfig;
use crate::ic::InformationContentEngine;
use crate::observer::{ScoreObserver, TracingObserver};
use crate::path::PathEngine;
use crate::score::{PairScore, Similarity, SimilarityMethod};

pub struct TermSimilarity {
    hierarchy: Arc<dyn Hierarchy>,
    ic: InformationContentEngine,
    path: PathEngine,
    observer: Arc<dyn ScoreObserver>,
}

impl TermSimilarity {
    pub fn new(hierarchy: Arc<dyn Hierarchy>, config: EngineConfig) -> Result<Self> {
        let path = PathEngine::with_decay(hierarchy.clone(), config.decay)?;
        let ic = InformationContentEngine::with_config(hierarchy.clone(), config)?;
        Ok(Self::from_engines(hierarchy, ic, path))
    }

    pub fn from_engines(hierarchy: Arc<dyn Hierarchy>, ic: InformationContentEngine, path: PathEngine) -> Self {
        Self {
            hierarchy,
            ic,
            path,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn ScoreObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[inline]
    #[must_use]
    pub fn information_content(&self) -> &InformationContentEngine {
        &self.ic
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &PathEngine {
        &self.path
    }

    /// Main headings a term stands for: itself, or the broader concepts of a
    /// narrow concept
    pub fn normalize(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        if !id.is_narrow() {
            if !self.hierarchy.contains(id) {
                return Err(Error::ConceptNotFound(id.to_string()));
            }
            return Ok(vec![id.clone()]);
        }
        let broader = self.hierarchy.broader_of(id)?;
        if broader.is_empty() {
            return Err(Error::NoBroaderConcepts(id.to_string()));
        }
        Ok(broader)
    }

    /// Scores in cartesian order of the normalized terms
    pub fn term_similarity(
        &self,
        a: &ConceptId,
        b: &ConceptId,
        category: Category,
        method: SimilarityMethod,
    ) -> Result<Vec<Similarity>> {
        Ok(self
            .term_similarity_detailed(a, b, category, method)?
            .into_iter()
            .map(|s| s.score)
            .collect())
    }

    pub fn term_similarity_detailed(
        &self,
        a: &ConceptId,
        b: &ConceptId,
        category: Category,
        method: SimilarityMethod,
    ) -> Result<Vec<PairScore>> {
        let left = self.normalize(a)?;
        let right = self.normalize(b)?;
        debug!(%a, %b, pairs = left.len() * right.len(), %method, "comparing terms");

        let mut scores = Vec::with_capacity(left.len() * right.len());
        for x in &left {
            for y in &right {
                let score = PairScore {
                    query: (a.clone(), b.clone()),
                    pair: (x.clone(), y.clone()),
                    category,
                    method,
                    score: self.score_pair(x, y, category, method)?,
                };
                self.observer.on_score(&score);
                scores.push(score);
            }
        }
        Ok(scores)
    }

    /// Score two main headings with one method
    pub fn score_pair(
        &self,
        a: &ConceptId,
        b: &ConceptId,
        category: Category,
        method: SimilarityMethod,
    ) -> Result<Similarity> {
        match method {
            SimilarityMethod::Resnik | SimilarityMethod::Lin | SimilarityMethod::Jiang | SimilarityMethod::Rel => {
                self.ic.score(a, b, category, method)
            }
            SimilarityMethod::Wang => self.path.wang_similarity(a, b, category).map(Similarity::Score),
            SimilarityMethod::Path => self.path.path_similarity_in(a, b, category),
        }
    }

    /// Compare many term pairs in parallel; results keep the input order
    pub fn score_batch(
        &self,
        pairs: &[(ConceptId, ConceptId)],
        category: Category,
        method: SimilarityMethod,
    ) -> Vec<Result<Vec<PairScore>>> {
        pairs
            .par_iter()
            .map(|(a, b)| self.term_similarity_detailed(a, b, category, method))
            .collect()
    }
}
