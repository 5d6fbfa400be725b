//! Pruning of concept lists, e.g. the MeSH hits extracted from one text.
//!
//! Narrow concepts have no hierarchy position; they pass through both
//! filters untouched.

use ahash::AHashSet;
use meshsim_core::{ConceptId, Hierarchy, Result};
use std::sync::Arc;
use tracing::debug;

pub struct ConceptFilter {
    hierarchy: Arc<dyn Hierarchy>,
}

impl ConceptFilter {
    pub fn new(hierarchy: Arc<dyn Hierarchy>) -> Self {
        Self { hierarchy }
    }

    /// Drop every id that is a proper ancestor of another id in the list, in
    /// any of its categories. Duplicates collapse to their first occurrence.
    pub fn discard_ancestors(&self, ids: &[ConceptId]) -> Result<Vec<ConceptId>> {
        let mut seen = AHashSet::new();
        let unique: Vec<&ConceptId> = ids.iter().filter(|id| seen.insert(*id)).collect();

        let mut covered: AHashSet<ConceptId> = AHashSet::new();
        for id in unique.iter().filter(|id| !id.is_narrow()) {
            for category in self.hierarchy.categories_of(id)? {
                let ancestors = self.hierarchy.ancestor_closure(id, category)?;
                covered.extend(ancestors.proper().cloned());
            }
        }

        let kept: Vec<ConceptId> = unique
            .into_iter()
            .filter(|id| !covered.contains(*id))
            .cloned()
            .collect();
        debug!(input = ids.len(), kept = kept.len(), "ancestors discarded");
        Ok(kept)
    }

    /// Drop ids with more than `max_descendants` distinct proper descendants
    /// across their categories
    pub fn discard_broad(&self, ids: &[ConceptId], max_descendants: usize) -> Result<Vec<ConceptId>> {
        let mut kept = Vec::with_capacity(ids.len());
        for id in ids {
            if id.is_narrow() {
                kept.push(id.clone());
                continue;
            }
            let mut descendants: AHashSet<&ConceptId> = AHashSet::new();
            let closures = self
                .hierarchy
                .categories_of(id)?
                .into_iter()
                .map(|category| self.hierarchy.descendant_closure(id, category))
                .collect::<Result<Vec<_>>>()?;
            for closure in &closures {
                descendants.extend(closure.proper());
            }
            if descendants.len() <= max_descendants {
                kept.push(id.clone());
            }
        }
        debug!(input = ids.len(), kept = kept.len(), max_descendants, "broad concepts discarded");
        Ok(kept)
    }
}
