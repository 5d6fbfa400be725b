//! Hierarchy navigation over the MeSH DAG.
//!
//! The tree is a DAG: a descriptor can have several parents inside one
//! category, so every traversal here is an iterative breadth-first walk with
//! a visited index. Each concept lands in a closure exactly once, at its
//! shortest hop distance from the start.

use ahash::AHashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheStats, SingleFlightCache};
use crate::{Category, ConceptId, Error, OntologyStore, PathCode, Result};

/// Candidate least common subsumer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Subsumer {
    Concept(ConceptId),
    /// The code-less top of a category: the two concepts share no tree prefix
    Top,
}

impl Subsumer {
    pub fn concept(&self) -> Option<&ConceptId> {
        match self {
            Subsumer::Concept(id) => Some(id),
            Subsumer::Top => None,
        }
    }
}

/// Result of an upward or downward traversal, start node included
#[derive(Debug, Clone)]
pub struct Closure {
    members: Vec<ConceptId>,
    distances: Vec<u32>,
    index: AHashMap<ConceptId, usize>,
}

impl Closure {
    fn traverse<F>(start: &ConceptId, mut next: F) -> Result<Self>
    where
        F: FnMut(&ConceptId) -> Result<Vec<ConceptId>>,
    {
        let mut closure = Closure {
            members: vec![start.clone()],
            distances: vec![0],
            index: AHashMap::new(),
        };
        closure.index.insert(start.clone(), 0);

        let mut queue = VecDeque::from([0usize]);
        while let Some(pos) = queue.pop_front() {
            let distance = closure.distances[pos] + 1;
            for neighbour in next(&closure.members[pos])? {
                if closure.index.contains_key(&neighbour) {
                    continue;
                }
                let slot = closure.members.len();
                closure.index.insert(neighbour.clone(), slot);
                closure.members.push(neighbour);
                closure.distances.push(distance);
                queue.push_back(slot);
            }
        }
        Ok(closure)
    }

    /// The concept the traversal started from
    #[inline]
    #[must_use]
    pub fn start(&self) -> &ConceptId {
        &self.members[0]
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ConceptId) -> bool {
        self.index.contains_key(id)
    }

    /// Shortest number of edges from the start concept
    pub fn distance(&self, id: &ConceptId) -> Option<u32> {
        self.index.get(id).map(|&i| self.distances[i])
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in breadth-first order
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[ConceptId] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConceptId, u32)> {
        self.members.iter().zip(self.distances.iter().copied())
    }

    /// Members other than the start concept
    pub fn proper(&self) -> impl Iterator<Item = &ConceptId> {
        self.members.iter().skip(1)
    }
}

/// Read interface the similarity engines use to reach the hierarchy
pub trait Hierarchy: Send + Sync {
    fn categories(&self) -> &[Category];

    /// Whether `id` is a loaded concept of either kind
    fn contains(&self, id: &ConceptId) -> bool;

    fn parents_of(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>>;

    fn children_of(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>>;

    fn ancestor_closure(&self, id: &ConceptId, category: Category) -> Result<Arc<Closure>>;

    fn descendant_closure(&self, id: &ConceptId, category: Category) -> Result<Arc<Closure>>;

    /// Subsumer candidates from shared tree-code prefixes
    fn least_common_subsumers(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Vec<Subsumer>>;

    /// Subsumer candidates from intersecting ancestor closures
    fn common_ancestors(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Vec<Subsumer>>;

    fn main_headings(&self, category: Category) -> Result<Vec<ConceptId>>;

    fn frequency(&self, id: &ConceptId) -> Result<f64>;

    fn broader_of(&self, id: &ConceptId) -> Result<Vec<ConceptId>>;

    fn categories_of(&self, id: &ConceptId) -> Result<Vec<Category>>;
}

type ClosureKey = (Category, ConceptId);

/// Caching navigator over an [`OntologyStore`]
pub struct Navigator {
    store: Arc<dyn OntologyStore>,
    categories: Vec<Category>,
    ancestors: SingleFlightCache<ClosureKey, Closure>,
    descendants: SingleFlightCache<ClosureKey, Closure>,
}

impl Navigator {
    pub fn new(store: Arc<dyn OntologyStore>) -> Self {
        let categories = store.all_categories();
        debug!(categories = categories.len(), "navigator ready");
        Self {
            store,
            categories,
            ancestors: SingleFlightCache::new(),
            descendants: SingleFlightCache::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn OntologyStore> {
        &self.store
    }

    pub fn ancestor_cache_stats(&self) -> &CacheStats {
        self.ancestors.stats()
    }

    pub fn descendant_cache_stats(&self) -> &CacheStats {
        self.descendants.stats()
    }

    fn check_category(&self, category: Category) -> Result<()> {
        if self.categories.contains(&category) {
            Ok(())
        } else {
            Err(Error::CategoryNotLoaded(category))
        }
    }

    fn check_main_heading(id: &ConceptId) -> Result<()> {
        if id.is_narrow() {
            Err(Error::NarrowConcept(id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Tree codes of `id` that lie inside `category`
    pub fn path_codes_in(&self, id: &ConceptId, category: Category) -> Result<Vec<PathCode>> {
        Self::check_main_heading(id)?;
        Ok(self
            .store
            .path_codes(id)?
            .into_iter()
            .filter(|code| category.admits(code))
            .collect())
    }

    pub fn concept_by_path_code(&self, code: &PathCode) -> Result<Option<ConceptId>> {
        self.store.concept_by_path_code(code)
    }

    /// Top-level descriptors above `id`, one per distinct tree root
    pub fn top_concepts(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        Self::check_main_heading(id)?;
        let mut tops = Vec::new();
        for code in self.store.path_codes(id)? {
            match self.store.concept_by_path_code(&code.root())? {
                Some(top) if !tops.contains(&top) => tops.push(top),
                Some(_) => {}
                None => warn!(code = %code.root(), concept = %id, "no concept owns root tree code"),
            }
        }
        Ok(tops)
    }

    pub fn narrower_of(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        Self::check_main_heading(id)?;
        self.store.narrower_concepts(id)
    }

    pub fn preferred_name(&self, id: &ConceptId) -> Result<Option<String>> {
        self.store.preferred_name(id)
    }
}

impl Hierarchy for Navigator {
    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn contains(&self, id: &ConceptId) -> bool {
        self.store.contains(id)
    }

    fn parents_of(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>> {
        self.check_category(category)?;
        Self::check_main_heading(id)?;
        self.store.parents(id, category)
    }

    fn children_of(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>> {
        self.check_category(category)?;
        Self::check_main_heading(id)?;
        self.store.children(id, category)
    }

    fn ancestor_closure(&self, id: &ConceptId, category: Category) -> Result<Arc<Closure>> {
        self.check_category(category)?;
        Self::check_main_heading(id)?;
        self.ancestors.get_or_try_insert_with((category, id.clone()), || {
            let closure = Closure::traverse(id, |c| self.store.parents(c, category))?;
            debug!(concept = %id, %category, size = closure.len(), "ancestor closure computed");
            Ok(closure)
        })
    }

    fn descendant_closure(&self, id: &ConceptId, category: Category) -> Result<Arc<Closure>> {
        self.check_category(category)?;
        Self::check_main_heading(id)?;
        self.descendants.get_or_try_insert_with((category, id.clone()), || {
            let closure = Closure::traverse(id, |c| self.store.children(c, category))?;
            debug!(concept = %id, %category, size = closure.len(), "descendant closure computed");
            Ok(closure)
        })
    }

    fn least_common_subsumers(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Vec<Subsumer>> {
        self.check_category(category)?;
        let codes_a = self.path_codes_in(a, category)?;
        let codes_b = self.path_codes_in(b, category)?;

        if codes_a.is_empty() || codes_b.is_empty() {
            warn!(%a, %b, %category, "concept has no tree code in category");
            return Ok(vec![Subsumer::Top]);
        }

        let mut candidates = Vec::new();
        for code_a in &codes_a {
            for code_b in &codes_b {
                let candidate = match code_a.common_prefix(code_b) {
                    None => Subsumer::Top,
                    Some(prefix) => match self.store.concept_by_path_code(&prefix)? {
                        Some(owner) => Subsumer::Concept(owner),
                        None => {
                            warn!(code = %prefix, "no concept owns shared tree code");
                            Subsumer::Top
                        }
                    },
                };
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        Ok(candidates)
    }

    fn common_ancestors(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Vec<Subsumer>> {
        let ancestors_a = self.ancestor_closure(a, category)?;
        let ancestors_b = self.ancestor_closure(b, category)?;
        let common: Vec<Subsumer> = ancestors_a
            .members()
            .iter()
            .filter(|id| ancestors_b.contains(id))
            .cloned()
            .map(Subsumer::Concept)
            .collect();
        if common.is_empty() {
            Ok(vec![Subsumer::Top])
        } else {
            Ok(common)
        }
    }

    fn main_headings(&self, category: Category) -> Result<Vec<ConceptId>> {
        self.check_category(category)?;
        self.store.main_headings(category)
    }

    fn frequency(&self, id: &ConceptId) -> Result<f64> {
        self.store.frequency(id)
    }

    fn broader_of(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        self.store.broader_concepts(id)
    }

    fn categories_of(&self, id: &ConceptId) -> Result<Vec<Category>> {
        self.store.categories(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConceptRecord, MemoryOntology, NarrowRecord};

    fn id(s: &str) -> ConceptId {
        ConceptId::parse(s).unwrap()
    }

    fn heading(s: &str, codes: &[&str]) -> ConceptRecord {
        codes.iter().fold(ConceptRecord::new(id(s), s), |r, c| {
            r.with_path_code(c.parse().unwrap())
        })
    }

    // A -> B, A -> C, B -> D, C -> D (D has two parents)
    fn diamond() -> Navigator {
        let store = MemoryOntology::builder()
            .concept(heading("D000001", &["C01"]))
            .concept(heading("D000002", &["C01.001"]))
            .concept(heading("D000003", &["C01.002"]))
            .concept(heading("D000004", &["C01.001.001", "C01.002.001"]))
            .edge(id("D000002"), id("D000001"), Category::C)
            .edge(id("D000003"), id("D000001"), Category::C)
            .edge(id("D000004"), id("D000002"), Category::C)
            .edge(id("D000004"), id("D000003"), Category::C)
            .narrow(NarrowRecord {
                id: id("C000001"),
                name: "n".to_string(),
                broader: vec![id("D000004")],
            })
            .build()
            .unwrap();
        Navigator::new(Arc::new(store))
    }

    #[test]
    fn test_diamond_ancestors_visited_once() {
        let nav = diamond();
        let closure = nav.ancestor_closure(&id("D000004"), Category::C).unwrap();
        assert_eq!(closure.len(), 4);
        let mut members = closure.members().to_vec();
        members.sort();
        assert_eq!(members, vec![id("D000001"), id("D000002"), id("D000003"), id("D000004")]);
        assert_eq!(closure.distance(&id("D000004")), Some(0));
        assert_eq!(closure.distance(&id("D000002")), Some(1));
        assert_eq!(closure.distance(&id("D000001")), Some(2));
    }

    #[test]
    fn test_diamond_descendants_visited_once() {
        let nav = diamond();
        let closure = nav.descendant_closure(&id("D000001"), Category::C).unwrap();
        assert_eq!(closure.len(), 4);
        assert_eq!(closure.distance(&id("D000004")), Some(2));
        assert_eq!(closure.start(), &id("D000001"));
        assert_eq!(closure.proper().count(), 3);
    }

    #[test]
    fn test_closures_contain_self() {
        let nav = diamond();
        for s in ["D000001", "D000002", "D000003", "D000004"] {
            let x = id(s);
            assert!(nav.ancestor_closure(&x, Category::C).unwrap().contains(&x));
            assert!(nav.descendant_closure(&x, Category::C).unwrap().contains(&x));
        }
    }

    #[test]
    fn test_closures_are_cached() {
        let nav = diamond();
        let first = nav.ancestor_closure(&id("D000004"), Category::C).unwrap();
        let second = nav.ancestor_closure(&id("D000004"), Category::C).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(nav.ancestor_cache_stats().misses.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn test_narrow_concept_rejected() {
        let nav = diamond();
        assert!(matches!(
            nav.parents_of(&id("C000001"), Category::C),
            Err(Error::NarrowConcept(_))
        ));
        assert!(nav.ancestor_closure(&id("C000001"), Category::C).is_err());
        assert_eq!(nav.broader_of(&id("C000001")).unwrap(), vec![id("D000004")]);
    }

    #[test]
    fn test_unloaded_category_rejected() {
        let nav = diamond();
        assert!(matches!(
            nav.children_of(&id("D000001"), Category::Z),
            Err(Error::CategoryNotLoaded(Category::Z))
        ));
    }

    #[test]
    fn test_subsumers_by_tree_code() {
        let nav = diamond();
        let subsumers = nav
            .least_common_subsumers(&id("D000004"), &id("D000003"), Category::C)
            .unwrap();
        // C01.001.001 vs C01.002 -> C01; C01.002.001 vs C01.002 -> C01.002
        assert_eq!(subsumers.len(), 2);
        assert!(subsumers.contains(&Subsumer::Concept(id("D000001"))));
        assert!(subsumers.contains(&Subsumer::Concept(id("D000003"))));
    }

    #[test]
    fn test_disjoint_codes_give_top() {
        let store = MemoryOntology::builder()
            .concept(heading("D000001", &["C01"]))
            .concept(heading("D000002", &["C02"]))
            .build()
            .unwrap();
        let nav = Navigator::new(Arc::new(store));
        let subsumers = nav
            .least_common_subsumers(&id("D000001"), &id("D000002"), Category::C)
            .unwrap();
        assert_eq!(subsumers, vec![Subsumer::Top]);
        let common = nav
            .common_ancestors(&id("D000001"), &id("D000002"), Category::C)
            .unwrap();
        assert_eq!(common, vec![Subsumer::Top]);
    }

    #[test]
    fn test_unowned_prefix_degrades_to_top() {
        // C01 has no descriptor, so the shared prefix cannot be resolved
        let store = MemoryOntology::builder()
            .concept(heading("D000002", &["C01.001"]))
            .concept(heading("D000003", &["C01.002"]))
            .build()
            .unwrap();
        let nav = Navigator::new(Arc::new(store));
        let subsumers = nav
            .least_common_subsumers(&id("D000002"), &id("D000003"), Category::C)
            .unwrap();
        assert_eq!(subsumers, vec![Subsumer::Top]);
    }

    #[test]
    fn test_common_ancestors() {
        let nav = diamond();
        let common = nav
            .common_ancestors(&id("D000002"), &id("D000003"), Category::C)
            .unwrap();
        assert_eq!(common, vec![Subsumer::Concept(id("D000001"))]);
    }

    #[test]
    fn test_top_concepts() {
        let nav = diamond();
        assert_eq!(nav.top_concepts(&id("D000004")).unwrap(), vec![id("D000001")]);
        assert_eq!(nav.narrower_of(&id("D000004")).unwrap(), vec![id("C000001")]);
    }
}
