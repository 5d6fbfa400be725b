//! Read-only ontology store contract and the in-memory implementation.
//!
//! Engines never see how the hierarchy tables were produced; they only call
//! [`OntologyStore`]. [`MemoryOntology`] is the implementation used for
//! snapshots and tests, assembled through the validating [`OntologyBuilder`].

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

use crate::{Category, ConceptId, ConceptRecord, Error, NarrowRecord, PathCode, Result};

/// Category-scoped, read-only access to the MeSH hierarchy tables
pub trait OntologyStore: Send + Sync {
    /// Whether `id` names a loaded main heading or narrow concept
    fn contains(&self, id: &ConceptId) -> bool;

    /// Direct parents of `id` in `category`; empty when it has none
    fn parents(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>>;

    /// Direct children of `id` in `category`; empty when it has none
    fn children(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>>;

    fn path_codes(&self, id: &ConceptId) -> Result<Vec<PathCode>>;

    /// Raw corpus frequency; 0 for narrow concepts
    fn frequency(&self, id: &ConceptId) -> Result<f64>;

    fn categories(&self, id: &ConceptId) -> Result<Vec<Category>>;

    fn broader_concepts(&self, id: &ConceptId) -> Result<Vec<ConceptId>>;

    fn all_categories(&self) -> Vec<Category>;

    fn concept_by_path_code(&self, code: &PathCode) -> Result<Option<ConceptId>>;

    /// Every main heading that belongs to `category`
    fn main_headings(&self, category: Category) -> Result<Vec<ConceptId>>;

    fn preferred_name(&self, id: &ConceptId) -> Result<Option<String>>;

    fn narrower_concepts(&self, id: &ConceptId) -> Result<Vec<ConceptId>>;
}

#[derive(Debug, Default)]
struct EdgeTable {
    parents: AHashMap<ConceptId, Vec<ConceptId>>,
    children: AHashMap<ConceptId, Vec<ConceptId>>,
}

impl EdgeTable {
    fn insert(&mut self, child: &ConceptId, parent: &ConceptId) {
        let parents = self.parents.entry(child.clone()).or_default();
        if parents.contains(parent) {
            return;
        }
        parents.push(parent.clone());
        self.children.entry(parent.clone()).or_default().push(child.clone());
    }

    fn edge_count(&self) -> usize {
        self.parents.values().map(Vec::len).sum()
    }
}

/// In-memory ontology store
#[derive(Debug)]
pub struct MemoryOntology {
    concepts: AHashMap<ConceptId, ConceptRecord>,
    narrow: AHashMap<ConceptId, NarrowRecord>,
    narrower: AHashMap<ConceptId, Vec<ConceptId>>,
    by_code: AHashMap<PathCode, ConceptId>,
    edges: AHashMap<Category, EdgeTable>,
    main_headings: AHashMap<Category, Vec<ConceptId>>,
}

impl MemoryOntology {
    pub fn builder() -> OntologyBuilder {
        OntologyBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    #[inline]
    #[must_use]
    pub fn narrow_count(&self) -> usize {
        self.narrow.len()
    }

    pub fn edge_count(&self, category: Category) -> usize {
        self.edges.get(&category).map(EdgeTable::edge_count).unwrap_or(0)
    }

    pub fn concept(&self, id: &ConceptId) -> Option<&ConceptRecord> {
        self.concepts.get(id)
    }

    pub fn narrow_concept(&self, id: &ConceptId) -> Option<&NarrowRecord> {
        self.narrow.get(id)
    }

    /// Main heading records in id order
    pub fn concepts(&self) -> Vec<&ConceptRecord> {
        let mut records: Vec<&ConceptRecord> = self.concepts.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Narrow records in id order
    pub fn narrow_concepts(&self) -> Vec<&NarrowRecord> {
        let mut records: Vec<&NarrowRecord> = self.narrow.values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// (child, parent, category) triples of the real tree categories
    pub fn edges(&self) -> Vec<(ConceptId, ConceptId, Category)> {
        let mut edges = Vec::new();
        for category in Category::TREES {
            if let Some(table) = self.edges.get(&category) {
                for (child, parents) in &table.parents {
                    for parent in parents {
                        edges.push((child.clone(), parent.clone(), category));
                    }
                }
            }
        }
        edges.sort();
        edges
    }

    fn heading(&self, id: &ConceptId) -> Result<&ConceptRecord> {
        self.concepts
            .get(id)
            .ok_or_else(|| Error::ConceptNotFound(id.to_string()))
    }

    fn table(&self, category: Category) -> Result<&EdgeTable> {
        self.edges
            .get(&category)
            .ok_or(Error::CategoryNotLoaded(category))
    }
}

impl OntologyStore for MemoryOntology {
    fn contains(&self, id: &ConceptId) -> bool {
        self.concepts.contains_key(id) || self.narrow.contains_key(id)
    }

    fn parents(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>> {
        let table = self.table(category)?;
        self.heading(id)?;
        Ok(table.parents.get(id).cloned().unwrap_or_default())
    }

    fn children(&self, id: &ConceptId, category: Category) -> Result<Vec<ConceptId>> {
        let table = self.table(category)?;
        self.heading(id)?;
        Ok(table.children.get(id).cloned().unwrap_or_default())
    }

    fn path_codes(&self, id: &ConceptId) -> Result<Vec<PathCode>> {
        Ok(self.heading(id)?.path_codes.clone())
    }

    fn frequency(&self, id: &ConceptId) -> Result<f64> {
        if self.narrow.contains_key(id) {
            return Ok(0.0);
        }
        Ok(self.heading(id)?.frequency)
    }

    fn categories(&self, id: &ConceptId) -> Result<Vec<Category>> {
        if let Some(record) = self.concepts.get(id) {
            return Ok(record.categories());
        }
        // narrow concepts are filed under their broader concepts' categories
        let Some(record) = self.narrow.get(id) else {
            return Err(Error::ConceptNotFound(id.to_string()));
        };
        let categories: BTreeSet<Category> = record
            .broader
            .iter()
            .filter_map(|b| self.concepts.get(b))
            .flat_map(ConceptRecord::categories)
            .collect();
        Ok(categories.into_iter().collect())
    }

    fn broader_concepts(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        self.narrow
            .get(id)
            .map(|n| n.broader.clone())
            .ok_or_else(|| Error::ConceptNotFound(id.to_string()))
    }

    fn all_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.edges.keys().copied().collect();
        categories.sort();
        categories
    }

    fn concept_by_path_code(&self, code: &PathCode) -> Result<Option<ConceptId>> {
        Ok(self.by_code.get(code).cloned())
    }

    fn main_headings(&self, category: Category) -> Result<Vec<ConceptId>> {
        self.table(category)?;
        Ok(self.main_headings.get(&category).cloned().unwrap_or_default())
    }

    fn preferred_name(&self, id: &ConceptId) -> Result<Option<String>> {
        let name = self
            .concepts
            .get(id)
            .map(|c| c.name.clone())
            .or_else(|| self.narrow.get(id).map(|n| n.name.clone()));
        Ok(name)
    }

    fn narrower_concepts(&self, id: &ConceptId) -> Result<Vec<ConceptId>> {
        self.heading(id)?;
        Ok(self.narrower.get(id).cloned().unwrap_or_default())
    }
}

/// Validating builder for [`MemoryOntology`]
#[derive(Debug, Default)]
pub struct OntologyBuilder {
    concepts: Vec<ConceptRecord>,
    narrow: Vec<NarrowRecord>,
    edges: Vec<(ConceptId, ConceptId, Category)>,
}

impl OntologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concept(mut self, record: ConceptRecord) -> Self {
        self.concepts.push(record);
        self
    }

    pub fn narrow(mut self, record: NarrowRecord) -> Self {
        self.narrow.push(record);
        self
    }

    /// Declare `child` narrower than `parent` inside `category`
    pub fn edge(mut self, child: ConceptId, parent: ConceptId, category: Category) -> Self {
        self.edges.push((child, parent, category));
        self
    }

    pub fn add_concept(&mut self, record: ConceptRecord) {
        self.concepts.push(record);
    }

    pub fn add_narrow(&mut self, record: NarrowRecord) {
        self.narrow.push(record);
    }

    pub fn add_edge(&mut self, child: ConceptId, parent: ConceptId, category: Category) {
        self.edges.push((child, parent, category));
    }

    pub fn build(self) -> Result<MemoryOntology> {
        let mut concepts: AHashMap<ConceptId, ConceptRecord> = AHashMap::with_capacity(self.concepts.len());
        let mut by_code: AHashMap<PathCode, ConceptId> = AHashMap::new();

        for record in self.concepts {
            if record.id.is_narrow() {
                return Err(Error::Storage(format!(
                    "{} is a narrow concept and cannot be loaded as a main heading",
                    record.id
                )));
            }
            if !record.frequency.is_finite() || record.frequency < 0.0 {
                return Err(Error::Storage(format!(
                    "{} has invalid frequency {}",
                    record.id, record.frequency
                )));
            }
            for code in &record.path_codes {
                if let Some(owner) = by_code.insert(code.clone(), record.id.clone()) {
                    if owner != record.id {
                        return Err(Error::Storage(format!(
                            "tree code {} is owned by both {} and {}",
                            code, owner, record.id
                        )));
                    }
                }
            }
            if concepts.contains_key(&record.id) {
                return Err(Error::Storage(format!("duplicate concept {}", record.id)));
            }
            concepts.insert(record.id.clone(), record);
        }

        let mut narrow: AHashMap<ConceptId, NarrowRecord> = AHashMap::with_capacity(self.narrow.len());
        let mut narrower: AHashMap<ConceptId, Vec<ConceptId>> = AHashMap::new();
        for record in self.narrow {
            if !record.id.is_narrow() {
                return Err(Error::Storage(format!("{} is not a narrow concept", record.id)));
            }
            for broader in &record.broader {
                if !concepts.contains_key(broader) {
                    return Err(Error::ConceptNotFound(broader.to_string()));
                }
                let list = narrower.entry(broader.clone()).or_default();
                if !list.contains(&record.id) {
                    list.push(record.id.clone());
                }
            }
            if narrow.contains_key(&record.id) {
                return Err(Error::Storage(format!("duplicate concept {}", record.id)));
            }
            narrow.insert(record.id.clone(), record);
        }

        let mut edges: AHashMap<Category, EdgeTable> = AHashMap::new();
        let mut members: AHashMap<Category, AHashSet<ConceptId>> = AHashMap::new();
        for (child, parent, category) in &self.edges {
            if category.is_all() {
                return Err(Error::Storage(
                    "edges of the `all` category are derived, not loaded".to_string(),
                ));
            }
            for id in [child, parent] {
                if !concepts.contains_key(id) {
                    return Err(Error::ConceptNotFound(id.to_string()));
                }
            }
            if child == parent {
                return Err(Error::Storage(format!("{} cannot be its own parent", child)));
            }
            edges.entry(*category).or_default().insert(child, parent);
            edges.entry(Category::All).or_default().insert(child, parent);
            let set = members.entry(*category).or_default();
            set.insert(child.clone());
            set.insert(parent.clone());
        }

        for record in concepts.values() {
            for category in record.categories() {
                edges.entry(category).or_default();
                members.entry(category).or_default().insert(record.id.clone());
            }
        }
        if !concepts.is_empty() {
            edges.entry(Category::All).or_default();
            members.insert(Category::All, concepts.keys().cloned().collect());
        }

        let main_headings = members
            .into_iter()
            .map(|(category, ids)| {
                let mut ids: Vec<ConceptId> = ids.into_iter().collect();
                ids.sort();
                (category, ids)
            })
            .collect();

        tracing::debug!(
            concepts = concepts.len(),
            narrow = narrow.len(),
            edges = self.edges.len(),
            "ontology built"
        );

        Ok(MemoryOntology {
            concepts,
            narrow,
            narrower,
            by_code,
            edges,
            main_headings,
        })
    }
}
