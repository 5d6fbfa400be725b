// Argument checks shared by the engines
use meshsim_core::{Category, ConceptId, Error, Hierarchy, Result};

/// Both ids must be loaded main headings and the category must be loaded
pub(crate) fn check_pair(
    hierarchy: &dyn Hierarchy,
    a: &ConceptId,
    b: &ConceptId,
    category: Category,
) -> Result<()> {
    if !hierarchy.categories().contains(&category) {
        return Err(Error::CategoryNotLoaded(category));
    }
    for id in [a, b] {
        if id.is_narrow() {
            return Err(Error::NarrowConcept(id.to_string()));
        }
        if !hierarchy.contains(id) {
            return Err(Error::ConceptNotFound(id.to_string()));
        }
    }
    Ok(())
}
