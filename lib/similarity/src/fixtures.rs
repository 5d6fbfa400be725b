//! Small hierarchies shared by the unit tests.

use meshsim_core::{Category, ConceptId, ConceptRecord, Hierarchy, MemoryOntology, NarrowRecord, Navigator};
use std::sync::Arc;

pub fn id(s: &str) -> ConceptId {
    ConceptId::parse(s).unwrap()
}

pub fn heading(s: &str, codes: &[&str], frequency: f64) -> ConceptRecord {
    codes
        .iter()
        .fold(ConceptRecord::new(id(s), s), |r, c| r.with_path_code(c.parse().unwrap()))
        .with_frequency(frequency)
}

fn narrow(s: &str, broader: &[&str]) -> NarrowRecord {
    NarrowRecord {
        id: id(s),
        name: s.to_string(),
        broader: broader.iter().map(|b| id(b)).collect(),
    }
}

/// D1 (C01) with children D2 (C01.001, 0.4) and D3 (C01.002, 0.6).
/// N1 is narrower than D2 and D3, N2 narrower than D2.
pub fn scenario() -> Arc<dyn Hierarchy> {
    let store = MemoryOntology::builder()
        .concept(heading("D000001", &["C01"], 0.0))
        .concept(heading("D000002", &["C01.001"], 0.4))
        .concept(heading("D000003", &["C01.002"], 0.6))
        .edge(id("D000002"), id("D000001"), Category::C)
        .edge(id("D000003"), id("D000001"), Category::C)
        .narrow(narrow("C000001", &["D000002", "D000003"]))
        .narrow(narrow("C000002", &["D000002"]))
        .build()
        .unwrap();
    Arc::new(Navigator::new(Arc::new(store)))
}

/// Diamond D1 -> {D2, D3} -> D4, plus D5 under D3 with no frequency and a
/// separate root D6 (C02).
pub fn diamond() -> Arc<dyn Hierarchy> {
    let store = MemoryOntology::builder()
        .concept(heading("D000001", &["C01"], 2.0))
        .concept(heading("D000002", &["C01.001"], 3.0))
        .concept(heading("D000003", &["C01.002"], 4.0))
        .concept(heading("D000004", &["C01.001.001", "C01.002.001"], 1.0))
        .concept(heading("D000005", &["C01.002.002"], 0.0))
        .concept(heading("D000006", &["C02"], 5.0))
        .edge(id("D000002"), id("D000001"), Category::C)
        .edge(id("D000003"), id("D000001"), Category::C)
        .edge(id("D000004"), id("D000002"), Category::C)
        .edge(id("D000004"), id("D000003"), Category::C)
        .edge(id("D000005"), id("D000003"), Category::C)
        .narrow(narrow("C000001", &["D000004"]))
        .narrow(narrow("C000002", &["D000002", "D000006"]))
        .build()
        .unwrap();
    Arc::new(Navigator::new(Arc::new(store)))
}
