// Integration tests for meshsim
use meshsim_core::{Category, ConceptId, ConceptRecord, Error, Hierarchy, MemoryOntology, NarrowRecord, Navigator};
use meshsim_similarity::{
    CollectingObserver, ConceptFilter, EngineConfig, PathEngine, Similarity, SimilarityMethod, SubsumerStrategy,
    TermSimilarity,
};
use meshsim_storage::{load_ontology, save_snapshot, OntologySnapshot};
use std::sync::Arc;
use tempfile::TempDir;

fn id(s: &str) -> ConceptId {
    ConceptId::parse(s).unwrap()
}

fn heading(s: &str, name: &str, codes: &[&str], frequency: f64) -> ConceptRecord {
    codes
        .iter()
        .fold(ConceptRecord::new(id(s), name), |r, c| r.with_path_code(c.parse().unwrap()))
        .with_frequency(frequency)
}

/// A slice of MeSH with one concept sitting in two categories
fn sample_ontology() -> MemoryOntology {
    MemoryOntology::builder()
        .concept(heading("D009369", "Neoplasms", &["C04"], 10.0))
        .concept(heading("D009370", "Neoplasms by Histologic Type", &["C04.557"], 5.0))
        .concept(heading("D018204", "Neoplasms, Connective Tissue", &["C04.557.450"], 3.0))
        .concept(heading("D009375", "Neoplasms, Glandular and Epithelial", &["C04.557.470"], 4.0))
        .concept(heading("D000230", "Adenocarcinoma", &["C04.557.470.035"], 6.0))
        .concept(heading("D001932", "Brain Neoplasms", &["C04.588.614", "C10.228.140.211"], 2.0))
        .concept(heading("D009371", "Neoplasms by Site", &["C04.588"], 1.0))
        .concept(heading("D009422", "Nervous System Diseases", &["C10"], 8.0))
        .concept(heading("D001927", "Brain Diseases", &["C10.228.140"], 2.0))
        .edge(id("D009370"), id("D009369"), Category::C)
        .edge(id("D018204"), id("D009370"), Category::C)
        .edge(id("D009375"), id("D009370"), Category::C)
        .edge(id("D000230"), id("D009375"), Category::C)
        .edge(id("D009371"), id("D009369"), Category::C)
        .edge(id("D001932"), id("D009371"), Category::C)
        .edge(id("D001927"), id("D009422"), Category::C)
        .edge(id("D001932"), id("D001927"), Category::C)
        .narrow(NarrowRecord {
            id: id("C536528"),
            name: "Glioma, familial".to_string(),
            broader: vec![id("D001932"), id("D000230")],
        })
        .narrow(NarrowRecord {
            id: id("C000657"),
            name: "Carcinoma 256, Walker".to_string(),
            broader: vec![id("D000230")],
        })
        .build()
        .unwrap()
}

fn orchestrator() -> (Arc<dyn Hierarchy>, TermSimilarity) {
    let hierarchy: Arc<dyn Hierarchy> = Arc::new(Navigator::new(Arc::new(sample_ontology())));
    let terms = TermSimilarity::new(hierarchy.clone(), EngineConfig::default()).unwrap();
    (hierarchy, terms)
}

#[test]
fn test_snapshot_to_scores() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mesh.json.gz");
    let description = save_snapshot(&path, &OntologySnapshot::from_ontology(&sample_ontology())).unwrap();

    let ontology = load_ontology(&path, Some(&description.checksum)).unwrap();
    assert_eq!(ontology.concept_count(), 9);

    let terms = TermSimilarity::new(
        Arc::new(Navigator::new(Arc::new(ontology))),
        EngineConfig::default(),
    )
    .unwrap();
    let scores = terms
        .term_similarity(&id("D018204"), &id("D000230"), Category::C, SimilarityMethod::Lin)
        .unwrap();
    assert_eq!(scores.len(), 1);
    let lin = scores[0].value().unwrap();
    assert!(lin > 0.0 && lin < 1.0, "lin = {}", lin);
}

#[test]
fn test_identity_for_every_method() {
    let (_, terms) = orchestrator();
    for method in SimilarityMethod::ALL {
        let scores = terms
            .term_similarity(&id("D009375"), &id("D009375"), Category::C, method)
            .unwrap();
        assert_eq!(scores, vec![Similarity::Score(1.0)], "method {}", method);
    }
}

#[test]
fn test_scores_stay_in_range() {
    let (hierarchy, terms) = orchestrator();
    let ids = hierarchy.main_headings(Category::C).unwrap();
    for a in &ids {
        for b in &ids {
            for method in [SimilarityMethod::Lin, SimilarityMethod::Jiang, SimilarityMethod::Rel, SimilarityMethod::Wang] {
                let score = terms.score_pair(a, b, Category::C, method).unwrap();
                if let Some(v) = score.value() {
                    assert!((0.0..=1.0 + 1e-12).contains(&v), "{} {} {} = {}", a, b, method, v);
                }
            }
        }
    }
}

#[test]
fn test_narrow_terms_expand_in_order() {
    let observer = Arc::new(CollectingObserver::new());
    let (_, terms) = orchestrator();
    let terms = terms.with_observer(observer.clone());

    let scores = terms
        .term_similarity_detailed(&id("C536528"), &id("C000657"), Category::C, SimilarityMethod::Wang)
        .unwrap();
    let pairs: Vec<_> = scores.iter().map(|s| s.pair.clone()).collect();
    assert_eq!(
        pairs,
        vec![(id("D001932"), id("D000230")), (id("D000230"), id("D000230"))]
    );
    assert_eq!(scores[1].score, Similarity::Score(1.0));
    assert_eq!(observer.drain().len(), 2);
}

#[test]
fn test_multi_category_concept() {
    let (hierarchy, terms) = orchestrator();
    // Brain Neoplasms sits under both Neoplasms by Site and Brain Diseases
    let ancestors = hierarchy.ancestor_closure(&id("D001932"), Category::C).unwrap();
    assert!(ancestors.contains(&id("D009369")));
    assert!(ancestors.contains(&id("D009422")));

    let path = terms.path();
    assert_eq!(
        path.shortest_path_length(&id("D001927"), &id("D009371")).unwrap(),
        None
    );
    assert_eq!(
        path.shortest_path_length(&id("D001932"), &id("D009422")).unwrap(),
        Some(2)
    );
}

#[test]
fn test_subsumer_strategies() {
    let hierarchy: Arc<dyn Hierarchy> = Arc::new(Navigator::new(Arc::new(sample_ontology())));
    let by_code = TermSimilarity::new(hierarchy.clone(), EngineConfig::default()).unwrap();
    let by_ancestry = TermSimilarity::new(
        hierarchy,
        EngineConfig {
            subsumer_strategy: SubsumerStrategy::Ancestry,
            ..EngineConfig::default()
        },
    )
    .unwrap();

    let a = id("D018204");
    let b = id("D000230");
    let lcs_code = by_code.information_content().least_common_subsumer(&a, &b, Category::C).unwrap();
    let lcs_ancestry = by_ancestry.information_content().least_common_subsumer(&a, &b, Category::C).unwrap();
    assert_eq!(lcs_code.subsumer.concept(), Some(&id("D009370")));
    assert_eq!(lcs_code, lcs_ancestry);
}

#[test]
fn test_invalid_inputs() {
    let (_, terms) = orchestrator();
    assert!(matches!(
        terms.term_similarity(&id("D009375"), &id("D000230"), Category::A, SimilarityMethod::Lin),
        Err(Error::CategoryNotLoaded(Category::A))
    ));
    assert!(matches!(ConceptId::parse("X123"), Err(Error::InvalidConceptId(_))));
    assert!(matches!("cosine".parse::<SimilarityMethod>(), Err(Error::UnknownMethod(_))));
    assert!(matches!(
        terms.normalize(&id("C999999")),
        Err(Error::ConceptNotFound(_))
    ));
    for method in SimilarityMethod::ALL {
        assert!(matches!(
            terms.term_similarity(&id("D999999"), &id("D000230"), Category::C, method),
            Err(Error::ConceptNotFound(_))
        ));
    }
}

#[test]
fn test_concurrent_scoring_is_consistent() {
    let (hierarchy, terms) = orchestrator();
    let ids = hierarchy.main_headings(Category::C).unwrap();
    let expected: Vec<Similarity> = ids
        .iter()
        .map(|b| terms.score_pair(&id("D000230"), b, Category::C, SimilarityMethod::Rel).unwrap())
        .collect();

    let fresh = TermSimilarity::new(hierarchy, EngineConfig::default()).unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for (b, want) in ids.iter().zip(&expected) {
                    let got = fresh.score_pair(&id("D000230"), b, Category::C, SimilarityMethod::Rel).unwrap();
                    assert_eq!(&got, want);
                }
            });
        }
    });
}

#[test]
fn test_concept_filter() {
    let (hierarchy, _) = orchestrator();
    let filter = ConceptFilter::new(hierarchy);
    let hits = [id("D009369"), id("D000230"), id("D009375"), id("D001927")];
    assert_eq!(
        filter.discard_ancestors(&hits).unwrap(),
        vec![id("D000230"), id("D001927")]
    );
    assert_eq!(
        filter.discard_broad(&hits, 1).unwrap(),
        vec![id("D000230"), id("D009375"), id("D001927")]
    );
}

#[test]
fn test_wang_decay_changes_scores() {
    let hierarchy: Arc<dyn Hierarchy> = Arc::new(Navigator::new(Arc::new(sample_ontology())));
    let default = PathEngine::new(hierarchy.clone());
    let steep = PathEngine::with_decay(hierarchy, 0.3).unwrap();
    let a = id("D018204");
    let b = id("D000230");
    let s1 = default.wang_similarity(&a, &b, Category::C).unwrap();
    let s2 = steep.wang_similarity(&a, &b, Category::C).unwrap();
    assert!(s1 > s2);
}
