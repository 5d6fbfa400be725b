pub mod snapshot;

pub use snapshot::{
    load_ontology, load_snapshot, save_snapshot, EdgeRecord, OntologySnapshot, SnapshotDescription,
    SNAPSHOT_VERSION,
};
