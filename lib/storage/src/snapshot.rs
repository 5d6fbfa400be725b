// Ontology snapshots: JSON, optionally gzip-compressed
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use meshsim_core::{Category, ConceptId, ConceptRecord, MemoryOntology, NarrowRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Snapshot description returned after a save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDescription {
    pub name: String,
    pub creation_time: Option<String>,
    pub size: u64,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub child: ConceptId,
    pub parent: ConceptId,
    pub category: Category,
}

/// Everything needed to rebuild a [`MemoryOntology`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologySnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub concepts: Vec<ConceptRecord>,
    #[serde(default)]
    pub narrow: Vec<NarrowRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl OntologySnapshot {
    pub fn from_ontology(ontology: &MemoryOntology) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            concepts: ontology.concepts().into_iter().cloned().collect(),
            narrow: ontology.narrow_concepts().into_iter().cloned().collect(),
            edges: ontology
                .edges()
                .into_iter()
                .map(|(child, parent, category)| EdgeRecord { child, parent, category })
                .collect(),
        }
    }

    /// Rebuild the store through the validating builder
    pub fn into_ontology(self) -> Result<MemoryOntology> {
        if self.version > SNAPSHOT_VERSION {
            return Err(anyhow!(
                "Snapshot version {} is newer than supported version {}",
                self.version,
                SNAPSHOT_VERSION
            ));
        }
        let mut builder = MemoryOntology::builder();
        for record in self.concepts {
            builder.add_concept(record);
        }
        for record in self.narrow {
            builder.add_narrow(record);
        }
        for edge in self.edges {
            builder.add_edge(edge.child, edge.parent, edge.category);
        }
        builder.build().context("Snapshot does not describe a valid ontology")
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write `snapshot` to `path` atomically; gzip when the path ends in `.gz`
pub fn save_snapshot(path: &Path, snapshot: &OntologySnapshot) -> Result<SnapshotDescription> {
    let json_data = serde_json::to_vec(snapshot)?;
    let bytes = if is_gzip_path(path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json_data)?;
        encoder.finish()?
    } else {
        json_data
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&bytes))
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;

    let now: DateTime<Utc> = Utc::now();
    let description = SnapshotDescription {
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string(),
        creation_time: Some(now.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        size: bytes.len() as u64,
        checksum: checksum(&bytes),
    };
    info!(
        path = %path.display(),
        concepts = snapshot.concepts.len(),
        size = description.size,
        "snapshot saved"
    );
    Ok(description)
}

/// Read a snapshot, verifying its SHA-256 checksum when one is given
pub fn load_snapshot(path: &Path, expected_checksum: Option<&str>) -> Result<OntologySnapshot> {
    if !path.exists() {
        return Err(anyhow!("Snapshot '{}' not found", path.display()));
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    if let Some(expected) = expected_checksum {
        let actual = checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(anyhow!(
                "Checksum mismatch: expected {}, got {}",
                expected,
                actual
            ));
        }
    }

    let json_data = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut json_data = Vec::new();
        decoder.read_to_end(&mut json_data)?;
        json_data
    } else {
        bytes
    };

    let snapshot: OntologySnapshot = serde_json::from_slice(&json_data)
        .with_context(|| format!("Malformed snapshot {}", path.display()))?;
    info!(
        path = %path.display(),
        concepts = snapshot.concepts.len(),
        narrow = snapshot.narrow.len(),
        edges = snapshot.edges.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Load a snapshot straight into a store
pub fn load_ontology(path: &Path, expected_checksum: Option<&str>) -> Result<MemoryOntology> {
    load_snapshot(path, expected_checksum)?.into_ontology()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> ConceptId {
        ConceptId::parse(s).unwrap()
    }

    fn sample() -> OntologySnapshot {
        OntologySnapshot {
            version: SNAPSHOT_VERSION,
            concepts: vec![
                ConceptRecord::new(id("D000001"), "Diseases").with_path_code("C01".parse().unwrap()),
                ConceptRecord::new(id("D000002"), "Infections")
                    .with_path_code("C01.001".parse().unwrap())
                    .with_frequency(3.0),
            ],
            narrow: vec![NarrowRecord {
                id: id("C000001"),
                name: "Sepsis variant".to_string(),
                broader: vec![id("D000002")],
            }],
            edges: vec![EdgeRecord {
                child: id("D000002"),
                parent: id("D000001"),
                category: Category::C,
            }],
        }
    }

    #[test]
    fn test_save_and_load_gzip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mesh.json.gz");
        let description = save_snapshot(&path, &sample()).unwrap();

        let raw = fs::read(&path).unwrap();
        assert!(raw.starts_with(&GZIP_MAGIC));
        assert_eq!(description.size, raw.len() as u64);
        assert_eq!(description.name, "mesh.json.gz");

        let loaded = load_snapshot(&path, Some(&description.checksum)).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_plain_json_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("mesh.json");
        save_snapshot(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"D000002\""));
        assert!(text.contains("\"C01.001\""));
        assert_eq!(load_snapshot(&path, None).unwrap(), sample());
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mesh.json.gz");
        save_snapshot(&path, &sample()).unwrap();
        let err = load_snapshot(&path, Some("deadbeef")).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        assert!(load_snapshot(&dir.path().join("absent.json"), None).is_err());

        let path = dir.path().join("broken.json");
        fs::write(&path, b"{\"concepts\": [{\"id\": \"X1\"}]}").unwrap();
        assert!(load_snapshot(&path, None).is_err());
    }

    #[test]
    fn test_ontology_round_trip() {
        let ontology = sample().into_ontology().unwrap();
        assert_eq!(ontology.concept_count(), 2);
        assert_eq!(ontology.narrow_count(), 1);
        assert_eq!(ontology.edge_count(Category::C), 1);

        let again = OntologySnapshot::from_ontology(&ontology);
        assert_eq!(again, sample());
    }

    #[test]
    fn test_invalid_snapshot_rejected_by_builder() {
        let mut snapshot = sample();
        snapshot.edges.push(EdgeRecord {
            child: id("D000002"),
            parent: id("D000009"),
            category: Category::C,
        });
        assert!(snapshot.into_ontology().is_err());

        let mut snapshot = sample();
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(snapshot.into_ontology().is_err());
    }
}
