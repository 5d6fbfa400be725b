use anyhow::{anyhow, bail, Context};
use clap::Parser;
use meshsim_core::{Category, ConceptId, Navigator};
use meshsim_similarity::{EngineConfig, PairScore, SimilarityMethod, TermSimilarity};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Semantic similarity between MeSH concepts
#[derive(Parser, Debug)]
#[command(name = "meshsim")]
#[command(about = "Score the semantic similarity of MeSH concepts", long_about = None)]
struct Args {
    /// Ontology snapshot (.json or .json.gz)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Expected SHA-256 checksum of the snapshot file
    #[arg(long)]
    checksum: Option<String>,

    /// MeSH category letter, or "all"
    #[arg(short, long, default_value = "all")]
    category: String,

    /// resnik, lin, jiang, rel, wang or path
    #[arg(short, long, default_value = "lin")]
    method: String,

    /// Engine configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decay factor for the wang method, overrides the config file
    #[arg(long)]
    decay: Option<f64>,

    /// File of tab-separated id pairs, one pair per line
    #[arg(long)]
    pairs: Option<PathBuf>,

    /// Print one JSON object per pair instead of tab-separated text
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// The two MeSH ids to compare
    ids: Vec<String>,
}

fn read_pairs(path: &PathBuf) -> anyhow::Result<Vec<(ConceptId, ConceptId)>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        match (fields.next(), fields.next()) {
            (Some(a), Some(b)) => pairs.push((a.trim().parse()?, b.trim().parse()?)),
            _ => bail!("{}:{}: expected two tab-separated ids", path.display(), number + 1),
        }
    }
    Ok(pairs)
}

fn print_score(score: &PairScore, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(score)?);
    } else {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            score.query.0, score.query.1, score.pair.0, score.pair.1, score.score
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let category: Category = args.category.parse()?;
    let method: SimilarityMethod = args.method.parse()?;

    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            EngineConfig::from_json_str(&json)?
        }
        None => EngineConfig::default(),
    };
    if let Some(decay) = args.decay {
        config.decay = decay;
    }

    let pairs = match (&args.pairs, args.ids.as_slice()) {
        (Some(path), []) => read_pairs(path)?,
        (None, [a, b]) => vec![(a.parse()?, b.parse()?)],
        (Some(_), _) => bail!("Give either --pairs or two ids, not both"),
        (None, _) => return Err(anyhow!("Expected exactly two MeSH ids")),
    };

    info!("Starting meshsim v{}", env!("CARGO_PKG_VERSION"));
    let ontology = meshsim_storage::load_ontology(&args.snapshot, args.checksum.as_deref())?;
    info!(
        concepts = ontology.concept_count(),
        narrow = ontology.narrow_count(),
        "Ontology loaded"
    );

    let navigator = Arc::new(Navigator::new(Arc::new(ontology)));
    let terms = TermSimilarity::new(navigator, config)?;

    let mut failures = 0usize;
    for ((a, b), result) in pairs.iter().zip(terms.score_batch(&pairs, category, method)) {
        match result {
            Ok(scores) => {
                for score in &scores {
                    print_score(score, args.json)?;
                }
            }
            Err(e) => {
                error!("{} vs {}: {}", a, b, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} pairs could not be scored", failures, pairs.len());
    }
    Ok(())
}
