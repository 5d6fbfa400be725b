//! Hooks that see every pair score produced by [`TermSimilarity`](crate::TermSimilarity).

use parking_lot::Mutex;
use tracing::debug;

use crate::score::PairScore;

/// Receives each pair score after it is computed. Observers cannot change
/// the result.
pub trait ScoreObserver: Send + Sync {
    fn on_score(&self, score: &PairScore);
}

/// Logs every pair at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScoreObserver for TracingObserver {
    fn on_score(&self, score: &PairScore) {
        debug!(
            query_a = %score.query.0,
            query_b = %score.query.1,
            a = %score.pair.0,
            b = %score.pair.1,
            category = %score.category,
            method = %score.method,
            score = %score.score,
            "pair scored"
        );
    }
}

/// Keeps every pair score in memory
#[derive(Debug, Default)]
pub struct CollectingObserver {
    scores: Mutex<Vec<PairScore>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> Vec<PairScore> {
        self.scores.lock().clone()
    }

    /// Take the collected scores, leaving the observer empty
    pub fn drain(&self) -> Vec<PairScore> {
        std::mem::take(&mut *self.scores.lock())
    }
}

impl ScoreObserver for CollectingObserver {
    fn on_score(&self, score: &PairScore) {
        self.scores.lock().push(score.clone());
    }
}
