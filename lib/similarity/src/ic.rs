//! Information-content similarity.
//!
//! A concept's information value in a category is `-log10(p)`, where `p` is
//! the normalized corpus frequency of the concept plus all of its
//! descendants. Scores are normalized by the information value of the
//! category's rarest concept.

use ahash::AHashMap;
use meshsim_core::{Category, ConceptId, Error, Hierarchy, Result, SingleFlightCache, Subsumer};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{EngineConfig, SubsumerStrategy};
use crate::score::{IcScores, Similarity, SimilarityMethod};
use crate::validate::check_pair;

/// Normalized frequencies of every main heading in one category
#[derive(Debug, Clone)]
pub struct FrequencyDistribution {
    probabilities: AHashMap<ConceptId, f64>,
    raw_total: f64,
}

impl FrequencyDistribution {
    /// Probability of a single concept; 0 when it has no frequency
    pub fn probability(&self, id: &ConceptId) -> f64 {
        self.probabilities.get(id).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.values().fold(0.0, |acc, p| acc + p)
    }

    /// Sum of the raw frequencies before normalization
    #[inline]
    #[must_use]
    pub fn raw_total(&self) -> f64 {
        self.raw_total
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

/// Normalization constant of a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxInformation {
    /// The rarest concept, `None` when the category has no frequencies
    pub concept: Option<ConceptId>,
    pub value: f64,
}

/// Most specific subsumer of a pair and its information value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeastCommonSubsumer {
    pub subsumer: Subsumer,
    pub information: f64,
}

pub struct InformationContentEngine {
    hierarchy: Arc<dyn Hierarchy>,
    config: EngineConfig,
    distributions: SingleFlightCache<Category, FrequencyDistribution>,
    information: SingleFlightCache<(Category, ConceptId), f64>,
    maxima: SingleFlightCache<Category, MaxInformation>,
}

impl InformationContentEngine {
    pub fn new(hierarchy: Arc<dyn Hierarchy>) -> Self {
        Self {
            hierarchy,
            config: EngineConfig::default(),
            distributions: SingleFlightCache::new(),
            information: SingleFlightCache::new(),
            maxima: SingleFlightCache::new(),
        }
    }

    pub fn with_config(hierarchy: Arc<dyn Hierarchy>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::new(hierarchy);
        engine.config = config;
        Ok(engine)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frequency_distribution(&self, category: Category) -> Result<Arc<FrequencyDistribution>> {
        self.distributions.get_or_try_insert_with(category, || {
            let headings = self.hierarchy.main_headings(category)?;
            let mut raw = Vec::with_capacity(headings.len());
            for id in headings {
                let frequency = self.hierarchy.frequency(&id)?;
                raw.push((id, frequency));
            }

            let raw_total: f64 = raw.iter().map(|(_, f)| f).sum();
            if raw_total <= 0.0 {
                warn!(%category, "category has no frequency mass");
                return Ok(FrequencyDistribution {
                    probabilities: AHashMap::new(),
                    raw_total,
                });
            }

            let probabilities: AHashMap<ConceptId, f64> = raw
                .into_iter()
                .filter(|(_, f)| *f > 0.0)
                .map(|(id, f)| (id, f / raw_total))
                .collect();
            debug!(%category, concepts = probabilities.len(), "frequency distribution built");
            Ok(FrequencyDistribution {
                probabilities,
                raw_total,
            })
        })
    }

    /// `-log10` of the probability mass of `id` and its descendants.
    ///
    /// A mass outside (0, 1] means the frequency tables are inconsistent; it
    /// is logged and the value degrades to 0.
    pub fn information_value(&self, id: &ConceptId, category: Category) -> Result<f64> {
        if id.is_narrow() {
            return Err(Error::NarrowConcept(id.to_string()));
        }
        let value = self
            .information
            .get_or_try_insert_with((category, id.clone()), || {
                let distribution = self.frequency_distribution(category)?;
                let descendants = self.hierarchy.descendant_closure(id, category)?;
                let mut mass: f64 = descendants
                    .members()
                    .iter()
                    .map(|c| distribution.probability(c))
                    .sum();

                if mass > 1.0 && mass <= 1.0 + self.config.mass_tolerance {
                    mass = 1.0;
                }
                if !(mass > 0.0 && mass <= 1.0) {
                    warn!(concept = %id, %category, mass, "probability mass outside (0, 1]");
                    return Ok::<f64, Error>(0.0);
                }
                Ok(if mass >= 1.0 { 0.0 } else { -mass.log10() })
            })?;
        Ok(*value)
    }

    /// Information value of every main heading in `category`, in id order
    pub fn information_table(&self, category: Category) -> Result<Vec<(ConceptId, f64)>> {
        let headings = self.hierarchy.main_headings(category)?;
        let mut table = Vec::with_capacity(headings.len());
        for id in headings {
            let value = self.information_value(&id, category)?;
            table.push((id, value));
        }
        Ok(table)
    }

    /// Information value of the category's rarest concept
    pub fn max_information(&self, category: Category) -> Result<Arc<MaxInformation>> {
        self.maxima.get_or_try_insert_with(category, || {
            let distribution = self.frequency_distribution(category)?;
            let rarest = distribution
                .probabilities
                .iter()
                .min_by_key(|(id, p)| (OrderedFloat(**p), (*id).clone()))
                .map(|(id, _)| id.clone());

            let max = match rarest {
                Some(concept) => {
                    let value = self.information_value(&concept, category)?;
                    MaxInformation {
                        concept: Some(concept),
                        value,
                    }
                }
                None => MaxInformation {
                    concept: None,
                    value: 0.0,
                },
            };
            debug!(%category, value = max.value, "max information computed");
            Ok::<MaxInformation, Error>(max)
        })
    }

    fn subsumer_candidates(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Vec<Subsumer>> {
        match self.config.subsumer_strategy {
            SubsumerStrategy::PathCode => self.hierarchy.least_common_subsumers(a, b, category),
            SubsumerStrategy::Ancestry => self.hierarchy.common_ancestors(a, b, category),
        }
    }

    /// The candidate subsumer with the greatest information value
    pub fn least_common_subsumer(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<LeastCommonSubsumer> {
        check_pair(self.hierarchy.as_ref(), a, b, category)?;
        let mut best = LeastCommonSubsumer {
            subsumer: Subsumer::Top,
            information: 0.0,
        };
        let mut first = true;
        for candidate in self.subsumer_candidates(a, b, category)? {
            let information = match &candidate {
                Subsumer::Concept(id) => self.information_value(id, category)?,
                Subsumer::Top => 0.0,
            };
            if first || information > best.information {
                best = LeastCommonSubsumer {
                    subsumer: candidate,
                    information,
                };
                first = false;
            }
        }
        Ok(best)
    }

    /// Resnik, Lin, Jiang and Rel scores for a pair.
    ///
    /// `None` when either concept (or the category normalizer) carries no
    /// information.
    pub fn pair_scores(&self, a: &ConceptId, b: &ConceptId, category: Category) -> Result<Option<IcScores>> {
        check_pair(self.hierarchy.as_ref(), a, b, category)?;
        if a == b {
            return Ok(Some(IcScores::IDENTICAL));
        }

        let max = self.max_information(category)?.value;
        if max <= 0.0 {
            warn!(%category, "category has no positive information value");
            return Ok(None);
        }

        let ic1 = self.information_value(a, category)? / max;
        let ic2 = self.information_value(b, category)? / max;
        if ic1 <= 0.0 || ic2 <= 0.0 {
            return Ok(None);
        }

        let ic_lcs = self.least_common_subsumer(a, b, category)?.information / max;
        let lin = 2.0 * ic_lcs / (ic1 + ic2);
        Ok(Some(IcScores {
            resnik: ic_lcs,
            lin,
            jiang: 1.0 - (ic1 + ic2 - 2.0 * ic_lcs).min(1.0),
            rel: lin * (1.0 - 10f64.powf(-ic_lcs * max)),
        }))
    }

    pub fn score(&self, a: &ConceptId, b: &ConceptId, category: Category, method: SimilarityMethod) -> Result<Similarity> {
        if !method.is_information_content() {
            return Err(Error::UnknownMethod(format!(
                "{} is not an information-content method",
                method
            )));
        }
        let scores = self.pair_scores(a, b, category)?;
        Ok(match scores.and_then(|s| s.get(method)) {
            Some(value) => Similarity::Score(value),
            None => Similarity::NotComparable,
        })
    }
}
