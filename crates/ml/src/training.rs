// Multiplicative feature re-weighting

use sharp_models::{Feature, ModelInsights, ModelState};
use tracing::{debug, info};

/// Completed picks required before weights are touched.
pub const MIN_ADAPTATION_HISTORY: usize = 20;

const BOOST_ABOVE: f64 = 0.70;
const DAMPEN_BELOW: f64 = 0.40;
const BOOST_FACTOR: f64 = 1.10;
const DAMPEN_FACTOR: f64 = 0.90;

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationReport {
    pub iteration: u32,
    pub boosted: Vec<Feature>,
    pub dampened: Vec<Feature>,
}

/// Greedy re-weighting from per-feature hit rates.
///
/// Known limitation: this is not a gradient method. Nothing decays or bounds
/// a weight before renormalisation, so over many iterations a consistently
/// boosted feature can drift toward 1.0 and the rest toward 0.0, and there is
/// no guarantee any step improves accuracy.
#[derive(Debug, Clone, Default)]
pub struct WeightAdapter;

impl WeightAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn is_eligible(&self, completed: usize, insights: Option<&ModelInsights>) -> bool {
        completed >= MIN_ADAPTATION_HISTORY
            && insights.is_some_and(|i| !i.feature_importance.is_empty())
    }

    /// Apply one adaptation step if eligible.
    pub fn maybe_adapt(
        &self,
        state: &mut ModelState,
        completed: usize,
        insights: Option<&ModelInsights>,
    ) -> Option<AdaptationReport> {
        match insights {
            Some(insights) if self.is_eligible(completed, Some(insights)) => {
                Some(self.adapt(state, insights))
            }
            _ => None,
        }
    }

    /// Scale each weighted feature by its hit rate, renormalise the whole set
    /// to sum to 1.0 and bump the iteration counter.
    pub fn adapt(&self, state: &mut ModelState, insights: &ModelInsights) -> AdaptationReport {
        let mut boosted = Vec::new();
        let mut dampened = Vec::new();

        for (name, tally) in &insights.feature_importance {
            // Diagnostic entries such as mlScore carry no weight
            let Ok(feature) = name.parse::<Feature>() else {
                continue;
            };
            let accuracy = tally.ratio();

            if accuracy > BOOST_ABOVE {
                state.weights.scale(feature, BOOST_FACTOR);
                boosted.push(feature);
            } else if accuracy < DAMPEN_BELOW {
                state.weights.scale(feature, DAMPEN_FACTOR);
                dampened.push(feature);
            }
        }

        state.weights.normalize();
        state.iterations += 1;

        debug!("⚖️ Boosted {:?}, dampened {:?}", boosted, dampened);
        info!("🧠 Model weights adapted, now at version {}", state.iterations);

        AdaptationReport {
            iteration: state.iterations,
            boosted,
            dampened,
        }
    }
}
