// Scoring models

use ndarray::Array1;
use sharp_models::{Feature, ModelWeights, ScheduledGame, Sport};
use crate::features::GameFeatures;

pub const MIN_CONFIDENCE: f64 = 55.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Weighted features entering the linear score, in order.
const SCORED_FEATURES: [Feature; 5] = [
    Feature::RecordDifferential,
    Feature::HomeAdvantage,
    Feature::RecentForm,
    Feature::Momentum,
    Feature::HeadToHead,
];

/// Turns one game's features into a signed score: positive favours the
/// home side, magnitude is confidence above a coin flip.
pub trait ScoringModel: Send + Sync {
    fn model_name(&self) -> &str;

    fn score(&self, features: &GameFeatures, weights: &ModelWeights) -> f64;

    fn project(
        &self,
        game: &ScheduledGame,
        sport: Sport,
        features: &GameFeatures,
        weights: &ModelWeights,
    ) -> Projection {
        Projection::new(game, sport, features, self.score(features, weights))
    }
}

/// `Σ delta_i × weight_i × 100` over record differential, home advantage,
/// recent form, momentum and the head-to-head noise term.
#[derive(Debug, Clone, Default)]
pub struct WeightedLinearModel;

impl WeightedLinearModel {
    pub fn new() -> Self {
        Self
    }
}

impl ScoringModel for WeightedLinearModel {
    fn model_name(&self) -> &str {
        "WeightedLinear"
    }

    fn score(&self, features: &GameFeatures, weights: &ModelWeights) -> f64 {
        let deltas = Array1::from(vec![
            features.record_differential,
            features.home_advantage,
            features.recent_form,
            features.momentum,
            features.head_to_head,
        ]);
        let weights: Array1<f64> = SCORED_FEATURES
            .iter()
            .map(|feature| weights.get(*feature))
            .collect();

        deltas.dot(&weights) * 100.0
    }
}

/// Lines and base confidence derived from a score, before any
/// history-based adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub ml_score: f64,
    pub base_confidence: f64,
    pub favor_home: bool,
    pub predicted_winner: String,
    pub spread_value: f64,
    pub spread: String,
    pub total_value: f64,
    pub total: String,
}

impl Projection {
    pub fn new(game: &ScheduledGame, sport: Sport, features: &GameFeatures, ml_score: f64) -> Self {
        let favor_home = ml_score > 0.0;
        let predicted_winner = if favor_home {
            game.home_team.clone()
        } else {
            game.away_team.clone()
        };

        let spread_value = (ml_score * 0.3).abs() + 2.0;
        let spread = if favor_home {
            format!("{} -{:.1}", ScheduledGame::nickname(&game.home_team), spread_value)
        } else {
            format!("{} +{:.1}", ScheduledGame::nickname(&game.away_team), spread_value)
        };

        let total_value = sport.baseline_total()
            + (features.home_strength + features.away_strength) * 10.0
            + features.total_noise;
        let side = if features.lean_over { "Over" } else { "Under" };
        let total = format!("{} {:.1}", side, total_value);

        Self {
            ml_score,
            base_confidence: 50.0 + ml_score.abs(),
            favor_home,
            predicted_winner,
            spread_value,
            spread,
            total_value,
            total,
        }
    }

    /// Base confidence shifted by `adjustment` and clamped to [55, 95].
    pub fn final_confidence(&self, adjustment: i32) -> f64 {
        (self.base_confidence + f64::from(adjustment)).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(record_differential: f64, recent_form: f64, momentum: f64) -> GameFeatures {
        GameFeatures {
            home_strength: 0.5 + record_differential / 2.0,
            away_strength: 0.5 - record_differential / 2.0,
            record_differential,
            home_advantage: 0.03,
            home_form: 0.5 + recent_form / 2.0,
            away_form: 0.5 - recent_form / 2.0,
            recent_form,
            home_momentum: 0.5 + momentum / 2.0,
            away_momentum: 0.5 - momentum / 2.0,
            momentum,
            head_to_head: 0.0,
            total_noise: 0.0,
            lean_over: true,
        }
    }

    fn game() -> ScheduledGame {
        ScheduledGame::new("Kansas City Chiefs".to_string(), "Buffalo Bills".to_string())
    }

    #[test]
    fn test_linear_score_matches_weighted_sum() {
        let model = WeightedLinearModel::new();
        let weights = ModelWeights::default();
        let f = features(0.666, 0.1, -0.2);

        let expected = (0.666 * 0.25 + 0.03 * 0.15 + 0.1 * 0.20 + -0.2 * 0.05) * 100.0;
        assert!((model.score(&f, &weights) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_home_favourite_projection() {
        let model = WeightedLinearModel::new();
        let weights = ModelWeights::default();
        let projection = model.project(&game(), Sport::Nfl, &features(0.666, 0.1, 0.0), &weights);

        assert!(projection.favor_home);
        assert_eq!(projection.predicted_winner, "Kansas City Chiefs");
        assert!(projection.spread.starts_with("Chiefs -"));
        assert!((projection.base_confidence - (50.0 + projection.ml_score)).abs() < 1e-9);
        assert!((projection.spread_value - (projection.ml_score * 0.3 + 2.0)).abs() < 1e-9);
        // 45 + (0.833 + 0.167) * 10 with no noise
        assert!((projection.total_value - 55.0).abs() < 1e-9);
        assert_eq!(projection.total, "Over 55.0");
    }

    #[test]
    fn test_away_favourite_projection() {
        let model = WeightedLinearModel::new();
        let weights = ModelWeights::default();
        let projection = model.project(&game(), Sport::Nba, &features(-0.6, -0.2, -0.5), &weights);

        assert!(!projection.favor_home);
        assert!(projection.ml_score < 0.0);
        assert_eq!(projection.predicted_winner, "Buffalo Bills");
        assert!(projection.spread.starts_with("Bills +"));
        assert!(projection.base_confidence > 50.0);
        assert!((projection.total_value - 230.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_confidence_is_clamped() {
        let projection = Projection::new(&game(), Sport::Nfl, &features(0.0, 0.0, 0.0), 1.0);
        assert_eq!(projection.final_confidence(0), MIN_CONFIDENCE);
        assert_eq!(projection.final_confidence(8), 59.0);

        let strong = Projection::new(&game(), Sport::Nfl, &features(0.0, 0.0, 0.0), 44.0);
        assert_eq!(strong.final_confidence(5), MAX_CONFIDENCE);
        assert_eq!(strong.final_confidence(-8), 86.0);
    }
}
