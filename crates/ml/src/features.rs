// Feature engineering

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sharp_models::{ScheduledGame, NOT_AVAILABLE};
use std::collections::BTreeMap;

/// Strength assigned to a team whose record is unknown or malformed.
pub const NEUTRAL_STRENGTH: f64 = 0.5;

/// Fixed home-field edge fed to the scoring model.
pub const HOME_ADVANTAGE: f64 = 0.03;

const RECORD_EPSILON: f64 = 0.01;
const FORM_MIDPOINT: f64 = 0.5;
const FORM_BAND: f64 = 0.15;
const HEAD_TO_HEAD_BAND: f64 = 0.05;
const TOTAL_NOISE_BAND: f64 = 4.0;

/// Normalise a "wins-losses" record into [0, 1].
///
/// `N/A`, empty text or anything without a `-` separator counts as unknown
/// and returns [`NEUTRAL_STRENGTH`]. Segments that do not start with digits
/// count as zero, so "x-y" is 0.0 rather than neutral.
pub fn record_strength(record: &str) -> f64 {
    let record = record.trim();
    if record.is_empty() || record == NOT_AVAILABLE {
        return NEUTRAL_STRENGTH;
    }

    let mut parts = record.split('-');
    let (Some(wins), Some(losses)) = (parts.next(), parts.next()) else {
        return NEUTRAL_STRENGTH;
    };

    let wins = leading_int(wins);
    let losses = leading_int(losses);
    wins / (wins + losses + RECORD_EPSILON)
}

fn leading_int(segment: &str) -> f64 {
    let digits: String = segment
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().map(f64::from).unwrap_or(0.0)
}

/// Everything the scoring model needs to know about one game.
///
/// Recent form and momentum are synthetic: sampled uniformly around a
/// neutral midpoint, not read from any data source.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFeatures {
    pub home_strength: f64,
    pub away_strength: f64,
    pub record_differential: f64,
    pub home_advantage: f64,
    pub home_form: f64,
    pub away_form: f64,
    pub recent_form: f64,
    pub home_momentum: f64,
    pub away_momentum: f64,
    pub momentum: f64,
    pub head_to_head: f64,
    pub total_noise: f64,
    pub lean_over: bool,
}

impl GameFeatures {
    /// Feature values stored on the prediction for later accuracy analysis.
    pub fn to_ml_features(&self, ml_score: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("recordDifferential".to_string(), self.record_differential),
            ("homeAdvantage".to_string(), self.home_advantage),
            ("recentForm".to_string(), self.recent_form),
            ("momentum".to_string(), self.momentum),
            ("mlScore".to_string(), ml_score),
        ])
    }
}

/// Samples per-game features from an injectable random source.
pub struct FeatureEngineer<R = SmallRng> {
    rng: R,
}

impl FeatureEngineer<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FeatureEngineer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn extract_features(&mut self, game: &ScheduledGame) -> GameFeatures {
        let home_strength = record_strength(&game.home_record);
        let away_strength = record_strength(&game.away_record);

        let home_form = FORM_MIDPOINT + self.rng.gen_range(-FORM_BAND..FORM_BAND);
        let away_form = FORM_MIDPOINT + self.rng.gen_range(-FORM_BAND..FORM_BAND);
        let home_momentum: f64 = self.rng.gen();
        let away_momentum: f64 = self.rng.gen();
        let head_to_head = self.rng.gen_range(-HEAD_TO_HEAD_BAND..HEAD_TO_HEAD_BAND);
        let total_noise = self.rng.gen_range(-TOTAL_NOISE_BAND..TOTAL_NOISE_BAND);
        let lean_over = self.rng.gen::<f64>() > 0.5;

        GameFeatures {
            home_strength,
            away_strength,
            record_differential: home_strength - away_strength,
            home_advantage: HOME_ADVANTAGE,
            home_form,
            away_form,
            recent_form: home_form - away_form,
            home_momentum,
            away_momentum,
            momentum: home_momentum - away_momentum,
            head_to_head,
            total_noise,
            lean_over,
        }
    }
}
