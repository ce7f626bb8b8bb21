use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use crate::games::Sport;
use crate::market::PAYOUT_PER_UNIT;

/// Spread line recorded for a pick'em game.
pub const PICK_EM: &str = "PK";

/// Text stored as the actual result of a losing pick when the caller
/// did not supply one.
pub const LOSING_SIDE: &str = "Opponent";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PredictionFactors {
    pub status: String,
    pub venue: String,
    pub home_record: String,
    pub away_record: String,
    pub odds: String,
    pub home_form: String,
    pub away_form: String,
    pub momentum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: Uuid,
    pub game: String,
    pub sport: Sport,
    pub prediction: String,
    pub spread: String,
    pub total: String,
    pub confidence: u8,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub factors: PredictionFactors,
    pub expected_value: f64,
    #[serde(default)]
    pub implied_odds: i32,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub adjusted_by_model: bool,
    #[serde(default)]
    pub adjustment_amount: i32,
    pub recommended_units: Decimal,
    #[serde(default)]
    pub ml_features: BTreeMap<String, f64>,
    #[serde(default)]
    pub model_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_result: Option<bool>,
}

impl Prediction {
    pub fn new(
        game: String,
        sport: Sport,
        prediction: String,
        confidence: u8,
        recommended_units: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game,
            sport,
            prediction,
            spread: PICK_EM.to_string(),
            total: String::new(),
            confidence,
            reasoning: String::new(),
            factors: PredictionFactors::default(),
            expected_value: 0.0,
            implied_odds: 0,
            date: Utc::now(),
            adjusted_by_model: false,
            adjustment_amount: 0,
            recommended_units,
            ml_features: BTreeMap::new(),
            model_version: 0,
            actual: None,
            correct: None,
            updated_at: None,
            spread_result: None,
            total_result: None,
        }
    }

    pub fn with_lines(mut self, spread: String, total: String) -> Self {
        self.spread = spread;
        self.total = total;
        self
    }

    pub fn with_features(mut self, features: BTreeMap<String, f64>) -> Self {
        self.ml_features = features;
        self
    }

    pub fn with_model_version(mut self, version: u32) -> Self {
        self.model_version = version;
        self
    }

    /// An outcome has been recorded; only completed predictions feed the
    /// analytics.
    pub fn is_completed(&self) -> bool {
        self.actual.is_some()
    }

    pub fn is_correct(&self) -> bool {
        self.correct.unwrap_or(false)
    }

    /// Attach the result. `actual` defaults to the picked side for a win
    /// and to [`LOSING_SIDE`] for a loss.
    pub fn record_outcome(&mut self, correct: bool, actual: Option<String>) {
        let actual = actual.unwrap_or_else(|| {
            if correct {
                self.prediction.clone()
            } else {
                LOSING_SIDE.to_string()
            }
        });
        self.actual = Some(actual);
        self.correct = Some(correct);
        self.updated_at = Some(Utc::now());
    }

    /// Units won or lost by this pick at -110.
    pub fn unit_return(&self) -> Decimal {
        if self.is_correct() {
            self.recommended_units * PAYOUT_PER_UNIT
        } else {
            -self.recommended_units
        }
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    pub fn pick_type(&self) -> Option<PickType> {
        PickType::from_spread(&self.spread)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 80 {
            ConfidenceTier::High
        } else if confidence >= 70 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PickType {
    Favorite,
    Underdog,
}

impl PickType {
    pub fn from_spread(spread: &str) -> Option<Self> {
        if spread.contains('-') {
            Some(PickType::Favorite)
        } else if spread.contains('+') || spread == PICK_EM {
            Some(PickType::Underdog)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Prediction {
        Prediction::new(
            "Buffalo Bills @ Kansas City Chiefs".to_string(),
            Sport::Nfl,
            "Kansas City Chiefs".to_string(),
            82,
            dec!(2.5),
        )
        .with_lines("Chiefs -5.1".to_string(), "Over 51.2".to_string())
    }

    #[test]
    fn test_prediction_creation() {
        let prediction = sample();

        assert_eq!(prediction.confidence, 82);
        assert!(!prediction.is_completed());
        assert!(!prediction.is_correct());
        assert_eq!(prediction.confidence_tier(), ConfidenceTier::High);
        assert_eq!(prediction.pick_type(), Some(PickType::Favorite));
    }

    #[test]
    fn test_record_outcome_defaults() {
        let mut win = sample();
        win.record_outcome(true, None);
        assert_eq!(win.actual.as_deref(), Some("Kansas City Chiefs"));
        assert!(win.is_completed());
        assert!(win.updated_at.is_some());

        let mut loss = sample();
        loss.record_outcome(false, None);
        assert_eq!(loss.actual.as_deref(), Some(LOSING_SIDE));
        assert_eq!(loss.correct, Some(false));

        let mut free_text = sample();
        free_text.record_outcome(true, Some("KC 27-20".to_string()));
        assert_eq!(free_text.actual.as_deref(), Some("KC 27-20"));
        assert!(free_text.is_correct());
    }

    #[test]
    fn test_unit_return() {
        let mut prediction = sample();
        prediction.record_outcome(true, None);
        assert_eq!(prediction.unit_return(), dec!(2.275));

        prediction.record_outcome(false, None);
        assert_eq!(prediction.unit_return(), dec!(-2.5));
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_confidence(80), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(79), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(70), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(69), ConfidenceTier::Low);
    }

    #[test]
    fn test_pick_types() {
        assert_eq!(PickType::from_spread("Chiefs -3.5"), Some(PickType::Favorite));
        assert_eq!(PickType::from_spread("Bills +2.0"), Some(PickType::Underdog));
        assert_eq!(PickType::from_spread(PICK_EM), Some(PickType::Underdog));
        assert_eq!(PickType::from_spread(""), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let prediction = sample();
        let value = serde_json::to_value(&prediction).unwrap();

        assert_eq!(value["sport"], "NFL");
        assert_eq!(value["recommendedUnits"], 2.5);
        assert!(value.get("actual").is_none());
        assert!(value.get("modelVersion").is_some());

        let back: Prediction = serde_json::from_value(value).unwrap();
        assert_eq!(back, prediction);
    }
}
