use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::{Result, SharpError};

/// The eight named inputs the scoring model weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    RecordDifferential,
    HomeAdvantage,
    RecentForm,
    HeadToHead,
    RestDays,
    Injuries,
    Weather,
    Momentum,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::RecordDifferential,
        Feature::HomeAdvantage,
        Feature::RecentForm,
        Feature::HeadToHead,
        Feature::RestDays,
        Feature::Injuries,
        Feature::Weather,
        Feature::Momentum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::RecordDifferential => "recordDifferential",
            Feature::HomeAdvantage => "homeAdvantage",
            Feature::RecentForm => "recentForm",
            Feature::HeadToHead => "headToHead",
            Feature::RestDays => "restDays",
            Feature::Injuries => "injuries",
            Feature::Weather => "weather",
            Feature::Momentum => "momentum",
        }
    }

    fn initial_weight(&self) -> f64 {
        match self {
            Feature::RecordDifferential => 0.25,
            Feature::HomeAdvantage => 0.15,
            Feature::RecentForm => 0.20,
            Feature::HeadToHead => 0.10,
            Feature::RestDays => 0.08,
            Feature::Injuries => 0.12,
            Feature::Weather => 0.05,
            Feature::Momentum => 0.05,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = SharpError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| SharpError::UnknownFeature(s.to_string()))
    }
}

/// Weight per feature. Always holds exactly the eight features of
/// [`Feature::ALL`]; there is no way to add or remove an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "BTreeMap<Feature, f64>", into = "BTreeMap<Feature, f64>")]
pub struct ModelWeights {
    weights: BTreeMap<Feature, f64>,
}

impl ModelWeights {
    pub fn get(&self, feature: Feature) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.weights.iter().map(|(feature, weight)| (*feature, *weight))
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn scale(&mut self, feature: Feature, factor: f64) {
        if let Some(weight) = self.weights.get_mut(&feature) {
            *weight *= factor;
        }
    }

    /// Rescale every weight so the set sums to 1.0.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if total <= 0.0 {
            return;
        }
        for weight in self.weights.values_mut() {
            *weight /= total;
        }
    }
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            weights: Feature::ALL
                .into_iter()
                .map(|feature| (feature, feature.initial_weight()))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<Feature, f64>> for ModelWeights {
    type Error = SharpError;

    fn try_from(weights: BTreeMap<Feature, f64>) -> Result<Self> {
        let missing: Vec<&str> = Feature::ALL
            .iter()
            .filter(|feature| !weights.contains_key(*feature))
            .map(Feature::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(SharpError::IncompleteWeights { missing: missing.join(", ") });
        }

        Ok(Self { weights })
    }
}

impl From<ModelWeights> for BTreeMap<Feature, f64> {
    fn from(weights: ModelWeights) -> Self {
        weights.weights
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    pub weights: ModelWeights,
    pub learning_rate: f64,
    /// Number of adaptation events so far; doubles as the model version.
    pub iterations: u32,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            weights: ModelWeights::default(),
            learning_rate: 0.01,
            iterations: 0,
        }
    }
}
