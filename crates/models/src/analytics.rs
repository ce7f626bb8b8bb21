use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Correct/total tally with a zero-safe accuracy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Tally {
    pub total: usize,
    pub correct: usize,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Fraction correct in [0, 1]; 0 when empty.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Percentage correct in [0, 100]; 0 when empty.
    pub fn accuracy(&self) -> f64 {
        self.ratio() * 100.0
    }
}

impl FromIterator<bool> for Tally {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for correct in iter {
            tally.record(correct);
        }
        tally
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConfidenceBreakdown {
    pub high: Tally,
    pub medium: Tally,
    pub low: Tally,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Accuracy (percent) of today's completed picks.
    pub daily_accuracy: f64,
    /// Accuracy (percent) over every completed pick.
    pub overall_accuracy: f64,
    pub total_completed: usize,
    pub by_confidence: ConfidenceBreakdown,
    pub by_sport: BTreeMap<String, Tally>,
    pub by_spread: Tally,
    pub by_total: Tally,
    /// Correctness of the last ten completed picks, oldest first.
    pub recent_trend: Vec<bool>,
    /// Percent return against the fixed 1.5-unit average stake baseline.
    pub roi: f64,
    /// Raw sum of per-pick unit returns.
    pub net_units: Decimal,
    pub best_win_streak: usize,
    pub worst_loss_streak: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BucketAccuracy {
    /// Percent.
    pub accuracy: f64,
    pub count: usize,
}

impl From<Tally> for BucketAccuracy {
    fn from(tally: Tally) -> Self {
        Self {
            accuracy: tally.accuracy(),
            count: tally.total,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Calibration {
    pub high: BucketAccuracy,
    pub medium: BucketAccuracy,
    pub low: BucketAccuracy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PickTypeSplit {
    pub favorites: BucketAccuracy,
    pub underdogs: BucketAccuracy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentStreak {
    #[serde(rename = "type")]
    pub kind: StreakKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecentForm {
    /// Accuracy (percent) of the last ten completed picks.
    pub accuracy: f64,
    pub streak: CurrentStreak,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInsights {
    pub calibration: Calibration,
    pub pick_types: PickTypeSplit,
    pub recent: RecentForm,
    /// Outcome tally per feature name; empty until enough featured picks exist.
    pub feature_importance: BTreeMap<String, Tally>,
    pub optimal_threshold: u8,
    /// Mean per-pick unit return at `optimal_threshold`; `None` when no
    /// candidate threshold had enough picks.
    #[serde(rename = "bestROI")]
    pub best_roi: Option<Decimal>,
}
