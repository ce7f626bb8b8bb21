// Model performance insights

use rust_decimal::Decimal;
use sharp_models::{
    BucketAccuracy, Calibration, ConfidenceTier, CurrentStreak, ModelInsights, PickType,
    PickTypeSplit, Prediction, RecentForm, StreakKind, Tally,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Completed picks required before any insights are produced.
pub const MIN_INSIGHT_HISTORY: usize = 3;

/// Completed picks with recorded features required for per-feature accuracy.
pub const MIN_FEATURE_HISTORY: usize = 10;

/// Threshold reported when no candidate has enough picks.
pub const DEFAULT_THRESHOLD: u8 = 70;

const THRESHOLD_CANDIDATES: [u8; 7] = [60, 65, 70, 75, 80, 85, 90];
const MIN_THRESHOLD_PICKS: usize = 5;
const RECENT_WINDOW: usize = 10;

/// Derives calibration, pick-type, recent-form, per-feature and threshold
/// diagnostics from the prediction history.
#[derive(Debug, Clone, Default)]
pub struct ModelInsightsAnalyzer;

impl ModelInsightsAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// `None` until at least [`MIN_INSIGHT_HISTORY`] picks are completed.
    /// `history` must be in chronological order.
    pub fn analyze(&self, history: &[Prediction]) -> Option<ModelInsights> {
        let completed: Vec<&Prediction> = history.iter().filter(|p| p.is_completed()).collect();
        if completed.len() < MIN_INSIGHT_HISTORY {
            debug!("🔍 {} completed picks, not enough for insights", completed.len());
            return None;
        }

        let (optimal_threshold, best_roi) = optimal_threshold(&completed);

        Some(ModelInsights {
            calibration: calibration(&completed),
            pick_types: pick_types(&completed),
            recent: recent_form(&completed),
            feature_importance: feature_importance(&completed),
            optimal_threshold,
            best_roi,
        })
    }
}

fn calibration(completed: &[&Prediction]) -> Calibration {
    let tier = |wanted: ConfidenceTier| -> BucketAccuracy {
        completed
            .iter()
            .filter(|p| p.confidence_tier() == wanted)
            .map(|p| p.is_correct())
            .collect::<Tally>()
            .into()
    };

    Calibration {
        high: tier(ConfidenceTier::High),
        medium: tier(ConfidenceTier::Medium),
        low: tier(ConfidenceTier::Low),
    }
}

fn pick_types(completed: &[&Prediction]) -> PickTypeSplit {
    let split = |wanted: PickType| -> BucketAccuracy {
        completed
            .iter()
            .filter(|p| p.pick_type() == Some(wanted))
            .map(|p| p.is_correct())
            .collect::<Tally>()
            .into()
    };

    PickTypeSplit {
        favorites: split(PickType::Favorite),
        underdogs: split(PickType::Underdog),
    }
}

fn recent_form(completed: &[&Prediction]) -> RecentForm {
    let start = completed.len().saturating_sub(RECENT_WINDOW);
    let recent: Tally = completed[start..].iter().map(|p| p.is_correct()).collect();

    RecentForm {
        accuracy: recent.accuracy(),
        streak: current_streak(completed),
    }
}

/// Unbroken run ending at the most recent completed pick. Callers guarantee
/// at least one completed pick.
fn current_streak(completed: &[&Prediction]) -> CurrentStreak {
    let mut outcomes = completed.iter().rev().map(|p| p.is_correct());
    let last = outcomes.next().unwrap_or(false);
    let count = 1 + outcomes.take_while(|correct| *correct == last).count();

    CurrentStreak {
        kind: if last { StreakKind::Win } else { StreakKind::Loss },
        count,
    }
}

fn feature_importance(completed: &[&Prediction]) -> BTreeMap<String, Tally> {
    let featured: Vec<&&Prediction> = completed
        .iter()
        .filter(|p| !p.ml_features.is_empty())
        .collect();

    let mut importance: BTreeMap<String, Tally> = BTreeMap::new();
    if featured.len() < MIN_FEATURE_HISTORY {
        return importance;
    }

    for prediction in featured {
        for name in prediction.ml_features.keys() {
            importance
                .entry(name.clone())
                .or_default()
                .record(prediction.is_correct());
        }
    }
    importance
}

/// Ascending scan over the candidate thresholds; a later threshold only wins
/// with a strictly higher mean unit return.
fn optimal_threshold(completed: &[&Prediction]) -> (u8, Option<Decimal>) {
    let mut best: Option<(u8, Decimal)> = None;

    for threshold in THRESHOLD_CANDIDATES {
        let returns: Vec<Decimal> = completed
            .iter()
            .filter(|p| p.confidence >= threshold)
            .map(|p| p.unit_return())
            .collect();
        if returns.len() < MIN_THRESHOLD_PICKS {
            continue;
        }

        let mean = returns.iter().copied().sum::<Decimal>() / Decimal::from(returns.len());
        if best.map_or(true, |(_, best_mean)| mean > best_mean) {
            best = Some((threshold, mean));
        }
    }

    match best {
        Some((threshold, mean)) => (threshold, Some(mean)),
        None => (DEFAULT_THRESHOLD, None),
    }
}
