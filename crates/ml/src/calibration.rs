// History-driven confidence adjustment

use sharp_models::{ModelInsights, Prediction, Tally};
use tracing::debug;

/// Completed picks required before recent form moves confidence at all.
pub const MIN_ADJUSTMENT_HISTORY: usize = 10;

const HIGH_TIER_FLOOR: f64 = 65.0;
const HIGH_TIER_MIN_COUNT: usize = 5;

/// Computes the signed shift added to every base confidence in the next
/// batch, from the trailing 5 and 10 completed picks and, when available,
/// the high-confidence calibration bucket.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceAdjuster;

impl ConfidenceAdjuster {
    pub fn new() -> Self {
        Self
    }

    /// `history` must be in chronological order; pending picks are skipped.
    pub fn adjustment(&self, history: &[Prediction], insights: Option<&ModelInsights>) -> i32 {
        let completed: Vec<&Prediction> = history.iter().filter(|p| p.is_completed()).collect();
        if completed.len() < MIN_ADJUSTMENT_HISTORY {
            return 0;
        }

        let last_10 = trailing_ratio(&completed, 10);
        let last_5 = trailing_ratio(&completed, 5);

        let mut adjustment = if last_10 >= 0.70 && last_5 >= 0.80 {
            5
        } else if last_10 >= 0.65 {
            3
        } else if last_10 <= 0.30 {
            -8
        } else if last_10 <= 0.40 {
            -5
        } else {
            0
        };

        if let Some(insights) = insights {
            let high = insights.calibration.high;
            if high.accuracy < HIGH_TIER_FLOOR && high.count >= HIGH_TIER_MIN_COUNT {
                adjustment -= 3;
            }
        }

        debug!(
            "🎚️ Confidence adjustment {:+} (last10 {:.0}%, last5 {:.0}%)",
            adjustment,
            last_10 * 100.0,
            last_5 * 100.0
        );

        adjustment
    }
}

fn trailing_ratio(completed: &[&Prediction], window: usize) -> f64 {
    let start = completed.len().saturating_sub(window);
    let tally: Tally = completed[start..].iter().map(|p| p.is_correct()).collect();
    tally.ratio()
}
