// Historical performance statistics

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sharp_models::{ConfidenceBreakdown, ConfidenceTier, Prediction, Stats, Tally};
use std::collections::BTreeMap;
use tracing::debug;

/// Assumed average stake, in units, that ROI is normalised against.
pub const ROI_STAKE_BASELINE: Decimal = dec!(1.5);

const RECENT_TREND_LEN: usize = 10;

/// Reduces the whole prediction history to [`Stats`]. Holds no state; every
/// call recomputes from scratch.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// `history` must be in chronological order. `today` selects the picks
    /// counted toward daily accuracy, by UTC calendar day of creation.
    pub fn compute(&self, history: &[Prediction], today: NaiveDate) -> Stats {
        let completed: Vec<&Prediction> = history.iter().filter(|p| p.is_completed()).collect();
        let outcomes: Vec<bool> = completed.iter().map(|p| p.is_correct()).collect();

        let daily: Tally = completed
            .iter()
            .filter(|p| p.date.date_naive() == today)
            .map(|p| p.is_correct())
            .collect();
        let overall: Tally = outcomes.iter().copied().collect();

        let mut by_confidence = ConfidenceBreakdown::default();
        let mut by_sport: BTreeMap<String, Tally> = BTreeMap::new();
        let mut by_spread = Tally::default();
        let mut by_total = Tally::default();

        for prediction in &completed {
            let correct = prediction.is_correct();
            match prediction.confidence_tier() {
                ConfidenceTier::High => by_confidence.high.record(correct),
                ConfidenceTier::Medium => by_confidence.medium.record(correct),
                ConfidenceTier::Low => by_confidence.low.record(correct),
            }
            by_sport
                .entry(prediction.sport.label().to_string())
                .or_default()
                .record(correct);
            if let Some(covered) = prediction.spread_result {
                by_spread.record(covered);
            }
            if let Some(hit) = prediction.total_result {
                by_total.record(hit);
            }
        }

        let net_units = net_units(&completed);
        let (best_win_streak, worst_loss_streak) = streaks(&outcomes);
        let trend_start = outcomes.len().saturating_sub(RECENT_TREND_LEN);

        let stats = Stats {
            daily_accuracy: daily.accuracy(),
            overall_accuracy: overall.accuracy(),
            total_completed: completed.len(),
            by_confidence,
            by_sport,
            by_spread,
            by_total,
            recent_trend: outcomes[trend_start..].to_vec(),
            roi: roi_percent(net_units, completed.len()),
            net_units,
            best_win_streak,
            worst_loss_streak,
        };

        debug!(
            "📊 Stats over {} completed picks: {:.1}% overall, {} units",
            stats.total_completed, stats.overall_accuracy, stats.net_units
        );
        stats
    }
}

/// Sum of per-pick unit returns.
pub fn net_units(completed: &[&Prediction]) -> Decimal {
    completed.iter().map(|p| p.unit_return()).sum()
}

/// Net units as a percentage of `completed × 1.5` units; 0 with no picks.
pub fn roi_percent(net_units: Decimal, completed: usize) -> f64 {
    if completed == 0 {
        return 0.0;
    }
    let staked = Decimal::from(completed) * ROI_STAKE_BASELINE;
    (net_units / staked * dec!(100)).to_f64().unwrap_or(0.0)
}

/// Longest win run and longest loss run in chronological order.
///
/// A run is committed when the outcome flips and once more at the end; a
/// record only moves on a strictly longer run.
pub fn streaks(outcomes: &[bool]) -> (usize, usize) {
    let mut best_win = 0;
    let mut worst_loss = 0;
    let mut running: Option<(bool, usize)> = None;

    let mut commit = |won: bool, length: usize| {
        if won && length > best_win {
            best_win = length;
        }
        if !won && length > worst_loss {
            worst_loss = length;
        }
    };

    for &correct in outcomes {
        running = match running {
            Some((won, length)) if won == correct => Some((won, length + 1)),
            Some((won, length)) => {
                commit(won, length);
                Some((correct, 1))
            }
            None => Some((correct, 1)),
        };
    }
    if let Some((won, length)) = running {
        commit(won, length);
    }

    (best_win, worst_loss)
}
