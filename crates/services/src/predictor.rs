// Prediction service

use chrono::NaiveDate;
use sharp_db::PredictionStore;
use sharp_ml::{
    AdaptationReport, ConfidenceAdjuster, FeatureEngineer, GameFeatures, Projection, ScoringModel,
    WeightAdapter, WeightedLinearModel,
};
use sharp_models::{
    expected_value, fair_american_odds, recommended_units, ModelInsights, ModelState, Prediction,
    PredictionFactors, Result, ScheduledGame, Sport,
};
use tracing::{info, warn};
use crate::data_feed::ScheduleProvider;

/// What a generation request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Generated {
        predictions: Vec<Prediction>,
        model_version: u32,
        adjustment: i32,
    },
    /// Nothing scheduled, or the provider could not be reached. Not an error.
    NoGames { sport: Sport, message: String },
}

impl BatchOutcome {
    pub fn predictions(&self) -> &[Prediction] {
        match self {
            BatchOutcome::Generated { predictions, .. } => predictions,
            BatchOutcome::NoGames { .. } => &[],
        }
    }
}

/// A scored batch before it is persisted.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub predictions: Vec<Prediction>,
    pub model_version: u32,
    pub adjustment: i32,
    pub adaptation: Option<AdaptationReport>,
}

/// Turns a slate of games into predictions: adapts weights when enough
/// history exists, computes one confidence adjustment for the batch, then
/// scores each game with the same weights and adjustment.
pub struct PredictorService {
    engineer: FeatureEngineer,
    model: Box<dyn ScoringModel>,
    adjuster: ConfidenceAdjuster,
    adapter: WeightAdapter,
}

impl PredictorService {
    /// `seed` makes the sampled form and momentum inputs reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let engineer = match seed {
            Some(seed) => FeatureEngineer::seeded(seed),
            None => FeatureEngineer::from_entropy(),
        };

        Self {
            engineer,
            model: Box::new(WeightedLinearModel::new()),
            adjuster: ConfidenceAdjuster::new(),
            adapter: WeightAdapter::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Fetch today's slate for `sport`, score it and append it to the store.
    ///
    /// An empty or failed fetch yields [`BatchOutcome::NoGames`] and leaves
    /// the store, including the model state, untouched.
    pub async fn generate(
        &mut self,
        provider: &dyn ScheduleProvider,
        store: &mut PredictionStore,
        sport: Sport,
        insights: Option<&ModelInsights>,
        today: NaiveDate,
    ) -> Result<BatchOutcome> {
        let games = match provider.fetch_games(sport).await {
            Ok(games) => games,
            Err(e) => {
                warn!("⚠️ Schedule fetch for {} failed: {}", sport, e);
                return Ok(no_games(sport));
            }
        };
        if games.is_empty() {
            info!("📭 No {} games scheduled", sport);
            return Ok(no_games(sport));
        }

        let mut state = store.model_state().clone();
        let batch = self.score_batch(sport, &games, store.history(), &mut state, insights);

        let adapted = batch.adaptation.is_some().then_some(state);
        store
            .append_batch(batch.predictions.clone(), adapted, today)
            .await?;

        info!(
            "🎯 Generated {} {} predictions (model v{}, adjustment {:+})",
            batch.predictions.len(),
            sport,
            batch.model_version,
            batch.adjustment
        );

        Ok(BatchOutcome::Generated {
            predictions: batch.predictions,
            model_version: batch.model_version,
            adjustment: batch.adjustment,
        })
    }

    /// Score `games` against `history`, adapting `state` in place first when
    /// eligible.
    pub fn score_batch(
        &mut self,
        sport: Sport,
        games: &[ScheduledGame],
        history: &[Prediction],
        state: &mut ModelState,
        insights: Option<&ModelInsights>,
    ) -> ScoredBatch {
        let completed = history.iter().filter(|p| p.is_completed()).count();
        let adaptation = self.adapter.maybe_adapt(state, completed, insights);
        let adjustment = self.adjuster.adjustment(history, insights);
        let model_version = state.iterations;

        let predictions = games
            .iter()
            .map(|game| {
                let features = self.engineer.extract_features(game);
                let projection = self.model.project(game, sport, &features, &state.weights);
                build_prediction(game, sport, &features, &projection, adjustment, model_version)
            })
            .collect();

        ScoredBatch {
            predictions,
            model_version,
            adjustment,
            adaptation,
        }
    }
}

fn no_games(sport: Sport) -> BatchOutcome {
    BatchOutcome::NoGames {
        sport,
        message: format!("No {} games scheduled today", sport),
    }
}

fn build_prediction(
    game: &ScheduledGame,
    sport: Sport,
    features: &GameFeatures,
    projection: &Projection,
    adjustment: i32,
    model_version: u32,
) -> Prediction {
    // Stake, EV and odds use the unrounded confidence
    let confidence = projection.final_confidence(adjustment);
    let probability = confidence / 100.0;

    let mut prediction = Prediction::new(
        game.game.clone(),
        sport,
        projection.predicted_winner.clone(),
        confidence.round() as u8,
        recommended_units(confidence),
    )
    .with_lines(projection.spread.clone(), projection.total.clone())
    .with_features(features.to_ml_features(projection.ml_score))
    .with_model_version(model_version);

    prediction.reasoning = format!(
        "ML Score: {:.2} | {} projected winner. Record differential ({:.1}%), recent form, and momentum favor this pick. {}",
        projection.ml_score,
        projection.predicted_winner,
        features.record_differential * 100.0,
        game.status
    );
    prediction.factors = PredictionFactors {
        status: game.status.clone(),
        venue: game.venue.clone(),
        home_record: game.home_record.clone(),
        away_record: game.away_record.clone(),
        odds: game
            .odds
            .as_ref()
            .map_or_else(|| "No odds".to_string(), |odds| format!("Spread: {}", odds.details)),
        home_form: format!("{:.0}%", features.home_form * 100.0),
        away_form: format!("{:.0}%", features.away_form * 100.0),
        momentum: if projection.favor_home { "Home" } else { "Away" }.to_string(),
    };
    prediction.expected_value = expected_value(probability);
    prediction.implied_odds = fair_american_odds(probability);
    prediction.adjusted_by_model = adjustment != 0;
    prediction.adjustment_amount = adjustment;
    prediction
}
