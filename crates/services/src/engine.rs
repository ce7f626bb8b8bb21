use chrono::{NaiveDate, Utc};
use sharp_db::{OutcomeUpdate, PredictionStore};
use sharp_ml::ModelInsightsAnalyzer;
use sharp_models::{
    BankrollSummary, LiveScore, ModelInsights, ModelState, Prediction, Result, Sport, Stats,
    UserSettings,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use crate::data_feed::ScheduleProvider;
use crate::export::{history_csv, ModelExport};
use crate::metrics::StatsAggregator;
use crate::predictor::{BatchOutcome, PredictorService};

/// The single owner of predictions, model state and derived analytics.
///
/// Stats and insights are rebuilt wholesale from the full history after
/// every mutation and swapped in whole.
pub struct PredictionEngine {
    store: PredictionStore,
    provider: Arc<dyn ScheduleProvider>,
    predictor: PredictorService,
    aggregator: StatsAggregator,
    analyzer: ModelInsightsAnalyzer,
    stats: Stats,
    insights: Option<ModelInsights>,
}

impl PredictionEngine {
    pub fn new(
        store: PredictionStore,
        provider: Arc<dyn ScheduleProvider>,
        predictor: PredictorService,
    ) -> Self {
        let mut engine = Self {
            store,
            provider,
            predictor,
            aggregator: StatsAggregator::new(),
            analyzer: ModelInsightsAnalyzer::new(),
            stats: Stats::default(),
            insights: None,
        };
        engine.refresh();
        engine
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn refresh(&mut self) {
        let history = self.store.history();
        self.stats = self.aggregator.compute(history, Self::today());
        self.insights = self.analyzer.analyze(history);
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn insights(&self) -> Option<&ModelInsights> {
        self.insights.as_ref()
    }

    pub fn model_state(&self) -> &ModelState {
        self.store.model_state()
    }

    pub fn settings(&self) -> &UserSettings {
        self.store.settings()
    }

    pub fn history(&self) -> &[Prediction] {
        self.store.history()
    }

    pub fn todays_predictions(&self) -> &[Prediction] {
        self.store.todays_predictions()
    }

    pub async fn generate(&mut self, sport: Sport) -> Result<BatchOutcome> {
        let outcome = self
            .predictor
            .generate(
                self.provider.as_ref(),
                &mut self.store,
                sport,
                self.insights.as_ref(),
                Self::today(),
            )
            .await?;

        if matches!(outcome, BatchOutcome::Generated { .. }) {
            self.refresh();
        }
        Ok(outcome)
    }

    pub async fn record_outcome(&mut self, id: Uuid, update: OutcomeUpdate) -> Result<Prediction> {
        let graded = self.store.record_outcome(id, update).await?;
        self.refresh();
        Ok(graded)
    }

    pub async fn update_settings(&mut self, settings: UserSettings) -> Result<UserSettings> {
        self.store.update_settings(settings).await?;
        Ok(self.store.settings().clone())
    }

    pub async fn clear_all(&mut self) -> Result<()> {
        self.store.clear_all().await?;
        self.refresh();
        info!("🔄 Model reset to defaults");
        Ok(())
    }

    pub fn bankroll_summary(&self) -> BankrollSummary {
        BankrollSummary::new(
            self.stats.total_completed,
            self.stats.overall_accuracy,
            self.stats.net_units,
            self.store.settings(),
        )
    }

    /// Live scores for `sport`; empty when the provider fails.
    pub async fn live_scores(&self, sport: Sport) -> Vec<LiveScore> {
        match self.provider.fetch_live_scores(sport).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("⚠️ Live scores for {} unavailable: {}", sport, e);
                Vec::new()
            }
        }
    }

    pub fn export_csv(&self) -> Result<String> {
        history_csv(self.store.history())
    }

    pub fn export_model(&self) -> ModelExport {
        ModelExport::new(
            self.store.model_state().clone(),
            self.insights.clone(),
            self.stats.clone(),
        )
    }
}
