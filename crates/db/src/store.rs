use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sharp_models::{ModelState, Prediction, Result, SharpError, UserSettings};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::repository::KeyValueStore;
use crate::schema::{HISTORY_KEY, LAST_FETCH_KEY, MODEL_KEY, SETTINGS_KEY, TODAYS_PREDICTIONS_KEY};

/// Result of a graded game, as entered by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeUpdate {
    pub correct: bool,
    pub actual: Option<String>,
    pub spread_result: Option<bool>,
    pub total_result: Option<bool>,
}

impl OutcomeUpdate {
    pub fn new(correct: bool) -> Self {
        Self {
            correct,
            ..Self::default()
        }
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn with_grades(mut self, spread_result: Option<bool>, total_result: Option<bool>) -> Self {
        self.spread_result = spread_result;
        self.total_result = total_result;
        self
    }
}

/// Owns the prediction history, model state, settings and today's batch,
/// and writes each through to the backing key-value store.
///
/// Every mutation builds the replacement collection first, persists it and
/// only then swaps it in, so a failed write leaves the in-memory view
/// untouched.
pub struct PredictionStore {
    backend: Arc<dyn KeyValueStore>,
    history: Vec<Prediction>,
    model_state: ModelState,
    settings: UserSettings,
    todays: Vec<Prediction>,
    last_fetch: Option<NaiveDate>,
}

impl PredictionStore {
    /// Restore state from `backend`. Anything missing, unreadable or
    /// malformed falls back to its default; this never fails.
    pub async fn load(backend: Arc<dyn KeyValueStore>, today: NaiveDate) -> Self {
        let history: Vec<Prediction> = read_or_default(backend.as_ref(), HISTORY_KEY).await;
        let settings = read_settings(backend.as_ref()).await;
        let last_fetch: Option<NaiveDate> = read_document(backend.as_ref(), LAST_FETCH_KEY).await;

        let model_state = match read_document::<ModelState>(backend.as_ref(), MODEL_KEY).await {
            Some(state) => state,
            None => {
                let state = ModelState::default();
                if let Err(e) = write_document(backend.as_ref(), MODEL_KEY, &state).await {
                    warn!("⚠️ Failed to persist initial model state: {}", e);
                }
                state
            }
        };

        let todays = if last_fetch == Some(today) {
            read_or_default(backend.as_ref(), TODAYS_PREDICTIONS_KEY).await
        } else {
            Vec::new()
        };

        info!(
            "📂 Loaded {} historical predictions, {} for today, model v{}",
            history.len(),
            todays.len(),
            model_state.iterations
        );

        Self {
            backend,
            history,
            model_state,
            settings,
            todays,
            last_fetch,
        }
    }

    /// Chronological, append order.
    pub fn history(&self) -> &[Prediction] {
        &self.history
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model_state
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn todays_predictions(&self) -> &[Prediction] {
        &self.todays
    }

    pub fn last_fetch(&self) -> Option<NaiveDate> {
        self.last_fetch
    }

    pub fn completed_count(&self) -> usize {
        self.history.iter().filter(|p| p.is_completed()).count()
    }

    /// Append a freshly generated batch to history and make it today's batch,
    /// together with the model state it was scored under when that state
    /// was adapted for this batch.
    ///
    /// The batch documents are written before the model, so a failed batch
    /// write never leaves an advanced model version behind. In-memory state
    /// changes only after every write succeeds.
    pub async fn append_batch(
        &mut self,
        batch: Vec<Prediction>,
        adapted: Option<ModelState>,
        today: NaiveDate,
    ) -> Result<()> {
        let mut history = self.history.clone();
        history.extend(batch.iter().cloned());

        write_document(self.backend.as_ref(), HISTORY_KEY, &history).await?;
        write_document(self.backend.as_ref(), TODAYS_PREDICTIONS_KEY, &batch).await?;
        write_document(self.backend.as_ref(), LAST_FETCH_KEY, &today).await?;
        if let Some(state) = &adapted {
            write_document(self.backend.as_ref(), MODEL_KEY, state).await?;
        }

        debug!("💾 Stored batch of {} predictions", batch.len());
        self.history = history;
        self.todays = batch;
        self.last_fetch = Some(today);
        if let Some(state) = adapted {
            self.model_state = state;
        }
        Ok(())
    }

    /// Attach an outcome to the prediction with `id`, searching history
    /// first and then today's batch. A prediction only present in today's
    /// batch is appended to history.
    pub async fn record_outcome(&mut self, id: Uuid, update: OutcomeUpdate) -> Result<Prediction> {
        let mut history = self.history.clone();
        let mut todays = self.todays.clone();

        let graded = if let Some(prediction) = history.iter_mut().find(|p| p.id == id) {
            apply_outcome(prediction, &update);
            prediction.clone()
        } else if let Some(prediction) = todays.iter().find(|p| p.id == id) {
            let mut prediction = prediction.clone();
            apply_outcome(&mut prediction, &update);
            history.push(prediction.clone());
            prediction
        } else {
            return Err(SharpError::PredictionNotFound { id });
        };

        if let Some(prediction) = todays.iter_mut().find(|p| p.id == id) {
            *prediction = graded.clone();
        }

        write_document(self.backend.as_ref(), HISTORY_KEY, &history).await?;
        write_document(self.backend.as_ref(), TODAYS_PREDICTIONS_KEY, &todays).await?;

        info!(
            "✅ Recorded {} for {} ({})",
            if update.correct { "win" } else { "loss" },
            graded.game,
            id
        );
        self.history = history;
        self.todays = todays;
        Ok(graded)
    }

    pub async fn update_settings(&mut self, settings: UserSettings) -> Result<()> {
        let settings = UserSettings::new(settings.bankroll, settings.unit_size)?;
        write_document(self.backend.as_ref(), SETTINGS_KEY, &settings).await?;
        self.settings = settings;
        Ok(())
    }

    /// Drop every prediction and reset model and settings to defaults.
    pub async fn clear_all(&mut self) -> Result<()> {
        self.backend.clear().await?;

        let model_state = ModelState::default();
        let settings = UserSettings::default();
        write_document(self.backend.as_ref(), MODEL_KEY, &model_state).await?;
        write_document(self.backend.as_ref(), SETTINGS_KEY, &settings).await?;

        warn!("🧹 Cleared {} historical predictions", self.history.len());
        self.history.clear();
        self.todays.clear();
        self.last_fetch = None;
        self.model_state = model_state;
        self.settings = settings;
        Ok(())
    }
}

fn apply_outcome(prediction: &mut Prediction, update: &OutcomeUpdate) {
    prediction.record_outcome(update.correct, update.actual.clone());
    if update.spread_result.is_some() {
        prediction.spread_result = update.spread_result;
    }
    if update.total_result.is_some() {
        prediction.total_result = update.total_result;
    }
}

async fn read_document<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match backend.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("⚠️ Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ Ignoring malformed {} document: {}", key, e);
            None
        }
    }
}

async fn read_or_default<T: DeserializeOwned + Default>(backend: &dyn KeyValueStore, key: &str) -> T {
    read_document(backend, key).await.unwrap_or_default()
}

async fn read_settings(backend: &dyn KeyValueStore) -> UserSettings {
    let Some(stored) = read_document::<UserSettings>(backend, SETTINGS_KEY).await else {
        return UserSettings::default();
    };

    UserSettings::new(stored.bankroll, stored.unit_size).unwrap_or_else(|e| {
        warn!("⚠️ Ignoring stored settings: {}", e);
        UserSettings::default()
    })
}

async fn write_document<T: Serialize + ?Sized>(
    backend: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    backend.set(key, &json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DatabaseConnection;
    use crate::repository::{MemoryStore, SqliteStore};
    use rust_decimal_macros::dec;
    use sharp_models::{Feature, Sport, LOSING_SIDE};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn prediction(game: &str) -> Prediction {
        Prediction::new(game.to_string(), Sport::Nfl, "Home".to_string(), 74, dec!(1.5))
    }

    async fn memory_store() -> (Arc<MemoryStore>, PredictionStore) {
        let backend = Arc::new(MemoryStore::new());
        let store = PredictionStore::load(backend.clone(), today()).await;
        (backend, store)
    }

    #[tokio::test]
    async fn test_first_start_persists_default_model() {
        let (backend, store) = memory_store().await;

        assert!(store.history().is_empty());
        assert_eq!(store.model_state(), &ModelState::default());
        assert_eq!(store.settings(), &UserSettings::default());
        assert!(backend.get(MODEL_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_batch_survives_reload() {
        let (backend, mut store) = memory_store().await;
        let batch = vec![prediction("A @ B"), prediction("C @ D")];
        store.append_batch(batch.clone(), None, today()).await.unwrap();

        let reloaded = PredictionStore::load(backend.clone(), today()).await;
        assert_eq!(reloaded.history(), batch.as_slice());
        assert_eq!(reloaded.todays_predictions(), batch.as_slice());
        assert_eq!(reloaded.last_fetch(), Some(today()));

        // A day later the cached batch is stale
        let tomorrow = today().succ_opt().unwrap();
        let next_day = PredictionStore::load(backend, tomorrow).await;
        assert_eq!(next_day.history().len(), 2);
        assert!(next_day.todays_predictions().is_empty());
    }

    #[tokio::test]
    async fn test_record_outcome_updates_history_and_today() {
        let (_, mut store) = memory_store().await;
        let batch = vec![prediction("A @ B"), prediction("C @ D")];
        let id = batch[1].id;
        store.append_batch(batch, None, today()).await.unwrap();

        let graded = store
            .record_outcome(id, OutcomeUpdate::new(false).with_grades(Some(true), None))
            .await
            .unwrap();

        assert_eq!(graded.actual.as_deref(), Some(LOSING_SIDE));
        assert_eq!(graded.spread_result, Some(true));
        assert_eq!(store.completed_count(), 1);
        assert_eq!(store.history().len(), 2);
        assert!(store.todays_predictions()[1].is_completed());
    }

    #[tokio::test]
    async fn test_record_outcome_from_todays_batch_only() {
        let backend = Arc::new(MemoryStore::new());
        let orphan = prediction("E @ F");
        let id = orphan.id;
        backend
            .set(TODAYS_PREDICTIONS_KEY, &serde_json::to_string(&vec![orphan]).unwrap())
            .await
            .unwrap();
        backend
            .set(LAST_FETCH_KEY, &serde_json::to_string(&today()).unwrap())
            .await
            .unwrap();

        let mut store = PredictionStore::load(backend, today()).await;
        assert!(store.history().is_empty());

        store
            .record_outcome(id, OutcomeUpdate::new(true).with_actual("F 24-17"))
            .await
            .unwrap();
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].actual.as_deref(), Some("F 24-17"));
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_id() {
        let (_, mut store) = memory_store().await;
        let result = store.record_outcome(Uuid::new_v4(), OutcomeUpdate::new(true)).await;
        assert!(matches!(result, Err(SharpError::PredictionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_malformed_documents_fall_back_to_defaults() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(HISTORY_KEY, "not json").await.unwrap();
        backend.set(MODEL_KEY, r#"{"weights":{"momentum":1.0},"learningRate":0.01,"iterations":4}"#).await.unwrap();
        backend.set(SETTINGS_KEY, r#"{"bankroll":-5,"unitSize":10}"#).await.unwrap();

        let store = PredictionStore::load(backend, today()).await;
        assert!(store.history().is_empty());
        assert_eq!(store.model_state(), &ModelState::default());
        assert_eq!(store.settings(), &UserSettings::default());
    }

    #[tokio::test]
    async fn test_settings_validation() {
        let (_, mut store) = memory_store().await;
        let invalid = UserSettings { bankroll: dec!(0), unit_size: dec!(10) };
        assert!(store.update_settings(invalid).await.is_err());
        assert_eq!(store.settings(), &UserSettings::default());

        let valid = UserSettings::new(dec!(2500), dec!(25)).unwrap();
        store.update_settings(valid.clone()).await.unwrap();
        assert_eq!(store.settings(), &valid);
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let (backend, mut store) = memory_store().await;
        let mut state = ModelState::default();
        state.weights.scale(Feature::Momentum, 2.0);
        state.weights.normalize();
        state.iterations = 3;
        store
            .append_batch(vec![prediction("A @ B")], Some(state), today())
            .await
            .unwrap();
        assert_eq!(store.model_state().iterations, 3);
        store
            .update_settings(UserSettings::new(dec!(50), dec!(5)).unwrap())
            .await
            .unwrap();

        store.clear_all().await.unwrap();
        assert!(store.history().is_empty());
        assert!(store.todays_predictions().is_empty());
        assert_eq!(store.model_state(), &ModelState::default());
        assert_eq!(store.settings(), &UserSettings::default());

        let reloaded = PredictionStore::load(backend, today()).await;
        assert!(reloaded.history().is_empty());
        assert_eq!(reloaded.model_state().iterations, 0);
    }

    /// Memory backend that rejects writes to one key.
    struct RejectingStore {
        inner: MemoryStore,
        rejected: &'static str,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for RejectingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == self.rejected {
                return Err(SharpError::Database(sqlx::Error::PoolClosed));
            }
            self.inner.set(key, value).await
        }

        async fn clear(&self) -> Result<()> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_failed_batch_write_keeps_model_version() {
        let backend = Arc::new(RejectingStore {
            inner: MemoryStore::new(),
            rejected: HISTORY_KEY,
        });
        let mut store = PredictionStore::load(backend.clone(), today()).await;

        let mut adapted = ModelState::default();
        adapted.iterations = 1;
        let result = store
            .append_batch(vec![prediction("A @ B")], Some(adapted), today())
            .await;

        assert!(result.is_err());
        assert!(store.history().is_empty());
        assert_eq!(store.model_state().iterations, 0);

        let reloaded = PredictionStore::load(backend, today()).await;
        assert_eq!(reloaded.model_state().iterations, 0);
        assert!(reloaded.todays_predictions().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_backed_store() {
        let db = DatabaseConnection::new("sqlite::memory:").await.unwrap();
        db.run_migrations().await.unwrap();
        let backend: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(db.pool().clone()));

        let mut store = PredictionStore::load(backend.clone(), today()).await;
        store.append_batch(vec![prediction("A @ B")], None, today()).await.unwrap();

        let reloaded = PredictionStore::load(backend, today()).await;
        assert_eq!(reloaded.history().len(), 1);
        assert_eq!(reloaded.todays_predictions().len(), 1);
    }
}
