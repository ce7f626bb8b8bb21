// Shared helpers for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sharp_api::{create_routes, AppState};
use sharp_db::{MemoryStore, PredictionStore};
use sharp_models::{LiveScore, Prediction, Result, ScheduledGame, Sport};
use sharp_services::{PredictionEngine, PredictorService, ScheduleProvider, SimulatedScheduleProvider};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Provider with nothing on the schedule.
pub struct EmptySchedule;

#[async_trait]
impl ScheduleProvider for EmptySchedule {
    async fn fetch_games(&self, _sport: Sport) -> Result<Vec<ScheduledGame>> {
        Ok(Vec::new())
    }

    async fn fetch_live_scores(&self, _sport: Sport) -> Result<Vec<LiveScore>> {
        Ok(Vec::new())
    }
}

pub async fn create_test_app_state(provider: Arc<dyn ScheduleProvider>) -> AppState {
    let store = PredictionStore::load(Arc::new(MemoryStore::new()), Utc::now().date_naive()).await;
    let engine = PredictionEngine::new(store, provider, PredictorService::new(Some(2024)));
    AppState::new(engine, Sport::Nfl)
}

pub async fn create_test_app() -> Router {
    create_routes().with_state(create_test_app_state(Arc::new(SimulatedScheduleProvider::new(8))).await)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A completed pick with the given confidence, stake and result.
pub fn completed_pick(confidence: u8, units: Decimal, correct: bool) -> Prediction {
    let mut prediction = Prediction::new(
        "Visitors @ Hosts".to_string(),
        Sport::Nfl,
        "Hosts".to_string(),
        confidence,
        units,
    )
    .with_lines("Hosts -3.5".to_string(), "Over 44.5".to_string())
    .with_features(BTreeMap::from([
        ("recordDifferential".to_string(), 0.2),
        ("recentForm".to_string(), 0.05),
        ("mlScore".to_string(), 8.0),
    ]));
    prediction.record_outcome(correct, None);
    prediction
}
