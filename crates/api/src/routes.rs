use axum::{
    Router,
    routing::{get, post},
    extract::{Query, Path, State},
    response::{IntoResponse, Json, Response},
    http::{header, StatusCode},
};
use serde::{Deserialize, Serialize};
use sharp_db::OutcomeUpdate;
use sharp_models::{
    BankrollSummary, LiveScore, ModelInsights, ModelState, Prediction, SharpError, Sport, Stats,
    UserSettings,
};
use sharp_services::{history_csv_filename, BatchOutcome, PredictionEngine};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<PredictionEngine>>,
    pub default_sport: Sport,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: PredictionEngine, default_sport: Sport) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            default_sport,
            started_at: Instant::now(),
        }
    }
}

#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub pagination: Option<PaginationInfo>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        })
    }

    fn with_message(data: T, message: String) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message),
            pagination: None,
        })
    }
}

#[derive(Serialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: String,
}

#[derive(Deserialize, Default)]
pub struct GenerateRequest {
    pub sport: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub predictions: Vec<Prediction>,
    pub model_version: Option<u32>,
    pub adjustment: Option<i32>,
    pub no_games: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRequest {
    pub correct: bool,
    pub actual: Option<String>,
    pub spread_result: Option<bool>,
    pub total_result: Option<bool>,
}

/// Error body in the same envelope as successful responses.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SharpError> for ApiError {
    fn from(err: SharpError) -> Self {
        let status = match &err {
            SharpError::PredictionNotFound { .. } => StatusCode::NOT_FOUND,
            SharpError::InvalidSettings(_)
            | SharpError::UnknownSport(_)
            | SharpError::UnknownFeature(_) => StatusCode::BAD_REQUEST,
            _ => {
                tracing::error!("❌ Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.message),
            pagination: None,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health and status
        .route("/health", get(health_check))

        // Predictions
        .route("/api/v1/predictions", get(get_todays_predictions))
        .route("/api/v1/predictions/generate", post(generate_predictions))

        // History and outcomes
        .route("/api/v1/history", get(get_history).delete(clear_history))
        .route("/api/v1/history/:id/outcome", post(record_outcome))

        // Analytics
        .route("/api/v1/stats", get(get_stats))
        .route("/api/v1/insights", get(get_insights))
        .route("/api/v1/model", get(get_model))

        // Settings and bankroll
        .route("/api/v1/settings", get(get_settings).put(update_settings))
        .route("/api/v1/bankroll", get(get_bankroll))

        // Live data
        .route("/api/v1/live/:sport", get(get_live_scores))

        // Exports
        .route("/api/v1/export/history.csv", get(export_history))
        .route("/api/v1/export/model", get(export_model))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: format!("{}s", state.started_at.elapsed().as_secs()),
    })
}

async fn get_todays_predictions(State(state): State<AppState>) -> Json<ApiResponse<Vec<Prediction>>> {
    let engine = state.engine.read().await;
    ApiResponse::ok(engine.todays_predictions().to_vec())
}

async fn generate_predictions(
    State(state): State<AppState>,
    body: Option<Json<GenerateRequest>>,
) -> ApiResult<GenerateResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let sport = match request.sport {
        Some(sport) => sport.parse::<Sport>()?,
        None => state.default_sport,
    };

    let outcome = state.engine.write().await.generate(sport).await?;

    Ok(match outcome {
        BatchOutcome::Generated {
            predictions,
            model_version,
            adjustment,
        } => {
            let message = format!("Generated {} {} predictions", predictions.len(), sport);
            ApiResponse::with_message(
                GenerateResponse {
                    predictions,
                    model_version: Some(model_version),
                    adjustment: Some(adjustment),
                    no_games: false,
                },
                message,
            )
        }
        BatchOutcome::NoGames { message, .. } => ApiResponse::with_message(
            GenerateResponse {
                predictions: Vec::new(),
                model_version: None,
                adjustment: None,
                no_games: true,
            },
            message,
        ),
    })
}

/// Newest first.
async fn get_history(
    Query(params): Query<PaginationParams>,
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<Prediction>>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let engine = state.engine.read().await;
    let history = engine.history();
    let total = history.len() as u32;

    let offset = (page as usize - 1).saturating_mul(limit as usize);
    let page_predictions: Vec<Prediction> = history
        .iter()
        .rev()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect();

    Json(ApiResponse {
        success: true,
        data: Some(page_predictions),
        message: None,
        pagination: Some(PaginationInfo {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        }),
    })
}

async fn record_outcome(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<OutcomeRequest>,
) -> ApiResult<Prediction> {
    let mut update = OutcomeUpdate::new(request.correct)
        .with_grades(request.spread_result, request.total_result);
    if let Some(actual) = request.actual.filter(|a| !a.trim().is_empty()) {
        update = update.with_actual(actual);
    }

    let graded = state.engine.write().await.record_outcome(id, update).await?;
    Ok(ApiResponse::ok(graded))
}

async fn clear_history(State(state): State<AppState>) -> ApiResult<()> {
    state.engine.write().await.clear_all().await?;
    Ok(ApiResponse::with_message((), "All data cleared".to_string()))
}

async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<Stats>> {
    let engine = state.engine.read().await;
    ApiResponse::ok(engine.stats().clone())
}

async fn get_insights(State(state): State<AppState>) -> Json<ApiResponse<Option<ModelInsights>>> {
    let engine = state.engine.read().await;
    match engine.insights() {
        Some(insights) => ApiResponse::ok(Some(insights.clone())),
        None => ApiResponse::with_message(None, "Not enough completed predictions".to_string()),
    }
}

async fn get_model(State(state): State<AppState>) -> Json<ApiResponse<ModelState>> {
    let engine = state.engine.read().await;
    ApiResponse::ok(engine.model_state().clone())
}

async fn get_settings(State(state): State<AppState>) -> Json<ApiResponse<UserSettings>> {
    let engine = state.engine.read().await;
    ApiResponse::ok(engine.settings().clone())
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<UserSettings>,
) -> ApiResult<UserSettings> {
    let saved = state.engine.write().await.update_settings(settings).await?;
    Ok(ApiResponse::with_message(saved, "Settings saved".to_string()))
}

async fn get_bankroll(State(state): State<AppState>) -> Json<ApiResponse<BankrollSummary>> {
    let engine = state.engine.read().await;
    ApiResponse::ok(engine.bankroll_summary())
}

async fn get_live_scores(
    Path(sport): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<LiveScore>> {
    let sport = sport
        .parse::<Sport>()
        .map_err(|_| ApiError::bad_request(format!("Unknown sport: {}", sport)))?;

    let scores = state.engine.read().await.live_scores(sport).await;
    Ok(ApiResponse::ok(scores))
}

async fn export_history(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state.engine.read().await.export_csv()?;
    let filename = history_csv_filename(chrono::Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        csv,
    )
        .into_response())
}

async fn export_model(State(state): State<AppState>) -> Result<Response, ApiError> {
    let export = state.engine.read().await.export_model();
    let body = export.to_json_pretty()?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename()),
            ),
        ],
        body,
    )
        .into_response())
}
