//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::data::StatsQuery;
use crate::engine::{PickFilter, Slate, SlateService, SlateSummary};
use crate::llm::{ChatTurn, PickExplainer};
use crate::types::{Confidence, PickResult, RiskPosture, StatType, ValcoachError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub slate: RwLock<Slate>,
    pub service: SlateService,
    pub explainer: Arc<dyn PickExplainer>,
}

impl DashboardState {
    pub fn new(slate: Slate, service: SlateService, explainer: Arc<dyn PickExplainer>) -> Self {
        Self {
            slate: RwLock::new(slate),
            service,
            explainer,
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error mapped onto an HTTP status with a JSON body.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ValcoachError> for ApiError {
    fn from(e: ValcoachError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ValcoachError>() {
            Some(ValcoachError::UnknownValue { .. }) => StatusCode::BAD_REQUEST,
            Some(ValcoachError::PickNotFound(_)) => StatusCode::NOT_FOUND,
            Some(ValcoachError::Llm { .. }) | Some(ValcoachError::StatsSource { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Dashboard request failed");
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlateResponse {
    pub region: String,
    pub timespan: String,
    pub posture: RiskPosture,
    pub generated_at: DateTime<Utc>,
    pub summary: SlateSummary,
}

/// Query string for `GET /api/picks` and `GET /api/slate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PicksParams {
    /// Comma-separated stat types, e.g. `kills,assists`.
    pub stats: Option<String>,
    pub min_confidence: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl PicksParams {
    pub fn to_filter(&self) -> Result<PickFilter, ValcoachError> {
        let mut filter = PickFilter {
            search: self.search.clone(),
            ..PickFilter::default()
        };

        if let Some(stats) = self.stats.as_deref().filter(|s| !s.trim().is_empty()) {
            filter.stat_types = stats
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<StatType>)
                .collect::<Result<_, _>>()?;
        }
        if let Some(conf) = self.min_confidence.as_deref() {
            filter.min_confidence = conf.parse::<Confidence>()?;
        }

        Ok(filter)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshParams {
    pub posture: Option<String>,
    pub region: Option<String>,
    pub timespan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplainRequest {
    /// Prior turns; empty asks for the initial explanation.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub model: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/slate
pub async fn get_slate(
    State(state): State<AppState>,
    Query(params): Query<PicksParams>,
) -> Result<Json<SlateResponse>, ApiError> {
    let filter = params.to_filter()?;
    let slate = state.slate.read().await;

    Ok(Json(SlateResponse {
        region: slate.query.region.clone(),
        timespan: slate.query.timespan.clone(),
        posture: slate.posture,
        generated_at: slate.generated_at,
        summary: slate.summary(&filter),
    }))
}

/// GET /api/picks
pub async fn get_picks(
    State(state): State<AppState>,
    Query(params): Query<PicksParams>,
) -> Result<Json<Vec<PickResult>>, ApiError> {
    let filter = params.to_filter()?;
    let slate = state.slate.read().await;
    let limit = params.limit.unwrap_or(usize::MAX);

    Ok(Json(
        slate
            .filtered(&filter)
            .into_iter()
            .take(limit)
            .cloned()
            .collect(),
    ))
}

async fn lookup_pick(state: &DashboardState, player_id: &str, stat: &str) -> Result<PickResult, ApiError> {
    let stat = stat.parse::<StatType>()?;
    let slate = state.slate.read().await;
    slate
        .find(player_id, stat)
        .cloned()
        .ok_or_else(|| ValcoachError::PickNotFound(format!("{player_id}/{stat}")).into())
}

/// GET /api/picks/:player_id/:stat
pub async fn get_pick(
    State(state): State<AppState>,
    Path((player_id, stat)): Path<(String, String)>,
) -> Result<Json<PickResult>, ApiError> {
    Ok(Json(lookup_pick(&state, &player_id, &stat).await?))
}

/// POST /api/picks/:player_id/:stat/explain
pub async fn explain_pick(
    State(state): State<AppState>,
    Path((player_id, stat)): Path<(String, String)>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    // Clone the pick out so the slate lock isn't held across the LLM call.
    let pick = lookup_pick(&state, &player_id, &stat).await?;
    let region = state.slate.read().await.query.region.clone();

    let text = if req.history.is_empty() {
        state.explainer.explain(&pick, Some(&region)).await?
    } else {
        state.explainer.follow_up(&pick, Some(&region), &req.history).await?
    };

    Ok(Json(ExplainResponse {
        model: state.explainer.model_name().to_string(),
        text,
    }))
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<SlateResponse>, ApiError> {
    let (query, posture) = {
        let current = state.slate.read().await;
        let posture = match params.posture.as_deref() {
            Some(p) => p.parse::<RiskPosture>()?,
            None => current.posture,
        };
        let query = StatsQuery::new(
            params.region.as_deref().unwrap_or(&current.query.region),
            params.timespan.as_deref().unwrap_or(&current.query.timespan),
        )?;
        (query, posture)
    };

    let slate = state.service.build_slate(&query, posture).await?;
    info!(
        region = %query.region,
        posture = %posture,
        picks = slate.picks.len(),
        "Slate refreshed from dashboard"
    );

    let response = SlateResponse {
        region: slate.query.region.clone(),
        timespan: slate.query.timespan.clone(),
        posture: slate.posture,
        generated_at: slate.generated_at,
        summary: slate.summary(&PickFilter::default()),
    };
    *state.slate.write().await = slate;

    Ok(Json(response))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
