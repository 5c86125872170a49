//! ---
//! cpes_section: "06-api-interfaces"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "REST API surface for monitoring, simulation, and advisory."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use cpes_advisor::{
    advise, model_insights, EfficiencyModel, FeatureVector, ModelInsights, NoopModel,
    Recommendation,
};
use cpes_calc_engine::export::write_csv;
use cpes_calc_engine::{compute, BatchSummary, MetricsRecord};
use cpes_core::config::{AppConfig, SimulationDefaults};
use cpes_core::{DerivedMetrics, FinancialParams, SensorReading};
use cpes_persistence::{SeriesEntry, SeriesStore};
use cpes_sim::{run_scenario, Scenario, SimError, SimulationConfig, SimulationEngine};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared API state exposed to handlers.
pub struct ApiState {
    financial: RwLock<FinancialParams>,
    sim_defaults: SimulationDefaults,
    store: Arc<SeriesStore>,
    model: Arc<dyn EfficiencyModel>,
    rated_capacity_kw: Option<f64>,
    start: Instant,
}

impl ApiState {
    pub fn new(config: &AppConfig, store: Arc<SeriesStore>) -> Self {
        Self {
            financial: RwLock::new(config.financial.clone()),
            sim_defaults: config.simulation.clone(),
            store,
            model: Arc::new(NoopModel),
            rated_capacity_kw: None,
            start: Instant::now(),
        }
    }

    /// Replace the no-op efficiency model with a wired-up implementation.
    pub fn with_model(mut self, model: Arc<dyn EfficiencyModel>) -> Self {
        self.model = model;
        self
    }

    /// Declare the plant's rated chiller capacity, enabling staging advice.
    pub fn with_rated_capacity(mut self, rated_capacity_kw: f64) -> Self {
        self.rated_capacity_kw = Some(rated_capacity_kw);
        self
    }

    fn financial_snapshot(&self) -> FinancialParams {
        self.financial.read().clone()
    }

    fn base_sim_config(&self) -> SimulationConfig {
        SimulationConfig::from_defaults(&self.sim_defaults)
    }

    fn status(&self) -> StatusResponse {
        StatusResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start.elapsed().as_secs(),
            reading_count: self.store.entry_count(),
            store_path: self.store.path().display().to_string(),
            scenarios: Scenario::ALL.iter().map(|s| s.name().to_string()).collect(),
        }
    }
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("sim_defaults", &self.sim_defaults)
            .field("rated_capacity_kw", &self.rated_capacity_kw)
            .finish_non_exhaustive()
    }
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Spawn the REST API on the given address.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let router = Router::new()
        .route("/api/status", get(get_status))
        .route("/api/financial", get(get_financial).put(put_financial))
        .route("/api/simulation/generate", post(post_generate))
        .route("/api/simulation/scenario", post(post_scenario))
        .route("/api/calculations/metrics", post(post_metrics))
        .route("/api/recommendations", post(post_recommendations))
        .route("/api/metrics/current", get(get_current))
        .route("/api/data/export", get(get_export))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %addr, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %addr, error = %err, "api server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(ApiServer {
        addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    version: String,
    uptime_seconds: u64,
    reading_count: u64,
    store_path: String,
    scenarios: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FinancialAck {
    applied: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    /// Full simulation configuration; the configured defaults apply when absent.
    config: Option<SimulationConfig>,
    seed: Option<u64>,
    /// Fixed start timestamp for reproducible runs.
    start: Option<DateTime<Utc>>,
    #[serde(default)]
    persist: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    seed: u64,
    persisted: usize,
    summary: BatchSummary,
    records: Vec<MetricsRecord>,
}

#[derive(Debug, Deserialize)]
struct ScenarioRequest {
    scenario: String,
    config: Option<SimulationConfig>,
    seed: Option<u64>,
    start: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct ScenarioResponse {
    scenario: Scenario,
    scenario_name: String,
    config: SimulationConfig,
    summary: BatchSummary,
    records: Vec<MetricsRecord>,
}

#[derive(Debug, Deserialize)]
struct MetricsRequest {
    reading: SensorReading,
    /// Overrides the configured financial parameters for this evaluation only.
    financial: Option<FinancialParams>,
    #[serde(default)]
    persist: bool,
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    metrics: DerivedMetrics,
    /// Sequence assigned by the store when the caller asked to persist.
    sequence: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RecommendationRequest {
    reading: SensorReading,
    financial: Option<FinancialParams>,
    rated_capacity_kw: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RecommendationResponse {
    metrics: DerivedMetrics,
    recommendations: Vec<Recommendation>,
    /// Absent when the reading failed validation.
    model: Option<ModelInsights>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

fn map_sim_error(err: SimError) -> ApiError {
    match &err {
        SimError::InvalidConfig(_) | SimError::UnknownScenario(_) => {
            ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
        }
        _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn internal(err: impl fmt::Display) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(state.status())
}

async fn get_financial(State(state): State<Arc<ApiState>>) -> Json<FinancialParams> {
    Json(state.financial_snapshot())
}

async fn put_financial(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<FinancialParams>,
) -> Result<Json<FinancialAck>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
    *state.financial.write() = payload;
    info!("financial parameters replaced");
    Ok(Json(FinancialAck { applied: true }))
}

async fn post_generate(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let config = request.config.unwrap_or_else(|| state.base_sim_config());
    let seed = request.seed.unwrap_or(state.sim_defaults.seed);
    let financial = state.financial_snapshot();

    let mut engine = SimulationEngine::new(config, seed).map_err(map_sim_error)?;
    let run = match request.start {
        Some(start) => engine.generate_from(start, &financial),
        None => engine.generate(&financial),
    }
    .map_err(map_sim_error)?;

    let mut persisted = 0usize;
    if request.persist {
        for record in &run.records {
            state
                .store
                .append(record.reading.clone(), record.metrics.clone())
                .map_err(internal)?;
            persisted += 1;
        }
        info!(persisted, seed, "simulation run persisted");
    }

    Ok(Json(GenerateResponse {
        seed,
        persisted,
        summary: run.summary,
        records: run.records,
    }))
}

async fn post_scenario(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ScenarioRequest>,
) -> Result<Json<ScenarioResponse>, ApiError> {
    let base = request.config.unwrap_or_else(|| state.base_sim_config());
    let seed = request.seed.unwrap_or(state.sim_defaults.seed);
    let financial = state.financial_snapshot();

    let outcome = run_scenario(&request.scenario, &base, seed, &financial, request.start)
        .map_err(map_sim_error)?;

    Ok(Json(ScenarioResponse {
        scenario: outcome.scenario,
        scenario_name: outcome.scenario.name().to_string(),
        config: outcome.config,
        summary: outcome.run.summary,
        records: outcome.run.records,
    }))
}

/// Degenerate readings are reported as invalid metrics, never as an HTTP error.
async fn post_metrics(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MetricsRequest>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let financial = request
        .financial
        .unwrap_or_else(|| state.financial_snapshot());
    let metrics = compute(&request.reading, &financial);

    let sequence = if request.persist {
        Some(
            state
                .store
                .append(request.reading, metrics.clone())
                .map_err(internal)?,
        )
    } else {
        None
    };

    Ok(Json(MetricsResponse { metrics, sequence }))
}

async fn post_recommendations(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let financial = request
        .financial
        .unwrap_or_else(|| state.financial_snapshot());
    let metrics = compute(&request.reading, &financial);
    let rated = request.rated_capacity_kw.or(state.rated_capacity_kw);
    let recommendations = advise(&request.reading, &metrics, rated);
    let model = FeatureVector::from_record(&request.reading, &metrics)
        .map(|features| model_insights(state.model.as_ref(), &features));

    Json(RecommendationResponse {
        metrics,
        recommendations,
        model,
    })
}

async fn get_current(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SeriesEntry>, ApiError> {
    match state.store.latest_valid().map_err(internal)? {
        Some(entry) => Ok(Json(entry)),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "no valid readings recorded",
        )),
    }
}

async fn get_export(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    let entries = state.store.read_all().map_err(internal)?;
    let records: Vec<MetricsRecord> = entries
        .into_iter()
        .map(|entry| MetricsRecord {
            reading: entry.reading,
            metrics: entry.metrics,
        })
        .collect();

    let mut buffer = Vec::new();
    write_csv(&records, &mut buffer).map_err(internal)?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        buffer,
    )
        .into_response())
}
