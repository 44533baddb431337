use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::advisor::Advisor;
use crate::cards::{Card, parse_cards};
use crate::config::AdvisorConfig;
use crate::equity::EquityReport;
use crate::error::PokerError;
use crate::evaluator::{HandCategory, evaluate};
use crate::policy::{Decision, DecisionInput};

/// Monte-Carlo work runs on the blocking pool; the advisor lock serializes access
/// to its generator and is only taken there. Trial counts are capped by
/// `AdvisorConfig::max_trials`.
#[derive(Clone)]
struct AppState {
    advisor: Arc<Mutex<Advisor>>,
}

impl AppState {
    fn new(config: AdvisorConfig) -> Self {
        Self {
            advisor: Arc::new(Mutex::new(Advisor::new(config))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    cards: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub category: HandCategory,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Deserialize)]
struct EquityRequest {
    hole: String,
    #[serde(default)]
    board: String,
    trials: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DecideRequest {
    hole: String,
    #[serde(default)]
    board: String,
    pot: u64,
    to_call: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Poker(#[from] PokerError),
    #[error("worker task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Poker(err) if err.is_invalid_input() => StatusCode::BAD_REQUEST,
            ApiError::Poker(_) | ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, config: AdvisorConfig) -> Result<()> {
    let app = build_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/evaluate", post(evaluate_hand))
        .route("/equity", post(estimate_equity))
        .route("/decide", post(decide_action));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router(config: AdvisorConfig) -> Router {
    build_router(AppState::new(config))
}

async fn health() -> &'static str {
    "ok"
}

fn cards(text: &str) -> Result<Vec<Card>, ApiError> {
    Ok(parse_cards(text)?)
}

/// Pure, so it never waits on the advisor lock.
async fn evaluate_hand(
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let cards = cards(&req.cards)?;
    let evaluation = evaluate(&cards)?;
    Ok(Json(EvaluateResponse {
        category: evaluation.category,
        name: evaluation.category.name().to_string(),
        score: evaluation.score,
    }))
}

async fn estimate_equity(
    State(state): State<AppState>,
    Json(req): Json<EquityRequest>,
) -> Result<Json<EquityReport>, ApiError> {
    let hole = cards(&req.hole)?;
    let board = cards(&req.board)?;
    let advisor = state.advisor.clone();
    let report =
        tokio::task::spawn_blocking(move || advisor.lock().estimate(&hole, &board, req.trials))
            .await??;
    Ok(Json(report))
}

async fn decide_action(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<Decision>, ApiError> {
    let input = DecisionInput {
        hole: cards(&req.hole)?,
        board: cards(&req.board)?,
        pot: req.pot,
        to_call: req.to_call,
    };
    let advisor = state.advisor.clone();
    let decision = tokio::task::spawn_blocking(move || advisor.lock().decide(&input)).await??;
    Ok(Json(decision))
}
