//! That Time You Killed Me Web API
//!
//! A thin JSON adapter over the rules engine and the AI. One game lives behind
//! a mutex, so commands are applied strictly one at a time.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ttykm_ai::{check_ai_turn, choose_turn, AiConfig, AiDecision, Difficulty};
use ttykm_core::{
    Action, ActionReport, EngineError, Game, GameConfig, GameState, Opening, Player, Timeline,
    TurnPlan,
};

// =============================================================================
// Session State
// =============================================================================

/// Shared application state
struct AppStateInner {
    game: Mutex<Game>,
    /// Source for AI sampling when a request brings no seed.
    rng: Mutex<StdRng>,
}

impl AppStateInner {
    fn game(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh generator for one AI request.
    fn request_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut shared = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                StdRng::from_rng(&mut *shared)
            }
        }
    }
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Deserialize)]
struct MovesQuery {
    board: Timeline,
    row: i32,
    col: i32,
}

#[derive(Serialize)]
struct LegalMovesModel {
    board: Timeline,
    row: i32,
    col: i32,
    actions: Vec<Action>,
}

#[derive(Deserialize)]
struct SelectRequest {
    player: Player,
    board: Timeline,
    row: i32,
    col: i32,
}

#[derive(Deserialize)]
struct MoveRequest {
    player: Player,
    board: Timeline,
    row: i32,
    col: i32,
    action: Action,
}

#[derive(Serialize)]
struct MoveResponse {
    report: ActionReport,
    state: GameState,
}

#[derive(Deserialize)]
struct NextBoardRequest {
    player: Player,
    board: Timeline,
}

#[derive(Deserialize)]
struct AiRequest {
    player: Player,
    /// Numeric level, used when `difficulty`/`depth` are not given.
    #[serde(default)]
    level: Option<u8>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    depth: Option<u8>,
    /// Play the chosen turn instead of only returning it.
    #[serde(default)]
    apply: bool,
    #[serde(default)]
    seed: Option<u64>,
}

impl AiRequest {
    fn config(&self) -> AiConfig {
        let base = AiConfig::from_level(self.level.unwrap_or(2));
        AiConfig::new(
            self.depth.unwrap_or(base.depth),
            self.difficulty.unwrap_or(base.difficulty),
        )
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DecisionModel {
    Play { plan: TurnPlan, score: i32 },
    NoLegalTurn { winner: Player },
}

impl From<AiDecision> for DecisionModel {
    fn from(decision: AiDecision) -> Self {
        match decision {
            AiDecision::Play { plan, score } => DecisionModel::Play { plan, score },
            AiDecision::NoLegalTurn { winner } => DecisionModel::NoLegalTurn { winner },
        }
    }
}

#[derive(Serialize)]
struct AiResponse {
    decision: DecisionModel,
    candidates: usize,
    nodes: u64,
    applied: bool,
    state: GameState,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    let detail = detail.into();
    warn!(%status, %detail, "request rejected");
    (status, Json(ErrorModel { detail }))
}

fn engine_error(e: EngineError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameState> {
    Json(state.game().state())
}

async fn get_moves(
    State(state): State<AppState>,
    Query(query): Query<MovesQuery>,
) -> ApiResult<LegalMovesModel> {
    let game = state.game();
    let actions = game
        .legal_moves(query.board, query.row, query.col)
        .map_err(engine_error)?;
    Ok(Json(LegalMovesModel {
        board: query.board,
        row: query.row,
        col: query.col,
        actions,
    }))
}

async fn select_piece(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> ApiResult<GameState> {
    let mut game = state.game();
    game.select_piece(req.player, req.board, req.row, req.col)
        .map_err(engine_error)?;
    Ok(Json(game.state()))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<MoveResponse> {
    let mut game = state.game();
    let report = game
        .apply_move(req.player, req.board, req.row, req.col, req.action)
        .map_err(engine_error)?;
    Ok(Json(MoveResponse {
        report,
        state: game.state(),
    }))
}

async fn next_board(
    State(state): State<AppState>,
    Json(req): Json<NextBoardRequest>,
) -> ApiResult<GameState> {
    let mut game = state.game();
    game.declare_next_board(req.player, req.board)
        .map_err(engine_error)?;
    Ok(Json(game.state()))
}

async fn ai_move(State(state): State<AppState>, Json(req): Json<AiRequest>) -> ApiResult<AiResponse> {
    let config = req.config();

    // Validate and copy under the lock, then search without holding it.
    let before = {
        let game = state.game();
        check_ai_turn(&game, req.player).map_err(engine_error)?;
        game.clone()
    };

    let mut rng = state.request_rng(req.seed);
    let player = req.player;
    let searched = before.clone();
    let report = tokio::task::spawn_blocking(move || {
        choose_turn(searched.position(), player, &config, &mut rng)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("search task failed: {}", e)))?;

    let mut game = state.game();
    let mut applied = false;
    if req.apply {
        if game.state() != before.state() {
            return Err(api_error(
                StatusCode::CONFLICT,
                "game changed while the AI was thinking",
            ));
        }
        if let AiDecision::Play { plan, .. } = report.decision {
            game.apply_turn(player, &plan).map_err(engine_error)?;
            applied = true;
            info!(player = player.name(), ?plan, "ai turn applied");
        }
    }

    Ok(Json(AiResponse {
        decision: report.decision.into(),
        candidates: report.scored.len(),
        nodes: report.stats.positions(),
        applied,
        state: game.state(),
    }))
}

async fn undo(State(state): State<AppState>) -> ApiResult<GameState> {
    let mut game = state.game();
    game.undo().map_err(engine_error)?;
    Ok(Json(game.state()))
}

async fn redo(State(state): State<AppState>) -> ApiResult<GameState> {
    let mut game = state.game();
    game.redo().map_err(engine_error)?;
    Ok(Json(game.state()))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameState> {
    let mut game = state.game();
    game.reset();
    Json(game.state())
}

async fn export_state(State(state): State<AppState>) -> Json<GameState> {
    Json(state.game().state())
}

async fn import_state(
    State(state): State<AppState>,
    Json(req): Json<GameState>,
) -> ApiResult<GameState> {
    let mut game = state.game();
    let config = *game.config();
    let imported = Game::from_state_with_config(req, config).map_err(engine_error)?;
    *game = imported;
    info!("state imported");
    Ok(Json(game.state()))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Main
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "ttykm-api", version, about = "Serve a That Time You Killed Me game over HTTP")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Starting layout: classic or sparse
    #[arg(long, default_value = "classic")]
    opening: Opening,

    /// Clone tokens per player
    #[arg(long, default_value_t = 4)]
    clones: u8,

    /// Seed for AI sampling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/select", post(select_piece))
        .route("/move", post(make_move))
        .route("/next-board", post(next_board))
        .route("/ai", post(ai_move))
        .route("/undo", post(undo))
        .route("/redo", post(redo))
        .route("/reset", post(reset_game))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = GameConfig {
        opening: args.opening,
        clone_tokens: args.clones,
        ..GameConfig::default()
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let state: AppState = Arc::new(AppStateInner {
        game: Mutex::new(Game::new(config)),
        rng: Mutex::new(rng),
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, opening = ?config.opening, "TTYKM API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
