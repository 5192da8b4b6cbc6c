use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use tower_http::{services::ServeDir, trace::TraceLayer};

use board_oracle_core::{ApiSettings, ChessSession, Database, XiangqiSession};

mod config;
mod routes;

use config::ServerConfig;

pub struct AppState {
    pub db: Mutex<Database>,
    pub settings: Mutex<ApiSettings>,
    pub xiangqi: Mutex<Option<XiangqiSession>>,
    pub chess: Mutex<Option<ChessSession>>,
    pub notice: Mutex<Option<String>>,
}

impl AppState {
    pub fn new(db: Database, settings: ApiSettings) -> Self {
        Self {
            db: Mutex::new(db),
            settings: Mutex::new(settings),
            xiangqi: Mutex::new(None),
            chess: Mutex::new(None),
            notice: Mutex::new(None),
        }
    }

    /// Message shown once on the next rendered page.
    pub fn set_notice(&self, message: impl Into<String>) {
        *self.notice.lock().unwrap() = Some(message.into());
    }

    pub fn take_notice(&self) -> Option<String> {
        self.notice.lock().unwrap().take()
    }
}

pub fn app(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/settings", get(routes::settings::settings_page).post(routes::settings::save_settings))
        .route("/xiangqi", get(routes::xiangqi::xiangqi_page))
        .route("/xiangqi/new", post(routes::xiangqi::new_game))
        .route("/xiangqi/select", post(routes::xiangqi::select_square))
        .route("/xiangqi/undo", post(routes::xiangqi::undo))
        .route("/xiangqi/ai", post(routes::xiangqi::oracle_move))
        .route("/api/xiangqi", get(routes::xiangqi::snapshot))
        .route("/api/xiangqi/moves", get(routes::xiangqi::moves_from))
        .route("/chess", get(routes::chess::chess_page))
        .route("/chess/new", post(routes::chess::new_game))
        .route("/chess/select", post(routes::chess::select_square))
        .route("/chess/move", post(routes::chess::play_move))
        .route("/chess/undo", post(routes::chess::undo))
        .route("/chess/ai", post(routes::chess::oracle_move))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();

    let db = match Database::open(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("failed to open database {}: {}", config.db_path, e);
            std::process::exit(1);
        }
    };

    let settings = db.load_settings().unwrap_or_else(|e| {
        tracing::warn!("could not load saved settings, using defaults: {}", e);
        ApiSettings::default()
    });

    let state = Arc::new(AppState::new(db, settings));
    let app = app(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(&config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", config.addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server stopped: {}", e);
    }
}
