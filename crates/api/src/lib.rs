//! Customer Churn Dashboard API Server
//!
//! Login-gated REST API over the customer tables and the churn model.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;
pub mod session;

use crate::config::{AppConfig, ArtifactsConfig, DatabaseConfig, LoggingConfig};
use crate::rate_limit::{create_governor_config, RateLimitConfig};
use crate::session::SessionStore;
use data_validator::Validator;
use inference_engine::ChurnPredictor;
use storage::{LoadSummary, Repository, StorageError};

/// Startup and CLI errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Logging setup failed: {0}")]
    Logging(String),
    #[error("Metrics setup failed: {0}")]
    Metrics(String),
    #[error("Invalid rate limit: per_second and burst_size must be non-zero")]
    RateLimit,
}

/// Application state shared across handlers
pub struct AppState {
    /// Account and customer storage
    pub repository: Repository,
    /// Loaded churn model; `None` when artifacts failed to load
    pub predictor: Option<Arc<ChurnPredictor>>,
    /// Live login sessions
    pub sessions: SessionStore,
    /// Form and credential validation
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    pub fn new(repository: Repository, predictor: Option<ChurnPredictor>) -> Self {
        Self {
            repository,
            predictor: predictor.map(Arc::new),
            sessions: SessionStore::new(),
            validator: Validator::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Optional router layers
#[derive(Default)]
pub struct RouterOptions {
    /// Per-IP limit on the signup and login routes
    pub rate_limit: Option<RateLimitConfig>,
    /// Serves `/metrics` when set
    pub metrics: Option<PrometheusHandle>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub active_sessions: usize,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
    pub inference: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Create the application router.
///
/// The prediction route is only mounted when the state holds a predictor.
pub fn create_router(state: AppState, options: RouterOptions) -> Result<Router, ServerError> {
    let has_predictor = state.predictor.is_some();
    let state: SharedState = Arc::new(RwLock::new(state));

    let mut auth = Router::new()
        .route("/api/v1/auth/signup", post(routes::auth::signup))
        .route("/api/v1/auth/login", post(routes::auth::login));
    if let Some(limits) = &options.rate_limit {
        let config = create_governor_config(limits).ok_or(ServerError::RateLimit)?;
        auth = auth.layer(GovernorLayer { config });
    }

    let mut router = Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route("/api/v1/auth/session", get(routes::auth::current_session))
        .route("/api/v1/customers/:id", get(routes::customers::get_customer))
        .route("/api/v1/tables", get(routes::tables::list_tables))
        .route("/api/v1/tables/:name", get(routes::tables::get_table))
        .merge(auth);

    if has_predictor {
        router = router.route(
            "/api/v1/predictions",
            post(routes::predictions::create_prediction),
        );
    } else {
        warn!("Model artifacts not loaded; prediction endpoint disabled");
    }

    if let Some(handle) = options.metrics {
        router = router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    Ok(router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state))
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;

    let database = match state.repository.ping().await {
        Ok(()) => ComponentHealth {
            status: "ok",
            detail: None,
        },
        Err(e) => ComponentHealth {
            status: "error",
            detail: Some(e.to_string()),
        },
    };
    let inference = match &state.predictor {
        Some(predictor) => ComponentHealth {
            status: "ok",
            detail: Some(predictor.engine().backend().to_string()),
        },
        None => ComponentHealth {
            status: "unavailable",
            detail: None,
        },
    };

    let status = if database.status == "ok" { "healthy" } else { "degraded" };
    Json(HealthResponse {
        status,
        timestamp: Utc::now(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { database, inference },
        active_sessions: state.sessions.len(),
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), ServerError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ServerError::Logging(format!("unknown log level {:?}", config.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| ServerError::Logging(e.to_string()))
}

/// Open the configured database
pub async fn open_repository(config: &DatabaseConfig) -> Result<Repository, ServerError> {
    Ok(Repository::open(&config.path)
        .await?
        .with_bcrypt_cost(config.bcrypt_cost))
}

/// Load model artifacts, logging and returning `None` on failure
pub fn load_predictor(config: &ArtifactsConfig) -> Option<ChurnPredictor> {
    let paths = config.paths();
    match ChurnPredictor::load(&paths, config.decision_threshold) {
        Ok(predictor) => {
            info!(
                "Churn model loaded from {} ({} backend)",
                paths.model.display(),
                predictor.engine().backend()
            );
            Some(predictor)
        }
        Err(e) => {
            error!("Failed to load model artifacts from {}: {}", config.dir.display(), e);
            None
        }
    }
}

/// Import the customer CSVs into the database
pub async fn load_data(config: &AppConfig, csv_dir: Option<&Path>) -> Result<Vec<LoadSummary>, ServerError> {
    let dir = csv_dir.unwrap_or(config.data.csv_dir.as_path());
    let repository = open_repository(&config.database).await?;

    info!("Loading customer tables from {}", dir.display());
    Ok(repository.load_directory(dir).await?)
}

/// Run the server
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let repository = open_repository(&config.database).await?;
    let predictor = load_predictor(&config.artifacts);
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;

    let mut state = AppState::new(repository, predictor);
    let ttl = Duration::try_minutes(config.server.session_ttl_minutes).unwrap_or(Duration::MAX);
    state.sessions = SessionStore::with_ttl(ttl);

    let app = create_router(
        state,
        RouterOptions {
            rate_limit: Some(config.rate_limit.clone()),
            metrics: Some(metrics),
        },
    )?;

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
