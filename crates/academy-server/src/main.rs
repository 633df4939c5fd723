//! Academy admin server binary.
//!
//! Connects the statement executor, replays the schema, seeds the admin
//! account and sample content, then serves a health endpoint until SIGTERM
//! or SIGINT.

mod config;

use academy_db::{BackendKind, SharedExecutor, StatementExecutor};
use academy_records::{seed_database, SeedOptions};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::DatabaseConfig;

/// State shared by the HTTP handlers.
#[derive(Clone, Copy)]
struct AppState {
    backend: BackendKind,
    schema_ready: bool,
}

/// Health check handler.
///
/// Reports `degraded` when the schema replay failed at startup; the process
/// keeps serving either way.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": if state.schema_ready { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.backend.as_str(),
    }))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("ACADEMY_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

/// Replays the configured schema file, or the embedded one.
///
/// Returns `false` on failure. A missing schema file is logged by the
/// loader and counts as not ready.
async fn prepare_schema(db: &dyn StatementExecutor, config: &DatabaseConfig) -> bool {
    let source = match &config.schema_path {
        Some(path) => match academy_db::load_schema(path) {
            Ok(Some(source)) => source,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "failed to read schema file");
                return false;
            }
        },
        None => academy_db::SCHEMA_SQL.to_string(),
    };

    match academy_db::replay_schema(db, &source).await {
        Ok(count) => {
            tracing::info!(statements = count, "schema replayed");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "schema replay failed, continuing in degraded mode");
            false
        }
    }
}

async fn seed(db: &SharedExecutor, options: &SeedOptions) {
    match seed_database(db, options).await {
        Ok(report) => tracing::debug!(
            admin_created = report.admin_created,
            videos_added = report.videos_added,
            "seeding finished"
        ),
        Err(e) => tracing::error!(error = %e, "seeding failed"),
    }
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration, the server cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let db = academy_db::connect(&config.database.settings())
        .expect("failed to open the database, check database.url in config");

    let schema_ready = prepare_schema(db.as_ref(), &config.database).await;
    if schema_ready {
        let options = SeedOptions {
            admin: config.seed.admin(),
        };
        seed(&db, &options).await;
    }

    let app = app(AppState {
        backend: db.backend(),
        schema_ready,
    });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, backend = %db.backend(), "starting academy server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("academy server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
