use std::{io, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, DatabaseConfig, StoreBackend};
use migration::MigratorTrait;
use service::{
    auth::domain::User,
    repository::{BankStore, MemoryStore, SeaOrmStore},
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{errors::StartupError, routes, state::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when present, environment otherwise.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) if e.downcast_ref::<io::Error>().is_some_and(|io| io.kind() == io::ErrorKind::NotFound) => {
            info!("no config file, using environment");
            let mut cfg = AppConfig::from_env();
            cfg.normalize_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok(cfg)
        }
        Err(e) => Err(StartupError::InvalidConfig(e.to_string())),
    }
}

pub async fn build_store(cfg: &DatabaseConfig) -> Result<Arc<dyn BankStore>, StartupError> {
    match cfg.backend {
        StoreBackend::Memory => {
            info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db = models::db::connect_with_config(cfg).await.map_err(|e| StartupError::Database(e.to_string()))?;
            if cfg.auto_migrate {
                migration::Migrator::up(&db, None).await.map_err(|e| StartupError::Database(e.to_string()))?;
                info!("migrations applied");
            }
            Ok(Arc::new(SeaOrmStore::new(db)))
        }
    }
}

pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = build_store(&cfg.database).await?;
    let state = ServerState::new(store, User::from(&cfg.auth));
    Ok(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl_c handler failed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Serve until Ctrl+C, letting in-flight requests finish.
pub async fn run_with_config(cfg: AppConfig) -> Result<(), StartupError> {
    let app = build_app(&cfg).await?;
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, backend = ?cfg.database.backend, "starting bank api");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    let cfg = load_config()?;
    run_with_config(cfg).await
}
