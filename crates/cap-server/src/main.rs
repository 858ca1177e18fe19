//! Capstone RS Server
//!
//! HTTP server wiring the workflow engine and collaboration coordinators
//! over Postgres, falling back to the in-memory stores when no database is
//! reachable.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cap_api::AppState;
use cap_core::config::AppConfig;
use cap_db::{Database, PgStores};
use cap_notifications::{NotificationSink, TracingSink};
use cap_store::MemoryStores;

mod health;

use health::HealthState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load config from env, using defaults");
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "starting capstone server"
    );

    let sink: Arc<dyn NotificationSink> = Arc::new(TracingSink);

    let (state, db_pool) = match Database::connect(&config.database).await {
        Ok(db) => {
            info!("connected to database");
            let pool = db.pool().clone();
            let stores = PgStores::new(pool.clone());
            let state = AppState::new(
                config.clone(),
                stores.projects,
                stores.requests,
                stores.members,
                stores.suggestions,
                stores.milestones,
                stores.users,
                sink,
            );
            (state, Some(pool))
        }
        Err(err) => {
            tracing::warn!(error = %err, "database unreachable, using in-memory stores");
            let stores = MemoryStores::new();
            (AppState::in_memory(config.clone(), &stores, sink), None)
        }
    };

    let app = build_router(state, Arc::new(HealthState { db: db_pool }));

    let addr = config.server_addr();
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cap_server=debug,cap_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn build_router(state: AppState, health_state: Arc<HealthState>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health_state);

    Router::new()
        .merge(health_routes)
        .merge(cap_api::router(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cap_notifications::MemorySink;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let stores = MemoryStores::new();
        let state = AppState::in_memory(
            AppConfig::default(),
            &stores,
            Arc::new(MemorySink::new()),
        );
        build_router(state, Arc::new(HealthState { db: None }))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_principal() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/projects/1/submit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
