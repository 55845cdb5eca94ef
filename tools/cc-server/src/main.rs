//! ClawCombat arena server binary — wires the HTTP surface (§6) to the
//! store, the Matchmaker, the Battle Coordinator, the Timeout Scheduler,
//! and the webhook dispatcher, then serves until asked to shut down.

mod auth;
mod config;
mod coordinator;
mod error;
mod handlers;
mod matchmaker;
mod request_id;
mod scheduler;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use cc_store::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let store = match Store::open(&config.database_path) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::error!(error = %err, path = %config.database_path, "failed to open database");
            std::process::exit(1);
        }
    };

    let (dispatcher, dispatcher_handle) = cc_webhook::Dispatcher::spawn(1024);
    let app_state = AppState { store, dispatcher, config: Arc::new(config) };

    tokio::spawn(scheduler::run(app_state.clone()));
    tokio::spawn(matchmaker::run(app_state.clone()));

    let cors = if app_state.config.development {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = app_state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/agents/register", post(handlers::agents::register))
        .route("/agents/connect", post(handlers::agents::connect))
        .route(
            "/battles/queue",
            post(handlers::battles::join_queue).delete(handlers::battles::leave_queue),
        )
        .route("/battles/challenge", post(handlers::battles::challenge))
        .route("/battles/active", get(handlers::battles::active))
        .route("/battles/:id/accept", post(handlers::battles::accept))
        .route("/battles/:id/choose-move", post(handlers::battles::choose_move))
        .route("/battles/:id/surrender", post(handlers::battles::surrender))
        .route("/battles/:id", get(handlers::battles::get))
        .route("/battles/:id/history", get(handlers::battles::history))
        .layer(axum::middleware::from_fn(request_id::attach_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state.clone());

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", app_state.config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port = app_state.config.port, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(port = app_state.config.port, "clawcombat arena server listening");

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }

    app_state.dispatcher.close();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher_handle).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sig.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining webhook queue");
}
