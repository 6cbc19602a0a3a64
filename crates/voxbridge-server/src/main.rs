//! Voxbridge server binary: the voice relay's entry point.
//!
//! Loads configuration, initializes structured logging, wires the
//! Azure-backed adapters into the pipeline, and serves the chat
//! endpoint with graceful shutdown on SIGTERM/SIGINT.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use voxbridge_server::{app, config, AppState};
use voxbridge_types::AgentSession;
use voxbridge_voice::{AzureAgentClient, AzureRecognizer, AzureSynthesizer, VoicePipeline};

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("VOXBRIDGE_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration; required credentials missing here is fatal.
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration, the relay cannot start without valid config");

    // Initialize tracing
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

    // Wire the pipeline: one adapter per remote capability, a session
    // identity owned by configuration for the process lifetime.
    let mut session = AgentSession::new(config.agent.agent_id.clone());
    if let Some(thread_id) = &config.agent.thread_id {
        session = session.with_thread(thread_id.clone());
    }

    let pipeline = VoicePipeline::new(
        Arc::new(AzureRecognizer::new(config.speech.clone())),
        Arc::new(AzureAgentClient::new(config.agent.clone())),
        Arc::new(AzureSynthesizer::new(config.speech.clone())),
        session,
    );

    let app = app(Arc::new(AppState { pipeline }));
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, region = %config.speech.region, "starting voxbridge server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("voxbridge server shut down");
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
