//! Credit ledger HTTP server binary

use credit_gateway::{router, spawn_command_actor, AppState, CreditService};
use ledger_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("CREDIT_LEDGER_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::from_env()?,
    };

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_line_number(true)
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting credit ledger server"
    );

    let service = Arc::new(CreditService::from_config(&config)?);
    let commands = spawn_command_actor(service.clone(), config.actor.mailbox_capacity);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState::new(service, commands.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.http_listen_addr).await?;
    tracing::info!(addr = %config.http_listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    commands.shutdown().await?;
    tracing::info!("Shutting down credit ledger server");
    Ok(())
}
