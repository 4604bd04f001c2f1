use std::sync::Arc;

use anyhow::Result;
use order_digest::config::AppConfig;
use order_digest::error::ConfigError;
use order_digest::groupme::GroupMeBot;
use order_digest::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingEnvVar(var)) => {
            eprintln!("Error: {var} not set");
            eprintln!("  export {var}=<your GroupMe bot id>");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("📦 Order Digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/groupme/webhook", config.port);
    eprintln!("   Health:  http://0.0.0.0:{}/", config.port);
    if config.notify_on_empty {
        eprintln!("   Policy:  notify on empty extraction");
    }

    let AppConfig {
        bot_id,
        port,
        notify_on_empty,
        api_base,
    } = config;

    let notifier = Arc::new(GroupMeBot::with_api_base(bot_id, api_base));
    let state = AppState::new(notifier, notify_on_empty);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening for GroupMe callbacks at /groupme/webhook");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
