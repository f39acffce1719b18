mod catalog;
mod config;
mod context;
mod error;
mod model;
mod responder;
mod search;
mod server;
mod twiml;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assistant_common::gemini::{GeminiClient, GeminiClientConfig};
use catalog::CatalogStore;
use config::Config;
use responder::Responder;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting admissions-bot");
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => info!(error = %e, "no .env loaded, using process environment"),
    }

    let config = Config::from_env()?;
    info!(
        catalog_path = %config.catalog_path,
        listen_addr = %config.listen_addr,
        twilio_account = %config.twilio_account_sid,
        twilio_auth_token_set = !config.twilio_auth_token.is_empty(),
        "configuration loaded"
    );

    let gemini_config = GeminiClientConfig::from_env();
    info!(
        base_url = %gemini_config.base_url,
        model = %gemini_config.model,
        timeout_ms = gemini_config.default_timeout.as_millis(),
        max_retries = gemini_config.max_retries,
        "gemini client configured"
    );
    let gemini = Arc::new(GeminiClient::new(gemini_config, config.google_api_key.clone())?);

    let catalog = Arc::new(CatalogStore::load(config.catalog_path()));
    spawn_reload_on_hangup(Arc::clone(&catalog));

    let state = AppState {
        catalog,
        responder: Arc::new(Responder::new(gemini, config.institution.clone())),
        gemini_configured: config.gemini_configured(),
    };

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "webhook server ready");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("webhook server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Re-read the catalog whenever the process receives SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(catalog: Arc<CatalogStore>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "catalog reload on SIGHUP unavailable");
            return;
        }
    };
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!(path = %catalog.path().display(), "SIGHUP received, reloading catalog");
            catalog.reload().await;
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_catalog: Arc<CatalogStore>) {}
