//! Callback HTTP server: `GET /` liveness and `POST /callback` for LINE webhooks.

use crate::channels::{parse_events, LineClient, ReplySender};
use crate::config::{self, Config, Credentials, RelaySettings};
use crate::echo::EchoDispatcher;
use crate::signature::{self, SIGNATURE_HEADER};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Body returned by `GET /`.
pub const HEALTH_TEXT: &str = "line-echo is running";

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub credentials: Arc<Credentials>,
    pub dispatcher: EchoDispatcher,
}

impl GatewayState {
    pub fn new(credentials: Credentials, sender: Arc<dyn ReplySender>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            dispatcher: EchoDispatcher::new(sender),
        }
    }
}

/// Routes for the relay.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/callback", post(callback))
        .with_state(state)
}

/// Run the relay from config: resolves settings (env overrides file), then serves.
/// `port` (e.g. from the command line) overrides both. Fails before binding if
/// either secret is missing.
pub async fn run_gateway(config: Config, port: Option<u16>) -> Result<()> {
    let mut settings = config::resolve_settings(&config).context("resolving relay settings")?;
    if let Some(p) = port {
        settings.port = p;
    }
    log::info!("starting relay on {}:{}", settings.bind, settings.port);
    run_relay(settings).await
}

/// Serve on `settings.bind:settings.port`, replying through the LINE API at
/// `settings.api_base`. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_relay(settings: RelaySettings) -> Result<()> {
    let client = LineClient::new(settings.credentials.access_token(), Some(settings.api_base));
    log::info!("reply api base: {}", client.base_url());
    let state = GatewayState::new(settings.credentials, Arc::new(client));

    let bind_addr = format!("{}:{}", settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /callback — verifies X-Line-Signature over the raw body, then echoes
/// text messages. 400 on signature failure; otherwise always 200 "OK".
async fn callback(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    log::debug!("request body: {}", String::from_utf8_lossy(&body));

    if let Err(e) = signature::check(&body, provided, state.credentials.channel_secret()) {
        log::warn!("callback rejected: {}", e);
        return (StatusCode::BAD_REQUEST, "Bad Request");
    }

    let events = match parse_events(&body) {
        Ok(events) => events,
        Err(e) => {
            // Authentic but unparseable: still 200, redelivery would carry the same body.
            log::warn!("verified callback has malformed payload: {}", e);
            return (StatusCode::OK, "OK");
        }
    };

    let summary = state.dispatcher.dispatch_all(&events).await;
    log::info!(
        "callback processed: {} event(s), {} replied, {} ignored, {} failed",
        events.len(),
        summary.replied,
        summary.ignored,
        summary.failed
    );
    (StatusCode::OK, "OK")
}

/// GET / returns a plain-text liveness string.
async fn health_http() -> &'static str {
    HEALTH_TEXT
}
