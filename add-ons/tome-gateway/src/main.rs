//! Tome Gateway: chat, transcription and speech over HTTP.
//!
//! Routes: `GET /health`, `POST /api/chat`, `POST /api/transcribe`, `POST /api/speech`.

mod error;
mod handlers;
mod state;

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use std::time::Instant;
use tome_core::{CoreConfig, OpenAiAssistants, Orchestrator};
use tome_voice::{OpenAiStt, SpeechGateway, SttBackend, VoiceConfig};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CoreConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(target: "tome::gateway", "Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let voice_config = VoiceConfig::from_env();

    let state = match build_state(&config, &voice_config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(target: "tome::gateway", "Startup failed: {}", e);
            std::process::exit(1);
        }
    };
    state.speech.log_status();

    let app = app(state);
    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "tome::gateway", "Cannot bind {}: {}", config.bind, e);
            std::process::exit(1);
        }
    };
    tracing::info!(target: "tome::gateway", "Tome gateway listening on {}", config.bind);

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(target: "tome::gateway", "Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "tome::gateway", "Shutdown requested (Ctrl+C)");
        }
    }
}

fn build_state(config: &CoreConfig, voice: &VoiceConfig) -> Result<AppState, String> {
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| "OPENAI_API_KEY is required for the assistant backend".to_string())?;
    let backend = OpenAiAssistants::new(config.api_base.clone(), api_key).map_err(|e| e.to_string())?;
    let orchestrator = Orchestrator::from_config(Arc::new(backend), config);
    if config.assistant_id.is_none() {
        tracing::info!(target: "tome::gateway", "No ASSISTANT_ID set; an assistant will be created on first chat");
    }

    let speech = SpeechGateway::from_config(voice).map_err(|e| e.to_string())?;
    let stt: Option<Arc<dyn SttBackend>> = match OpenAiStt::from_config(voice) {
        Ok(s) => Some(Arc::new(s)),
        Err(e) => {
            tracing::warn!(target: "tome::gateway", "Transcription disabled: {}", e);
            None
        }
    };

    Ok(AppState {
        orchestrator: Arc::new(orchestrator),
        speech: Arc::new(speech),
        stt,
        speak_replies: env_bool("TOME_SPEAK_REPLIES", true),
    })
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true" || v == "yes" || v == "on"
        })
        .unwrap_or(default)
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/transcribe", post(handlers::transcribe::transcribe))
        .route("/api/speech", post(handlers::speech::speech))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        target: "tome::gateway",
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}
