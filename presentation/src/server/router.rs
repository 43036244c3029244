//! HTTP routes for browser clients

use crate::server::data_stream::{
    CONTENT_TYPE, DATA_STREAM_HEADER, DATA_STREAM_VERSION, encode, encode_error,
};
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderName, Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parley_application::{ChatRequest, LlmGateway, StreamReplyUseCase};
use parley_domain::{Character, CharacterCatalog, LanguageTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for every route
pub struct AppState<G: LlmGateway + 'static> {
    pub stream_reply: Arc<StreamReplyUseCase<G>>,
    pub catalog: Arc<CharacterCatalog>,
    pub languages: Arc<LanguageTable>,
}

impl<G: LlmGateway + 'static> AppState<G> {
    pub fn new(
        stream_reply: StreamReplyUseCase<G>,
        catalog: CharacterCatalog,
        languages: Arc<LanguageTable>,
    ) -> Self {
        Self {
            stream_reply: Arc::new(stream_reply),
            catalog: Arc::new(catalog),
            languages,
        }
    }
}

// Manual impl: deriving would require `G: Clone`
impl<G: LlmGateway + 'static> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            stream_reply: Arc::clone(&self.stream_reply),
            catalog: Arc::clone(&self.catalog),
            languages: Arc::clone(&self.languages),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CharacterQuery {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct LanguageEntry {
    name: String,
    locale: String,
    rate: f32,
}

pub fn router<G: LlmGateway + 'static>(state: AppState<G>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::<G>))
        .route("/api/characters", get(characters::<G>))
        .route("/api/languages", get(languages::<G>))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Streams the tutor reply. Failures to start arrive as an error part in
/// an otherwise normal response.
async fn chat<G: LlmGateway + 'static>(
    State(state): State<AppState<G>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let body = match state.stream_reply.execute(request).await {
        Ok(handle) => Body::from_stream(encode(handle)),
        Err(e) => {
            warn!("Chat request failed: {}", e);
            Body::from_stream(encode_error(e.to_string()))
        }
    };

    (
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (HeaderName::from_static(DATA_STREAM_HEADER), DATA_STREAM_VERSION),
        ],
        body,
    )
        .into_response()
}

async fn characters<G: LlmGateway + 'static>(
    State(state): State<AppState<G>>,
    Query(query): Query<CharacterQuery>,
) -> Json<Vec<Character>> {
    let query = query.q.unwrap_or_default();
    Json(state.catalog.search(&query).into_iter().cloned().collect())
}

async fn languages<G: LlmGateway + 'static>(
    State(state): State<AppState<G>>,
) -> Json<Vec<LanguageEntry>> {
    let entries = state
        .languages
        .profiles()
        .iter()
        .map(|profile| {
            let speech = state.languages.speech_settings(&profile.name);
            LanguageEntry {
                name: profile.name.clone(),
                locale: speech.locale,
                rate: speech.rate,
            }
        })
        .collect();
    Json(entries)
}

async fn health() -> &'static str {
    "ok"
}
