//! Servidor web Axum com WebSocket para destacar PII em tempo real e
//! exigir consentimento antes do envio

mod config;
mod remote;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use pii_core::{
    samples::demo_texts, ConsentGate, DeadlineRecognizer, Detection, DetectionEvent,
    HeuristicRecognizer, PatternTable, PiiDetector, RecognizerStatus, Span,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::remote::{RemoteRecognizer, REMOTE_NAME};

const PII_WARNING: &str = "PII detected! Please review before submitting.";
const NO_PII: &str = "No PII detected.";

/// Estado compartilhado da aplicação.
///
/// O detector só é lido depois de construído, então basta um `Arc`.
struct AppState {
    detector: Arc<PiiDetector>,
    remote: Option<RemoteRecognizer>,
}

#[derive(Deserialize)]
struct DetectRequest {
    text: String,
}

#[derive(Deserialize)]
struct SubmitRequest {
    text: String,
    #[serde(default)]
    acknowledged: bool,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

#[derive(Serialize)]
struct DetectResponse {
    spans: Vec<Span>,
    html: String,
    has_pii: bool,
    pattern_hits: usize,
    entity_hits: usize,
    recognizer: RecognizerStatus,
    skipped: Vec<Span>,
    processing_ms: u64,
    message: &'static str,
}

impl DetectResponse {
    fn new(text: &str, detection: Detection) -> Self {
        let highlighted = detection.highlight(text);
        let has_pii = detection.has_pii();
        Self {
            html: highlighted.to_html(),
            skipped: highlighted.skipped,
            has_pii,
            pattern_hits: detection.pattern_hits,
            entity_hits: detection.entity_hits,
            recognizer: detection.recognizer,
            processing_ms: detection.processing_ms,
            spans: detection.spans,
            message: if has_pii { PII_WARNING } else { NO_PII },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = Arc::new(build_state(&config)?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("não foi possível escutar em {}", config.bind_addr))?;
    info!("🚀 Servidor PII iniciado em http://{}", config.bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Monta o detector a partir da configuração.
///
/// Uma tabela de padrões inválida aborta a inicialização.
fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let table = match &config.patterns_file {
        Some(path) => PatternTable::from_toml_file(path)
            .with_context(|| format!("tabela de padrões inválida em {}", path.display()))?,
        None => PatternTable::india()?,
    };
    info!(patterns = table.len(), "tabela de padrões carregada");

    let mut detector = PiiDetector::new(table);
    if config.local_ner {
        let heuristic = Arc::new(HeuristicRecognizer::new());
        let bounded = DeadlineRecognizer::new(heuristic, config.ner_timeout)
            .context("pool do reconhecedor local")?;
        detector = detector.with_recognizer(Arc::new(bounded));
    }

    let remote = match &config.remote {
        Some(remote_config) => {
            let client = RemoteRecognizer::new(remote_config).context("cliente HTTP do modelo NER")?;
            info!(url = client.url(), "usando modelo NER hospedado");
            Some(client)
        }
        None => None,
    };

    Ok(AppState {
        detector: Arc::new(detector),
        remote,
    })
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/detect", post(detect_handler))
        .route("/submit", post(submit_handler))
        .route("/patterns", get(patterns_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Executa uma passada completa de detecção fora do runtime assíncrono.
///
/// Com modelo hospedado configurado, a chamada HTTP é aguardada aqui e só a
/// resposta segue para o detector.
async fn run_detection(state: Arc<AppState>, text: String) -> Result<Detection, tokio::task::JoinError> {
    let external = match &state.remote {
        Some(remote) => Some(remote.recognize(&text).await),
        None => None,
    };
    tokio::task::spawn_blocking(move || match external {
        Some(recognition) => state.detector.detect_with(&text, REMOTE_NAME, recognition),
        None => state.detector.detect(&text),
    })
    .await
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(err: tokio::task::JoinError) -> Response {
    error!(error = %err, "detecção abortada");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "falha interna na detecção" })),
    )
        .into_response()
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Detecção via HTTP POST (sem streaming)
async fn detect_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DetectRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return bad_request("Texto vazio");
    }

    let text = req.text;
    match run_detection(state, text.clone()).await {
        Ok(detection) => {
            info!(
                chars = text.chars().count(),
                spans = detection.spans.len(),
                degraded = detection.recognizer.is_degraded(),
                "detecção via HTTP"
            );
            Json(DetectResponse::new(&text, detection)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

/// Tentativa de envio: detecta de novo e consulta o portão de consentimento
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return bad_request("Texto vazio");
    }

    let detection = match run_detection(state, req.text).await {
        Ok(detection) => detection,
        Err(err) => return internal_error(err),
    };

    match ConsentGate::submit(&detection, req.acknowledged) {
        Ok(submission) => {
            info!(consented = submission.consented(), "envio concluído");
            Json(serde_json::json!({
                "status": "completed",
                "consented": submission.consented(),
                "message": submission.message(),
            }))
            .into_response()
        }
        Err(blocked) => {
            info!(detected = blocked.detected, "envio bloqueado sem consentimento");
            (
                StatusCode::PRECONDITION_REQUIRED,
                Json(serde_json::json!({
                    "status": "blocked",
                    "message": blocked.to_string(),
                    "spans": detection.spans,
                })),
            )
                .into_response()
        }
    }
}

/// Tabela de padrões ativa
async fn patterns_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.detector.matcher().table().definitions())
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa a detecção e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Tenta parsear como JSON {text}; senão usa como texto puro
                let text = match serde_json::from_str::<WsRequest>(&text) {
                    Ok(req) => req.text,
                    Err(_) => text.to_string(),
                };
                if text.trim().is_empty() {
                    continue;
                }

                let external = match &state.remote {
                    Some(remote) => Some(remote.recognize(&text).await),
                    None => None,
                };

                // O detector é síncrono: roda no pool de bloqueio
                let (tx, rx) = std::sync::mpsc::channel::<DetectionEvent>();
                let detector = Arc::clone(&state.detector);
                let handle = tokio::task::spawn_blocking(move || {
                    detector.detect_streaming(&text, external.map(|r| (REMOTE_NAME, r)), tx);
                });
                if let Err(err) = handle.await {
                    error!(error = %err, "detecção via WebSocket abortada");
                    continue;
                }

                // Coleta todos os eventos numa Vec (o rx não é Send)
                let events: Vec<DetectionEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
