//! Servidor web Axum com WebSocket para acompanhar a análise de endereços em tempo real
//!
//! Variáveis de ambiente:
//! - `ADDR_SETTINGS`: arquivo JSON com [`ParserSettings`] (padrão: configuração embutida)
//! - `ADDR_CITIES` / `ADDR_STREETS`: listas com uma entrada por linha (padrão: base de demonstração)
//! - `ADDR_LISTEN`: endereço de escuta (padrão: `0.0.0.0:3000`)
//! - `RUST_LOG`: filtro do tracing (padrão: `info`)

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use addr_core::{
    corpus::{demo_addresses, demo_reference},
    AddressParser, AddressRecord, ParseError, ParseEvent, ParserSettings, ReferenceDatabase,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    parser: AddressParser,
}

#[derive(Deserialize)]
struct ParseRequest {
    address: String,
}

#[derive(Serialize)]
struct ParseResponse {
    record: AddressRecord,
    processing_ms: u64,
}

fn open(var: &str, path: &str) -> Result<BufReader<File>, ParseError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ParseError::Configuration(format!("{}={}: {}", var, path, e)))
}

fn load_settings() -> Result<ParserSettings, ParseError> {
    match std::env::var("ADDR_SETTINGS") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| ParseError::Configuration(format!("ADDR_SETTINGS={}: {}", path, e)))?;
            info!(%path, "configuração carregada");
            ParserSettings::from_json(&json)
        }
        Err(_) => Ok(ParserSettings::default()),
    }
}

fn load_reference() -> Result<ReferenceDatabase, ParseError> {
    match (std::env::var("ADDR_CITIES"), std::env::var("ADDR_STREETS")) {
        (Ok(cities), Ok(streets)) => {
            let db = ReferenceDatabase::from_readers(
                open("ADDR_CITIES", &cities)?,
                open("ADDR_STREETS", &streets)?,
            )?;
            info!(cities = db.cities().len(), streets = db.streets().len(), "base de referência carregada");
            Ok(db)
        }
        (Ok(_), Err(_)) | (Err(_), Ok(_)) => Err(ParseError::Configuration(
            "ADDR_CITIES and ADDR_STREETS must be set together".to_string(),
        )),
        (Err(_), Err(_)) => {
            warn!("ADDR_CITIES/ADDR_STREETS ausentes, usando a base de demonstração");
            demo_reference()
        }
    }
}

fn error_response(err: &ParseError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "kind": err.kind(), "error": err.to_string() })),
    )
        .into_response()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let parser = match load_settings()
        .and_then(|settings| AddressParser::new(load_reference()?, settings))
    {
        Ok(parser) => parser,
        Err(err) => {
            error!(%err, "configuração inválida");
            std::process::exit(1);
        }
    };
    info!(
        cities = parser.reference().cities().len(),
        streets = parser.reference().streets().len(),
        k_similar = parser.settings().k_similar,
        rerank = ?parser.settings().rerank,
        "parser pronto"
    );
    let state = Arc::new(AppState { parser });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/parse", post(parse_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-addresses", get(demo_addresses_handler))
        .layer(cors)
        .with_state(state);

    let listen = std::env::var("ADDR_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
    let listener = match tokio::net::TcpListener::bind(&listen).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%listen, %err, "não foi possível abrir a porta");
            std::process::exit(1);
        }
    };
    info!("🚀 Parser de endereços iniciado em http://{}", listen);
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "servidor encerrado com erro");
    }
}

/// Análise via HTTP POST (sem streaming)
async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Response {
    let address = req.address.trim().to_string();
    if address.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Endereço vazio"})),
        )
            .into_response();
    }

    let result = tokio::task::spawn_blocking(move || {
        let start = std::time::Instant::now();
        state
            .parser
            .parse(&address)
            .map(|record| (record, start.elapsed().as_millis() as u64))
    })
    .await;

    match result {
        Ok(Ok((record, processing_ms))) => Json(ParseResponse {
            record,
            processing_ms,
        })
        .into_response(),
        Ok(Err(err)) => {
            warn!(%err, "endereço rejeitado");
            error_response(&err)
        }
        Err(err) => {
            error!(%err, "tarefa de análise falhou");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Retorna as linhas de demonstração
async fn demo_addresses_handler() -> impl IntoResponse {
    Json(demo_addresses())
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe uma linha (texto puro ou `{"address": ...}`) e transmite os eventos da análise
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let address = match serde_json::from_str::<ParseRequest>(&text) {
                    Ok(req) => req.address.trim().to_string(),
                    Err(_) => text.trim().to_string(),
                };
                if address.is_empty() {
                    continue;
                }

                info!("Analisando via WebSocket: {} chars", address.len());

                // O parser é síncrono: roda fora do runtime e entrega os eventos por std::mpsc
                let (tx, rx) = std::sync::mpsc::channel::<ParseEvent>();
                let parser_state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let _ = parser_state.parser.parse_streaming(&address, tx);
                });
                if let Err(err) = handle.await {
                    error!(%err, "tarefa de análise falhou");
                    continue;
                }

                let events: Vec<ParseEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
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
