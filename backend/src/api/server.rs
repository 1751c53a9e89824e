//! HTTP Server for the SylvaScan knowledge API.
//!
//! Provides REST endpoints for folding image analysis results into the
//! knowledge graph and for browsing what the graph knows. Image analysis
//! itself runs elsewhere; this server only receives its results.
//!
//! # API Endpoints
//!
//! | Method | Path                             | Description                        |
//! |--------|----------------------------------|------------------------------------|
//! | GET    | `/health`                        | Health check                       |
//! | POST   | `/api/knowledge/process`         | Apply an analysis result           |
//! | POST   | `/api/knowledge/suggestions`     | Preview updates without applying   |
//! | GET    | `/api/knowledge/relations`       | List valid relation labels         |
//! | GET    | `/api/knowledge/entities/{name}` | Triples and features of one entity |
//! | GET    | `/api/logs`                      | SSE stream for real-time logs      |

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, UpdateReport};
use crate::ai::AiClient;
use crate::error::{ServerError, ServerResult, UpdateError, ValidationError};
use crate::graph::KnowledgeStore;
use crate::models::AnalysisResult;
use crate::updater::KnowledgeUpdater;
use crate::validation::validate_analysis_result;

/// State shared by all request handlers
struct AppState {
    updater: KnowledgeUpdater,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Update(UpdateError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Update(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log_error(format!("Request failed: {}", self));
        }

        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Start the HTTP server
pub async fn start_server(port: u16, db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = KnowledgeStore::open(db_path).await?;

    let seeded = store.seed_default_relations().await?;
    if seeded > 0 {
        println!("🌿 Seeded {} default relation(s)", seeded);
    }
    println!(
        "📂 Knowledge store: {} ({} triples)",
        db_path,
        store.triple_count().await?
    );

    let updater = match AiClient::from_env() {
        Ok(client) => {
            println!("🤖 AI relation discovery enabled ({})", client.model());
            KnowledgeUpdater::new(store).with_ai(client)
        }
        Err(_) => {
            println!("⚠️ ANTHROPIC_API_KEY not set, AI relation discovery disabled");
            KnowledgeUpdater::new(store)
        }
    };

    let state = Arc::new(AppState { updater });

    // CORS permissif pour le développement
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/knowledge/process", post(process_result))
        .route("/api/knowledge/suggestions", post(suggest_updates))
        .route("/api/knowledge/relations", get(list_relations))
        .route("/api/knowledge/entities/{name}", get(entity_details))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 SylvaScan knowledge server running on http://localhost:{}", port);
    println!("   POST /api/knowledge/process         - Apply an analysis result");
    println!("   POST /api/knowledge/suggestions     - Preview updates without applying");
    println!("   GET  /api/knowledge/relations       - List valid relation labels");
    println!("   GET  /api/knowledge/entities/{{name}} - Entity triples and features");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sylvascan",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/knowledge/process",
            "suggestions": "POST /api/knowledge/suggestions",
            "relations": "GET /api/knowledge/relations",
            "entities": "GET /api/knowledge/entities/{name}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        match result {
            Ok(entry) => {
                let json = serde_json::to_string(&entry).ok()?;
                Some(Ok(Event::default().data(json)))
            }
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Apply an analysis result to the knowledge graph
async fn process_result(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> ServerResult<Json<UpdateReport>> {
    let entity_count = payload
        .get("detectedEntities")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    println!("\n{}", "=".repeat(70));
    println!("🔬 NEW ANALYSIS RESULT ({} detected entities)", entity_count);
    println!("{}\n", "=".repeat(70));

    let stats = state.updater.process_value(&payload).await?;

    println!("\n{}", "=".repeat(70));
    println!("📊 SUMMARY");
    println!("{}", "=".repeat(70));
    println!("   New entities:       {}", stats.new_entities_added);
    println!("   New relations:      {}", stats.new_relations_added);
    println!("   Features refreshed: {}", stats.features_updated);
    println!("   Skipped (low conf): {}", stats.skipped_low_confidence);
    println!("{}\n", "=".repeat(70));

    Ok(Json(UpdateReport::from(stats)))
}

/// Preview what a run would change, without touching the graph
async fn suggest_updates(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> ServerResult<Json<Value>> {
    validate_analysis_result(&payload)?;
    let result: AnalysisResult =
        serde_json::from_value(payload).map_err(ValidationError::from)?;

    let suggestions = state.updater.suggestions(&result);
    let count = suggestions.len();

    Ok(Json(json!({ "suggestions": suggestions, "count": count })))
}

/// List the relation labels AI discovery may answer with
async fn list_relations(State(state): State<Arc<AppState>>) -> ServerResult<Json<Value>> {
    let relations = state.updater.store().valid_relations().await?;
    Ok(Json(json!({ "relations": relations })))
}

/// Everything the graph knows about one entity
async fn entity_details(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ServerResult<Json<Value>> {
    let store = state.updater.store();
    let triples = store.triples_for(&name).await?;
    let features = store.features_for(&name).await?;

    if triples.is_empty() && features.is_empty() {
        return Err(ServerError::NotFound(name));
    }

    Ok(Json(json!({
        "entity": name,
        "triples": triples,
        "features": features
    })))
}
