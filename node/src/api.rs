//! # Ballot-Intake HTTP API
//!
//! Builds the axum router for the node. All endpoints share application
//! state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Liveness probe                            |
//! | GET    | `/status`         | Chain height, pending count, validity     |
//! | POST   | `/votes`          | Submit a ballot (one per voter identity)  |
//! | GET    | `/blocks?last=n`  | Trailing window of sealed blocks          |
//! | GET    | `/chain/validate` | Full-chain integrity report               |
//! | GET    | `/export.csv`     | Full chain as CSV download                |
//!
//! ## Locking
//!
//! The ledger sits behind one mutex shared by writers and readers: the
//! append-and-possibly-seal step is a single critical section, and reads
//! take the same lock so they always see a consistent chain — never a
//! half-appended block. Every critical section is a few hashes long at
//! worst, so a blocking lock under an async handler is fine here.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use vera_ledger::config::{CSV_EXPORT_FILENAME, DEFAULT_DISPLAY_WINDOW};
use vera_ledger::export;
use vera_ledger::{Block, Entry, Ledger, Seal, ValidationFault};

use crate::metrics::NodeMetrics;
use crate::registry::VoterRegistry;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The single-writer ledger. One lock for writers and readers.
    pub ledger: Arc<Mutex<Ledger>>,
    /// One-vote-per-identity set, checked before the ledger is touched.
    pub registry: Arc<VoterRegistry>,
    /// Prometheus handles for in-handler recording.
    pub metrics: Arc<NodeMetrics>,
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Request body for `POST /votes`.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// Unique voter identity. One ballot per identity, ever.
    pub voter_id: String,
    /// The voter's choice, opaque to the node.
    pub choice: String,
}

/// Response body for an accepted ballot.
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    /// Echo of the voter identity.
    pub voter_id: String,
    /// Echo of the choice.
    pub choice: String,
    /// RFC 3339 time the ballot was recorded.
    pub cast_at: String,
    /// Index of the block this ballot sealed, if it completed a batch.
    pub sealed_block: Option<u64>,
}

/// A block as presented by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockView {
    /// Chain position.
    pub index: u64,
    /// Seal time, RFC 3339 with millisecond precision.
    pub created_at: String,
    /// Seal time, raw Unix milliseconds (what the digest covers).
    pub created_at_millis: u64,
    /// The entries sealed in this block, submission order.
    pub entries: Vec<Entry>,
    /// This block's digest.
    pub hash: String,
    /// The predecessor's digest (`"0"` for genesis).
    pub previous_hash: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            created_at: block.created_at_rfc3339(),
            created_at_millis: block.created_at,
            entries: block.entries.clone(),
            hash: block.hash.clone(),
            previous_hash: block.previous_hash.clone(),
        }
    }
}

/// Response body for `GET /blocks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlocksResponse {
    /// The selected window, oldest first.
    pub blocks: Vec<BlockView>,
}

/// Query parameters for `GET /blocks`.
#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    /// Window size; defaults to the display window of the original UI.
    pub last: Option<usize>,
}

/// Response body for `GET /chain/validate`.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// True if every block's digest and parent link check out.
    pub valid: bool,
    /// The first fault found, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<ValidationFault>,
}

/// Response body for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Sealed blocks on the chain, genesis included.
    pub chain_height: u64,
    /// Entries waiting in the pending buffer.
    pub pending_entries: usize,
    /// Configured batch size.
    pub batch_size: usize,
    /// Identities that have voted.
    pub voters: usize,
    /// Whether the chain currently validates.
    pub valid: bool,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

/// Error envelope for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> impl IntoResponse {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/votes", post(submit_vote_handler))
        .route("/blocks", get(blocks_handler))
        .route("/chain/validate", get(validate_handler))
        .route("/export.csv", get(export_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /status` — one-look service summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.lock();
    Json(StatusResponse {
        version: state.version.clone(),
        chain_height: ledger.len() as u64,
        pending_entries: ledger.pending_len(),
        batch_size: ledger.batch_size(),
        voters: state.registry.len(),
        valid: ledger.validate().is_valid(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `POST /votes` — record one ballot.
///
/// The identity check happens before the ledger lock is taken; a rejected
/// duplicate never touches the chain. An accepted ballot becomes an entry
/// `{id, choice, cast_at}` — the same shape the original system sealed.
async fn submit_vote_handler(
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> axum::response::Response {
    if request.voter_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "voter_id must not be empty")
            .into_response();
    }
    if request.choice.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "choice must not be empty")
            .into_response();
    }

    if !state.registry.try_claim(&request.voter_id) {
        state.metrics.votes_rejected_total.inc();
        tracing::info!(voter_id = %request.voter_id, "duplicate ballot rejected");
        return error_response(StatusCode::CONFLICT, "this identity has already voted")
            .into_response();
    }

    let cast_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let entry = Entry::new()
        .with("id", request.voter_id.clone())
        .with("choice", request.choice.clone())
        .with("cast_at", cast_at.clone());

    let mut ledger = state.ledger.lock();
    match ledger.submit_entry(entry) {
        Ok(outcome) => {
            state.metrics.votes_submitted_total.inc();
            state.metrics.pending_entries.set(ledger.pending_len() as i64);
            let sealed_block = match outcome {
                Seal::Sealed(index) => {
                    state.metrics.blocks_sealed_total.inc();
                    state.metrics.chain_height.set(ledger.len() as i64);
                    tracing::info!(index, "ballot sealed a block");
                    Some(index)
                }
                Seal::Buffered => None,
            };
            (
                StatusCode::CREATED,
                Json(VoteResponse {
                    voter_id: request.voter_id,
                    choice: request.choice,
                    cast_at,
                    sealed_block,
                }),
            )
                .into_response()
        }
        Err(e) => {
            // The batch stays pending inside the ledger and the identity
            // stays claimed — the ballot is recorded, just not yet
            // durable. It seals with a later submission's retry.
            tracing::error!("block persistence failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("ballot buffered but block persistence failed: {e}"),
            )
            .into_response()
        }
    }
}

/// `GET /blocks?last=n` — trailing window of sealed blocks, oldest first.
async fn blocks_handler(
    State(state): State<AppState>,
    Query(query): Query<BlocksQuery>,
) -> impl IntoResponse {
    let window = query.last.unwrap_or(DEFAULT_DISPLAY_WINDOW);
    let ledger = state.ledger.lock();
    let blocks = ledger.blocks(window).iter().map(BlockView::from).collect();
    Json(BlocksResponse { blocks })
}

/// `GET /chain/validate` — full integrity walk.
///
/// An invalid chain is still a 200: the report is the designed signal,
/// not a server failure, and it must reach the caller prominently.
async fn validate_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.lock();
    let report = ledger.validate();
    Json(ValidateResponse {
        valid: report.is_valid(),
        fault: report.fault().copied(),
    })
}

/// `GET /export.csv` — the whole chain in the archived export format.
async fn export_handler(State(state): State<AppState>) -> axum::response::Response {
    let ledger = state.ledger.lock();
    let blocks = ledger.all_blocks();
    let columns = export::collect_columns(blocks);
    match export::csv_bytes(blocks, &columns) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_EXPORT_FILENAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("csv export failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("export failed: {e}"))
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
