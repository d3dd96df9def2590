// SuperStore Analytics - REST API with Axum
// Each session owns its own dataset; nothing is shared between sessions.
// Sessions idle past the TTL, or beyond the cap, are evicted on insert.

use crate::aggregate::AggregationResult;
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardSession, DashboardView, KpiCard};
use crate::error::AnalyticsError;
use crate::filter::{FilterOptions, FilterPredicate};
use crate::record::{Category, Region, TransactionRecord};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 256;

struct SessionEntry {
    session: DashboardSession,
    last_access: Instant,
}

/// Least recently used first
type SessionMap = IndexMap<String, SessionEntry>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: DashboardConfig,
    session_ttl: Duration,
    max_sessions: usize,
    sessions: Arc<Mutex<SessionMap>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Arc::new(Mutex::new(IndexMap::new())),
        }
    }

    /// Idle time after which a session may be evicted
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Upper bound on live sessions (at least 1)
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn sessions(&self) -> MutexGuard<'_, SessionMap> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    /// Drop expired sessions and the least recently used ones over the cap,
    /// then register the new session. Returns how many were evicted.
    fn insert_session(&self, session_id: String, session: DashboardSession) -> usize {
        let mut sessions = self.sessions();
        let now = Instant::now();
        let before = sessions.len();

        sessions.retain(|_, entry| now.duration_since(entry.last_access) < self.session_ttl);
        while sessions.len() >= self.max_sessions {
            sessions.shift_remove_index(0);
        }
        let evicted = before - sessions.len();

        sessions.insert(session_id, SessionEntry { session, last_access: now });
        evicted
    }
}

/// Look a session up and mark it as most recently used
fn touch<'a>(sessions: &'a mut SessionMap, session_id: &str) -> Option<&'a mut DashboardSession> {
    let index = sessions.get_index_of(session_id)?;
    let last = sessions.len() - 1;
    sessions.move_index(index, last);

    let (_, entry) = sessions.get_index_mut(last)?;
    entry.last_access = Instant::now();
    Some(&mut entry.session)
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn not_found(session_id: &str) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(AnalyticsError::UnknownSession(session_id.to_string()).to_string()),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: String,
    row_count: usize,
}

/// Dashboard payload; `empty` is the signal to stop rendering
#[derive(Serialize)]
struct DashboardResponse {
    empty: bool,
    regions: Vec<Region>,
    categories: Vec<Category>,
    summary: Option<AggregationResult>,
    kpis: Vec<KpiCard>,
    records: Vec<TransactionRecord>,
}

/// `?regions=East,West&categories=Technology`
/// Absent parameter = all values; present but empty = nothing selected.
#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub regions: Option<String>,
    pub categories: Option<String>,
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

impl DashboardQuery {
    pub fn to_predicate(&self) -> FilterPredicate {
        let regions: Vec<&str> = match &self.regions {
            Some(raw) => split_list(raw),
            None => Region::ALL.iter().map(|r| r.as_str()).collect(),
        };
        let categories: Vec<&str> = match &self.categories {
            Some(raw) => split_list(raw),
            None => Category::ALL.iter().map(|c| c.as_str()).collect(),
        };

        FilterPredicate::from_names(&regions, &categories)
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/sessions - Create a session with its own dataset
async fn create_session(State(state): State<AppState>) -> Response {
    let session_id = uuid::Uuid::new_v4().to_string();
    let session = DashboardSession::from_config(&state.config);
    let row_count = session.records().len();

    let evicted = state.insert_session(session_id.clone(), session);
    if evicted > 0 {
        debug!(evicted, "evicted stale sessions");
    }
    info!(session = %session_id, rows = row_count, "session created");

    (
        StatusCode::CREATED,
        Json(ApiResponse::ok(SessionCreated { session_id, row_count })),
    )
        .into_response()
}

/// DELETE /api/sessions/:id - Tear a session down
async fn delete_session(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match state.sessions().shift_remove(&session_id) {
        Some(_) => {
            info!(session = %session_id, "session closed");
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&session_id),
    }
}

/// GET /api/sessions/:id/options - Filter choices for the session's data
async fn get_options(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    let mut sessions = state.sessions();
    let options: Option<FilterOptions> = touch(&mut sessions, &session_id).map(|s| s.options());

    match options {
        Some(options) => (StatusCode::OK, Json(ApiResponse::ok(options))).into_response(),
        None => not_found(&session_id),
    }
}

/// GET /api/sessions/:id/dashboard - KPIs, chart data and detail rows
async fn get_dashboard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let mut sessions = state.sessions();
    let session = match touch(&mut sessions, &session_id) {
        Some(session) => session,
        None => return not_found(&session_id),
    };

    session.set_predicate(query.to_predicate());
    let predicate = session.predicate().clone();

    let response = match session.view() {
        DashboardView::NoData => DashboardResponse {
            empty: true,
            regions: predicate.regions(),
            categories: predicate.categories(),
            summary: None,
            kpis: Vec::new(),
            records: Vec::new(),
        },
        DashboardView::Ready(snapshot) => DashboardResponse {
            empty: false,
            regions: predicate.regions(),
            categories: predicate.categories(),
            summary: Some(snapshot.summary),
            kpis: snapshot.kpis,
            records: snapshot.records,
        },
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/options", get(get_options))
        .route("/sessions/:id/dashboard", get(get_dashboard))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
