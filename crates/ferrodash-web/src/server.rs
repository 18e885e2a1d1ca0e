//! HTTP surface: dashboard page, JSON API and per-browser sessions.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Dashboard page |
//! | `GET /static/style.css` | Page styles |
//! | `GET /healthz` | Source health and store summary |
//! | `GET /api/catalog` | Catalog entries in display order |
//! | `GET /api/view?ticker&start&end` | Stateless recompute |
//! | `POST /api/sessions` | Open a session and render its initial view |
//! | `POST /api/sessions/:id/events` | Deliver one input event |
//! | `DELETE /api/sessions/:id` | Close a session |
//! | `POST /api/admin/refresh` | Re-fetch the store and swap it in |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use ferrodash_core::{
    today_utc, CacheMode, CatalogEntry, Dashboard, DashboardView, DateWindow, Dispatch,
    HealthState, HealthStatus, InputEvent, SelectionState,
};

use crate::bootstrap::Bootstrap;
use crate::error::ApiError;
use crate::page::{render_index, STYLE_SHEET};
use crate::session::SessionRegistry;

/// Shared server state. The dashboard is swapped whole on refresh so
/// in-flight requests keep the store they started with.
#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<RwLock<Arc<Dashboard>>>,
    sessions: SessionRegistry,
    bootstrap: Arc<Bootstrap>,
}

impl AppState {
    pub fn new(bootstrap: Bootstrap, dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(RwLock::new(Arc::new(dashboard))),
            sessions: SessionRegistry::default(),
            bootstrap: Arc::new(bootstrap),
        }
    }

    async fn current(&self) -> Arc<Dashboard> {
        Arc::clone(&*self.dashboard.read().await)
    }

    fn clamp_event(&self, event: InputEvent) -> InputEvent {
        match event {
            InputEvent::StartDateChanged { date } => InputEvent::StartDateChanged {
                date: self.bootstrap.clamp_date(date),
            },
            InputEvent::EndDateChanged { date } => InputEvent::EndDateChanged {
                date: self.bootstrap.clamp_date(date),
            },
            other => other,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/style.css", get(style))
        .route("/healthz", get(healthz))
        .route("/api/catalog", get(catalog))
        .route("/api/view", get(view))
        .route("/api/sessions", post(open_session))
        .route("/api/sessions/:id/events", post(session_event))
        .route("/api/sessions/:id", delete(close_session))
        .route("/api/admin/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let dashboard = state.current().await;
    Html(render_index(
        dashboard.catalog(),
        dashboard.fallback(),
        state.bootstrap.history_start(),
        today_utc(),
    ))
}

async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_SHEET)
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    source: &'static str,
    health: HealthStatus,
    tickers: usize,
    bars: usize,
    fetched_window: Option<DateWindow>,
    sessions: usize,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthReport> {
    let dashboard = state.current().await;
    let source = state.bootstrap.source();
    let health = source.health().await;
    let status = match health.state {
        HealthState::Healthy => "ok",
        _ => "degraded",
    };
    Json(HealthReport {
        status,
        source: source.id(),
        health,
        tickers: dashboard.store().len(),
        bars: dashboard.store().bar_count(),
        fetched_window: dashboard.store().fetched_window(),
        sessions: state.sessions.len().await,
    })
}

async fn catalog(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(state.current().await.catalog().entries().to_vec())
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    ticker: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

async fn view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let selection = state.bootstrap.selection(
        query.ticker.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
    )?;
    Ok(Json(state.current().await.recompute(&selection)))
}

#[derive(Debug, Serialize)]
struct SessionOpened {
    session_id: Uuid,
    #[serde(flatten)]
    dispatch: Dispatch,
}

async fn open_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionOpened>) {
    let dashboard = state.current().await;
    let initial = SelectionState::new(None, state.bootstrap.full_window());
    let dispatch = dashboard.initial_view(&initial);
    let session_id = state.sessions.create(dispatch.state.clone()).await;
    tracing::info!(session = %session_id, ticker = ?dispatch.state.ticker, "session opened");
    (
        StatusCode::CREATED,
        Json(SessionOpened {
            session_id,
            dispatch,
        }),
    )
}

async fn session_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<InputEvent>,
) -> Result<Json<Dispatch>, ApiError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("session.not_found", format!("no session {id}")))?;
    let event = state.clamp_event(event);
    let dashboard = state.current().await;

    let mut selection = handle.lock().await;
    let dispatch = dashboard.dispatch(&selection, &event);
    *selection = dispatch.state.clone();
    tracing::debug!(
        session = %id,
        signal = ?event.signal(),
        recomputed = dispatch.view.is_some(),
        "event dispatched"
    );
    Ok(Json(dispatch))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(
            "session.not_found",
            format!("no session {id}"),
        ))
    }
}

#[derive(Debug, Serialize)]
struct RefreshReport {
    tickers: usize,
    bars: usize,
    fetched_window: Option<DateWindow>,
}

async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshReport>, ApiError> {
    let fresh = state.bootstrap.dashboard(CacheMode::Refresh).await?;
    let report = RefreshReport {
        tickers: fresh.store().len(),
        bars: fresh.store().bar_count(),
        fetched_window: fresh.store().fetched_window(),
    };
    *state.dashboard.write().await = Arc::new(fresh);
    tracing::info!(
        tickers = report.tickers,
        bars = report.bars,
        "series store refreshed"
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use ferrodash_core::{DashboardConfig, Symbol};
    use serde_json::{json, Value};
    use time::Duration;
    use tower::ServiceExt;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    async fn app() -> Router {
        let config = DashboardConfig {
            catalog: vec![
                CatalogEntry::new("Gold", symbol("GC=F")),
                CatalogEntry::new("Silver", symbol("SI=F")),
                CatalogEntry::new("Natural Gas", symbol("NG=F")),
            ],
            history_start: today_utc() - Duration::days(90),
            fallback_ticker: symbol("NG=F"),
            ..DashboardConfig::default()
        };
        let bootstrap = Bootstrap::from_config(config).expect("valid config");
        let dashboard = bootstrap
            .dashboard(CacheMode::Use)
            .await
            .expect("dashboard builds");
        router(AppState::new(bootstrap, dashboard))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn healthz_reports_store_summary() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/healthz", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["source"], "yahoo");
        assert_eq!(body["tickers"], 3);
        assert!(body["bars"].as_u64().expect("bars") > 0);
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn catalog_keeps_configured_order() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/catalog", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"name": "Gold", "symbol": "GC=F"},
                {"name": "Silver", "symbol": "SI=F"},
                {"name": "Natural Gas", "symbol": "NG=F"},
            ])
        );
    }

    #[tokio::test]
    async fn view_renders_requested_ticker() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/view?ticker=gc%3Df", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "GC=F");
        assert_eq!(body["name"], "Gold");
        assert_eq!(body["price_chart"]["layout"]["title"]["text"], "Price: Gold");
        assert_eq!(body["heatmap"]["matrix"]["labels"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn view_falls_back_for_unknown_ticker() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/view?ticker=AAPL", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "NG=F");
        assert_eq!(body["warnings"][0]["code"], "unknown_ticker");
        assert_eq!(body["warnings"][0]["requested"], "AAPL");
    }

    #[tokio::test]
    async fn view_rejects_malformed_ticker() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/view?ticker=%21%21", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let app = app().await;
        let (status, first) = send(&app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["state"]["ticker"], "NG=F");
        assert!(first["view"].is_object());
        let (_, second) = send(&app, Method::POST, "/api/sessions", None).await;

        let first_id = first["session_id"].as_str().expect("id");
        let second_id = second["session_id"].as_str().expect("id");
        let (status, moved) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{first_id}/events"),
            Some(json!({"kind": "ticker_selected", "symbol": "GC=F"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["state"]["ticker"], "GC=F");
        assert_eq!(moved["view"]["ticker"], "GC=F");

        let (_, untouched) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{second_id}/events"),
            Some(json!({"kind": "end_date_changed", "date": "2999-01-01"})),
        )
        .await;
        assert_eq!(untouched["state"]["ticker"], "NG=F");
        assert_eq!(
            untouched["state"]["end"],
            ferrodash_core::format_date(today_utc())
        );
    }

    #[tokio::test]
    async fn repeated_ticker_event_skips_recompute() {
        let app = app().await;
        let (_, opened) = send(&app, Method::POST, "/api/sessions", None).await;
        let id = opened["session_id"].as_str().expect("id");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/events"),
            Some(json!({"kind": "ticker_selected", "symbol": "NG=F"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["view"].is_null());
        assert_eq!(body["bindings"], json!(["ticker_selection"]));
    }

    #[tokio::test]
    async fn closed_session_is_not_found() {
        let app = app().await;
        let (_, opened) = send(&app, Method::POST, "/api/sessions", None).await;
        let id = opened["session_id"].as_str().expect("id");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/events"),
            Some(json!({"kind": "ticker_selected"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "session.not_found");
    }

    #[tokio::test]
    async fn refresh_swaps_in_a_new_store() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/api/admin/refresh", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"], 3);
        assert!(body["bars"].as_u64().expect("bars") > 0);
    }

    #[tokio::test]
    async fn index_lists_catalog_names() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let html = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(html.contains("Gold"));
        assert!(html.contains("Natural Gas"));
        assert!(html.contains("/static/style.css"));
    }
}
