use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::models::{parse_trader_lines, parse_wallet_list, Address, TrackedTrader};
use crate::monitor::{DashboardSettings, Window};

use super::render;
use super::state::AppState;

pub fn dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard))
        .route("/upload", post(upload_wallets))
}

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/traders/{address}", get(trader_report))
}

// ---------------------------------------------------------------------------
// Sidebar state
// ---------------------------------------------------------------------------

/// Sidebar inputs as they arrive in the query string or upload form.
///
/// Everything is taken as text and parsed leniently so a bad value falls back
/// to its default instead of rejecting the page. A repeated key keeps its last value.
#[derive(Debug, Default)]
struct SidebarQuery {
    traders: String,
    max_fills: Option<String>,
    window_hours: Option<String>,
    aggregate: Option<String>,
    auto_refresh: Option<String>,
    refresh_secs: Option<String>,
    refresh: Option<String>,
}

impl SidebarQuery {
    fn from_fields(mut fields: HashMap<String, String>) -> Self {
        Self {
            traders: fields.remove("traders").unwrap_or_default(),
            max_fills: fields.remove("max_fills"),
            window_hours: fields.remove("window_hours"),
            aggregate: fields.remove("aggregate"),
            auto_refresh: fields.remove("auto_refresh"),
            refresh_secs: fields.remove("refresh_secs"),
            refresh: fields.remove("refresh"),
        }
    }

    fn settings(&self) -> DashboardSettings {
        let defaults = DashboardSettings::default();
        DashboardSettings {
            max_fills: parse_or(&self.max_fills, defaults.max_fills),
            window_hours: parse_or(&self.window_hours, defaults.window_hours),
            aggregate_by_time: is_on(self.aggregate.as_deref()).unwrap_or(false),
            auto_refresh: is_on(self.auto_refresh.as_deref()).unwrap_or(defaults.auto_refresh),
            refresh_secs: parse_or(&self.refresh_secs, defaults.refresh_secs),
        }
        .normalized()
    }

    fn refresh_requested(&self) -> bool {
        is_on(self.refresh.as_deref()).unwrap_or(false)
    }
}

fn parse_or<T: FromStr>(raw: &Option<String>, default: T) -> T {
    raw.as_deref()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn is_on(raw: Option<&str>) -> Option<bool> {
    raw.map(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "on" | "1" | "true" | "yes"
        )
    })
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(fields): Query<HashMap<String, String>>,
) -> Html<String> {
    let query = SidebarQuery::from_fields(fields);
    let settings = query.settings();
    let traders = parse_trader_lines(&query.traders);

    if query.refresh_requested() {
        state.monitor.clear_cache().await;
    }

    if traders.is_empty() {
        debug!("No traders entered");
        return Html(render::dashboard_page(&traders, &settings, None, &state.api_url));
    }

    let snapshot = state.monitor.snapshot(&traders, &settings).await;

    info!(
        traders = traders.len(),
        failing = snapshot.reports.iter().filter(|r| r.has_errors()).count(),
        fills = snapshot.total_fills(),
        positions = snapshot.total_positions(),
        "Dashboard rendered"
    );

    Html(render::dashboard_page(
        &traders,
        &settings,
        Some(&snapshot),
        &state.api_url,
    ))
}

/// Append addresses from an uploaded txt/csv wallet list and go back to the dashboard.
async fn upload_wallets(mut multipart: Multipart) -> Result<Redirect, (StatusCode, String)> {
    let mut fields = HashMap::new();
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "wallets" {
            let bytes = field.bytes().await.map_err(bad_upload)?;
            uploaded.extend(parse_wallet_list(&String::from_utf8_lossy(&bytes)));
        } else {
            let value = field.text().await.map_err(bad_upload)?;
            fields.insert(name, value);
        }
    }

    let query = SidebarQuery::from_fields(fields);
    let mut traders = parse_trader_lines(&query.traders);
    let added = uploaded.len();
    for address in uploaded {
        let label = format!("Trader {}", traders.len() + 1);
        traders.push(TrackedTrader::new(label, address));
    }

    info!(added = added, total = traders.len(), "Wallet list uploaded");

    Ok(Redirect::to(&render::dashboard_url(
        &traders,
        &query.settings(),
    )))
}

fn bad_upload(e: MultipartError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn trader_report(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(fields): Query<HashMap<String, String>>,
) -> Response {
    if let Err(e) = Address::parse(&address) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("{:#}", e),
                "address": address,
            })),
        )
            .into_response();
    }

    let settings = SidebarQuery::from_fields(fields).settings();
    let window = Window::ending_at(Utc::now(), settings.window_hours);
    let trader = TrackedTrader::new(address.clone(), address);
    let report = state
        .monitor
        .trader_report(trader, &settings, window)
        .await;

    Json(report).into_response()
}
