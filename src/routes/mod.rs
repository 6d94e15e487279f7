// HTTP + WebSocket routes

mod http;
mod ws;

use axum::http::HeaderMap;
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::presenter::preference::CookiePreferenceStore;
use crate::runtime_repo::RuntimeRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: RuntimeRepo,
    pub(crate) config: AppConfig,
}

pub fn app(repo: RuntimeRepo, config: AppConfig) -> Router {
    let state = AppState { repo, config };
    Router::new()
        .route("/", get(http::dashboard_handler)) // GET / (page, JSON state, admin actions)
        .route("/version", get(http::version_handler)) // GET /version
        .route("/ws", get(ws::ws_dashboard)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// True when the request reached us over HTTPS (directly or via a proxy).
pub(crate) fn is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("https"))
}

pub(crate) fn preference_store(
    state: &AppState,
    headers: &HeaderMap,
    page_path: &str,
) -> CookiePreferenceStore {
    let cookie = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok());
    CookiePreferenceStore::from_request(&state.config.cookie, cookie, page_path, is_https(headers))
}
