// GET handlers: dashboard page / JSON state / admin actions, version

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, preference_store};
use crate::normalizer::normalize;
use crate::presenter::{AdminAction, Presenter};
use crate::version::{NAME, VERSION};

/// Query parameters understood by `GET /`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct DashboardQuery {
    reset: Option<String>,
    invalidate: Option<String>,
    invalidate_searched: Option<String>,
    section: Option<String>,
}

impl DashboardQuery {
    fn action(&self) -> Option<AdminAction> {
        if self.reset.is_some() {
            Some(AdminAction::Reset)
        } else if let Some(path) = &self.invalidate {
            Some(AdminAction::Invalidate(path.clone()))
        } else {
            self.invalidate_searched
                .as_ref()
                .map(|s| AdminAction::InvalidateSearched(s.clone()))
        }
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

async fn perform(state: &AppState, action: &AdminAction) -> bool {
    let options = &state.config.presenter;
    let allowed = match action {
        AdminAction::Reset => options.allow_reset,
        AdminAction::Invalidate(_) | AdminAction::InvalidateSearched(_) => options.allow_invalidate,
    };
    if !allowed {
        tracing::warn!(action = ?action, "admin action not allowed by configuration");
        return false;
    }
    let result = match action {
        AdminAction::Reset => state.repo.reset_all().await,
        AdminAction::Invalidate(path) => state.repo.invalidate(path).await,
        AdminAction::InvalidateSearched(text) => state.repo.invalidate_matching(text).await,
    };
    match result {
        Ok(success) => {
            tracing::info!(action = ?action, success, "admin action finished");
            success
        }
        Err(e) => {
            tracing::warn!(error = %e, action = ?action, "admin action errored");
            false
        }
    }
}

fn upstream_error(json: bool, message: String) -> Response {
    if json {
        (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    } else {
        (StatusCode::BAD_GATEWAY, message).into_response()
    }
}

/// GET /: admin action (`reset`, `invalidate`, `invalidate_searched`), JSON state
/// (optionally one `section`) when JSON is accepted, otherwise the HTML dashboard.
pub(super) async fn dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let json = accepts_json(&headers);

    if let Some(action) = query.action() {
        let success = perform(&state, &action).await;
        if json {
            let answer = if success { "yes" } else { "no" };
            return Json(serde_json::json!({ "success": answer })).into_response();
        }
        // redirect mode reports nothing: a failed action simply leaves the cache unchanged
        return Redirect::to(uri.path()).into_response();
    }

    let raw = match state.repo.snapshot().await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, operation = "snapshot", "snapshot fetch failed");
            return upstream_error(json, format!("cache runtime unavailable: {}", e));
        }
    };
    let view = match normalize(&raw, &state.config.display) {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(error = %e, operation = "normalize", "snapshot rejected");
            return upstream_error(json, e.to_string());
        }
    };

    if json {
        return match query.section.as_deref() {
            None => Json(view).into_response(),
            Some(name) => match view.section(name) {
                Some(section) => Json(section).into_response(),
                None => (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({ "error": format!("unknown section: {}", name) })),
                )
                    .into_response(),
            },
        };
    }

    let prefs = preference_store(&state, &headers, uri.path());
    let mut presenter = Presenter::new(
        state.config.display.clone(),
        state.config.presenter.clone(),
        prefs,
    );
    presenter.replace_view(Arc::new(view));
    Html(presenter.render_page()).into_response()
}
