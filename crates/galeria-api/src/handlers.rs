//! API Handlers
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use galeria_core::{ApplicationRecord, GALERIA_VERSION};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::ApiError;
use crate::metrics::{self, Outcome};
use crate::store::ApplicationStore;

const ADMIN_PAGE: &str = include_str!("../static/admin.html");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ApplicationStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }
}

/// `GET /api/candidaturas`: every stored application, newest first
pub async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationRecord>>, ApiError> {
    let mut records = state.store.list_newest_first().await.map_err(|e| {
        metrics::record_listing(Outcome::Error);
        ApiError::from(e)
    })?;

    records.sort_by(|a, b| b.id.cmp(&a.id));
    metrics::record_listing(Outcome::Ok);
    info!(count = records.len(), "Listed applications");
    Ok(Json(records))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": GALERIA_VERSION })),
    )
}

pub async fn export_metrics() -> Response {
    match metrics::render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}
