use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Authentication required")]
    Unauthorized { realm: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // The store's message is passed through as-is.
            ApiError::Store(err) => {
                error!(error = %err, "Failed to list applications");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
            ApiError::Unauthorized { realm } => {
                let challenge = format!("Basic realm=\"{}\"", realm.replace('"', ""));
                let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                }
                response
            }
        }
    }
}
