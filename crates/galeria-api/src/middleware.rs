//! Access control for the two panel variants.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::config::Credentials;
use crate::error::ApiError;

/// Open variant: any origin may read the panel
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

#[derive(Debug, Clone)]
pub struct BasicAuth {
    credentials: Credentials,
    realm: String,
}

impl BasicAuth {
    pub fn new(credentials: Credentials, realm: impl Into<String>) -> Self {
        Self {
            credentials,
            realm: realm.into(),
        }
    }

    /// True when `header` is `Basic <base64(user:password)>` with the configured pair.
    /// The scheme name is case-insensitive.
    pub fn accepts(&self, header: Option<&HeaderValue>) -> bool {
        let Some((scheme, encoded)) = header
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.trim_start().split_once(' '))
        else {
            return false;
        };
        if !scheme.eq_ignore_ascii_case("basic") {
            return false;
        }
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(pair) = String::from_utf8(decoded) else {
            return false;
        };
        match pair.split_once(':') {
            Some((user, password)) => {
                let user = user.as_bytes().ct_eq(self.credentials.username.as_bytes());
                let password = password.as_bytes().ct_eq(self.credentials.password.as_bytes());
                (user & password).into()
            }
            None => false,
        }
    }
}

pub async fn require_basic_auth(
    State(auth): State<Arc<BasicAuth>>,
    req: Request,
    next: Next,
) -> Response {
    if auth.accepts(req.headers().get(header::AUTHORIZATION)) {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), "Rejected unauthenticated request");
    ApiError::Unauthorized {
        realm: auth.realm.clone(),
    }
    .into_response()
}
