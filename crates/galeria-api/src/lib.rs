//! Galeria API: read-only admin panel over stored applications
//!
//! One binary, two variants picked by [`AccessMode`]:
//! - `Basic`: every route behind HTTP Basic Auth, static panel files from disk
//! - `Open`: permissive CORS and the embedded panel page
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub use config::{AccessMode, ConfigError, Credentials, ServerConfig, StoreConfig};
pub use error::ApiError;
pub use handlers::AppState;
pub use middleware::BasicAuth;
pub use store::{ApplicationStore, MemoryStore, StoreError, SupabaseStore};

pub fn create_app(state: AppState, access: &AccessMode, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/api/candidaturas", get(handlers::list_applications))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::export_metrics))
        .route("/admin", get(handlers::admin_page))
        .with_state(state);

    let app = match access {
        AccessMode::Basic { credentials, realm } => {
            let auth = Arc::new(BasicAuth::new(credentials.clone(), realm.clone()));
            api.fallback_service(ServeDir::new(static_dir))
                .layer(from_fn_with_state(auth, middleware::require_basic_auth))
        }
        AccessMode::Open => api
            .route("/", get(handlers::admin_page))
            .layer(middleware::cors()),
    };

    app.layer(TraceLayer::new_for_http())
}

pub fn build_store(config: &StoreConfig) -> Arc<dyn ApplicationStore> {
    match config {
        StoreConfig::Supabase { url, key } => Arc::new(SupabaseStore::new(url.clone(), key.clone())),
        StoreConfig::Memory => Arc::new(MemoryStore::default()),
    }
}

pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(build_store(&config.store));
    let app = create_app(state, &config.access, &config.static_dir);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    let variant = match config.access {
        AccessMode::Basic { .. } => "basic-auth",
        AccessMode::Open => "open",
    };
    info!(%address, variant, "Panel listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Panel shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
