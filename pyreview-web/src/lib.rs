//! pyreview web - browser surface
//!
//! Serves the paste/upload form and the results panel, accepts analyze
//! requests and offers the stored report for download. Each browser gets
//! its own session, keyed by a cookie.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod error;
pub mod render;
pub mod routes;
pub mod state;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pyreview_analysis::ReviewPipeline;
use pyreview_core::ReviewConfig;

pub use error::WebError;
pub use routes::router;
pub use state::{AppState, SessionRegistry, SESSION_COOKIE};

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,
    /// Largest accepted request body (upload plus form fields)
    pub max_upload_bytes: usize,
    /// Most sessions kept at once; the least recently used is evicted
    pub max_sessions: usize,
    /// Sessions unused for this long are dropped
    pub session_idle_secs: u64,
}

impl ServerConfig {
    pub const fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 1024 * 1024,
            max_sessions: 1024,
            session_idle_secs: 60 * 60,
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(server: ServerConfig, review: &ReviewConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState::new(ReviewPipeline::new(review), server.clone()));
    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    info!("pyreview listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("pyreview server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
