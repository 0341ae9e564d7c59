//! Error type for the web surface

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Nothing has been analyzed in this session yet
    #[error("No report available. Analyze some code first.")]
    NoReport,

    /// The submitted form could not be used
    #[error("{0}")]
    BadRequest(String),

    /// Error from the analysis layer
    #[error(transparent)]
    Analysis(#[from] pyreview_core::Error),

    /// Socket or server I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoReport => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Analysis(pyreview_core::Error::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Analysis(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::BadRequest(format!("Could not read the submitted form: {e}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
