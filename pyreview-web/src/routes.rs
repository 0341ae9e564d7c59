//! HTTP routes

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use pyreview_analysis::{
    AnalysisExporter, AnalysisReport, SessionState, EXPORT_FILE_NAME, MARKDOWN_MIME,
};
use pyreview_core::{Error, SourceCode};

use crate::render::{render_page, PageView};
use crate::state::{AppState, SESSION_COOKIE};
use crate::WebError;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/clear", post(clear))
        .route("/report.md", get(export_markdown))
        .route("/api/report", get(api_report))
        .route("/api/tools", get(api_tools))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Session id from the request cookie, if well formed
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// The caller's session if the cookie names a live one
async fn existing_session(state: &AppState, headers: &HeaderMap) -> Option<Arc<SessionState>> {
    match session_id(headers) {
        Some(id) => state.sessions.get(id).await,
        None => None,
    }
}

/// Resolve the caller's session, attaching a cookie when a new one is made
async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> (Arc<SessionState>, Option<String>) {
    let (id, session, created) = state.sessions.get_or_create(session_id(headers)).await;
    (session, created.then(|| session_cookie(id)))
}

fn with_cookie(cookie: Option<String>, response: impl IntoResponse) -> Response {
    match cookie {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], response).into_response(),
        None => response.into_response(),
    }
}

/// Rendering the page never creates a session; the first analyze does
async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let report = match existing_session(&state, &headers).await {
        Some(session) => session.current().await,
        None => None,
    };

    Html(render_page(&PageView {
        report: report.as_deref(),
        ..PageView::default()
    }))
}

/// Submitted form: the upload wins over the paste area
#[derive(Debug, Default)]
struct Submission {
    upload: Option<(String, Vec<u8>)>,
    pasted: String,
}

impl Submission {
    async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(ToString::to_string);
            match name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen
                    if !file_name.is_empty() || !bytes.is_empty() {
                        submission.upload = Some((file_name, bytes.to_vec()));
                    }
                }
                Some("code") => submission.pasted = field.text().await?,
                other => debug!("Ignoring form field {:?}", other),
            }
        }

        Ok(submission)
    }

    fn into_source(self) -> Result<SourceCode, WebError> {
        match self.upload {
            Some((file_name, bytes)) => {
                if !file_name.ends_with(".py") {
                    return Err(WebError::BadRequest(
                        "Please upload a Python file (.py).".to_string(),
                    ));
                }
                let text = String::from_utf8(bytes).map_err(|_| {
                    WebError::BadRequest(format!("{file_name} is not valid UTF-8 text."))
                })?;
                Ok(SourceCode::new(text).with_origin(file_name))
            }
            None => Ok(SourceCode::new(self.pasted)),
        }
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let submission = Submission::read(multipart).await?;
    let draft = submission.pasted.clone();

    let outcome = match submission.into_source() {
        Ok(source) => state
            .pipeline
            .analyze_into(&session, source)
            .await
            .map_err(WebError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            info!(
                "Stored report for {} ({} degraded section(s))",
                report.source.origin(),
                report.degraded_sections()
            );
            Ok(with_cookie(cookie, Redirect::to("/")))
        }
        Err(e @ (WebError::BadRequest(_) | WebError::Analysis(Error::Validation(_)))) => {
            // Leave the stored report as it was and show the message
            let report = session.current().await;
            let message = e.to_string();
            let page = render_page(&PageView {
                report: report.as_deref(),
                error: Some(&message),
                draft: &draft,
            });
            Ok(with_cookie(cookie, (e.status(), Html(page))))
        }
        Err(e) => Err(e),
    }
}

async fn clear(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    if let Some(session) = existing_session(&state, &headers).await {
        session.clear().await;
    }
    Redirect::to("/")
}

async fn stored_report(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<AnalysisReport>, WebError> {
    let session = existing_session(state, headers)
        .await
        .ok_or(WebError::NoReport)?;
    session.current().await.ok_or(WebError::NoReport)
}

async fn export_markdown(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let report = stored_report(&state, &headers).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format!("{MARKDOWN_MIME}; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        AnalysisExporter::to_markdown(&report).to_string(),
    )
        .into_response())
}

async fn api_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Arc<AnalysisReport>>, WebError> {
    Ok(Json(stored_report(&state, &headers).await?))
}

async fn api_tools(State(state): State<Arc<AppState>>) -> Json<Vec<pyreview_core::ToolStatus>> {
    Json(state.pipeline.tools().check_tool_availability().await)
}
