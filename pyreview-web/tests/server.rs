//! End-to-end tests against a live server on an ephemeral port.
//!
//! Every tool points at a missing program, so each analysis degrades all
//! three sections without depending on what is installed.

use std::sync::Arc;

use pyreview_analysis::ReviewPipeline;
use pyreview_core::{ReviewConfig, ToolCommand, EMPTY_INPUT_MESSAGE};
use pyreview_web::{router, AppState, ServerConfig};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

async fn spawn_app() -> String {
    spawn_app_with(ServerConfig::default()).await.0
}

async fn spawn_app_with(server: ServerConfig) -> (String, Arc<AppState>) {
    let mut review = ReviewConfig::default();
    review.tools.flake8 = ToolCommand::new("/nonexistent/pyreview-flake8");
    review.tools.black = ToolCommand::new("/nonexistent/pyreview-black");
    review.tools.radon = ToolCommand::new("/nonexistent/pyreview-radon");

    let state = Arc::new(AppState::new(ReviewPipeline::new(&review), server));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Submit an empty form and return the session cookie it hands out
async fn open_session(client: &reqwest::Client, base: &str) -> String {
    let response = client
        .post(format!("{base}/analyze"))
        .multipart(Form::new().text("code", ""))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("pyreview_session="));

    let body = response.text().await.unwrap();
    assert!(body.contains(EMPTY_INPUT_MESSAGE));
    assert!(body.contains("Results will be displayed here after analysis."));
    cookie
}

#[tokio::test]
async fn test_page_views_do_not_create_sessions() {
    let (base, state) = spawn_app_with(ServerConfig::default()).await;
    let client = client();

    for _ in 0..50 {
        let response = client.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    assert_eq!(state.sessions.active_sessions().await, 0);
}

#[tokio::test]
async fn test_cookieless_submissions_keep_registry_bounded() {
    let (base, state) = spawn_app_with(ServerConfig {
        max_sessions: 4,
        ..ServerConfig::default()
    })
    .await;
    let client = client();

    for _ in 0..40 {
        open_session(&client, &base).await;
    }

    assert_eq!(state.sessions.active_sessions().await, 4);
}

#[tokio::test]
async fn test_export_before_analysis_is_not_found() {
    let base = spawn_app().await;
    let client = client();
    let cookie = open_session(&client, &base).await;

    let response = client
        .get(format!("{base}/report.md"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(format!("{base}/api/report")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_then_export() {
    let base = spawn_app().await;
    let client = client();
    let cookie = open_session(&client, &base).await;

    let response = client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &cookie)
        .multipart(Form::new().text("code", "x = 1\n"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

    let response = client
        .get(format!("{base}/report.md"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/markdown"));
    assert_eq!(
        response.headers().get(CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"code_analysis_report.md\""
    );

    let markdown = response.text().await.unwrap();
    assert!(markdown.starts_with("# Code Analysis Report\n"));
    assert!(markdown.contains("Error running flake8:"));
    assert!(markdown.contains("Error running black:"));
    assert!(markdown.contains("Error running radon:"));
    assert!(markdown.contains("* **Total Lines of Code (LOC):** N/A"));

    let page = client
        .get(format!("{base}/"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Export Full Report (.md)"));
}

#[tokio::test]
async fn test_blank_input_keeps_previous_report() {
    let base = spawn_app().await;
    let client = client();
    let cookie = open_session(&client, &base).await;

    client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &cookie)
        .multipart(Form::new().text("code", "first = 1\n"))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &cookie)
        .multipart(Form::new().text("code", "  \n\t"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains(EMPTY_INPUT_MESSAGE));

    let report: serde_json::Value = client
        .get(format!("{base}/api/report"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["source"]["text"], "first = 1\n");
    assert_eq!(report["style"]["status"], "degraded");
}

#[tokio::test]
async fn test_upload_takes_precedence_over_paste() {
    let base = spawn_app().await;
    let client = client();
    let cookie = open_session(&client, &base).await;

    let form = Form::new().text("code", "pasted = 1\n").part(
        "file",
        Part::bytes(b"uploaded = 2\n".to_vec()).file_name("module.py"),
    );
    let response = client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &cookie)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let report: serde_json::Value = client
        .get(format!("{base}/api/report"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["source"]["text"], "uploaded = 2\n");
    assert_eq!(report["source"]["origin"], "module.py");
}

#[tokio::test]
async fn test_non_python_upload_rejected() {
    let base = spawn_app().await;
    let client = client();
    let cookie = open_session(&client, &base).await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"hello\n".to_vec()).file_name("notes.txt"),
    );
    let response = client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &cookie)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Please upload a Python file (.py)."));
}

#[tokio::test]
async fn test_sessions_do_not_share_reports() {
    let base = spawn_app().await;
    let client = client();
    let alice = open_session(&client, &base).await;
    let bob = open_session(&client, &base).await;
    assert_ne!(alice, bob);

    client
        .post(format!("{base}/analyze"))
        .header(COOKIE, &alice)
        .multipart(Form::new().text("code", "x = 1\n"))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{base}/report.md"))
        .header(COOKIE, &bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
