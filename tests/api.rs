use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use docgen::application::documents::{DOCX_CONTENT_TYPE, DocumentService, DocumentSettings};
use docgen::application::render::DEFAULT_MAX_DEPTH;
use docgen::infra::docx::DocxMaterializer;
use docgen::infra::http::{self, ApiState, REQUEST_ID_HEADER, ServiceInfo};
use docgen::infra::pdf::{PLACEHOLDER_PDF, PlaceholderPdfConverter};

const FRONTEND: &str = "https://forms.example.com";

struct Harness {
    router: Router,
    scratch: TempDir,
    output: TempDir,
}

fn harness() -> Harness {
    harness_with(|_| {})
}

fn harness_with(adjust: impl FnOnce(&mut DocumentSettings)) -> Harness {
    let scratch = TempDir::new().expect("scratch dir");
    let output = TempDir::new().expect("output dir");
    let mut settings = DocumentSettings {
        scratch_dir: scratch.path().to_path_buf(),
        output_root: Some(output.path().to_path_buf()),
        max_depth: DEFAULT_MAX_DEPTH,
    };
    adjust(&mut settings);

    let documents = DocumentService::new(
        Arc::new(DocxMaterializer::new()),
        Arc::new(PlaceholderPdfConverter),
        settings,
    );
    let state = ApiState {
        documents: Arc::new(documents),
        info: Arc::new(ServiceInfo::new("test", FRONTEND)),
    };

    Harness {
        router: http::build_router(state),
        scratch,
        output,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

fn contact_form() -> Value {
    json!({
        "template": {
            "name": "Contact Form",
            "description": "Reach out",
            "fields": [
                {"name": "full_name", "label": "Full name"},
                {"name": "email", "label": "Email"}
            ]
        },
        "data": {"full_name": "Ann Example", "email": "ann@example.com"}
    })
}

fn scratch_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .expect("scratch dir readable")
        .next()
        .is_none()
}

#[tokio::test]
async fn generate_document_returns_a_docx_download() {
    let harness = harness();
    let response = send(
        &harness.router,
        Method::POST,
        "/generate-document",
        Some(contact_form()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(
        headers.get(header::CONTENT_TYPE).expect("content type"),
        DOCX_CONTENT_TYPE
    );
    assert_eq!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .expect("content disposition"),
        "attachment; filename=\"Contact_Form.docx\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"PK"), "docx is a zip archive");
    assert_eq!(
        headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok()),
        Some(bytes.len())
    );
}

#[tokio::test]
async fn missing_members_are_rejected() {
    let harness = harness();
    let bodies = [
        json!({"data": {}}),
        json!({"template": {"name": "T", "fields": []}}),
        json!({"template": null, "data": {}}),
    ];

    for body in bodies {
        let response = send(&harness.router, Method::POST, "/generate-document", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Missing required parameters"})
        );
    }
}

#[tokio::test]
async fn template_without_name_is_a_client_error() {
    let harness = harness();
    let body = json!({"template": {"fields": []}, "data": {}});

    let response = send(&harness.router, Method::POST, "/generate-document", Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("template name"), "got {message}");
}

#[tokio::test]
async fn non_object_form_data_is_rejected() {
    let harness = harness();
    let body = json!({"template": {"name": "T", "fields": []}, "data": [1, 2]});

    let response = send(&harness.router, Method::POST, "/generate-document", Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn malformed_json_uses_the_error_shape() {
    let harness = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/generate-document")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");

    let response = harness
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.starts_with("Invalid request body"), "got {message}");
}

#[tokio::test]
async fn json_document_is_written_under_the_output_root() {
    let harness = harness();
    let mut body = json!({
        "template": {"name": "Survey", "fields": []},
        "data": {"answers": [{"q": "Why?", "a": "Because"}]},
        "outputPath": "nested/survey.docx"
    });

    let response = send(
        &harness.router,
        Method::POST,
        "/generate-json-document",
        Some(body.clone()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let reply = body_json(response).await;
    assert_eq!(reply["success"], json!(true));

    let expected = harness.output.path().join("nested/survey.docx");
    assert_eq!(reply["path"], json!(expected.display().to_string()));
    let written = std::fs::read(&expected).expect("document written");
    assert!(written.starts_with(b"PK"));

    body["outputPath"] = json!("../escape.docx");
    let response = send(
        &harness.router,
        Method::POST,
        "/generate-json-document",
        Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn json_document_requires_an_output_path() {
    let harness = harness();
    let body = json!({"template": {"name": "Survey", "fields": []}, "data": {}});

    let response = send(
        &harness.router,
        Method::POST,
        "/generate-json-document",
        Some(body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Missing required parameters"})
    );
}

#[tokio::test]
async fn overly_deep_data_is_rejected() {
    let harness = harness_with(|settings| settings.max_depth = 2);
    let body = json!({
        "template": {"name": "Deep", "fields": []},
        "data": {"a": {"b": {"c": {"d": 1}}}},
        "outputPath": "deep.docx"
    });

    let response = send(
        &harness.router,
        Method::POST,
        "/generate-json-document",
        Some(body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!harness.output.path().join("deep.docx").exists());
}

#[tokio::test]
async fn pdf_preview_returns_placeholder_and_cleans_scratch() {
    let harness = harness();
    let response = send(
        &harness.router,
        Method::POST,
        "/generate-pdf-preview",
        Some(contact_form()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "pdf": PLACEHOLDER_PDF})
    );
    assert!(scratch_is_empty(harness.scratch.path()));
}

#[tokio::test]
async fn status_reports_features() {
    let harness = harness();
    let response = send(&harness.router, Method::GET, "/status", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": "test",
            "features": ["word_generation", "pdf_preview"]
        })
    );
}

#[tokio::test]
async fn api_info_points_at_the_frontend() {
    let harness = harness();
    let response = send(&harness.router, Method::GET, "/api-info", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["api"], json!("DocGen API"));
    assert_eq!(body["status"], json!("active"));
    assert_eq!(body["frontend_url"], json!(FRONTEND));
    assert_eq!(
        body["message"],
        json!(format!(
            "This is the API endpoint. For the web application, go to {FRONTEND}"
        ))
    );
}

#[tokio::test]
async fn health_and_root_redirect() {
    let harness = harness();

    let response = send(&harness.router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "environment": "test"})
    );

    let response = send(&harness.router, Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        FRONTEND
    );
}

#[tokio::test]
async fn unknown_routes_answer_with_json_404() {
    let harness = harness();
    let response = send(&harness.router, Method::GET, "/nope", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let harness = harness();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/status")
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .expect("request should build");

    let response = harness
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("cors header"),
        "*"
    );
}

#[tokio::test]
async fn download_name_survives_control_characters() {
    let harness = harness();
    let body = json!({
        "template": {"name": "Report\nQ1", "fields": []},
        "data": {}
    });

    let response = send(&harness.router, Method::POST, "/generate-document", Some(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .expect("content disposition"),
        "attachment; filename=\"Report_Q1.docx\""
    );
}

#[tokio::test]
async fn request_ids_are_echoed_or_minted() {
    let harness = harness();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(REQUEST_ID_HEADER, "trace-abc-123")
        .body(Body::empty())
        .expect("request should build");
    let response = harness
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).expect("request id"),
        "trace-abc-123"
    );

    let response = send(&harness.router, Method::POST, "/generate-document", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let minted = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .expect("minted request id");
    assert_eq!(minted.len(), 36, "uuid request id, got {minted}");
}

#[tokio::test]
async fn empty_form_data_renders_blank_fields() {
    let harness = harness();
    let body = json!({
        "template": {"name": "Blank", "fields": [{"name": "who"}]},
        "data": {}
    });

    let response = send(&harness.router, Method::POST, "/generate-document", Some(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.starts_with(b"PK"));
}
