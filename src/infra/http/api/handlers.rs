//! Document generation handlers.

use std::path::PathBuf;

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::application::documents::{
    DOCX_CONTENT_TYPE, DocumentError, DocumentKind, GeneratedDocument,
};
use crate::application::render::RenderContext;
use crate::domain::template::{FormData, TemplateDescriptor};
use crate::infra::http::middleware::{DocumentTrace, RequestContext};

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

const SOURCE: &str = "infra::http::api::handlers";

pub async fn generate_document(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Response {
    let template = template_name(
        payload
            .as_ref()
            .ok()
            .and_then(|Json(body)| body.template.as_ref()),
    );
    let result = form_download(state, request, payload).await;
    traced(DocumentKind::Form, template, result)
}

pub async fn generate_json_document(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    payload: Result<Json<GenerateJsonDocumentRequest>, JsonRejection>,
) -> Response {
    let template = template_name(
        payload
            .as_ref()
            .ok()
            .and_then(|Json(body)| body.template.as_ref()),
    );
    let result = write_json_document(state, request, payload).await;
    traced(DocumentKind::Structured, template, result)
}

pub async fn generate_pdf_preview(
    State(state): State<ApiState>,
    Extension(request): Extension<RequestContext>,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Response {
    let template = template_name(
        payload
            .as_ref()
            .ok()
            .and_then(|Json(body)| body.template.as_ref()),
    );
    let result = pdf_preview(state, request, payload).await;
    traced(DocumentKind::Preview, template, result)
}

async fn form_download(
    state: ApiState,
    request: RequestContext,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let (template, data) = form_request(payload)?;
    let ctx = render_context(&state, &request);

    let documents = state.documents.clone();
    let document =
        run_blocking(move || documents.generate_form(&template, &data, &ctx)).await?;

    Ok(download_response(document))
}

async fn write_json_document(
    state: ApiState,
    request: RequestContext,
    payload: Result<Json<GenerateJsonDocumentRequest>, JsonRejection>,
) -> Result<Json<WrittenDocumentResponse>, ApiError> {
    let Json(payload) = payload?;
    let GenerateJsonDocumentRequest {
        template: Some(template),
        data: Some(data),
        output_path: Some(output_path),
    } = payload
    else {
        return Err(ApiError::missing_parameters(SOURCE));
    };
    if output_path.trim().is_empty() {
        return Err(ApiError::missing_parameters(SOURCE));
    }
    let ctx = render_context(&state, &request);

    let documents = state.documents.clone();
    let requested = PathBuf::from(output_path);
    let written = run_blocking(move || {
        documents.write_structured(&template, &data, &requested, &ctx)
    })
    .await?;

    Ok(Json(WrittenDocumentResponse {
        success: true,
        path: written.display().to_string(),
    }))
}

async fn pdf_preview(
    state: ApiState,
    request: RequestContext,
    payload: Result<Json<GenerateDocumentRequest>, JsonRejection>,
) -> Result<Json<PdfPreviewResponse>, ApiError> {
    let Json(payload) = payload?;
    let (template, data) = form_request(payload)?;
    let ctx = render_context(&state, &request);

    let documents = state.documents.clone();
    let preview = run_blocking(move || documents.preview_pdf(&template, &data, &ctx)).await?;

    Ok(Json(PdfPreviewResponse {
        success: true,
        pdf: preview.to_latin1(),
    }))
}

fn template_name(template: Option<&TemplateDescriptor>) -> Option<String> {
    template.and_then(|template| template.name.clone())
}

/// Render the outcome and tag it with the document it concerned for the access log.
fn traced<T: IntoResponse>(
    kind: DocumentKind,
    template: Option<String>,
    result: Result<T, ApiError>,
) -> Response {
    let mut response = result.into_response();
    DocumentTrace { kind, template }.attach(&mut response);
    response
}

/// Split a form request into its template and field values.
///
/// Both members must be present and non-null, and `data` must be an object.
/// An empty object is accepted: every field then renders with an empty value.
fn form_request(
    payload: GenerateDocumentRequest,
) -> Result<(TemplateDescriptor, FormData), ApiError> {
    let GenerateDocumentRequest {
        template: Some(template),
        data: Some(data),
    } = payload
    else {
        return Err(ApiError::missing_parameters(SOURCE));
    };

    match data {
        Value::Object(fields) => Ok((template, fields)),
        _ => Err(ApiError::bad_request(
            SOURCE,
            "data must be a JSON object of field values",
        )),
    }
}

fn render_context(state: &ApiState, request: &RequestContext) -> RenderContext {
    state
        .documents
        .context()
        .with_request_id(request.request_id.clone())
}

/// Run a synchronous document job on the blocking pool.
async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DocumentError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| ApiError::internal(SOURCE, format!("document task failed: {err}")))?
        .map_err(ApiError::from)
}

fn download_response(document: GeneratedDocument) -> Response {
    let GeneratedDocument { filename, bytes } = document;
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(DOCX_CONTENT_TYPE),
    );

    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }

    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}
