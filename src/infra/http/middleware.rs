//! Request ids and the document access log.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::{documents::DocumentKind, error::ErrorReport};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_CLIENT_REQUEST_ID_LEN: usize = 128;
const LOG_TARGET: &str = "docgen::http::access";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// What a document handler worked on, attached to its response whether or
/// not generation succeeded.
#[derive(Debug, Clone)]
pub struct DocumentTrace {
    pub kind: DocumentKind,
    pub template: Option<String>,
}

impl DocumentTrace {
    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Reuse a caller-supplied `x-request-id` when it is short printable text,
/// otherwise mint one, and echo it on the response.
pub async fn assign_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_CLIENT_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log every document request and every failed request, and count responses
/// by status class.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let started_at = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis() as u64;

    let class = match status.as_u16() {
        500.. => "5xx",
        400.. => "4xx",
        300.. => "3xx",
        _ => "2xx",
    };
    counter!("docgen_http_responses_total", "status" => class).increment(1);

    let trace = response.extensions_mut().remove::<DocumentTrace>();
    let report = response.extensions_mut().remove::<ErrorReport>();
    let kind = trace.as_ref().map_or("-", |trace| trace.kind.as_str());
    let template = trace
        .as_ref()
        .and_then(|trace| trace.template.clone())
        .unwrap_or_default();

    let Some(report) = report.filter(|_| status.is_client_error() || status.is_server_error())
    else {
        if trace.is_some() {
            let bytes = response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            info!(
                target: LOG_TARGET,
                status = status.as_u16(),
                %method,
                %path,
                kind,
                %template,
                bytes,
                elapsed_ms,
                %request_id,
                "document served"
            );
        } else if status.is_client_error() || status.is_server_error() {
            warn!(
                target: LOG_TARGET,
                status = status.as_u16(),
                %method,
                %path,
                elapsed_ms,
                %request_id,
                "request failed without diagnostics"
            );
        }
        return response;
    };

    let detail = report.messages.first().cloned().unwrap_or_default();
    if status.is_server_error() {
        error!(
            target: LOG_TARGET,
            status = status.as_u16(),
            %method,
            %path,
            kind,
            %template,
            source = report.source,
            %detail,
            chain = ?report.messages,
            elapsed_ms,
            %request_id,
            "document request failed"
        );
    } else {
        warn!(
            target: LOG_TARGET,
            status = status.as_u16(),
            %method,
            %path,
            kind,
            %template,
            source = report.source,
            %detail,
            elapsed_ms,
            %request_id,
            "request rejected"
        );
    }

    response
}
