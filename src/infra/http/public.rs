//! Informational routes: status, API descriptor, health and the frontend redirect.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};

use super::api::{
    ApiState,
    error::ApiError,
    models::{ApiInfoResponse, HealthResponse, StatusResponse},
    state::FEATURES,
};

const API_NAME: &str = "DocGen API";

pub fn build_public_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(frontend_redirect))
        .route("/status", get(status))
        .route("/api-info", get(api_info))
        .route("/health", get(health))
        .fallback(not_found)
}

async fn frontend_redirect(State(state): State<ApiState>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.info.frontend_url.clone())],
    )
        .into_response()
}

async fn status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
        version: state.info.version.clone(),
        environment: state.info.environment.clone(),
        features: FEATURES.iter().map(|feature| feature.to_string()).collect(),
    })
}

async fn api_info(State(state): State<ApiState>) -> Json<ApiInfoResponse> {
    let frontend_url = state.info.frontend_url.clone();
    Json(ApiInfoResponse {
        api: API_NAME.to_string(),
        status: "active".to_string(),
        version: state.info.version.clone(),
        message: format!("This is the API endpoint. For the web application, go to {frontend_url}"),
        frontend_url,
    })
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        environment: state.info.environment.clone(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::new(
        "infra::http::public::not_found",
        StatusCode::NOT_FOUND,
        format!("No route for {}", uri.path()),
    )
}
