pub mod api;
mod middleware;
mod public;

pub use api::{ApiState, ServiceInfo};
pub use middleware::{DocumentTrace, REQUEST_ID_HEADER, RequestContext};

use axum::{Router, middleware as axum_middleware};
use tower_http::cors::CorsLayer;

use middleware::{assign_request_id, log_requests};

/// Assemble every route with request ids, the access log and permissive CORS.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(api::build_api_router())
        .merge(public::build_public_router())
        .with_state(state)
        .layer(axum_middleware::from_fn(log_requests))
        .layer(axum_middleware::from_fn(assign_request_id))
        .layer(CorsLayer::permissive())
}
