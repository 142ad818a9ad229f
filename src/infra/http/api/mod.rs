pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::{ApiState, ServiceInfo};

use axum::{Router, routing::post};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route("/generate-document", post(handlers::generate_document))
        .route(
            "/generate-json-document",
            post(handlers::generate_json_document),
        )
        .route(
            "/generate-pdf-preview",
            post(handlers::generate_pdf_preview),
        )
}
