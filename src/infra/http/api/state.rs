use std::sync::Arc;

use crate::application::documents::DocumentService;

pub const FEATURES: [&str; 2] = ["word_generation", "pdf_preview"];

/// Static facts about the running service reported by the informational routes.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub version: String,
    pub environment: String,
    pub frontend_url: String,
}

impl ServiceInfo {
    pub fn new(environment: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.into(),
            frontend_url: frontend_url.into(),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub documents: Arc<DocumentService>,
    pub info: Arc<ServiceInfo>,
}
