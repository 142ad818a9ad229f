//! Request and response bodies of the document API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::template::TemplateDescriptor;

/// Body of `POST /generate-document` and `POST /generate-pdf-preview`.
///
/// Every member is optional so that absent members are answered with the
/// API's own error message instead of a deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateDocumentRequest {
    #[serde(default)]
    pub template: Option<TemplateDescriptor>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Body of `POST /generate-json-document`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateJsonDocumentRequest {
    #[serde(default)]
    pub template: Option<TemplateDescriptor>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenDocumentResponse {
    pub success: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPreviewResponse {
    pub success: bool,
    pub pdf: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfoResponse {
    pub api: String,
    pub status: String,
    pub version: String,
    pub message: String,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
}
