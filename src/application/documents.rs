//! Document generation use cases: render blocks, materialize them and, for
//! previews, run the PDF converter against scratch files.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use metrics::{counter, histogram};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::render::{self, RenderContext};
use crate::config::Settings;
use crate::domain::{
    blocks::DocumentBlock,
    error::DomainError,
    labels::download_filename,
    template::{FormData, TemplateDescriptor},
};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const SOURCE: &str = "application::documents";

/// Turns a block sequence into a binary document image.
pub trait DocumentMaterializer: Send + Sync {
    fn materialize(&self, blocks: &[DocumentBlock]) -> Result<Vec<u8>, MaterializeError>;
}

/// Converts a document on disk into a PDF on disk.
pub trait PdfConverter: Send + Sync {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to package document: {0}")]
    Package(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to write converted document: {0}")]
    Io(#[from] io::Error),
    #[error("conversion failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Whether the failure was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, DocumentError::Domain(_))
    }
}

/// Which renderer produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Template fields filled from flat form data.
    Form,
    /// Arbitrary nested data flattened into paragraphs.
    Structured,
    /// Form document converted for preview.
    Preview,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Form => "form",
            DocumentKind::Structured => "structured",
            DocumentKind::Preview => "preview",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentSettings {
    /// Parent directory for per-request scratch directories.
    pub scratch_dir: PathBuf,
    /// When set, written documents must land inside this directory.
    pub output_root: Option<PathBuf>,
    pub max_depth: usize,
}

impl From<&Settings> for DocumentSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            scratch_dir: settings.documents.scratch_dir.clone(),
            output_root: settings.documents.output_root.clone(),
            max_depth: settings.render.max_depth.get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPreview {
    pub bytes: Vec<u8>,
}

impl PdfPreview {
    /// Byte-for-character text form of the PDF, suitable for a JSON string.
    pub fn to_latin1(&self) -> String {
        self.bytes.iter().map(|&byte| char::from(byte)).collect()
    }
}

pub struct DocumentService {
    materializer: Arc<dyn DocumentMaterializer>,
    converter: Arc<dyn PdfConverter>,
    settings: DocumentSettings,
}

impl DocumentService {
    pub fn new(
        materializer: Arc<dyn DocumentMaterializer>,
        converter: Arc<dyn PdfConverter>,
        settings: DocumentSettings,
    ) -> Self {
        Self {
            materializer,
            converter,
            settings,
        }
    }

    /// A render context stamped with the current local time.
    pub fn context(&self) -> RenderContext {
        RenderContext::now(self.settings.max_depth)
    }

    pub fn generate_form(
        &self,
        template: &TemplateDescriptor,
        data: &FormData,
        ctx: &RenderContext,
    ) -> Result<GeneratedDocument, DocumentError> {
        observe(DocumentKind::Form, ctx, || {
            self.form_document(template, data, ctx)
        })
    }

    pub fn generate_structured(
        &self,
        template: &TemplateDescriptor,
        data: &Value,
        ctx: &RenderContext,
    ) -> Result<GeneratedDocument, DocumentError> {
        observe(DocumentKind::Structured, ctx, || {
            let blocks = render::flatten(template, data, ctx)?;
            self.package(template, &blocks)
        })
    }

    /// Flatten `data` and write the document to `output_path`, creating parent
    /// directories as needed. Returns the path actually written.
    pub fn write_structured(
        &self,
        template: &TemplateDescriptor,
        data: &Value,
        output_path: &Path,
        ctx: &RenderContext,
    ) -> Result<PathBuf, DocumentError> {
        let target = self.resolve_output_path(output_path)?;
        let document = self.generate_structured(template, data, ctx)?;

        if let Some(parent) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| DocumentError::io("failed to create output directory", err))?;
        }
        fs::write(&target, &document.bytes)
            .map_err(|err| DocumentError::io("failed to write document", err))?;

        info!(
            target = SOURCE,
            op = "write_structured",
            request_id = ctx.request_id(),
            path = %target.display(),
            bytes = document.bytes.len(),
            "Document written"
        );
        Ok(target)
    }

    /// Render the form document, convert it through scratch files and return
    /// the converted bytes. Scratch files are removed whether or not the
    /// conversion succeeds.
    pub fn preview_pdf(
        &self,
        template: &TemplateDescriptor,
        data: &FormData,
        ctx: &RenderContext,
    ) -> Result<PdfPreview, DocumentError> {
        observe(DocumentKind::Preview, ctx, || {
            let document = self.form_document(template, data, ctx)?;

            fs::create_dir_all(&self.settings.scratch_dir)
                .map_err(|err| DocumentError::io("failed to prepare scratch directory", err))?;
            let scratch = tempfile::Builder::new()
                .prefix("docgen-preview-")
                .tempdir_in(&self.settings.scratch_dir)
                .map_err(|err| DocumentError::io("failed to create scratch directory", err))?;

            let result = self.convert_in(scratch.path(), &document.bytes);

            let scratch_path = scratch.path().to_path_buf();
            if let Err(err) = scratch.close() {
                warn!(
                    target = SOURCE,
                    op = "preview_pdf",
                    result = "cleanup_error",
                    path = %scratch_path.display(),
                    error = %err,
                    "Failed to remove preview scratch files"
                );
            }

            result.map(|bytes| PdfPreview { bytes })
        })
    }

    fn convert_in(&self, dir: &Path, docx: &[u8]) -> Result<Vec<u8>, DocumentError> {
        let input = dir.join("preview.docx");
        let output = dir.join("preview.pdf");

        fs::write(&input, docx)
            .map_err(|err| DocumentError::io("failed to write scratch document", err))?;
        self.converter.convert(&input, &output)?;
        fs::read(&output).map_err(|err| DocumentError::io("failed to read converted document", err))
    }

    fn form_document(
        &self,
        template: &TemplateDescriptor,
        data: &FormData,
        ctx: &RenderContext,
    ) -> Result<GeneratedDocument, DocumentError> {
        let blocks = render::render(template, data, ctx)?;
        self.package(template, &blocks)
    }

    fn package(
        &self,
        template: &TemplateDescriptor,
        blocks: &[DocumentBlock],
    ) -> Result<GeneratedDocument, DocumentError> {
        let bytes = self.materializer.materialize(blocks)?;
        Ok(GeneratedDocument {
            filename: download_filename(template.title()?, "docx"),
            bytes,
        })
    }

    fn resolve_output_path(&self, requested: &Path) -> Result<PathBuf, DomainError> {
        if requested.as_os_str().is_empty() {
            return Err(DomainError::validation("output path must not be empty"));
        }

        let Some(root) = self.settings.output_root.as_ref() else {
            return Ok(requested.to_path_buf());
        };

        if requested
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(DomainError::validation(
                "output path must not contain `..` segments",
            ));
        }

        if requested.is_absolute() {
            if requested.starts_with(root) {
                return Ok(requested.to_path_buf());
            }
            return Err(DomainError::validation(format!(
                "output path must be inside {}",
                root.display()
            )));
        }

        Ok(root.join(requested))
    }
}

fn observe<T>(
    kind: DocumentKind,
    ctx: &RenderContext,
    work: impl FnOnce() -> Result<T, DocumentError>,
) -> Result<T, DocumentError> {
    let started_at = Instant::now();
    let result = work();
    let elapsed_ms = started_at.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => {
            counter!("docgen_documents_generated_total", "kind" => kind.as_str()).increment(1);
            histogram!("docgen_render_ms", "kind" => kind.as_str()).record(elapsed_ms as f64);
        }
        Err(err) => {
            counter!("docgen_document_failures_total", "kind" => kind.as_str()).increment(1);
            warn!(
                target = SOURCE,
                op = kind.as_str(),
                result = "error",
                request_id = ctx.request_id(),
                elapsed_ms,
                validation = err.is_validation(),
                error = %err,
                "Document generation failed"
            );
        }
    }

    result
}
