//! Placeholder PDF conversion.
//!
//! No real conversion happens: the output file always holds the same fixed
//! text, whatever the input document contains.

use std::{fs, path::Path};

use tracing::debug;

use crate::application::documents::{ConvertError, PdfConverter};

pub const PLACEHOLDER_PDF: &str = "This is a simulated PDF file for demo purposes.";

#[derive(Debug, Clone, Default)]
pub struct PlaceholderPdfConverter;

impl PdfConverter for PlaceholderPdfConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        debug!(
            target = "infra::pdf",
            op = "convert",
            input = %input.display(),
            output = %output.display(),
            "Writing placeholder PDF"
        );
        fs::write(output, PLACEHOLDER_PDF)?;
        Ok(())
    }
}
