//! `.docx` materialization backed by `docx-rs`.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run as DocxRun, Style, StyleType};

use crate::application::documents::{DocumentMaterializer, MaterializeError};
use crate::domain::blocks::{DocumentBlock, Run};

const TITLE_STYLE: &str = "Title";
const MAX_HEADING_LEVEL: u8 = 9;

/// Writes headings with Word's built-in `Title`/`HeadingN` styles and
/// paragraphs as sequences of emphasised runs.
#[derive(Debug, Clone, Default)]
pub struct DocxMaterializer;

impl DocxMaterializer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentMaterializer for DocxMaterializer {
    fn materialize(&self, blocks: &[DocumentBlock]) -> Result<Vec<u8>, MaterializeError> {
        let mut docx = with_heading_styles(Docx::new());

        for block in blocks {
            let paragraph = match block {
                DocumentBlock::Heading { text, level } => Paragraph::new()
                    .style(&heading_style_id(*level))
                    .add_run(DocxRun::new().add_text(text.as_str())),
                DocumentBlock::Paragraph { runs } => runs
                    .iter()
                    .fold(Paragraph::new(), |paragraph, run| paragraph.add_run(docx_run(run))),
            };
            docx = docx.add_paragraph(paragraph);
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|err| MaterializeError::Package(err.to_string()))?;
        Ok(buffer.into_inner())
    }
}

fn heading_style_id(level: u8) -> String {
    match level {
        0 => TITLE_STYLE.to_string(),
        level => format!("Heading{}", level.min(MAX_HEADING_LEVEL)),
    }
}

fn with_heading_styles(docx: Docx) -> Docx {
    let title = Style::new(TITLE_STYLE, StyleType::Paragraph)
        .name(TITLE_STYLE)
        .size(56);
    (1..=MAX_HEADING_LEVEL).fold(docx.add_style(title), |docx, level| {
        let size = 36usize.saturating_sub(usize::from(level) * 2).max(22);
        docx.add_style(
            Style::new(&heading_style_id(level), StyleType::Paragraph)
                .name(&format!("Heading {level}"))
                .size(size)
                .bold(),
        )
    })
}

/// Tab characters become Word tab elements so indentation survives editing.
fn docx_run(run: &Run) -> DocxRun {
    let mut docx_run = DocxRun::new();
    for (index, segment) in run.text.split('\t').enumerate() {
        if index > 0 {
            docx_run = docx_run.add_tab();
        }
        if !segment.is_empty() {
            docx_run = docx_run.add_text(segment);
        }
    }
    if run.bold {
        docx_run = docx_run.bold();
    }
    if run.italic {
        docx_run = docx_run.italic();
    }
    docx_run
}
