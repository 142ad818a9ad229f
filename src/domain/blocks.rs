//! Format-independent document content produced by the renderers and consumed
//! by a [`DocumentMaterializer`](crate::application::documents::DocumentMaterializer).

use serde::Serialize;

/// A contiguous span of text sharing one emphasis style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentBlock {
    Heading { text: String, level: u8 },
    Paragraph { runs: Vec<Run> },
}

impl DocumentBlock {
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(runs: Vec<Run>) -> Self {
        Self::Paragraph { runs }
    }

    /// Concatenated text of the block, the way a reader of the final document sees it.
    pub fn text(&self) -> String {
        match self {
            DocumentBlock::Heading { text, .. } => text.clone(),
            DocumentBlock::Paragraph { runs } => runs.iter().map(|run| run.text.as_str()).collect(),
        }
    }
}
