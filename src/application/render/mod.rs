//! Turn templates and submitted data into format-independent document blocks.
//!
//! Both renderers are pure: they read their inputs and a [`RenderContext`] and
//! return the block sequence. Materializing the blocks into a file happens in
//! [`crate::application::documents`].

mod flatten;
mod template;

pub use flatten::flatten;
pub use template::render;

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::domain::{
    blocks::{DocumentBlock, Run},
    error::DomainError,
    template::TemplateDescriptor,
};

/// Default bound on how deeply nested structured data may be.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const TIMESTAMP_PREFIX: &str = "Document generated on: ";

/// Per-call inputs for a render, passed explicitly instead of read from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Local wall-clock time stamped at the end of the document.
    pub generated_at: NaiveDateTime,
    /// Deepest nesting level the flattener will descend into.
    pub max_depth: usize,
    /// Correlates render diagnostics with the HTTP request that triggered them.
    pub request_id: Option<String>,
}

impl RenderContext {
    pub fn at(generated_at: NaiveDateTime, max_depth: usize) -> Self {
        Self {
            generated_at,
            max_depth,
            request_id: None,
        }
    }

    pub fn now(max_depth: usize) -> Self {
        Self::at(Local::now().naive_local(), max_depth)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub(crate) fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("")
    }
}

/// Display form of a data value inside a paragraph.
///
/// Strings are shown verbatim and null as nothing; every other value uses its
/// compact JSON text, so booleans read `true`/`false` and a missing value
/// leaves the paragraph blank rather than printing a placeholder word.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Title heading plus the description paragraph, when there is one.
fn preamble(template: &TemplateDescriptor) -> Result<Vec<DocumentBlock>, DomainError> {
    let mut blocks = vec![DocumentBlock::heading(template.title()?, 0)];
    if let Some(description) = template.summary() {
        blocks.push(DocumentBlock::paragraph(vec![Run::plain(description)]));
    }
    Ok(blocks)
}

fn timestamp_block(ctx: &RenderContext) -> DocumentBlock {
    DocumentBlock::paragraph(vec![Run::plain(format!(
        "{TIMESTAMP_PREFIX}{}",
        ctx.generated_at.format(TIMESTAMP_FORMAT)
    ))])
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::test_support::{STAMP, fixed_context};
    use super::*;

    #[test]
    fn stringify_matches_display_rules() {
        assert_eq!(stringify(&json!("Ann")), "Ann");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn timestamp_uses_day_first_format() {
        let block = timestamp_block(&fixed_context());
        assert_eq!(block.text(), STAMP);
    }

    #[test]
    fn preamble_rejects_missing_name() {
        let err = preamble(&TemplateDescriptor::default()).expect_err("missing name");
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
