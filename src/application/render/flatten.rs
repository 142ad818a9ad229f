use serde_json::{Map, Value};
use tracing::debug;

use super::{RenderContext, preamble, stringify, timestamp_block};
use crate::domain::{
    blocks::{DocumentBlock, Run},
    error::DomainError,
    labels::format_key,
    template::TemplateDescriptor,
};

const INDENT_UNIT: &str = "  ";

/// Render arbitrary structured data as labeled, indented paragraphs.
///
/// Object keys become bold labels, arrays become numbered items, and nesting
/// is shown by indenting two spaces per level. A scalar passed as the whole
/// document becomes a single plain paragraph.
pub fn flatten(
    template: &TemplateDescriptor,
    data: &Value,
    ctx: &RenderContext,
) -> Result<Vec<DocumentBlock>, DomainError> {
    let mut flattener = Flattener {
        blocks: preamble(template)?,
        max_depth: ctx.max_depth,
        deepest: 0,
    };

    match data {
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            flattener.push(vec![Run::plain(stringify(data))]);
        }
        _ => flattener.value(data, 0)?,
    }

    let Flattener {
        mut blocks,
        deepest,
        ..
    } = flattener;
    blocks.push(timestamp_block(ctx));

    debug!(
        target = "application::render::flatten",
        op = "flatten",
        request_id = ctx.request_id(),
        depth = deepest,
        blocks = blocks.len(),
        "Flattened structured data"
    );

    Ok(blocks)
}

struct Flattener {
    blocks: Vec<DocumentBlock>,
    max_depth: usize,
    deepest: usize,
}

impl Flattener {
    fn push(&mut self, runs: Vec<Run>) {
        self.blocks.push(DocumentBlock::paragraph(runs));
    }

    fn value(&mut self, value: &Value, depth: usize) -> Result<(), DomainError> {
        if depth > self.max_depth {
            return Err(DomainError::depth_exceeded(self.max_depth));
        }
        self.deepest = self.deepest.max(depth);

        match value {
            Value::Object(entries) => self.object(entries, depth),
            Value::Array(items) => self.array(items, depth),
            // Scalars below the top level are written by their container.
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
        }
    }

    fn object(&mut self, entries: &Map<String, Value>, depth: usize) -> Result<(), DomainError> {
        let indent = INDENT_UNIT.repeat(depth);

        for (key, value) in entries {
            let label = format_key(key);
            match value {
                Value::Object(_) => {
                    self.push(vec![Run::bold(format!("{indent}{label}:"))]);
                    self.value(value, depth + 1)?;
                }
                Value::Array(items) => {
                    self.push(vec![Run::bold(format!("{indent}{label}:"))]);
                    for (index, item) in items.iter().enumerate() {
                        let number = index + 1;
                        if item.is_object() {
                            self.push(vec![Run::italic(format!("{indent}\tItem {number}:"))]);
                            self.value(item, depth + 2)?;
                        } else {
                            self.push(vec![
                                Run::italic(format!("{indent}\tItem {number}: ")),
                                Run::plain(stringify(item)),
                            ]);
                        }
                    }
                }
                _ => self.push(vec![
                    Run::bold(format!("{indent}{label}: ")),
                    Run::plain(stringify(value)),
                ]),
            }
        }

        Ok(())
    }

    fn array(&mut self, items: &[Value], depth: usize) -> Result<(), DomainError> {
        let indent = INDENT_UNIT.repeat(depth);

        for (index, item) in items.iter().enumerate() {
            let mut runs = vec![Run::bold(format!("{indent}Item {}:", index + 1))];
            match item {
                Value::Object(_) | Value::Array(_) => {
                    self.push(runs);
                    self.value(item, depth + 1)?;
                }
                _ => {
                    // Scalars share the item paragraph instead of opening a new one.
                    runs.push(Run::plain(format!(" {}", stringify(item))));
                    self.push(runs);
                }
            }
        }

        Ok(())
    }
}
