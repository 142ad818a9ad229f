use tracing::debug;

use super::{RenderContext, preamble, stringify, timestamp_block};
use crate::domain::{
    blocks::{DocumentBlock, Run},
    error::DomainError,
    template::{FormData, TemplateDescriptor},
};

/// Render a form-style document: one bold-label paragraph per template field,
/// in declared order.
///
/// Fields missing from `data` render with an empty value rather than failing.
pub fn render(
    template: &TemplateDescriptor,
    data: &FormData,
    ctx: &RenderContext,
) -> Result<Vec<DocumentBlock>, DomainError> {
    let mut blocks = preamble(template)?;
    blocks.reserve(template.fields.len() + 1);

    let mut missing = 0usize;
    for field in &template.fields {
        let value = match data.get(&field.name) {
            Some(value) => stringify(value),
            None => {
                missing += 1;
                String::new()
            }
        };
        blocks.push(DocumentBlock::paragraph(vec![
            Run::bold(format!("{}: ", field.display_label())),
            Run::plain(value),
        ]));
    }

    blocks.push(timestamp_block(ctx));

    debug!(
        target = "application::render::template",
        op = "render",
        request_id = ctx.request_id(),
        fields = template.fields.len(),
        missing_fields = missing,
        blocks = blocks.len(),
        "Rendered form template"
    );

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::application::render::test_support::{STAMP, dump, fixed_context};
    use crate::domain::template::FieldDescriptor;

    fn form(value: Value) -> FormData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn lease_template() -> TemplateDescriptor {
        TemplateDescriptor::new("Lease Agreement")
            .with_description("Standard residential lease")
            .with_field(FieldDescriptor::new("tenant", "Tenant"))
            .with_field(FieldDescriptor::new("rent", "Monthly rent"))
            .with_field(FieldDescriptor::new("furnished", "Furnished"))
    }

    #[test]
    fn renders_heading_description_fields_and_timestamp() {
        let data = form(json!({"tenant": "Ann", "rent": 950, "furnished": false}));
        let blocks = render(&lease_template(), &data, &fixed_context()).expect("renders");

        assert_eq!(blocks.len(), 1 + 1 + 3 + 1);
        assert_eq!(blocks[0], DocumentBlock::heading("Lease Agreement", 0));
        assert_eq!(
            blocks[2],
            DocumentBlock::paragraph(vec![Run::bold("Tenant: "), Run::plain("Ann")])
        );
        assert_eq!(blocks[3].text(), "Monthly rent: 950");
        assert_eq!(blocks[4].text(), "Furnished: false");
        assert_eq!(blocks[5].text(), STAMP);
    }

    #[test]
    fn block_count_without_description() {
        let mut template = lease_template();
        template.description = None;
        let data = form(json!({"tenant": "Ann", "rent": 950, "furnished": true}));

        let blocks = render(&template, &data, &fixed_context()).expect("renders");
        assert_eq!(blocks.len(), 1 + 3 + 1);
    }

    #[test]
    fn missing_fields_render_empty() {
        let data = form(json!({"rent": 700}));
        let blocks = render(&lease_template(), &data, &fixed_context()).expect("renders");

        assert_eq!(
            blocks[2],
            DocumentBlock::paragraph(vec![Run::bold("Tenant: "), Run::plain("")])
        );
        assert_eq!(blocks[4].text(), "Furnished: ");
    }

    #[test]
    fn field_order_follows_template_not_data() {
        let template = TemplateDescriptor::new("Order")
            .with_field(FieldDescriptor::new("b", "Second"))
            .with_field(FieldDescriptor::new("a", "First"));
        let data = form(json!({"a": 1, "b": 2, "unused": 3}));

        let blocks = render(&template, &data, &fixed_context()).expect("renders");
        insta::assert_snapshot!(dump(&blocks), @r#"
H0 "Order"
P [b "Second: "] [- "2"]
P [b "First: "] [- "1"]
P [- "Document generated on: 05/03/2024 14:07:09"]
"#);
    }

    #[test]
    fn missing_template_name_is_a_validation_error() {
        let template = TemplateDescriptor {
            name: None,
            ..lease_template()
        };
        let err = render(&template, &FormData::new(), &fixed_context()).expect_err("fails");
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
