//! Template descriptors submitted alongside form data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;

/// Flat field-name to value mapping used by the form renderer.
pub type FormData = Map<String, Value>;

/// A named, optionally described set of expected input fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Document title. Kept optional so a missing name is reported by the
    /// renderer as a validation failure instead of a body parse error.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Lookup key into the form data.
    pub name: String,
    /// Display text; the field name is shown when absent.
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl TemplateDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// The document title, rejecting absent or blank names.
    pub fn title(&self) -> Result<&str, DomainError> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            Some(_) => Err(DomainError::validation("template name must not be blank")),
            None => Err(DomainError::validation("template name is required")),
        }
    }

    /// The description when present and non-empty.
    pub fn summary(&self) -> Option<&str> {
        self.description.as_deref().filter(|text| !text.is_empty())
    }
}
