//! Field definition types

use serde::{Deserialize, Serialize};

/// CQL-relevant data type of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// Plain string, single-quoted in CQL
    #[default]
    String,
    /// Terminology code, rendered like a string
    Code,
    /// Bare `true`/`false` literal
    Boolean,
    /// `@YYYY-MM-DD` literal
    Date,
    /// `@YYYY-MM-DDThh:mm:ss` literal
    DateTime,
    /// Numeric value with optional UCUM unit
    Quantity,
    /// Resource reference, rendered as a quoted string
    Reference,
}

/// UI editor kind the query builder renders for a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEditor {
    /// Free text input
    #[default]
    Text,
    /// Dropdown selection
    Select,
    /// Checkbox
    Checkbox,
    /// Date picker
    Date,
}

/// Metadata for a single queryable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Owning FHIR resource type
    pub resource_type: String,
    /// Field name as the query builder refers to it
    pub name: String,
    /// FHIR path emitted into CQL expressions
    pub fhir_path: String,
    /// Data type driving literal rendering
    pub data_type: DataType,
    /// UI editor kind
    #[serde(rename = "valueEditorType")]
    pub value_editor: ValueEditor,
    /// HTML input type hint for the text editor
    pub input_type: String,
}

impl FieldDefinition {
    /// Create a field definition with the given path and type
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        fhir_path: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        let value_editor = match data_type {
            DataType::Boolean => ValueEditor::Checkbox,
            DataType::Date | DataType::DateTime => ValueEditor::Date,
            DataType::Code => ValueEditor::Select,
            _ => ValueEditor::Text,
        };
        let input_type = match data_type {
            DataType::Quantity => "number",
            DataType::Date => "date",
            DataType::DateTime => "datetime-local",
            _ => "text",
        };
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            fhir_path: fhir_path.into(),
            data_type,
            value_editor,
            input_type: input_type.to_string(),
        }
    }

    /// Override the UI editor kind
    pub fn with_editor(mut self, editor: ValueEditor) -> Self {
        self.value_editor = editor;
        self
    }
}
