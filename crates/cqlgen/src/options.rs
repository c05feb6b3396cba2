//! Translation options

use serde::{Deserialize, Serialize};

/// Library name used when the caller does not supply one
pub const DEFAULT_LIBRARY_NAME: &str = "Query";

/// A named value set bound to an OID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetDef {
    /// Name referenced by `in` operators
    pub name: String,
    /// Value-set OID emitted in the declaration
    pub oid: String,
}

impl ValueSetDef {
    /// Create a new value-set binding
    pub fn new(name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oid: oid.into(),
        }
    }
}

/// Caller-supplied configuration for one translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOptions {
    /// Library header name; defaults to [`DEFAULT_LIBRARY_NAME`]
    #[serde(default)]
    pub library_name: Option<String>,
    /// Resource types to pre-declare retrieval defines for, even when
    /// unreferenced by the tree
    #[serde(default)]
    pub resource_types: Vec<String>,
    /// Value-set bindings available to `in` operators
    #[serde(default)]
    pub value_sets: Vec<ValueSetDef>,
}

impl TranslationOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the library name
    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = Some(name.into());
        self
    }

    /// Pre-declare a retrieval define for a resource type
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_types.push(resource_type.into());
        self
    }

    /// Bind a value-set name to an OID
    pub fn with_value_set(mut self, name: impl Into<String>, oid: impl Into<String>) -> Self {
        self.value_sets.push(ValueSetDef::new(name, oid));
        self
    }

    /// The effective library name
    pub fn effective_library_name(&self) -> &str {
        self.library_name.as_deref().unwrap_or(DEFAULT_LIBRARY_NAME)
    }
}
