//! Field metadata registry

use crate::field::{DataType, FieldDefinition};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use thiserror::Error;

/// Errors raised while building a registry from external schema data
#[derive(Debug, Error)]
pub enum ModelError {
    /// Schema data could not be parsed
    #[error("schema parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two definitions share the same (resource type, field name) key
    #[error("duplicate field definition for {resource_type}.{name}")]
    DuplicateField { resource_type: String, name: String },
}

/// Immutable lookup table from (resource type, field name) to metadata
///
/// Resource and field iteration order is insertion order, matching the order
/// the query builder presents fields in.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    resources: IndexMap<String, Vec<FieldDefinition>>,
}

impl FieldRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default FHIR R4 registry
    pub fn global() -> &'static FieldRegistry {
        static GLOBAL: Lazy<FieldRegistry> = Lazy::new(FieldRegistry::fhir);
        &GLOBAL
    }

    /// Build a registry from a JSON array of field definitions
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let fields: Vec<FieldDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for field in fields {
            if registry.field(&field.resource_type, &field.name).is_some() {
                return Err(ModelError::DuplicateField {
                    resource_type: field.resource_type,
                    name: field.name,
                });
            }
            registry = registry.with_field(field);
        }
        Ok(registry)
    }

    /// Add a field definition, builder style
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.resources
            .entry(field.resource_type.clone())
            .or_default()
            .push(field);
        self
    }

    /// Look up a field definition by resource type and field name
    pub fn field(&self, resource_type: &str, name: &str) -> Option<&FieldDefinition> {
        self.resources
            .get(resource_type)?
            .iter()
            .find(|f| f.name == name)
    }

    /// All fields of a resource type in registration order; empty for
    /// unknown resource types
    pub fn fields_for(&self, resource_type: &str) -> &[FieldDefinition] {
        self.resources
            .get(resource_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registered resource types in registration order
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Resolve the FHIR path for a field.
    ///
    /// Unknown fields synthesize `"<resourceType>.<fieldName>"` so
    /// translation degrades to best-effort output instead of blocking.
    pub fn fhir_path(&self, resource_type: &str, name: &str) -> String {
        match self.field(resource_type, name) {
            Some(field) => field.fhir_path.clone(),
            None => format!("{resource_type}.{name}"),
        }
    }

    /// The built-in FHIR R4 field table
    pub fn fhir() -> Self {
        use DataType::{Boolean, Code, Date, DateTime, Quantity, Reference, String as Str};

        let fields: &[(&str, &str, &str, DataType)] = &[
            ("Patient", "gender", "Patient.gender", Code),
            ("Patient", "birthDate", "Patient.birthDate", Date),
            ("Patient", "active", "Patient.active", Boolean),
            ("Patient", "deceasedBoolean", "Patient.deceased", Boolean),
            ("Patient", "maritalStatus", "Patient.maritalStatus", Code),
            ("Patient", "name", "Patient.name.family", Str),
            ("Patient", "address", "Patient.address.city", Str),
            ("Patient", "language", "Patient.communication.language", Code),
            ("Patient", "generalPractitioner", "Patient.generalPractitioner", Reference),
            ("Condition", "code", "Condition.code", Code),
            ("Condition", "clinicalStatus", "Condition.clinicalStatus", Code),
            ("Condition", "verificationStatus", "Condition.verificationStatus", Code),
            ("Condition", "severity", "Condition.severity", Code),
            ("Condition", "onsetDateTime", "Condition.onset", DateTime),
            ("Condition", "abatementDateTime", "Condition.abatement", DateTime),
            ("Condition", "recordedDate", "Condition.recordedDate", DateTime),
            ("Observation", "code", "Observation.code", Code),
            ("Observation", "status", "Observation.status", Code),
            ("Observation", "category", "Observation.category", Code),
            ("Observation", "valueQuantity", "Observation.value", Quantity),
            ("Observation", "valueString", "Observation.value", Str),
            ("Observation", "effectiveDateTime", "Observation.effective", DateTime),
            ("Observation", "issued", "Observation.issued", DateTime),
            ("MedicationRequest", "medication", "MedicationRequest.medication", Code),
            ("MedicationRequest", "status", "MedicationRequest.status", Code),
            ("MedicationRequest", "intent", "MedicationRequest.intent", Code),
            ("MedicationRequest", "authoredOn", "MedicationRequest.authoredOn", DateTime),
            ("Encounter", "status", "Encounter.status", Code),
            ("Encounter", "class", "Encounter.class", Code),
            ("Encounter", "type", "Encounter.type", Code),
            ("Encounter", "serviceType", "Encounter.serviceType", Code),
            ("Encounter", "periodStart", "Encounter.period.start", DateTime),
            ("Encounter", "periodEnd", "Encounter.period.end", DateTime),
            ("Procedure", "code", "Procedure.code", Code),
            ("Procedure", "status", "Procedure.status", Code),
            ("Procedure", "performedDateTime", "Procedure.performed", DateTime),
            ("Immunization", "vaccineCode", "Immunization.vaccineCode", Code),
            ("Immunization", "status", "Immunization.status", Code),
            ("Immunization", "occurrenceDateTime", "Immunization.occurrence", DateTime),
            ("Immunization", "lotNumber", "Immunization.lotNumber", Str),
            ("AllergyIntolerance", "code", "AllergyIntolerance.code", Code),
            ("AllergyIntolerance", "clinicalStatus", "AllergyIntolerance.clinicalStatus", Code),
            ("AllergyIntolerance", "category", "AllergyIntolerance.category", Code),
            ("AllergyIntolerance", "criticality", "AllergyIntolerance.criticality", Code),
            ("AllergyIntolerance", "onsetDateTime", "AllergyIntolerance.onset", DateTime),
        ];

        fields
            .iter()
            .fold(Self::new(), |registry, (resource, name, path, data_type)| {
                registry.with_field(FieldDefinition::new(*resource, *name, *path, *data_type))
            })
    }
}
