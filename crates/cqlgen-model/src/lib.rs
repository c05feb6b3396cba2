//! FHIR field metadata registry
//!
//! Maps (resource type, field name) pairs to field definitions: the FHIR
//! path to emit, the CQL-relevant data type, and the UI input kind the query
//! builder renders. The registry is pure data, immutable once built, with a
//! process-wide default covering the common FHIR R4 resources.

mod field;
mod registry;

pub use field::*;
pub use registry::*;
