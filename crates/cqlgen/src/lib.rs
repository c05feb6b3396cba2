//! Query-builder rule trees to Clinical Quality Language (CQL)
//!
//! This crate translates the nested boolean rule tree produced by a visual
//! query builder into a syntactically valid CQL library, complete with
//! value-set declarations and resource retrieval definitions.
//!
//! # Example
//!
//! ```
//! use cqlgen::ast::{Rule, RuleGroup};
//! use cqlgen::{TranslationOptions, translate};
//!
//! let tree = RuleGroup::and(vec![
//!     Rule::new("gender", "=", "male").into(),
//!     Rule::new("birthDate", "<", "1980-01-01").into(),
//! ]);
//! let options = TranslationOptions::new().with_library_name("TestLib");
//!
//! let result = translate(&tree, &options);
//! assert!(result.cql.contains("library TestLib version '1.0.0'"));
//! assert!(result.cql.contains("Patient.gender = 'male'"));
//! ```
//!
//! Translation is pure and synchronous: one rule tree and one options value
//! in, one [`TranslationResult`] out. Bad input never aborts a call; every
//! degraded construct is reported through the result's issue list.

// Re-export member crates
pub use cqlgen_ast as ast;
pub use cqlgen_diagnostics as diagnostics;
pub use cqlgen_model as model;

pub mod emitter;
pub mod literal;
pub mod operators;
pub mod planner;

mod options;
mod translator;

pub use operators::OperatorKind;
pub use options::{TranslationOptions, ValueSetDef};
pub use planner::TranslationPlan;
pub use translator::{TranslationResult, Translator, translate};

// Convenience re-exports
pub use cqlgen_ast::{Rule, RuleGroup, RuleNode};
pub use cqlgen_diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use cqlgen_model::FieldRegistry;
