//! Diagnostics for rule-tree to CQL translation
//!
//! Translation never aborts on bad input; every degraded construct is
//! reported as a [`Diagnostic`] collected into the translation result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the offending construct was dropped from the output
    Error,
    /// Warning - the construct was translated with a best-effort substitute
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The category of a translation diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Field not present in the metadata registry
    UnknownField,
    /// Operator token has no CQL mapping
    UnsupportedOperator,
    /// `in` operator references a value set that was not declared
    UndeclaredValueSet,
    /// Structurally invalid input node or conflicting declarations
    MalformedTree,
}

impl DiagnosticKind {
    /// Short identifier used in rendered messages
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownField => "unknown-field",
            Self::UnsupportedOperator => "unsupported-operator",
            Self::UndeclaredValueSet => "undeclared-valueset",
            Self::MalformedTree => "malformed-tree",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single diagnostic produced during translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Diagnostic category
    pub kind: DiagnosticKind,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }

    /// Whether this diagnostic carries error severity
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(DiagnosticKind::UnsupportedOperator, "no mapping for 'between'");
        assert_eq!(
            diag.to_string(),
            "error: unsupported-operator - no mapping for 'between'"
        );
    }

    #[test]
    fn test_severity_predicate() {
        assert!(Diagnostic::error(DiagnosticKind::MalformedTree, "x").is_error());
        assert!(!Diagnostic::warning(DiagnosticKind::UnknownField, "x").is_error());
    }
}
