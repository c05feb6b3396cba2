//! CQL literal rendering
//!
//! Single source of truth for literal syntax: every leaf predicate renders
//! its operand through [`format_literal`], never through ad hoc string
//! interpolation.

use chrono::{NaiveDate, NaiveDateTime};
use cqlgen_ast::RuleValue;
use cqlgen_diagnostics::{Diagnostic, DiagnosticKind};
use cqlgen_model::DataType;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Quote a string as a CQL string literal, escaping embedded quotes
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a rule value as a CQL literal according to the field's data type.
///
/// Unknown or mismatched payloads degrade to string rendering; date and
/// dateTime text that chrono rejects is still emitted best-effort with a
/// warning pushed onto `issues`.
pub fn format_literal(
    data_type: DataType,
    value: &RuleValue,
    issues: &mut Vec<Diagnostic>,
) -> String {
    match data_type {
        DataType::String | DataType::Code | DataType::Reference => quote(&value_text(value)),
        DataType::Boolean => format_boolean(value, issues),
        DataType::Date => format_date(&value_text(value), issues),
        DataType::DateTime => format_date_time(&value_text(value), issues),
        DataType::Quantity => format_quantity(value, issues),
    }
}

fn value_text(value: &RuleValue) -> String {
    match value {
        RuleValue::Text(s) => s.clone(),
        RuleValue::Number(d) => d.to_string(),
        RuleValue::Boolean(b) => b.to_string(),
        RuleValue::Empty => String::new(),
    }
}

fn format_boolean(value: &RuleValue, issues: &mut Vec<Diagnostic>) -> String {
    match value {
        RuleValue::Boolean(b) => b.to_string(),
        RuleValue::Text(s) if s.eq_ignore_ascii_case("true") => "true".to_string(),
        RuleValue::Text(s) if s.eq_ignore_ascii_case("false") => "false".to_string(),
        other => {
            issues.push(Diagnostic::warning(
                DiagnosticKind::MalformedTree,
                format!("expected a boolean value, got {other:?}"),
            ));
            quote(&value_text(other))
        }
    }
}

fn format_date(text: &str, issues: &mut Vec<Diagnostic>) -> String {
    if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() {
        issues.push(Diagnostic::warning(
            DiagnosticKind::MalformedTree,
            format!("'{text}' is not a valid YYYY-MM-DD date"),
        ));
    }
    format!("@{text}")
}

fn format_date_time(text: &str, issues: &mut Vec<Diagnostic>) -> String {
    if NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok() {
        return format!("@{text}");
    }
    // A plain date is promoted to midnight rather than rejected.
    if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() {
        return format!("@{text}T00:00:00");
    }
    issues.push(Diagnostic::warning(
        DiagnosticKind::MalformedTree,
        format!("'{text}' is not a valid dateTime"),
    ));
    format!("@{text}")
}

fn format_quantity(value: &RuleValue, issues: &mut Vec<Diagnostic>) -> String {
    match value {
        RuleValue::Number(d) => d.to_string(),
        RuleValue::Text(s) => {
            // "70 kg" splits into a numeric token and a quoted UCUM unit.
            let mut parts = s.splitn(2, ' ');
            let number = parts.next().unwrap_or_default();
            match Decimal::from_str(number) {
                Ok(d) => match parts.next().map(str::trim).filter(|u| !u.is_empty()) {
                    Some(unit) => format!("{d} {}", quote(unit)),
                    None => d.to_string(),
                },
                Err(_) => {
                    issues.push(Diagnostic::warning(
                        DiagnosticKind::MalformedTree,
                        format!("'{s}' is not a valid quantity"),
                    ));
                    quote(s)
                }
            }
        }
        other => {
            issues.push(Diagnostic::warning(
                DiagnosticKind::MalformedTree,
                format!("expected a quantity value, got {other:?}"),
            ));
            quote(&value_text(other))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(data_type: DataType, value: impl Into<RuleValue>) -> (String, Vec<Diagnostic>) {
        let mut issues = Vec::new();
        let text = format_literal(data_type, &value.into(), &mut issues);
        (text, issues)
    }

    #[rstest]
    #[case(DataType::String, "male", "'male'")]
    #[case(DataType::Code, "active", "'active'")]
    #[case(DataType::Reference, "Practitioner/42", "'Practitioner/42'")]
    #[case(DataType::Date, "1980-01-01", "@1980-01-01")]
    #[case(DataType::DateTime, "2020-06-01T08:30:00", "@2020-06-01T08:30:00")]
    #[case(DataType::DateTime, "2020-06-01", "@2020-06-01T00:00:00")]
    #[case(DataType::Quantity, "70 kg", "70 'kg'")]
    #[case(DataType::Quantity, "98.6", "98.6")]
    fn test_rendering(#[case] data_type: DataType, #[case] input: &str, #[case] expected: &str) {
        let (text, issues) = render(data_type, input);
        assert_eq!(text, expected);
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_string_escaping() {
        let (text, _) = render(DataType::String, "O'Brien");
        assert_eq!(text, "'O\\'Brien'");
    }

    #[test]
    fn test_boolean_rendering() {
        assert_eq!(render(DataType::Boolean, true).0, "true");
        assert_eq!(render(DataType::Boolean, false).0, "false");
        assert_eq!(render(DataType::Boolean, "true").0, "true");

        let (text, issues) = render(DataType::Boolean, "maybe");
        assert_eq!(text, "'maybe'");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_invalid_date_warns_but_emits() {
        let (text, issues) = render(DataType::Date, "01/01/1980");
        assert_eq!(text, "@01/01/1980");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DiagnosticKind::MalformedTree);
    }

    #[test]
    fn test_invalid_quantity_warns() {
        let (text, issues) = render(DataType::Quantity, "heavy");
        assert_eq!(text, "'heavy'");
        assert_eq!(issues.len(), 1);
    }
}
