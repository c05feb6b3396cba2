//! Ingestion of the loosely-typed query-builder wire format
//!
//! The visual query builder ships its tree as duck-typed JSON: group objects
//! carry `combinator` + `rules`, rule objects carry `field` + `operator` +
//! `value`. This module decodes that shape into the closed [`RuleNode`]
//! union, substituting a vacuously true group for any malformed node so a
//! single bad node never rejects the whole tree.

use crate::{Rule, RuleGroup, RuleNode, RuleValue, ValueSource};
use cqlgen_diagnostics::{Diagnostic, DiagnosticKind};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Decode a query-builder JSON tree into a [`RuleGroup`].
///
/// Malformed nodes are replaced with an empty group (which translates to
/// `true`) and reported as [`DiagnosticKind::MalformedTree`] errors.
pub fn parse_tree(value: &Value) -> (RuleGroup, Vec<Diagnostic>) {
    let mut issues = Vec::new();
    let group = decode_group(value, &mut issues);
    (group, issues)
}

fn malformed(value: &Value, detail: &str, issues: &mut Vec<Diagnostic>) {
    issues.push(Diagnostic::error(
        DiagnosticKind::MalformedTree,
        format!("{detail}: {value}"),
    ));
}

fn decode_group(value: &Value, issues: &mut Vec<Diagnostic>) -> RuleGroup {
    let Some(obj) = value.as_object() else {
        malformed(value, "expected a rule group object", issues);
        return RuleGroup::empty();
    };
    let combinator = match obj.get("combinator").and_then(Value::as_str) {
        Some("and") => crate::Combinator::And,
        Some("or") => crate::Combinator::Or,
        Some(other) => {
            malformed(value, &format!("unknown combinator '{other}'"), issues);
            return RuleGroup::empty();
        }
        None => {
            malformed(value, "missing combinator", issues);
            return RuleGroup::empty();
        }
    };

    let mut group = RuleGroup {
        combinator,
        negated: obj.get("not").and_then(Value::as_bool).unwrap_or(false),
        rules: Vec::new(),
    };
    if let Some(children) = obj.get("rules") {
        match children.as_array() {
            Some(children) => {
                for child in children {
                    group.rules.push(decode_node(child, issues));
                }
            }
            None => malformed(children, "'rules' must be an array", issues),
        }
    }
    group
}

fn decode_node(value: &Value, issues: &mut Vec<Diagnostic>) -> RuleNode {
    let is_group = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("combinator") || obj.contains_key("rules"));
    if is_group {
        return RuleNode::Group(decode_group(value, issues));
    }
    match decode_rule(value, issues) {
        Some(rule) => RuleNode::Rule(rule),
        // A malformed leaf degrades to a vacuously true subtree.
        None => RuleNode::Group(RuleGroup::empty()),
    }
}

fn decode_rule(value: &Value, issues: &mut Vec<Diagnostic>) -> Option<Rule> {
    let Some(obj) = value.as_object() else {
        malformed(value, "expected a rule object", issues);
        return None;
    };
    let Some(field) = obj.get("field").and_then(Value::as_str) else {
        malformed(value, "rule is missing 'field'", issues);
        return None;
    };
    let Some(operator) = obj.get("operator").and_then(Value::as_str) else {
        malformed(value, "rule is missing 'operator'", issues);
        return None;
    };

    let payload = match obj.get("value") {
        None | Some(Value::Null) => RuleValue::Empty,
        Some(Value::Bool(b)) => RuleValue::Boolean(*b),
        Some(Value::String(s)) => RuleValue::Text(s.clone()),
        Some(Value::Number(n)) => match Decimal::from_str(&n.to_string()) {
            Ok(d) => RuleValue::Number(d),
            Err(_) => {
                malformed(value, "rule value is not a representable number", issues);
                return None;
            }
        },
        Some(other) => {
            malformed(other, "rule value must be a scalar", issues);
            return None;
        }
    };

    let value_source = match obj.get("valueSource").and_then(Value::as_str) {
        Some("field") => ValueSource::Field,
        _ => ValueSource::Value,
    };

    let mut rule = Rule::new(field, operator, payload);
    rule.value_source = value_source;
    Some(rule)
}
