//! Recursive rule-tree to CQL expression emission

use crate::literal::format_literal;
use crate::operators::OperatorKind;
use crate::planner::TranslationPlan;
use cqlgen_ast::{DEFAULT_RESOURCE, Rule, RuleGroup, RuleNode, ValueSource, split_field_reference};
use cqlgen_diagnostics::{Diagnostic, DiagnosticKind};
use cqlgen_model::{DataType, FieldRegistry};

/// Emit the boolean expression for the root group.
///
/// Skipped leaves degrade the surrounding group; a group with no renderable
/// children renders as the literal `true`.
pub fn emit(
    root: &RuleGroup,
    registry: &FieldRegistry,
    plan: &TranslationPlan,
    issues: &mut Vec<Diagnostic>,
) -> String {
    let mut emitter = Emitter {
        registry,
        plan,
        issues,
    };
    emitter.emit_group(root, false)
}

struct Emitter<'a> {
    registry: &'a FieldRegistry,
    plan: &'a TranslationPlan,
    issues: &'a mut Vec<Diagnostic>,
}

impl Emitter<'_> {
    fn emit_group(&mut self, group: &RuleGroup, nested: bool) -> String {
        let mut rendered = Vec::with_capacity(group.rules.len());
        for node in &group.rules {
            match node {
                RuleNode::Group(child) => rendered.push(self.emit_group(child, true)),
                RuleNode::Rule(rule) => {
                    if let Some(expr) = self.emit_rule(rule) {
                        rendered.push(expr);
                    }
                }
            }
        }

        let joined = if rendered.is_empty() {
            "true".to_string()
        } else {
            rendered.join(&format!(" {} ", group.combinator.keyword()))
        };

        if group.negated {
            format!("not ({joined})")
        } else if !rendered.is_empty() && (nested || rendered.len() > 1) {
            // Explicit parenthesization is the only precedence disambiguator.
            format!("({joined})")
        } else {
            joined
        }
    }

    fn emit_rule(&mut self, rule: &Rule) -> Option<String> {
        let Some(kind) = OperatorKind::classify(&rule.operator) else {
            self.issues.push(Diagnostic::error(
                DiagnosticKind::UnsupportedOperator,
                format!(
                    "no CQL mapping for operator '{}' on field '{}'",
                    rule.operator.token(),
                    rule.field
                ),
            ));
            return None;
        };

        let (resource_type, field_name) = self.resolve_field(&rule.field)?;
        let data_type = self
            .registry
            .field(&resource_type, &field_name)
            .map(|f| f.data_type)
            .unwrap_or_default();
        let path = self.registry.fhir_path(&resource_type, &field_name);

        let operand = if kind.takes_operand() {
            self.render_operand(rule, kind, data_type, &resource_type)?
        } else {
            String::new()
        };

        if resource_type == DEFAULT_RESOURCE {
            return Some(kind.render(&path, &operand));
        }

        // Non-patient resources are existence-checked over their retrieve.
        let alias = resource_alias(&resource_type);
        let relative = path
            .strip_prefix(&format!("{resource_type}."))
            .unwrap_or(&path);
        let condition = kind.render(&format!("{alias}.{relative}"), &operand);
        Some(format!("exists([{resource_type}] {alias} where {condition})"))
    }

    fn render_operand(
        &mut self,
        rule: &Rule,
        kind: OperatorKind,
        data_type: DataType,
        lhs_resource: &str,
    ) -> Option<String> {
        if rule.value_source == ValueSource::Field {
            return self.render_field_operand(rule, lhs_resource);
        }

        if kind == OperatorKind::In {
            if let Some(name) = rule.value.as_text()
                && self.plan.value_set_oid(name).is_some()
            {
                return Some(format!("\"{name}\""));
            }
            self.issues.push(Diagnostic::warning(
                DiagnosticKind::UndeclaredValueSet,
                format!(
                    "no declared value set matches the operand of 'in' on '{}'; \
                     falling back to a singleton set",
                    rule.field
                ),
            ));
            let literal = format_literal(data_type, &rule.value, self.issues);
            return Some(format!("{{{literal}}}"));
        }

        Some(format_literal(data_type, &rule.value, self.issues))
    }

    /// Resolve a `valueSource: field` operand to the referenced field's path
    fn render_field_operand(&mut self, rule: &Rule, lhs_resource: &str) -> Option<String> {
        let Some(reference) = rule.value.as_text() else {
            self.issues.push(Diagnostic::error(
                DiagnosticKind::MalformedTree,
                format!("field-valued operand of '{}' is not a field name", rule.field),
            ));
            return None;
        };
        let Some((resource_type, field_name)) = split_field_reference(reference) else {
            self.issues.push(Diagnostic::error(
                DiagnosticKind::UnknownField,
                format!("ambiguous field reference '{reference}'"),
            ));
            return None;
        };
        let path = self.registry.fhir_path(resource_type, field_name);
        if resource_type == lhs_resource && resource_type != DEFAULT_RESOURCE {
            // Both sides live on the aliased retrieve.
            let alias = resource_alias(resource_type);
            let relative = path
                .strip_prefix(&format!("{resource_type}."))
                .unwrap_or(&path);
            return Some(format!("{alias}.{relative}"));
        }
        Some(path)
    }

    fn resolve_field(&mut self, field: &str) -> Option<(String, String)> {
        let Some((resource_type, field_name)) = split_field_reference(field) else {
            self.issues.push(Diagnostic::error(
                DiagnosticKind::UnknownField,
                format!("ambiguous field reference '{field}' (more than one '.')"),
            ));
            return None;
        };
        if self.registry.field(resource_type, field_name).is_none() {
            self.issues.push(Diagnostic::warning(
                DiagnosticKind::UnknownField,
                format!(
                    "field '{resource_type}.{field_name}' is not registered; \
                     using a synthesized path"
                ),
            ));
        }
        Some((resource_type.to_string(), field_name.to_string()))
    }
}

fn resource_alias(resource_type: &str) -> String {
    resource_type
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_else(|| "R".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TranslationOptions;
    use crate::planner;
    use pretty_assertions::assert_eq;

    fn emit_with(tree: &RuleGroup, options: &TranslationOptions) -> (String, Vec<Diagnostic>) {
        let mut issues = Vec::new();
        let plan = planner::plan(tree, options, &mut issues);
        let expr = emit(tree, FieldRegistry::global(), &plan, &mut issues);
        (expr, issues)
    }

    #[test]
    fn test_flat_and_group() {
        let tree = RuleGroup::and(vec![
            Rule::new("gender", "=", "male").into(),
            Rule::new("birthDate", "<", "1980-01-01").into(),
        ]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(
            expr,
            "(Patient.gender = 'male' and Patient.birthDate < @1980-01-01)"
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_single_child_root_is_unparenthesized() {
        let tree = RuleGroup::and(vec![Rule::new("active", "=", true).into()]);
        let (expr, _) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "Patient.active = true");
    }

    #[test]
    fn test_nested_group_is_parenthesized() {
        let tree = RuleGroup::and(vec![
            Rule::new("gender", "=", "female").into(),
            RuleGroup::or(vec![
                Rule::new("active", "=", true).into(),
                Rule::new("deceasedBoolean", "=", false).into(),
            ])
            .into(),
        ]);
        let (expr, _) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(
            expr,
            "(Patient.gender = 'female' and (Patient.active = true or Patient.deceased = false))"
        );
    }

    #[test]
    fn test_negated_group() {
        let tree = RuleGroup::or(vec![
            Rule::new("gender", "=", "other").into(),
            Rule::new("active", "=", false).into(),
        ])
        .negate();
        let (expr, _) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(
            expr,
            "not (Patient.gender = 'other' or Patient.active = false)"
        );
    }

    #[test]
    fn test_empty_group_renders_true() {
        let (expr, issues) = emit_with(&RuleGroup::empty(), &TranslationOptions::new());
        assert_eq!(expr, "true");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unsupported_operator_skips_leaf() {
        let tree = RuleGroup::and(vec![
            Rule::new("gender", "=", "male").into(),
            Rule::new("birthDate", "between", "x").into(),
        ]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "Patient.gender = 'male'");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DiagnosticKind::UnsupportedOperator);
    }

    #[test]
    fn test_all_skipped_group_renders_true() {
        let tree = RuleGroup::and(vec![Rule::new("gender", "between", "x").into()]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "true");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_retrieve_exists_wrapping() {
        let tree = RuleGroup::and(vec![Rule::new("Condition.code", "in", "Diabetes").into()]);
        let options = TranslationOptions::new().with_value_set("Diabetes", "1.2.3");
        let (expr, issues) = emit_with(&tree, &options);
        assert_eq!(expr, "exists([Condition] C where C.code in \"Diabetes\")");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_undeclared_value_set_falls_back_to_singleton() {
        let tree = RuleGroup::and(vec![Rule::new("Condition.code", "in", "Diabetes").into()]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "exists([Condition] C where C.code in {'Diabetes'})");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DiagnosticKind::UndeclaredValueSet);
    }

    #[test]
    fn test_ambiguous_field_is_skipped() {
        let tree = RuleGroup::and(vec![
            Rule::new("Condition.code.coding", "=", "x").into(),
            Rule::new("gender", "=", "male").into(),
        ]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "Patient.gender = 'male'");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DiagnosticKind::UnknownField);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_unknown_field_warns_and_synthesizes() {
        let tree = RuleGroup::and(vec![Rule::new("favoriteColor", "=", "blue").into()]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(expr, "Patient.favoriteColor = 'blue'");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DiagnosticKind::UnknownField);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_field_valued_operand() {
        let tree = RuleGroup::and(vec![
            Rule::new("Encounter.periodStart", "<", "Encounter.periodEnd")
                .with_field_operand()
                .into(),
        ]);
        let (expr, issues) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(
            expr,
            "exists([Encounter] E where E.period.start < E.period.end)"
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_null_operators() {
        use cqlgen_ast::RuleValue;

        let tree = RuleGroup::and(vec![
            Rule::new("deceasedBoolean", "null", RuleValue::Empty).into(),
            Rule::new("maritalStatus", "notNull", RuleValue::Empty).into(),
        ]);
        let (expr, _) = emit_with(&tree, &TranslationOptions::new());
        assert_eq!(
            expr,
            "(Patient.deceased is null and Patient.maritalStatus is not null)"
        );
    }
}
