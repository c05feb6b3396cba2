//! Retrieve and value-set planning
//!
//! A single pre-pass over the rule tree determines which resource types need
//! a named retrieval define and which value sets need a declaration, before
//! any expression text is emitted. Declarations are deduplicated by name and
//! keep first-encounter order.

use crate::operators::OperatorKind;
use crate::options::TranslationOptions;
use cqlgen_ast::{RuleGroup, RuleNode};
use cqlgen_diagnostics::{Diagnostic, DiagnosticKind};
use indexmap::{IndexMap, IndexSet};

/// Name of the retrieval define for a resource type, e.g. `Conditions`
pub fn retrieve_define_name(resource_type: &str) -> String {
    format!("{resource_type}s")
}

/// Precomputed declarations for one translation
#[derive(Debug, Default)]
pub struct TranslationPlan {
    retrieves: IndexSet<String>,
    value_sets: IndexMap<String, String>,
}

impl TranslationPlan {
    /// Resource types needing a retrieval define, in declaration order
    pub fn retrieve_types(&self) -> impl Iterator<Item = &str> {
        self.retrieves.iter().map(String::as_str)
    }

    /// Value sets to declare as (name, oid), in first-encounter order
    pub fn value_sets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.value_sets
            .iter()
            .map(|(name, oid)| (name.as_str(), oid.as_str()))
    }

    /// The OID of a declared value set, if the name was planned
    pub fn value_set_oid(&self, name: &str) -> Option<&str> {
        self.value_sets.get(name).map(String::as_str)
    }
}

/// Walk the tree once and collect retrieval defines and value-set
/// declarations.
///
/// Duplicate value-set names in `options` with differing OIDs keep the first
/// binding and report the conflict.
pub fn plan(
    root: &RuleGroup,
    options: &TranslationOptions,
    issues: &mut Vec<Diagnostic>,
) -> TranslationPlan {
    let mut declared: IndexMap<&str, &str> = IndexMap::new();
    for vs in &options.value_sets {
        match declared.get(vs.name.as_str()) {
            Some(oid) if *oid != vs.oid => issues.push(Diagnostic::error(
                DiagnosticKind::MalformedTree,
                format!(
                    "value set '{}' bound to conflicting OIDs '{}' and '{}'",
                    vs.name, oid, vs.oid
                ),
            )),
            _ => {
                declared.insert(&vs.name, &vs.oid);
            }
        }
    }

    let mut plan = TranslationPlan::default();
    for resource_type in &options.resource_types {
        plan.retrieves.insert(resource_type.clone());
    }
    visit_group(root, &declared, &mut plan);
    plan
}

fn visit_group(group: &RuleGroup, declared: &IndexMap<&str, &str>, plan: &mut TranslationPlan) {
    for node in &group.rules {
        match node {
            RuleNode::Group(nested) => visit_group(nested, declared, plan),
            RuleNode::Rule(rule) => {
                // Unsupported operators and ambiguous fields are skipped by
                // the emitter, so they must not force declarations either.
                if OperatorKind::classify(&rule.operator).is_none() {
                    continue;
                }
                let Some((resource_type, _)) = rule.field_parts() else {
                    continue;
                };
                if resource_type != cqlgen_ast::DEFAULT_RESOURCE {
                    plan.retrieves.insert(resource_type.to_string());
                }
                if rule.operator == cqlgen_ast::OperatorToken::In
                    && let Some(name) = rule.value.as_text()
                    && let Some(oid) = declared.get(name)
                {
                    plan.value_sets.insert(name.to_string(), (*oid).to_string());
                }
            }
        }
    }
}
