//! Translation entry point and library assembly

use crate::options::TranslationOptions;
use crate::{emitter, planner};
use cqlgen_ast::RuleGroup;
use cqlgen_diagnostics::Diagnostic;
use cqlgen_model::FieldRegistry;
use log::debug;

/// CQL version stamped into every library header
const LIBRARY_VERSION: &str = "1.0.0";
/// FHIR version for the `using` declaration
const FHIR_VERSION: &str = "4.0.1";
/// Name of the population define
const POPULATION_DEFINE: &str = "Initial Population";

/// The outcome of one translation
///
/// `cql` is always non-empty; `issues` lists one entry per degraded
/// construct. Issues never abort translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    /// The assembled CQL library text
    pub cql: String,
    /// Diagnostics for skipped or substituted constructs
    pub issues: Vec<Diagnostic>,
}

impl TranslationResult {
    /// Whether any diagnostic carries error severity
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Diagnostic::is_error)
    }
}

/// Translate a rule tree against the process-wide FHIR registry
pub fn translate(root: &RuleGroup, options: &TranslationOptions) -> TranslationResult {
    Translator::new(FieldRegistry::global()).translate(root, options)
}

/// A translator bound to a field metadata registry
///
/// The registry is borrowed read-only for the duration of each call, so one
/// translator can serve concurrent invocations without locking.
pub struct Translator<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> Translator<'a> {
    /// Create a translator over the given registry
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Translate a rule tree into a complete CQL library
    pub fn translate(&self, root: &RuleGroup, options: &TranslationOptions) -> TranslationResult {
        let mut issues = Vec::new();

        let plan = planner::plan(root, options, &mut issues);
        let expression = emitter::emit(root, self.registry, &plan, &mut issues);
        debug!(
            "planned {} value set(s), {} retrieve(s), {} issue(s)",
            plan.value_sets().count(),
            plan.retrieve_types().count(),
            issues.len()
        );

        let cql = assemble(options.effective_library_name(), &plan, &expression);
        TranslationResult { cql, issues }
    }
}

/// Concatenate header, declarations, retrieval defines and the population
/// define into the final library text.
fn assemble(library_name: &str, plan: &planner::TranslationPlan, expression: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("library {library_name} version '{LIBRARY_VERSION}'"));
    lines.push(String::new());
    lines.push(format!("using FHIR version '{FHIR_VERSION}'"));
    lines.push(String::new());

    let mut declared_any = false;
    for (name, oid) in plan.value_sets() {
        lines.push(format!("valueset \"{name}\": '{oid}'"));
        declared_any = true;
    }
    if declared_any {
        lines.push(String::new());
    }

    lines.push("context Patient".to_string());
    lines.push(String::new());

    for resource_type in plan.retrieve_types() {
        let define_name = planner::retrieve_define_name(resource_type);
        lines.push(format!("define \"{define_name}\":\n  [{resource_type}]"));
        lines.push(String::new());
    }

    lines.push(format!("define \"{POPULATION_DEFINE}\":\n  {expression}"));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqlgen_ast::Rule;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assembled_section_order() {
        let tree = RuleGroup::and(vec![Rule::new("Condition.code", "in", "Diabetes").into()]);
        let options = TranslationOptions::new()
            .with_library_name("Ordering")
            .with_value_set("Diabetes", "1.2.3");

        let result = translate(&tree, &options);
        let library = result.cql.find("library Ordering version '1.0.0'").unwrap();
        let using = result.cql.find("using FHIR version '4.0.1'").unwrap();
        let valueset = result.cql.find("valueset \"Diabetes\": '1.2.3'").unwrap();
        let context = result.cql.find("context Patient").unwrap();
        let retrieve = result.cql.find("define \"Conditions\":\n  [Condition]").unwrap();
        let population = result.cql.find("define \"Initial Population\":").unwrap();

        assert!(library < using);
        assert!(using < valueset);
        assert!(valueset < context);
        assert!(context < retrieve);
        assert!(retrieve < population);
    }

    #[test]
    fn test_empty_tree_produces_trivial_library() {
        let result = translate(&RuleGroup::empty(), &TranslationOptions::new());
        assert!(result.issues.is_empty());
        assert_eq!(
            result.cql,
            "library Query version '1.0.0'\n\
             \n\
             using FHIR version '4.0.1'\n\
             \n\
             context Patient\n\
             \n\
             define \"Initial Population\":\n  true\n"
        );
    }
}
