//! Rule-tree node definitions

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// The resource type a bare (undotted) field name resolves against
pub const DEFAULT_RESOURCE: &str = "Patient";

/// Split a field reference into (resource type, field name).
///
/// Bare names resolve against [`DEFAULT_RESOURCE`]; a single-dotted name
/// carries its resource type as the prefix. More than one dot is ambiguous
/// and yields `None`.
pub fn split_field_reference(field: &str) -> Option<(&str, &str)> {
    let mut parts = field.split('.');
    let first = parts.next()?;
    match (parts.next(), parts.next()) {
        (None, _) => Some((DEFAULT_RESOURCE, first)),
        (Some(name), None) => Some((first, name)),
        (Some(_), Some(_)) => None,
    }
}

/// A node in the rule tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    /// A combinator group of child nodes
    Group(RuleGroup),
    /// A leaf predicate
    Rule(Rule),
}

/// A leaf predicate against a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Field reference, either bare (`gender`) or dotted (`Condition.code`)
    pub field: String,
    /// Query-builder operator token
    pub operator: OperatorToken,
    /// Right-hand operand payload
    #[serde(default)]
    pub value: RuleValue,
    /// Whether the operand is a literal value or another field reference
    #[serde(default)]
    pub value_source: ValueSource,
}

impl Rule {
    /// Create a new rule with a literal operand
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<OperatorToken>,
        value: impl Into<RuleValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            value_source: ValueSource::Value,
        }
    }

    /// Mark the operand as a field reference
    pub fn with_field_operand(mut self) -> Self {
        self.value_source = ValueSource::Field;
        self
    }

    /// Split the field reference into (resource type, field name); see
    /// [`split_field_reference`]
    pub fn field_parts(&self) -> Option<(&str, &str)> {
        split_field_reference(&self.field)
    }
}

/// A group of nodes joined by a boolean combinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    /// The boolean keyword joining the children
    pub combinator: Combinator,
    /// Whether the whole group is negated
    #[serde(default, rename = "not")]
    pub negated: bool,
    /// Child nodes in original order
    #[serde(default)]
    pub rules: Vec<RuleNode>,
}

impl RuleGroup {
    /// Create an `and` group
    pub fn and(rules: Vec<RuleNode>) -> Self {
        Self {
            combinator: Combinator::And,
            negated: false,
            rules,
        }
    }

    /// Create an `or` group
    pub fn or(rules: Vec<RuleNode>) -> Self {
        Self {
            combinator: Combinator::Or,
            negated: false,
            rules,
        }
    }

    /// Negate the group
    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Create an empty group, which translates to a vacuously true expression
    pub fn empty() -> Self {
        Self::and(Vec::new())
    }
}

impl From<Rule> for RuleNode {
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}

impl From<RuleGroup> for RuleNode {
    fn from(group: RuleGroup) -> Self {
        Self::Group(group)
    }
}

/// Boolean combinator keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// Get the CQL keyword
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Operand source for a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// The operand is a literal value
    #[default]
    Value,
    /// The operand names another field
    Field,
}

/// Query-builder operator tokens
///
/// Unrecognized tokens are carried through as [`OperatorToken::Other`] so the
/// emitter can report them instead of the decoder rejecting the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatorToken {
    /// Equality (`=`)
    Eq,
    /// Inequality (`!=`)
    NotEq,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEq,
    /// Greater than or equal (`>=`)
    GreaterEq,
    /// Substring containment (`contains`)
    Contains,
    /// Value-set membership (`in`)
    In,
    /// Null test (`null`)
    Null,
    /// Non-null test (`notNull`)
    NotNull,
    /// Unrecognized token, preserved verbatim
    Other(String),
}

impl OperatorToken {
    /// Parse a raw query-builder token
    pub fn parse(token: &str) -> Self {
        match token {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            "<" => Self::Less,
            ">" => Self::Greater,
            "<=" => Self::LessEq,
            ">=" => Self::GreaterEq,
            "contains" => Self::Contains,
            "in" => Self::In,
            "null" => Self::Null,
            "notNull" => Self::NotNull,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the raw token text
    pub fn token(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Contains => "contains",
            Self::In => "in",
            Self::Null => "null",
            Self::NotNull => "notNull",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OperatorToken {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for OperatorToken {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<OperatorToken> for String {
    fn from(op: OperatorToken) -> Self {
        op.token().to_string()
    }
}

/// The loosely-typed operand payload attached to a rule
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuleValue {
    /// Text payload (also used for dates, codes and value-set names)
    Text(String),
    /// Numeric payload
    Number(Decimal),
    /// Boolean payload
    Boolean(bool),
    /// No payload (null tests, missing value)
    #[default]
    Empty,
}

impl RuleValue {
    /// The text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for RuleValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Decimal> for RuleValue {
    fn from(d: Decimal) -> Self {
        Self::Number(d)
    }
}

impl From<i64> for RuleValue {
    fn from(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

// Decimal round-trips through strings on the wire, matching how the query
// builder ships numbers, so the serde impls are written by hand rather than
// derived through rust_decimal.
impl Serialize for RuleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(d) => serializer.serialize_str(&d.to_string()),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for RuleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(Self::Empty),
            serde_json::Value::Bool(b) => Ok(Self::Boolean(b)),
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .map(Self::Number)
                .map_err(|e| D::Error::custom(format!("invalid number: {e}"))),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            other => Err(D::Error::custom(format!(
                "expected scalar rule value, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_token_round_trip() {
        for token in ["=", "!=", "<", ">", "<=", ">=", "contains", "in", "null", "notNull"] {
            assert_eq!(OperatorToken::parse(token).token(), token);
        }
        assert_eq!(
            OperatorToken::parse("between"),
            OperatorToken::Other("between".to_string())
        );
    }

    #[test]
    fn test_field_parts() {
        let bare = Rule::new("gender", "=", "male");
        assert_eq!(bare.field_parts(), Some(("Patient", "gender")));

        let dotted = Rule::new("Condition.code", "in", "Diabetes");
        assert_eq!(dotted.field_parts(), Some(("Condition", "code")));

        let ambiguous = Rule::new("Condition.code.coding", "=", "x");
        assert_eq!(ambiguous.field_parts(), None);
    }

    #[test]
    fn test_rule_node_deserialize_untagged() {
        let json = r#"{
            "combinator": "and",
            "rules": [
                {"field": "gender", "operator": "=", "value": "male"},
                {"combinator": "or", "not": true, "rules": []}
            ]
        }"#;
        let node: RuleNode = serde_json::from_str(json).unwrap();
        let RuleNode::Group(group) = node else {
            panic!("expected group, got {node:?}");
        };
        assert_eq!(group.combinator, Combinator::And);
        assert_eq!(group.rules.len(), 2);
        assert!(matches!(&group.rules[0], RuleNode::Rule(r) if r.field == "gender"));
        assert!(matches!(&group.rules[1], RuleNode::Group(g) if g.negated));
    }

    #[test]
    fn test_rule_value_deserialize_scalars() {
        let rule: Rule =
            serde_json::from_str(r#"{"field": "active", "operator": "=", "value": true}"#).unwrap();
        assert_eq!(rule.value, RuleValue::Boolean(true));

        let rule: Rule =
            serde_json::from_str(r#"{"field": "age", "operator": ">", "value": 65}"#).unwrap();
        assert_eq!(rule.value, RuleValue::Number(Decimal::from(65)));

        let rule: Rule =
            serde_json::from_str(r#"{"field": "deceasedBoolean", "operator": "null"}"#).unwrap();
        assert_eq!(rule.value, RuleValue::Empty);
    }
}
