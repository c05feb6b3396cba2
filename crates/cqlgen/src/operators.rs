//! Operator token to CQL expression templates

use cqlgen_ast::OperatorToken;

/// The CQL expression shape an operator token maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `<path> <symbol> <operand>`
    Comparison(&'static str),
    /// `<path>.contains(<operand>)`
    Contains,
    /// `<path> in <operand>` where the operand is a value-set reference or a
    /// singleton set fallback
    In,
    /// `<path> is null`
    IsNull,
    /// `<path> is not null`
    IsNotNull,
}

impl OperatorKind {
    /// Classify a query-builder token; `None` for unsupported tokens
    pub fn classify(token: &OperatorToken) -> Option<Self> {
        match token {
            OperatorToken::Eq => Some(Self::Comparison("=")),
            OperatorToken::NotEq => Some(Self::Comparison("!=")),
            OperatorToken::Less => Some(Self::Comparison("<")),
            OperatorToken::Greater => Some(Self::Comparison(">")),
            OperatorToken::LessEq => Some(Self::Comparison("<=")),
            OperatorToken::GreaterEq => Some(Self::Comparison(">=")),
            OperatorToken::Contains => Some(Self::Contains),
            OperatorToken::In => Some(Self::In),
            OperatorToken::Null => Some(Self::IsNull),
            OperatorToken::NotNull => Some(Self::IsNotNull),
            OperatorToken::Other(_) => None,
        }
    }

    /// Whether this operator takes a right-hand operand
    pub const fn takes_operand(&self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Render the expression for a resolved path and operand
    pub fn render(&self, path: &str, operand: &str) -> String {
        match self {
            Self::Comparison(symbol) => format!("{path} {symbol} {operand}"),
            Self::Contains => format!("{path}.contains({operand})"),
            Self::In => format!("{path} in {operand}"),
            Self::IsNull => format!("{path} is null"),
            Self::IsNotNull => format!("{path} is not null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("=", "Patient.gender = 'male'")]
    #[case("!=", "Patient.gender != 'male'")]
    #[case("<", "Patient.gender < 'male'")]
    #[case(">=", "Patient.gender >= 'male'")]
    fn test_comparison_templates(#[case] token: &str, #[case] expected: &str) {
        let kind = OperatorKind::classify(&OperatorToken::parse(token)).unwrap();
        assert_eq!(kind.render("Patient.gender", "'male'"), expected);
    }

    #[test]
    fn test_special_templates() {
        assert_eq!(
            OperatorKind::Contains.render("Patient.name.family", "'Smith'"),
            "Patient.name.family.contains('Smith')"
        );
        assert_eq!(
            OperatorKind::In.render("C.code", "\"Diabetes\""),
            "C.code in \"Diabetes\""
        );
        assert_eq!(
            OperatorKind::IsNull.render("Patient.deceased", ""),
            "Patient.deceased is null"
        );
        assert_eq!(
            OperatorKind::IsNotNull.render("Patient.deceased", ""),
            "Patient.deceased is not null"
        );
    }

    #[test]
    fn test_unsupported_token() {
        assert_eq!(
            OperatorKind::classify(&OperatorToken::parse("between")),
            None
        );
    }
}
