//! Diagnostics produced by the rules and the sinks that receive them.

use std::fmt;

use crate::rules::{Confidence, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub explanation: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        rule_id: &str,
        severity: Severity,
        message: &str,
        file: &str,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            confidence: Confidence::Certain,
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
            end_line: line,
            end_column: column,
            explanation: None,
            suggestion: None,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_inconclusive(&self) -> bool {
        self.confidence == Confidence::Inconclusive
    }
}

/// Classic one-line rendering: `[file:line]: (severity[, inconclusive]) message`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]: ({}", self.file, self.line, self.severity)?;
        if self.is_inconclusive() {
            write!(f, ", inconclusive")?;
        }
        write!(f, ") {}", self.message)
    }
}

/// Receiver of emitted diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_classic_format() {
        let diag = Diagnostic::new(
            "B003",
            Severity::Error,
            "Boolean value assigned to pointer.",
            "test.cpp",
            2,
            7,
        );

        assert_eq!(
            diag.to_string(),
            "[test.cpp:2]: (error) Boolean value assigned to pointer."
        );
    }

    #[test]
    fn display_marks_inconclusive_findings() {
        let diag = Diagnostic::new("B001", Severity::Style, "msg", "a.c", 3, 1)
            .with_confidence(Confidence::Inconclusive);

        assert_eq!(diag.to_string(), "[a.c:3]: (style, inconclusive) msg");
    }

    #[test]
    fn builders_fill_optional_fields() {
        let diag = Diagnostic::new("B002", Severity::Style, "msg", "a.c", 1, 4)
            .with_end(1, 6)
            .with_explanation("long text")
            .with_suggestion("do this");

        assert_eq!(diag.end_column, 6);
        assert_eq!(diag.explanation.as_deref(), Some("long text"));
        assert_eq!(diag.suggestion.as_deref(), Some("do this"));
        assert!(!diag.is_inconclusive());
    }

    #[test]
    fn vec_collects_reported_diagnostics() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(Diagnostic::new("B001", Severity::Style, "a", "f.c", 1, 1));
        sink.report(Diagnostic::new("B002", Severity::Style, "b", "f.c", 2, 1));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].rule_id, "B002");
    }
}
