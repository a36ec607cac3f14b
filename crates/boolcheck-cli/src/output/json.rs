//! JSON output formatter for diagnostic display
//!
//! Structured output for editors and CI integration.

use std::collections::HashSet;

use boolcheck_core::diagnostic::Diagnostic;
use boolcheck_core::rules::RuleRegistry;
use serde::Serialize;

use super::text::SeverityCounts;

#[derive(Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub metadata: JsonMetadata,
    pub summary: JsonSummary,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Serialize)]
pub struct JsonMetadata {
    pub boolcheck_version: &'static str,
    pub working_directory: String,
    pub analyzed_path: String,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub files_with_issues: usize,
    pub total_diagnostics: usize,
    pub by_severity: JsonSeverityCounts,
}

#[derive(Serialize)]
pub struct JsonSeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub style: usize,
}

#[derive(Serialize)]
pub struct JsonDiagnostic {
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    pub severity: String,
    pub inconclusive: bool,
    pub message: String,
    pub location: JsonLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Serialize)]
pub struct JsonLocation {
    pub file: String,
    pub start: JsonPosition,
    pub end: JsonPosition,
}

#[derive(Serialize)]
pub struct JsonPosition {
    pub line: usize,
    pub column: usize,
}

pub struct JsonFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> JsonFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(
        &self,
        diagnostics: &[Diagnostic],
        total_files: usize,
        analyzed_path: &str,
    ) -> String {
        let output = self.build_output(diagnostics, total_files, analyzed_path);
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn build_output(
        &self,
        diagnostics: &[Diagnostic],
        total_files: usize,
        analyzed_path: &str,
    ) -> JsonOutput {
        JsonOutput {
            version: "1.0",
            metadata: JsonMetadata {
                boolcheck_version: env!("CARGO_PKG_VERSION"),
                working_directory: std::env::current_dir()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
                analyzed_path: analyzed_path.to_string(),
            },
            summary: build_summary(diagnostics, total_files),
            diagnostics: diagnostics
                .iter()
                .map(|d| self.convert_diagnostic(d))
                .collect(),
        }
    }

    fn convert_diagnostic(&self, diag: &Diagnostic) -> JsonDiagnostic {
        JsonDiagnostic {
            rule_id: diag.rule_id.clone(),
            rule_name: self.rule_name(&diag.rule_id),
            severity: diag.severity.as_str().to_string(),
            inconclusive: diag.is_inconclusive(),
            message: diag.message.clone(),
            location: JsonLocation {
                file: diag.file.clone(),
                start: JsonPosition {
                    line: diag.line,
                    column: diag.column,
                },
                end: JsonPosition {
                    line: diag.end_line,
                    column: diag.end_column,
                },
            },
            explanation: diag.explanation.clone(),
            suggestion: diag.suggestion.clone(),
        }
    }

    fn rule_name(&self, rule_id: &str) -> Option<String> {
        self.registry
            .and_then(|registry| registry.get_rule(rule_id))
            .map(|rule| rule.metadata().name.to_string())
    }
}

impl Default for JsonFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn build_summary(diagnostics: &[Diagnostic], total_files: usize) -> JsonSummary {
    let counts = SeverityCounts::from_diagnostics(diagnostics);
    let files_with_issues: HashSet<&str> = diagnostics.iter().map(|d| d.file.as_str()).collect();

    JsonSummary {
        total_files,
        files_with_issues: files_with_issues.len(),
        total_diagnostics: diagnostics.len(),
        by_severity: JsonSeverityCounts {
            error: counts.error,
            warning: counts.warning,
            style: counts.style,
        },
    }
}
