//! Classic one-line text output
//!
//! `[file:line]: (severity[, inconclusive]) message`, with the severity
//! colored when the terminal allows it.

use boolcheck_core::diagnostic::Diagnostic;
use boolcheck_core::rules::Severity;
use colored::Colorize;

pub struct TextFormatter {
    show_suggestions: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
        }
    }

    pub fn without_suggestions() -> Self {
        Self {
            show_suggestions: false,
        }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();

        for diag in diagnostics {
            output.push_str(&format_line(diag));
            output.push('\n');

            if self.show_suggestions {
                if let Some(suggestion) = &diag.suggestion {
                    output.push_str(&format!("  {} {}\n", "suggestion:".green(), suggestion));
                }
            }
        }

        if !diagnostics.is_empty() {
            let counts = SeverityCounts::from_diagnostics(diagnostics);
            output.push('\n');
            output.push_str(&format!(
                "Found {} error(s), {} warning(s) and {} style issue(s)\n",
                counts.error, counts.warning, counts.style
            ));
        }

        output
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_line(diag: &Diagnostic) -> String {
    let severity = match diag.severity {
        Severity::Error => diag.severity.as_str().red().bold(),
        Severity::Warning => diag.severity.as_str().yellow().bold(),
        Severity::Style => diag.severity.as_str().cyan().bold(),
    };
    let inconclusive = if diag.is_inconclusive() {
        ", inconclusive"
    } else {
        ""
    };

    format!(
        "[{}:{}]: ({}{}) {}",
        diag.file, diag.line, severity, inconclusive, diag.message
    )
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub style: usize,
}

impl SeverityCounts {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = Self::default();
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Style => counts.style += 1,
            }
        }
        counts
    }
}
