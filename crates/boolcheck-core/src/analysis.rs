//! Analysis engine for code analysis and diagnostic generation
//!
//! Runs the enabled rules over a parsed file, drops suppressed findings,
//! orders the rest by line and removes duplicates.

use std::collections::HashSet;

use crate::config::Config;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::parser::ParsedFile;
use crate::rules::RuleRegistry;
use crate::rules::comparison::{
    BoolExpressionWithInt, BoolWithBool, BoolWithInt, FunctionReturningBool,
};
use crate::rules::operators::{AssignBoolToPointer, BitwiseOnBoolean, IncrementBoolean};

pub struct AnalysisEngine {
    registry: RuleRegistry,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            registry: create_default_registry(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut registry = create_default_registry();
        registry.configure(&config.checks);
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn analyze(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        for error in file.errors() {
            tracing::debug!(
                file = %file.metadata().filename,
                line = error.line,
                column = error.column,
                "{}",
                error.message
            );
        }

        let mut diagnostics: Vec<Diagnostic> = self
            .registry
            .run_all(file)
            .into_iter()
            .filter(|diagnostic| !self.is_suppressed(diagnostic, file))
            .collect();

        diagnostics.sort_by_key(|diagnostic| diagnostic.line);

        let mut seen = HashSet::new();
        diagnostics.retain(|diagnostic| {
            seen.insert((
                diagnostic.rule_id.clone(),
                diagnostic.line,
                diagnostic.message.clone(),
            ))
        });

        diagnostics
    }

    /// Emits the findings of [`analyze`](Self::analyze) into `sink`.
    pub fn analyze_into(&self, file: &ParsedFile, sink: &mut dyn DiagnosticSink) {
        for diagnostic in self.analyze(file) {
            sink.report(diagnostic);
        }
    }

    fn is_suppressed(&self, diagnostic: &Diagnostic, file: &ParsedFile) -> bool {
        let directives = file.disable_directives();
        if directives.is_disabled(diagnostic.line, &diagnostic.rule_id) {
            return true;
        }
        self.registry
            .get_rule(&diagnostic.rule_id)
            .is_some_and(|rule| directives.is_disabled(diagnostic.line, rule.metadata().name))
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn create_default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.register(Box::new(BitwiseOnBoolean::new()));
    registry.register(Box::new(IncrementBoolean::new()));
    registry.register(Box::new(AssignBoolToPointer::new()));
    registry.register(Box::new(BoolExpressionWithInt::new()));
    registry.register(Box::new(BoolWithInt::new()));
    registry.register(Box::new(FunctionReturningBool::new()));
    registry.register(Box::new(BoolWithBool::new()));

    registry
}
