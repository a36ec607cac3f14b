//! Rule system for code analysis
//!
//! Provides the boolean misuse rules, grouped into operator rules and
//! comparison rules, and the registry that decides which of them run.

pub mod comparison;
pub mod operators;

use crate::config::ChecksConfig;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Style,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Style => "style",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inconclusive findings carry a known false-positive risk and are only
/// reported when explicitly requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Confidence {
    #[default]
    Certain,
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub confidence: Confidence,
    pub experimental: bool,
    pub examples: Option<&'static str>,
}

impl RuleMetadata {
    /// Diagnostic carrying this rule's id, severity and confidence.
    pub fn diagnostic(&self, message: &str, file: &str, line: usize, column: usize) -> Diagnostic {
        Diagnostic::new(self.id, self.severity, message, file, line, column)
            .with_confidence(self.confidence)
    }
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic>;
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
    style_enabled: bool,
    warning_enabled: bool,
    inconclusive_enabled: bool,
    experimental_enabled: bool,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            style_enabled: true,
            warning_enabled: true,
            inconclusive_enabled: false,
            experimental_enabled: false,
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &ChecksConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for rule_ref in &config.disabled {
            self.disabled_rules.insert(rule_ref.clone());
        }

        for (rule_ref, severity_value) in &config.severity {
            self.severity_overrides
                .insert(rule_ref.clone(), (*severity_value).into());
        }

        self.style_enabled = config.style.unwrap_or(true);
        self.warning_enabled = config.warning.unwrap_or(true);
        self.inconclusive_enabled = config.inconclusive.unwrap_or(false);
        self.experimental_enabled = config.experimental.unwrap_or(false);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn run_all(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .filter(|rule| self.should_run_rule(rule.as_ref()))
            .flat_map(|rule| {
                let mut diagnostics = rule.check(file);
                tracing::trace!(
                    rule = rule.metadata().id,
                    count = diagnostics.len(),
                    "rule finished"
                );
                self.apply_severity_overrides(rule.as_ref(), &mut diagnostics);
                diagnostics
            })
            .collect()
    }

    fn should_run_rule(&self, rule: &dyn Rule) -> bool {
        let metadata = rule.metadata();

        if metadata.experimental && !self.experimental_enabled {
            return false;
        }

        if metadata.confidence == Confidence::Inconclusive && !self.inconclusive_enabled {
            return false;
        }

        match metadata.severity {
            Severity::Style if !self.style_enabled => return false,
            Severity::Warning if !self.warning_enabled => return false,
            _ => {}
        }

        !self.is_rule_disabled(metadata)
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id) || self.disabled_rules.contains(metadata.name)
    }

    fn apply_severity_overrides(&self, rule: &dyn Rule, diagnostics: &mut [Diagnostic]) {
        let metadata = rule.metadata();

        let override_severity = self
            .severity_overrides
            .get(metadata.id)
            .or_else(|| self.severity_overrides.get(metadata.name));

        if let Some(severity) = override_severity {
            for diag in diagnostics.iter_mut() {
                diag.severity = *severity;
            }
        }
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        if let Some(rule) = self
            .get_rule(id_or_name)
            .or_else(|| self.get_rule_by_name(id_or_name))
        {
            self.should_run_rule(rule)
        } else {
            false
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        severity = $sev:ident
        $(, confidence = $conf:ident)?
        $(, experimental = $exp:literal)?
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: $crate::rules::RuleMetadata {
                        id: $id,
                        name: $rule_name,
                        description: $desc,
                        severity: $crate::rules::Severity::$sev,
                        confidence: $crate::declare_rule!(@confidence $($conf)?),
                        experimental: $crate::declare_rule!(@experimental $($exp)?),
                        examples: $crate::declare_rule!(@examples $($examples)?),
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@confidence $conf:ident) => { $crate::rules::Confidence::$conf };
    (@confidence) => { $crate::rules::Confidence::Certain };
    (@experimental $exp:literal) => { $exp };
    (@experimental) => { false };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeverityValue;

    struct TestRule {
        metadata: RuleMetadata,
        diagnostics_to_return: Vec<Diagnostic>,
    }

    impl TestRule {
        fn new(id: &'static str) -> Self {
            Self {
                metadata: RuleMetadata {
                    id,
                    name: "test-rule",
                    description: "A test rule",
                    severity: Severity::Warning,
                    confidence: Confidence::Certain,
                    experimental: false,
                    examples: None,
                },
                diagnostics_to_return: Vec::new(),
            }
        }

        fn with_name(mut self, name: &'static str) -> Self {
            self.metadata.name = name;
            self
        }

        fn with_severity(mut self, severity: Severity) -> Self {
            self.metadata.severity = severity;
            self
        }

        fn inconclusive(mut self) -> Self {
            self.metadata.confidence = Confidence::Inconclusive;
            self
        }

        fn experimental(mut self) -> Self {
            self.metadata.experimental = true;
            self
        }

        fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
            self.diagnostics_to_return.push(diagnostic);
            self
        }
    }

    impl Rule for TestRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn check(&self, _file: &ParsedFile) -> Vec<Diagnostic> {
            self.diagnostics_to_return.clone()
        }
    }

    fn empty_file() -> ParsedFile {
        ParsedFile::from_source("test.cpp", "int x;\n")
    }

    #[test]
    fn rule_has_required_metadata() {
        let rule = TestRule::new("T001");
        let metadata = rule.metadata();

        assert_eq!(metadata.id, "T001");
        assert_eq!(metadata.name, "test-rule");
        assert_eq!(metadata.severity, Severity::Warning);
        assert_eq!(metadata.confidence, Confidence::Certain);
        assert!(!metadata.experimental);
        assert!(metadata.examples.is_none());
    }

    #[test]
    fn run_all_collects_diagnostics() {
        let mut registry = RuleRegistry::new();

        let diag1 = Diagnostic::new("T001", Severity::Warning, "Issue 1", "test.cpp", 1, 1);
        let diag2 = Diagnostic::new("T002", Severity::Error, "Issue 2", "test.cpp", 2, 1);

        registry.register(Box::new(TestRule::new("T001").with_diagnostic(diag1)));
        registry.register(Box::new(
            TestRule::new("T002")
                .with_severity(Severity::Error)
                .with_diagnostic(diag2),
        ));

        let diagnostics = registry.run_all(&empty_file());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].rule_id, "T001");
        assert_eq!(diagnostics[1].rule_id, "T002");
    }

    #[test]
    fn inconclusive_rules_are_skipped_by_default() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").inconclusive()));

        assert!(!registry.is_rule_enabled("T001"));

        registry.configure(&ChecksConfig {
            inconclusive: Some(true),
            ..Default::default()
        });
        assert!(registry.is_rule_enabled("T001"));
    }

    #[test]
    fn experimental_rules_require_opt_in() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").experimental()));

        assert!(!registry.is_rule_enabled("T001"));

        registry.configure(&ChecksConfig {
            experimental: Some(true),
            ..Default::default()
        });
        assert!(registry.is_rule_enabled("T001"));
    }

    #[test]
    fn severity_toggles_gate_rules() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(
            TestRule::new("T001")
                .with_name("style-rule")
                .with_severity(Severity::Style),
        ));
        registry.register(Box::new(TestRule::new("T002").with_name("warning-rule")));
        registry.register(Box::new(
            TestRule::new("T003")
                .with_name("error-rule")
                .with_severity(Severity::Error),
        ));

        registry.configure(&ChecksConfig {
            style: Some(false),
            warning: Some(false),
            ..Default::default()
        });

        assert!(!registry.is_rule_enabled("T001"));
        assert!(!registry.is_rule_enabled("T002"));
        assert!(registry.is_rule_enabled("T003"));
    }

    #[test]
    fn rules_disabled_by_id_or_name() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("first")));
        registry.register(Box::new(TestRule::new("T002").with_name("second")));

        registry.configure(&ChecksConfig {
            disabled: vec!["T001".to_string(), "second".to_string()],
            ..Default::default()
        });

        assert!(!registry.is_rule_enabled("first"));
        assert!(!registry.is_rule_enabled("T002"));
    }

    #[test]
    fn severity_override_rewrites_diagnostics() {
        let mut registry = RuleRegistry::new();
        let diag = Diagnostic::new("T001", Severity::Warning, "Issue", "test.cpp", 1, 1);
        registry.register(Box::new(
            TestRule::new("T001")
                .with_name("overridden")
                .with_diagnostic(diag),
        ));

        let mut severity = HashMap::new();
        severity.insert("overridden".to_string(), SeverityValue::Error);
        registry.configure(&ChecksConfig {
            severity,
            ..Default::default()
        });

        let diagnostics = registry.run_all(&empty_file());
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn registry_lookup_by_id_and_name() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001").with_name("first")));

        assert_eq!(registry.get_rule("T001").map(|r| r.metadata().name), Some("first"));
        assert!(registry.get_rule_by_name("first").is_some());
        assert!(registry.get_rule("UNKNOWN").is_none());
        assert!(!registry.is_rule_enabled("UNKNOWN"));
    }

    #[test]
    fn registry_len_returns_count() {
        let mut registry = RuleRegistry::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());

        registry.register(Box::new(TestRule::new("T001")));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn severity_renders_lowercase() {
        assert_eq!(Severity::Style.to_string(), "style");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn confidence_default_is_certain() {
        assert_eq!(Confidence::default(), Confidence::Certain);
    }
}
