//! Explain command - provides detailed explanation of a rule

use std::env;

use boolcheck_core::analysis::AnalysisEngine;
use boolcheck_core::config::load_config_or_default_with_warnings;
use boolcheck_core::rules::{Confidence, RuleMetadata, RuleRegistry, Severity};
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "RULE_ID",
        help = "Rule ID to explain (e.g., \"B001\", \"bitwise-on-boolean\")"
    )]
    pub rule_id: String,
}

impl ExplainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let cwd = env::current_dir()?;
        let config = load_config_or_default_with_warnings(&cwd).config;
        let engine = AnalysisEngine::with_config(&config);
        let registry = engine.registry();

        match find_rule(registry, &self.rule_id) {
            Some(metadata) => {
                print!("{}", render(metadata, registry.is_rule_enabled(metadata.id)));
                Ok(())
            }
            None => {
                eprintln!(
                    "{} Unknown rule '{}'",
                    "error:".red().bold(),
                    self.rule_id
                );
                eprintln!();
                eprintln!("Available rules:");
                for rule in registry.rules() {
                    let meta = rule.metadata();
                    eprintln!("  {} ({})", meta.id, meta.name);
                }

                std::process::exit(1);
            }
        }
    }
}

fn find_rule<'a>(registry: &'a RuleRegistry, id_or_name: &str) -> Option<&'a RuleMetadata> {
    registry
        .get_rule(id_or_name)
        .or_else(|| registry.get_rule_by_name(id_or_name))
        .map(|rule| rule.metadata())
}

fn render(metadata: &RuleMetadata, is_enabled: bool) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!("{}\n\n", format!("Rule {}", metadata.id).bold()));
    out.push_str(&format!("  {}: {}\n", "Name".cyan(), metadata.name));
    out.push_str(&format!("  {}: {}\n", "Description".cyan(), metadata.description));
    out.push_str(&format!(
        "  {}: {}\n",
        "Severity".cyan(),
        format_severity(&metadata.severity)
    ));
    if metadata.confidence == Confidence::Inconclusive {
        out.push_str(&format!(
            "  {}: inconclusive (run with --inconclusive)\n",
            "Confidence".cyan()
        ));
    }
    if metadata.experimental {
        out.push_str(&format!(
            "  {}: experimental (run with --experimental)\n",
            "Stage".cyan()
        ));
    }

    if let Some(examples) = metadata.examples {
        out.push('\n');
        out.push_str(&format!("  {}:\n", "Examples".cyan()));
        for line in examples.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }

    out.push('\n');
    let status = if is_enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    out.push_str(&format!("  {}: {}\n\n", "Status".cyan(), status));

    out
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Error => severity.as_str().red().to_string(),
        Severity::Warning => severity.as_str().yellow().to_string(),
        Severity::Style => severity.as_str().cyan().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolcheck_core::config::{ChecksConfig, Config};

    #[test]
    fn explain_known_rule_by_id() {
        let engine = AnalysisEngine::new();

        let metadata = find_rule(engine.registry(), "B003").expect("B003 should exist");

        assert_eq!(metadata.name, "assign-bool-to-pointer");
        assert!(!metadata.description.is_empty());
    }

    #[test]
    fn explain_rule_by_name() {
        let engine = AnalysisEngine::new();

        let metadata = find_rule(engine.registry(), "compare-bool-with-int");

        assert_eq!(metadata.map(|m| m.id), Some("B005"));
    }

    #[test]
    fn explain_unknown_rule_returns_none() {
        let engine = AnalysisEngine::new();

        assert!(find_rule(engine.registry(), "B999").is_none());
    }

    #[test]
    fn render_shows_gating_and_status() {
        colored::control::set_override(false);
        let engine = AnalysisEngine::new();
        let metadata = find_rule(engine.registry(), "B001").unwrap();

        let text = render(metadata, engine.registry().is_rule_enabled("B001"));

        assert!(text.contains("Rule B001"));
        assert!(text.contains("Severity: style"));
        assert!(text.contains("inconclusive (run with --inconclusive)"));
        assert!(text.contains("Status: disabled"));
    }

    #[test]
    fn render_reflects_enabled_experimental_rule() {
        colored::control::set_override(false);
        let engine = AnalysisEngine::with_config(&Config {
            checks: ChecksConfig::all(),
            ..Default::default()
        });
        let metadata = find_rule(engine.registry(), "B007").unwrap();

        let text = render(metadata, engine.registry().is_rule_enabled("B007"));

        assert!(text.contains("experimental (run with --experimental)"));
        assert!(text.contains("Status: enabled"));
    }

    #[test]
    fn every_rule_has_examples() {
        let engine = AnalysisEngine::new();

        for rule in engine.registry().rules() {
            assert!(
                rule.metadata().examples.is_some(),
                "{} has no examples",
                rule.metadata().id
            );
        }
    }
}
