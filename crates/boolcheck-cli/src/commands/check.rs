//! Check command - analyzes C/C++ files for boolean misuse

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use boolcheck_core::analysis::AnalysisEngine;
use boolcheck_core::config::{Config, load_config_or_default_with_warnings};
use boolcheck_core::diagnostic::Diagnostic;
use boolcheck_core::parser::ParsedFile;
use boolcheck_core::rules::Severity;
use clap::Args;
use colored::Colorize;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::output::json::JsonFormatter;
use crate::output::text::TextFormatter;

const SUPPORTED_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx"];

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to file or directory to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format for diagnostics (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Report findings that may be false positives
    #[arg(long)]
    pub inconclusive: bool,

    /// Run experimental rules
    #[arg(long)]
    pub experimental: bool,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let config = self.load_config();
        let files = discover_files(&self.path, &config.exclude)?;

        if files.is_empty() {
            println!("No C/C++ files found.");
            return Ok(());
        }

        let engine = AnalysisEngine::with_config(&config);
        let diagnostics = analyze_files(&engine, &files);

        match self.format.as_str() {
            "json" => {
                let formatter = JsonFormatter::with_registry(engine.registry());
                println!(
                    "{}",
                    formatter.format(&diagnostics, files.len(), &self.path.to_string_lossy())
                );
            }
            "text" => print!("{}", TextFormatter::new().format(&diagnostics)),
            other => anyhow::bail!("Invalid format '{}'. Valid values: text, json", other),
        }

        if self.should_fail(&diagnostics) {
            process::exit(1);
        }

        Ok(())
    }

    fn load_config(&self) -> Config {
        let result = load_config_or_default_with_warnings(&self.path);
        for warning in &result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }

        let mut config = result.config;
        if self.inconclusive {
            config.checks.inconclusive = Some(true);
        }
        if self.experimental {
            config.checks.experimental = Some(true);
        }
        config
    }

    fn should_fail(&self, diagnostics: &[Diagnostic]) -> bool {
        diagnostics.iter().any(|d| match d.severity {
            Severity::Error => true,
            Severity::Warning => self.fail_on_warnings,
            Severity::Style => false,
        })
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }
}

/// Runs the engine over every file in parallel; results keep file order.
pub fn analyze_files(engine: &AnalysisEngine, files: &[PathBuf]) -> Vec<Diagnostic> {
    files
        .par_iter()
        .filter_map(|file| {
            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!(file = %file.display(), "skipping unreadable file: {err}");
                    return None;
                }
            };
            tracing::debug!(file = %file.display(), "analyzing");
            let parsed = ParsedFile::from_source(&file.to_string_lossy(), &content);
            Some(engine.analyze(&parsed))
        })
        .flatten()
        .collect()
}

fn discover_files(path: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        if is_supported_file(path) {
            return Ok(vec![path.to_path_buf()]);
        } else {
            return Ok(vec![]);
        }
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_excluded(e, exclude))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_supported_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    Ok(files)
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(entry: &walkdir::DirEntry, exclude: &[String]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| exclude.iter().any(|excluded| excluded == name))
        .unwrap_or(false)
}
