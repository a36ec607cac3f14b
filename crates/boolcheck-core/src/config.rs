//! Configuration loading and parsing for boolcheck
//!
//! Provides functionality to load and parse `boolcheck.toml` configuration files.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::rules::Severity;

pub const CONFIG_FILENAME: &str = "boolcheck.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["exclude", "checks"];
const KNOWN_CHECKS_KEYS: &[&str] = &[
    "style",
    "warning",
    "inconclusive",
    "experimental",
    "disabled",
    "severity",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory or file names skipped during discovery.
    pub exclude: Vec<String>,
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChecksConfig {
    pub style: Option<bool>,
    pub warning: Option<bool>,
    pub inconclusive: Option<bool>,
    pub experimental: Option<bool>,
    pub disabled: Vec<String>,
    #[serde(default)]
    pub severity: HashMap<String, SeverityValue>,
}

impl ChecksConfig {
    /// Every check enabled, including inconclusive and experimental ones.
    pub fn all() -> Self {
        Self {
            style: Some(true),
            warning: Some(true),
            inconclusive: Some(true),
            experimental: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityValue {
    Error,
    Warning,
    Style,
}

impl From<SeverityValue> for Severity {
    fn from(value: SeverityValue) -> Self {
        match value {
            SeverityValue::Error => Severity::Error,
            SeverityValue::Warning => Severity::Warning,
            SeverityValue::Style => Severity::Style,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = read_config(path)?;
    parse_config(path, &content)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = read_config(path)?;
    let config = parse_config(path, &content)?;
    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_config(path: &Path, content: &str) -> Result<Config, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    if let Some(toml::Value::Table(checks)) = table.get("checks") {
        let known_checks: HashSet<&str> = KNOWN_CHECKS_KEYS.iter().copied().collect();
        for key in checks.keys() {
            if !known_checks.contains(key.as_str()) {
                warnings.push(format!("Unknown config option in [checks]: '{}'", key));
            }
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => match load_config_with_warnings(&path) {
            Ok(result) => result,
            Err(err) => ConfigResult {
                config: Config::default(),
                warnings: vec![err.to_string()],
            },
        },
        None => ConfigResult::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn load_config_from_file() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
exclude = ["third_party"]

[checks]
style = false
inconclusive = true
disabled = ["B002"]

[checks.severity]
bitwise-on-boolean = "warning"
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.exclude, vec!["third_party"]);
        assert_eq!(config.checks.style, Some(false));
        assert_eq!(config.checks.warning, None);
        assert_eq!(config.checks.inconclusive, Some(true));
        assert_eq!(config.checks.disabled, vec!["B002"]);
        assert_eq!(
            config.checks.severity.get("bitwise-on-boolean"),
            Some(&SeverityValue::Warning)
        );
    }

    #[test]
    fn default_config_when_missing() {
        let dir = create_temp_dir();
        let config = load_config_or_default(dir.path());

        assert_eq!(config, Config::default());
        assert!(config.exclude.is_empty());
        assert!(config.checks.disabled.is_empty());
        assert_eq!(config.checks.experimental, None);
    }

    #[test]
    fn error_on_invalid_toml() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "this is not valid { toml }").unwrap();

        let err = load_config(&config_path).unwrap_err();

        match err {
            ConfigError::ParseError { path, message } => {
                assert_eq!(path, config_path);
                assert!(!message.is_empty());
            }
            _ => panic!("Expected ParseError"),
        }
    }

    #[test]
    fn error_on_missing_file() {
        let dir = create_temp_dir();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn find_config_file_in_parent_directory() {
        let parent = create_temp_dir();
        let child = parent.path().join("src");
        fs::create_dir(&child).unwrap();
        let config_path = parent.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        assert_eq!(find_config_file(&child), Some(config_path));
    }

    #[test]
    fn find_config_file_returns_none_when_not_found() {
        let dir = create_temp_dir();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn severity_values_parse_correctly() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
[checks.severity]
B001 = "error"
B004 = "warning"
B005 = "style"
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.checks.severity.get("B001"), Some(&SeverityValue::Error));
        assert_eq!(config.checks.severity.get("B004"), Some(&SeverityValue::Warning));
        assert_eq!(config.checks.severity.get("B005"), Some(&SeverityValue::Style));
    }

    #[test]
    fn severity_value_converts_to_severity() {
        assert_eq!(Severity::from(SeverityValue::Error), Severity::Error);
        assert_eq!(Severity::from(SeverityValue::Warning), Severity::Warning);
        assert_eq!(Severity::from(SeverityValue::Style), Severity::Style);
    }

    #[test]
    fn unknown_severity_is_a_parse_error() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[checks.severity]\nB001 = \"hint\"\n").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn all_checks_enable_everything() {
        let checks = ChecksConfig::all();

        assert_eq!(checks.inconclusive, Some(true));
        assert_eq!(checks.experimental, Some(true));
        assert!(checks.disabled.is_empty());
    }

    #[test]
    fn config_error_display_is_helpful() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("/path/to/boolcheck.toml"),
            message: "expected `=`".to_string(),
        };

        let msg = format!("{}", err);

        assert!(msg.contains("/path/to/boolcheck.toml"));
        assert!(msg.contains("expected `=`"));
    }

    #[test]
    fn warns_on_unknown_top_level_option() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "exclude = [\"build\"]\nunknown_option = true\n").unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert_eq!(result.config.exclude, vec!["build"]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("unknown_option"));
    }

    #[test]
    fn warns_on_unknown_checks_option() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[checks]\nportability = true\n").unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("portability"));
        assert!(result.warnings[0].contains("[checks]"));
    }

    #[test]
    fn no_warnings_for_valid_config() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
exclude = ["vendor"]

[checks]
style = true
warning = true
inconclusive = false
experimental = true
disabled = ["compare-bool-with-int"]

[checks.severity]
B003 = "warning"
"#,
        )
        .unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert!(result.warnings.is_empty());
    }

    #[test]
    fn invalid_config_is_reported_as_warning_when_defaulting() {
        let dir = create_temp_dir();
        fs::write(dir.path().join(CONFIG_FILENAME), "[checks\n").unwrap();

        let result = load_config_or_default_with_warnings(dir.path());

        assert_eq!(result.config, Config::default());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Invalid TOML"));
    }

    #[test]
    fn load_config_or_default_with_warnings_returns_empty_when_no_config() {
        let dir = create_temp_dir();

        let result = load_config_or_default_with_warnings(dir.path());

        assert_eq!(result.config, Config::default());
        assert!(result.warnings.is_empty());
    }
}
