//! Delta reduction of a source file around one finding
//!
//! The reducer blanks lines rather than deleting them, so the finding keeps
//! its line number for the whole run. Only lines whose removal still lets the
//! oracle reproduce the finding stay blank.

use anyhow::Result;
use boolcheck_core::analysis::AnalysisEngine;
use boolcheck_core::config::{ChecksConfig, Config};
use boolcheck_core::parser::ParsedFile;

/// Answers whether a candidate source still produces the finding.
pub trait Oracle {
    fn reproduces(&self, source: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Oracle for F {
    fn reproduces(&self, source: &str) -> bool {
        self(source)
    }
}

/// Runs every rule, inconclusive and experimental ones included, and looks
/// for any finding on `line`.
pub struct EngineOracle {
    engine: AnalysisEngine,
    filename: String,
    line: usize,
}

impl EngineOracle {
    pub fn new(filename: &str, line: usize) -> Self {
        let config = Config {
            checks: ChecksConfig::all(),
            ..Default::default()
        };
        Self {
            engine: AnalysisEngine::with_config(&config),
            filename: filename.to_string(),
            line,
        }
    }
}

impl Oracle for EngineOracle {
    fn reproduces(&self, source: &str) -> bool {
        let file = ParsedFile::from_source(&self.filename, source);
        self.engine
            .analyze(&file)
            .iter()
            .any(|diagnostic| diagnostic.line == self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Include,
    Declaration,
    Block,
}

/// One removal attempt. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub start: usize,
    pub end: usize,
    pub removed: bool,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = if self.removed { "removed" } else { "kept" };
        match self.kind {
            StepKind::Include => write!(f, "{verb} #include at line {}", self.start),
            StepKind::Declaration => write!(f, "{verb} declaration at line {}", self.start),
            StepKind::Block => write!(
                f,
                "{verb} block of code at lines {}-{}",
                self.start, self.end
            ),
        }
    }
}

pub struct Reducer<O> {
    oracle: O,
    lines: Vec<String>,
    steps: Vec<Step>,
}

impl<O: Oracle> Reducer<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            lines: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Reduces `source` and returns the remaining non-empty lines.
    pub fn reduce(&mut self, source: &str) -> Result<String> {
        if !self.oracle.reproduces(source) {
            anyhow::bail!("Can't reproduce the finding in the original file");
        }

        self.lines = normalize(source);
        self.steps.clear();

        if !self.oracle.reproduces(&self.render(None)) {
            anyhow::bail!("Cleanup failed");
        }

        self.remove_includes();
        self.remove_declarations_and_blocks();

        Ok(self.output())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn output(&self) -> String {
        self.lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| format!("{line}\n"))
            .collect()
    }

    /// Current lines with `blank` (inclusive, 0-based) emptied.
    fn render(&self, blank: Option<(usize, usize)>) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| match blank {
                Some((start, end)) if (start..=end).contains(&i) => "\n".to_string(),
                _ => format!("{line}\n"),
            })
            .collect()
    }

    fn try_blank(&mut self, kind: StepKind, start: usize, end: usize) -> bool {
        let removed = self.oracle.reproduces(&self.render(Some((start, end))));
        if removed {
            for line in &mut self.lines[start..=end] {
                line.clear();
            }
        }

        let step = Step {
            kind,
            start: start + 1,
            end: end + 1,
            removed,
        };
        tracing::debug!("{step}");
        self.steps.push(step);
        removed
    }

    fn remove_includes(&mut self) {
        for i in 0..self.lines.len() {
            if self.lines[i].starts_with("#include") {
                self.try_blank(StepKind::Include, i, i);
            }
        }
    }

    fn remove_declarations_and_blocks(&mut self) {
        for i in 0..self.lines.len() {
            let (first, last) = {
                let line = &self.lines[i];
                match (line.chars().next(), line.chars().last()) {
                    (Some(first), Some(last)) => (first, last),
                    _ => continue,
                }
            };

            if first.is_ascii_alphabetic() && last == ';' {
                self.try_blank(StepKind::Declaration, i, i);
            }

            // Blocks that follow a top-level statement or definition.
            if !first.is_whitespace() && (last == '}' || last == ';') {
                let mut anchor = i;
                while let Some((start, end)) = self.find_block(anchor + 1) {
                    if !self.try_blank(StepKind::Block, start, end) {
                        break;
                    }
                    anchor = end;
                }
            }
        }
    }

    /// A top-level block starting at the first non-empty line from `from`:
    /// a header (possibly spanning several lines when it opens a parameter
    /// list), `{` alone on a line, an indented body and `}` or `};`.
    fn find_block(&self, from: usize) -> Option<(usize, usize)> {
        let lines = &self.lines;
        let len = lines.len();

        let start = (from..len).find(|&i| !lines[i].is_empty())?;
        if start + 2 >= len || !lines[start].starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut header_end = start;
        if lines[start].contains('(') && !lines[start].contains(')') {
            header_end += 1;
            while header_end + 2 < len
                && !lines[header_end].is_empty()
                && !lines[header_end].contains(['(', ')', '{', '}'])
            {
                header_end += 1;
            }
            let closing = &lines[header_end];
            if closing.contains(['(', '{', '}']) || !closing.contains(')') {
                return None;
            }
        }

        if header_end + 2 >= len || lines[header_end + 1] != "{" {
            return None;
        }

        let mut end = header_end + 2;
        while end < len && (lines[end].is_empty() || lines[end].starts_with(char::is_whitespace)) {
            end += 1;
        }

        (end < len && (lines[end] == "}" || lines[end] == "};")).then_some((start, end))
    }
}

/// Canonical line form used while reducing.
pub fn normalize(source: &str) -> Vec<String> {
    let mut in_block_comment = false;

    source
        .lines()
        .map(|raw| {
            let mut line: String = raw
                .chars()
                .map(|c| {
                    if !c.is_ascii() || c.is_ascii_whitespace() {
                        ' '
                    } else {
                        c
                    }
                })
                .collect();

            if in_block_comment {
                match line.find("*/") {
                    Some(end) => {
                        line.replace_range(..end + 2, "");
                        in_block_comment = false;
                    }
                    None => line.clear(),
                }
            }

            while !in_block_comment {
                let Some(start) = line.find("/*") else {
                    break;
                };
                match line[start + 2..].find("*/") {
                    Some(offset) => line.replace_range(start..start + 2 + offset + 2, ""),
                    None => {
                        line.truncate(start);
                        in_block_comment = true;
                    }
                }
            }

            if let Some(start) = line.find("//") {
                line.truncate(start);
            }

            let trimmed = line.trim_start_matches(' ');
            if trimmed.is_empty() {
                return String::new();
            }
            if trimmed.starts_with('#') {
                line = trimmed.to_string();
            }

            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reproduces while every `needed` line is still present.
    fn requires<'a>(needed: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
        move |source: &str| {
            needed
                .iter()
                .all(|wanted| source.lines().any(|line| line == *wanted))
        }
    }

    #[test]
    fn normalize_replaces_special_whitespace() {
        assert_eq!(normalize("int\ta;\u{a0}"), vec!["int a;"]);
    }

    #[test]
    fn normalize_strips_comments() {
        let source = "int a; // trailing\nint /* inline */ b;\n/* start\nstill comment\nend */ int c;\n";

        assert_eq!(normalize(source), vec!["int a;", "int  b;", "", "", " int c;"]);
    }

    #[test]
    fn normalize_moves_directives_to_column_zero() {
        assert_eq!(
            normalize("    #include <x>\n   \nint a;   "),
            vec!["#include <x>", "", "int a;"]
        );
    }

    #[test]
    fn block_comment_opening_mid_line_keeps_prefix() {
        assert_eq!(normalize("int a; /* open\nclose */"), vec!["int a;", ""]);
    }

    #[test]
    fn fails_when_original_does_not_reproduce() {
        let mut reducer = Reducer::new(|_: &str| false);

        let err = reducer.reduce("int a;\n").unwrap_err();

        assert!(err.to_string().contains("Can't reproduce"));
    }

    #[test]
    fn fails_when_cleanup_loses_the_finding() {
        let mut reducer = Reducer::new(|source: &str| source.contains("// keep"));

        let err = reducer.reduce("x = 1; // keep\n").unwrap_err();

        assert_eq!(err.to_string(), "Cleanup failed");
    }

    #[test]
    fn removes_unneeded_includes_and_declarations() {
        let source = "#include <a.h>\n#include <b.h>\nint unused;\nbool flag;\nvoid f() { flag++; }\n";
        let mut reducer = Reducer::new(requires(&["#include <b.h>", "bool flag;", "void f() { flag++; }"]));

        let output = reducer.reduce(source).unwrap();

        assert_eq!(output, "#include <b.h>\nbool flag;\nvoid f() { flag++; }\n");
        let removed: Vec<_> = reducer
            .steps()
            .iter()
            .filter(|s| s.removed)
            .map(|s| (s.kind, s.start))
            .collect();
        assert_eq!(
            removed,
            vec![(StepKind::Include, 1), (StepKind::Declaration, 3)]
        );
    }

    #[test]
    fn removes_function_blocks_after_a_definition() {
        let source = "\
int g;
void helper()
{
    g = 1;
}
void other(int a,
           int b)
{
    g = a + b;
}
void target(bool *p)
{
    p = false;
}
";
        let mut reducer = Reducer::new(requires(&["    p = false;"]));

        let output = reducer.reduce(source).unwrap();

        assert_eq!(output, "void target(bool *p)\n{\n    p = false;\n}\n");
        let blocks: Vec<_> = reducer
            .steps()
            .iter()
            .filter(|s| s.kind == StepKind::Block)
            .map(|s| (s.start, s.end, s.removed))
            .collect();
        assert_eq!(blocks, vec![(2, 5, true), (6, 10, true), (11, 14, false)]);
    }

    #[test]
    fn blank_lines_keep_line_numbers_stable() {
        let seen = std::cell::RefCell::new(Vec::new());
        let oracle = |source: &str| {
            seen.borrow_mut().push(source.lines().count());
            source.contains("p = false;")
        };
        let mut reducer = Reducer::new(oracle);

        reducer
            .reduce("#include <x>\nint a;\nvoid f(bool *p) { p = false; }\n")
            .unwrap();

        assert!(seen.borrow().iter().all(|&count| count == 3));
    }

    #[test]
    fn step_display_matches_report_wording() {
        let step = Step {
            kind: StepKind::Block,
            start: 4,
            end: 9,
            removed: false,
        };

        assert_eq!(step.to_string(), "kept block of code at lines 4-9");
    }

    #[test]
    fn engine_oracle_finds_diagnostic_on_line() {
        let oracle = EngineOracle::new("test.cpp", 2);

        assert!(oracle.reproduces("void f(bool *p) {\n    p = false;\n}\n"));
        assert!(!oracle.reproduces("void f(bool *p) {\n\n    p = false;\n}\n"));
    }
}
