//! Inline disable comment directives for suppressing diagnostics
//!
//! Supported forms, with either comment style:
//! - `// boolcheck-disable-next-line B001` - disable B001 for the next line
//! - `// boolcheck-disable-line B001` - disable B001 for the current line
//! - `/* boolcheck-disable-line */` - disable all rules for the current line
//! - `// boolcheck-disable-next-line B001, compare-bool-with-int` - ids and names mix

use std::collections::HashMap;

const NEXT_LINE_DIRECTIVE: &str = "boolcheck-disable-next-line";
const LINE_DIRECTIVE: &str = "boolcheck-disable-line";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableDirective {
    pub line: usize,
    pub rules: Vec<String>,
}

impl DisableDirective {
    pub fn new(line: usize, rules: Vec<String>) -> Self {
        Self { line, rules }
    }

    pub fn for_all_rules(line: usize) -> Self {
        Self {
            line,
            rules: Vec::new(),
        }
    }

    pub fn disables_all(&self) -> bool {
        self.rules.is_empty()
    }

    /// `rule_ref` may be either a rule id or a rule name.
    pub fn disables_rule(&self, rule_ref: &str) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|r| r == rule_ref)
    }

    fn merge(&mut self, other: DisableDirective) {
        if self.disables_all() || other.disables_all() {
            self.rules.clear();
        } else {
            self.rules.extend(other.rules);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisableDirectives {
    by_line: HashMap<usize, DisableDirective>,
}

impl DisableDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &str) -> Self {
        let mut directives = Self::new();

        for (line_idx, line) in source.lines().enumerate() {
            let line_num = line_idx + 1;

            let Some(comment) = comment_text(line) else {
                continue;
            };

            if let Some(rest) = comment.strip_prefix(NEXT_LINE_DIRECTIVE) {
                directives.add(DisableDirective::new(line_num + 1, parse_rule_refs(rest)));
            } else if let Some(rest) = comment.strip_prefix(LINE_DIRECTIVE) {
                directives.add(DisableDirective::new(line_num, parse_rule_refs(rest)));
            }
        }

        directives
    }

    pub fn add(&mut self, directive: DisableDirective) {
        match self.by_line.get_mut(&directive.line) {
            Some(existing) => existing.merge(directive),
            None => {
                self.by_line.insert(directive.line, directive);
            }
        }
    }

    pub fn is_disabled(&self, line: usize, rule_ref: &str) -> bool {
        self.by_line
            .get(&line)
            .is_some_and(|d| d.disables_rule(rule_ref))
    }

    pub fn directives(&self) -> impl Iterator<Item = &DisableDirective> {
        self.by_line.values()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }
}

fn comment_text(line: &str) -> Option<&str> {
    if let Some(start) = line.find("//") {
        return Some(line[start + 2..].trim());
    }

    let start = line.find("/*")?;
    let body = &line[start + 2..];
    let body = body.find("*/").map_or(body, |end| &body[..end]);
    Some(body.trim())
}

fn parse_rule_refs(rest: &str) -> Vec<String> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
