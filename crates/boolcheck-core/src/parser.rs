//! Parser module for C and C++ source code
//!
//! Integrates with tree-sitter and the C++ grammar. Both languages go
//! through the C++ grammar, which accepts the C subset the rules care about.

use std::ops::Range;
use std::sync::OnceLock;

use tree_sitter::{Node, Tree};

use crate::disable_comments::DisableDirectives;
use crate::semantic::{ScopeBuilder, SemanticModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Cpp,
}

pub fn detect_language(filename: &str) -> Language {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "c" => Language::C,
        _ => Language::Cpp,
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("failed to load C++ grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

#[derive(Debug)]
pub struct ParseResult {
    pub tree: Option<Tree>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.tree.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub language: Language,
    pub line_count: usize,
    pub has_errors: bool,
}

pub struct ParsedFile {
    source: String,
    metadata: FileMetadata,
    tree: Option<Tree>,
    errors: Vec<ParseError>,
    line_ranges: OnceLock<Vec<Range<usize>>>,
    disable_directives: DisableDirectives,
    semantic: OnceLock<SemanticModel>,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("metadata", &self.metadata)
            .field("has_tree", &self.tree.is_some())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let language = detect_language(filename);
        let parse_result = match Parser::new() {
            Ok(mut parser) => parser.parse(source),
            Err(err) => ParseResult {
                tree: None,
                errors: vec![ParseError {
                    line: 1,
                    column: 1,
                    message: err.to_string(),
                }],
            },
        };
        let disable_directives = DisableDirectives::from_source(source);

        let line_count = if source.is_empty() {
            0
        } else {
            source.lines().count()
        };

        let metadata = FileMetadata {
            filename: filename.to_string(),
            language,
            line_count,
            has_errors: parse_result.has_errors(),
        };

        Self {
            source: source.to_string(),
            metadata,
            tree: parse_result.tree,
            errors: parse_result.errors,
            line_ranges: OnceLock::new(),
            disable_directives,
            semantic: OnceLock::new(),
        }
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// Scopes, declarations and expression roots, built on first use.
    pub fn semantic(&self) -> &SemanticModel {
        self.semantic.get_or_init(|| match &self.tree {
            Some(tree) => ScopeBuilder::build(tree, &self.source),
            None => SemanticModel::empty(),
        })
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn disable_directives(&self) -> &DisableDirectives {
        &self.disable_directives
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 {
            return None;
        }

        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        let index = line_number - 1;

        ranges.get(index).map(|range| &self.source[range.clone()])
    }

    fn build_line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in self.source.char_indices() {
            if c == '\n' {
                ranges.push(start..i);
                start = i + 1;
            }
        }

        if start < self.source.len() || (start == 0 && !self.source.is_empty()) {
            ranges.push(start..self.source.len());
        }

        ranges
    }
}

pub struct Parser {
    inner: tree_sitter::Parser,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl Parser {
    pub fn new() -> Result<Self, ParserError> {
        let mut inner = tree_sitter::Parser::new();
        inner.set_language(&tree_sitter_cpp::LANGUAGE.into())?;
        Ok(Self { inner })
    }

    /// Parses `code`, recovering from syntax errors. The tree is only
    /// missing when the parse was cancelled.
    pub fn parse(&mut self, code: &str) -> ParseResult {
        let Some(tree) = self.inner.parse(code, None) else {
            return ParseResult {
                tree: None,
                errors: vec![ParseError {
                    line: 1,
                    column: 1,
                    message: "parse cancelled".to_string(),
                }],
            };
        };

        let mut errors = Vec::new();
        collect_errors(tree.root_node(), &mut errors);

        ParseResult {
            tree: Some(tree),
            errors,
        }
    }
}

fn collect_errors(root: Node, errors: &mut Vec<ParseError>) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        let point = node.start_position();
        if node.is_error() {
            errors.push(ParseError {
                line: point.row + 1,
                column: point.column + 1,
                message: "syntax error".to_string(),
            });
            continue;
        }
        if node.is_missing() {
            errors.push(ParseError {
                line: point.row + 1,
                column: point.column + 1,
                message: format!("missing `{}`", node.kind()),
            });
            continue;
        }
        if !node.has_error() {
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        pending.extend(children.into_iter().rev());
    }
}
