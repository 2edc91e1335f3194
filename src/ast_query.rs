//! Pattern engine adapter
//!
//! Wraps Tree-sitter behind a narrow contract so the rest of the crate never
//! touches syntax-tree internals:
//!
//! - [`compile`] turns pattern text into a [`CompiledQuery`] for a grammar
//! - [`SourceParser`] reads and parses a file into a tree
//! - [`CompiledQuery::run`] yields the ordered [`QueryMatch`] list for a tree
//!
//! A compiled query is shared read-only between workers; each worker owns its
//! own [`SourceParser`].
//!
//! ## Example Usage
//!
//! ```rust
//! use tsq::ast_query::{compile, SourceParser};
//! use tsq::parsers::go::Go;
//!
//! # fn example() -> tsq::Result<()> {
//! let query = compile("(function_declaration name: (identifier) @name) @function", &Go)?;
//! let mut parser = SourceParser::new(&Go)?;
//!
//! let source = b"package main\n\nfunc Hello() {}\n";
//! let tree = parser.parse(source).expect("parse");
//! let matches = query.run(&tree, source, "main.go");
//!
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].captures[0].name, "name");
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor, Tree};

use crate::error::{Result, TsqError};
use crate::models::{Capture, Position, Range, QueryMatch};
use crate::parsers::Grammar;

/// A pattern compiled against one grammar
pub struct CompiledQuery {
    query: Query,
}

/// Compile pattern text for a grammar
///
/// # Errors
///
/// Returns [`TsqError::QueryCompile`] when the pattern is malformed or names
/// node kinds or fields the grammar does not have.
pub fn compile(text: &str, grammar: &dyn Grammar) -> Result<CompiledQuery> {
    let query = Query::new(&grammar.language(), text)
        .map_err(|source| TsqError::QueryCompile { source })?;

    log::debug!(
        "Compiled {} query: {} patterns, {} captures",
        grammar.name(),
        query.pattern_count(),
        query.capture_names().len()
    );

    Ok(CompiledQuery { query })
}

impl CompiledQuery {
    /// Number of top-level patterns
    pub fn pattern_count(&self) -> usize {
        self.query.pattern_count()
    }

    /// Run the query over a parsed tree
    ///
    /// Matches come back in the engine's order. Text predicates such as
    /// `#eq?` and `#match?` are applied by the engine.
    pub fn run(&self, tree: &Tree, source: &[u8], display_path: &str) -> Vec<QueryMatch> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source);

        let mut out = Vec::new();
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|cap| Capture {
                    name: names[cap.index as usize].to_string(),
                    node_type: cap.node.kind().to_string(),
                    text: node_text(&cap.node, source),
                    range: node_range(&cap.node),
                })
                .collect();

            out.push(QueryMatch {
                file: display_path.to_string(),
                pattern: m.pattern_index,
                captures,
            });
        }

        log::trace!("{}: {} matches", display_path, out.len());
        out
    }
}

/// A Tree-sitter parser bound to one grammar
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new(grammar: &dyn Grammar) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language())
            .map_err(|source| TsqError::InvalidGrammar {
                language: grammar.name().to_string(),
                source,
            })?;
        Ok(Self { parser })
    }

    /// Parse source bytes; `None` when the engine gives up
    pub fn parse(&mut self, source: &[u8]) -> Option<Tree> {
        self.parser.parse(source, None)
    }

    /// Read and parse a file, returning the tree with the bytes it was built from
    pub fn parse_file(&mut self, path: &Path) -> Result<(Tree, Vec<u8>)> {
        let source = std::fs::read(path).map_err(|source| TsqError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let tree = self.parse(&source).ok_or_else(|| TsqError::Parse {
            path: path.to_path_buf(),
        })?;

        Ok((tree, source))
    }
}

/// Convert a node's span to 1-based positions
pub fn node_range(node: &Node) -> Range {
    let start = node.start_position();
    let end = node.end_position();
    Range::new(
        Position::new(start.row + 1, start.column + 1),
        Position::new(end.row + 1, end.column + 1),
    )
}

fn node_text(node: &Node, source: &[u8]) -> String {
    String::from_utf8_lossy(&source[node.byte_range()]).into_owned()
}
