//! Core data models for tsq
//!
//! These structures are the normalized output format that tsq hands to AI
//! agents and other programmatic consumers. Optional fields are omitted from
//! the JSON form when they carry nothing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

/// A location in a source file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, counted in bytes)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A span in a source file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A single named capture within a query match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capture {
    /// Capture name as written in the pattern (without the leading `@`)
    pub name: String,
    /// Grammar node kind of the captured node (e.g. `struct_type`)
    pub node_type: String,
    /// Source text covered by the node
    pub text: String,
    pub range: Range,
}

/// One application of a query pattern at one tree location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryMatch {
    /// Display path of the file the match came from
    pub file: String,
    /// Index of the sub-pattern that fired
    pub pattern: usize,
    pub captures: Vec<Capture>,
}

/// Type of symbol found in code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Struct,
    Interface,
    Type,
    Const,
    Var,
}

/// Naming-convention visibility (leading upper-case letter means exported)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Visibility filter applied to symbol results
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisibilityFilter {
    #[default]
    All,
    Public,
    Private,
}

impl VisibilityFilter {
    /// Whether a symbol with the given visibility passes this filter
    pub fn allows(self, visibility: Visibility) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Public => visibility == Visibility::Public,
            VisibilityFilter::Private => visibility == Visibility::Private,
        }
    }
}

/// A code symbol (function, method, type, constant, variable)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    /// Display path of the defining file
    pub file: String,
    pub range: Range,
    /// Function or method signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Declaration source, possibly truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// For methods: the bare receiver type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Documentation comment, when the pattern captures one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// An import statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportInfo {
    /// Import path without surrounding quotes
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Structural overview of a single file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileOutline {
    pub file: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<ImportInfo>,
    pub symbols: Vec<Symbol>,
}

/// Symbols extracted from one file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolsResult {
    pub file: String,
    pub symbols: Vec<Symbol>,
}

/// How a symbol is used at a reference site
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceKind {
    Call,
    TypeRef,
    FieldAccess,
    Identifier,
    /// Catch-all for capture names without a dedicated kind
    Reference,
}

/// A usage of a symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    /// The search term, verbatim
    pub symbol: String,
    pub kind: ReferenceKind,
    pub file: String,
    pub position: Position,
    /// Trimmed source line containing the reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// References found for one search term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefsResult {
    pub symbol: String,
    pub references: Vec<Reference>,
}

/// A file queued for processing
///
/// Created by the scanner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileJob {
    pub abs_path: PathBuf,
    /// Path shown in results (root-relative, `/`-separated)
    pub display_path: String,
}

impl FileJob {
    pub fn new(abs_path: impl Into<PathBuf>, display_path: impl Into<String>) -> Self {
        Self {
            abs_path: abs_path.into(),
            display_path: display_path.into(),
        }
    }
}
