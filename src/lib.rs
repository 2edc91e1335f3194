//! tsq: structural code queries for AI agents
//!
//! tsq runs Tree-sitter queries over source files and projects the raw
//! matches into typed, JSON-serializable records: a symbol catalog, per-file
//! outlines and a reference index. Every run is stateless and starts from a
//! fresh file scan.
//!
//! # Architecture
//!
//! - **Scanner**: discovers files, pruning ignored directories and oversized files
//! - **Dispatcher**: parses and matches files on a bounded worker pool
//! - **Projector**: classifies capture sets into symbols, outlines and references
//! - **Query Engine**: resolves defaults and ties the pieces together
//!
//! # Example Usage
//!
//! ```no_run
//! use tsq::{LanguageRegistry, QueryEngine, SymbolsOptions};
//!
//! let engine = QueryEngine::new(LanguageRegistry::with_defaults());
//! let results = engine.symbols(&SymbolsOptions::default()).unwrap();
//!
//! for file in results {
//!     println!("{}: {} symbols", file.file, file.symbols.len());
//! }
//! ```

pub mod ast_query;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod projector;
pub mod query;
pub mod scanner;

// Re-export commonly used types
pub use error::{Result, TsqError};
pub use models::{
    Capture, FileJob, FileOutline, ImportInfo, Position, QueryMatch, Range, Reference,
    ReferenceKind, RefsResult, Symbol, SymbolKind, SymbolsResult, Visibility, VisibilityFilter,
};
pub use parsers::{Grammar, LanguageRegistry};
pub use query::{OutlineOptions, QueryEngine, QueryOptions, RefsOptions, SymbolsOptions, Target};
