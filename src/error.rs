//! Error types for tsq
//!
//! Configuration and query-compile errors abort a whole invocation before
//! any file is touched. Per-file read and parse failures inside the worker
//! pool never reach this type; they are logged and the file is skipped.

use std::path::PathBuf;

/// Errors surfaced by the tsq library
#[derive(Debug, thiserror::Error)]
pub enum TsqError {
    #[error("query is required")]
    MissingQuery,

    #[error("symbol is required")]
    MissingSymbol,

    #[error("file is required")]
    MissingFile,

    #[error("{0} language not registered")]
    UnknownLanguage(String),

    #[error("failed to load {language} grammar: {source}")]
    InvalidGrammar {
        language: String,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("compile query: {source}")]
    QueryCompile {
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("resolve {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse { path: PathBuf },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, TsqError>;
