//! Language bindings for tsq
//!
//! A binding pairs a Tree-sitter grammar with the built-in queries (symbols,
//! outline, refs) written against that grammar's node kinds. Bindings are
//! collected in an explicit [`LanguageRegistry`] which callers construct and
//! hand to the query engine; there is no process-wide registry.

pub mod go;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, TsqError};

/// A language binding: grammar plus embedded queries
///
/// Capture names used by the built-in queries are the contract with
/// [`crate::projector`]; see that module for the names it understands.
pub trait Grammar: Send + Sync {
    /// Language identifier (e.g. "go")
    fn name(&self) -> &'static str;

    /// File extensions, lowercase and without the leading dot
    fn extensions(&self) -> &'static [&'static str];

    /// The Tree-sitter grammar
    fn language(&self) -> tree_sitter::Language;

    /// Query used by `symbols`
    fn symbols_query(&self) -> &'static str;

    /// Query used by `outline`
    fn outline_query(&self) -> &'static str;

    /// Query used by `refs`
    fn refs_query(&self) -> &'static str;

    /// Example patterns shown by `tsq example-queries`
    fn example_queries(&self) -> &'static str {
        ""
    }
}

/// Registry of language bindings, keyed by name
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    grammars: BTreeMap<&'static str, Arc<dyn Grammar>>,
}

impl LanguageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every bundled language
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(go::Go);
        registry
    }

    /// Add a binding, replacing any binding registered under the same name
    pub fn register(&mut self, grammar: impl Grammar + 'static) {
        let grammar: Arc<dyn Grammar> = Arc::new(grammar);
        if self.grammars.insert(grammar.name(), Arc::clone(&grammar)).is_some() {
            log::debug!("Replaced language binding '{}'", grammar.name());
        }
    }

    /// Look up a binding by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Grammar>> {
        self.grammars
            .get(name)
            .cloned()
            .ok_or_else(|| TsqError::UnknownLanguage(name.to_string()))
    }

    /// Registered language names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        self.grammars.keys().copied().collect()
    }

    /// Iterate over registered bindings in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Grammar>> {
        self.grammars.values()
    }

    /// Find the binding that claims a file extension (case-insensitive, dot optional)
    pub fn by_extension(&self, ext: &str) -> Option<Arc<dyn Grammar>> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.grammars
            .values()
            .find(|g| g.extensions().contains(&ext.as_str()))
            .cloned()
    }

    /// Find the binding for a path by its extension
    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn Grammar>> {
        let ext = path.extension()?.to_str()?;
        self.by_extension(ext)
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.names())
            .finish()
    }
}
