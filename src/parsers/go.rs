//! Go language binding
//!
//! Queries live next to this file under `queries/go/` and are embedded at
//! compile time. Capture names used:
//! - symbols: `@function`, `@method`, `@type`, `@const`, `@var` plus `@name`,
//!   `@params`, `@result`, `@receiver`, `@type_def`
//! - outline: `@package`, `@path`/`@alias`, `@func_name`, `@method_name`,
//!   `@receiver_type`, `@type_name`, `@const_name`, `@var_name`
//! - refs: `@call`, `@composite_type`, `@short_var`, `@field`, `@type_ref`, `@ident`

use super::Grammar;

const SYMBOLS_QUERY: &str = include_str!("queries/go/symbols.scm");
const OUTLINE_QUERY: &str = include_str!("queries/go/outline.scm");
const REFS_QUERY: &str = include_str!("queries/go/refs.scm");
const EXAMPLE_QUERIES: &str = include_str!("queries/go/examples.txt");

/// The Go binding
#[derive(Debug, Clone, Copy, Default)]
pub struct Go;

impl Grammar for Go {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn symbols_query(&self) -> &'static str {
        SYMBOLS_QUERY
    }

    fn outline_query(&self) -> &'static str {
        OUTLINE_QUERY
    }

    fn refs_query(&self) -> &'static str {
        REFS_QUERY
    }

    fn example_queries(&self) -> &'static str {
        EXAMPLE_QUERIES
    }
}
