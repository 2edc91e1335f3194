//! Query engine: the four tsq operations
//!
//! Each operation resolves its defaults, picks the grammar, compiles its
//! query (failing before any file is touched), selects the file set and runs
//! the dispatcher with a projection from [`crate::projector`].
//!
//! Results carry no cross-file ordering; callers that need stable output sort.

use std::path::PathBuf;
use std::sync::Arc;

use crate::ast_query::{compile, SourceParser};
use crate::dispatcher::dispatch;
use crate::error::{Result, TsqError};
use crate::models::{FileJob, FileOutline, QueryMatch, RefsResult, SymbolsResult, VisibilityFilter};
use crate::parsers::{Grammar, LanguageRegistry};
use crate::projector::{build_outline, extract_symbols, find_references, SymbolOptions};
use crate::scanner::{self, ScanConfig, DEFAULT_MAX_BYTES};

/// Language used when none is given
pub const DEFAULT_LANGUAGE: &str = "go";

/// Source lines kept per symbol by `symbols`
pub const DEFAULT_SYMBOL_SOURCE_LINES: usize = 10;

/// Source lines kept per symbol by `outline`
pub const DEFAULT_OUTLINE_SOURCE_LINES: usize = 5;

/// Which files an operation runs over, and how hard to work
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// Root directory to scan (default ".")
    pub path: Option<PathBuf>,
    /// Single file; takes precedence over `path` and bypasses discovery
    pub file: Option<PathBuf>,
    /// Language name (default "go")
    pub language: Option<String>,
    /// Worker count; 0 means one per CPU, negative clamps to 1
    pub jobs: isize,
    /// Byte ceiling for discovered files; `Some(0)` disables it
    pub max_bytes: Option<u64>,
    /// Honor .gitignore during discovery
    pub respect_gitignore: bool,
    /// Directory names pruned in addition to the built-in set
    pub extra_ignore_dirs: Vec<String>,
}

/// Options for [`QueryEngine::query`]
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Pattern text
    pub query: String,
    pub target: Target,
}

/// Options for [`QueryEngine::symbols`]
#[derive(Debug, Clone, Default)]
pub struct SymbolsOptions {
    pub target: Target,
    pub visibility: VisibilityFilter,
    pub include_source: bool,
    /// Lines of source kept per symbol (default 10, 0 = all)
    pub max_source_lines: Option<usize>,
}

/// Options for [`QueryEngine::outline`]
#[derive(Debug, Clone, Default)]
pub struct OutlineOptions {
    pub file: Option<PathBuf>,
    pub language: Option<String>,
    pub include_source: bool,
    /// Lines of source kept per symbol (default 5, 0 = all)
    pub max_source_lines: Option<usize>,
}

/// Options for [`QueryEngine::refs`]
#[derive(Debug, Clone, Default)]
pub struct RefsOptions {
    /// Search term, matched exactly against capture text
    pub symbol: String,
    pub include_context: bool,
    pub target: Target,
}

/// Runs tsq operations against a language registry
#[derive(Debug, Clone)]
pub struct QueryEngine {
    registry: LanguageRegistry,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(LanguageRegistry::with_defaults())
    }
}

impl QueryEngine {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Raw matches of a caller-supplied pattern
    pub fn query(&self, opts: &QueryOptions) -> Result<Vec<QueryMatch>> {
        if opts.query.trim().is_empty() {
            return Err(TsqError::MissingQuery);
        }

        let grammar = self.grammar(opts.target.language.as_deref())?;
        let query = compile(&opts.query, grammar.as_ref())?;
        let files = self.collect_files(grammar.as_ref(), &opts.target)?;

        log::info!("query: {} files, {} patterns", files.len(), query.pattern_count());

        let matches = dispatch(
            grammar.as_ref(),
            &query,
            &files,
            resolve_jobs(opts.target.jobs),
            |_, matches, _| matches,
        )?;

        log::info!("query: {} matches", matches.len());
        Ok(matches)
    }

    /// Symbols per file; files without symbols are left out
    pub fn symbols(&self, opts: &SymbolsOptions) -> Result<Vec<SymbolsResult>> {
        let grammar = self.grammar(opts.target.language.as_deref())?;
        let query = compile(grammar.symbols_query(), grammar.as_ref())?;
        let files = self.collect_files(grammar.as_ref(), &opts.target)?;

        let symbol_opts = SymbolOptions {
            visibility: opts.visibility,
            include_source: opts.include_source,
            max_source_lines: opts.max_source_lines.unwrap_or(DEFAULT_SYMBOL_SOURCE_LINES),
        };

        log::info!("symbols: {} files, visibility={}", files.len(), opts.visibility);

        let results = dispatch(
            grammar.as_ref(),
            &query,
            &files,
            resolve_jobs(opts.target.jobs),
            |job, matches, _| {
                let symbols = extract_symbols(&matches, &symbol_opts);
                if symbols.is_empty() {
                    Vec::new()
                } else {
                    vec![SymbolsResult {
                        file: job.display_path.clone(),
                        symbols,
                    }]
                }
            },
        )?;

        log::info!("symbols: {} files with symbols", results.len());
        Ok(results)
    }

    /// Structural outline of a single file
    ///
    /// Runs synchronously. Read and parse failures are returned rather than
    /// skipped since the file is the whole unit of work.
    pub fn outline(&self, opts: &OutlineOptions) -> Result<FileOutline> {
        let file = opts.file.as_deref().ok_or(TsqError::MissingFile)?;
        let grammar = self.grammar(opts.language.as_deref())?;
        let query = compile(grammar.outline_query(), grammar.as_ref())?;

        let job = scanner::single(file)?;
        let mut parser = SourceParser::new(grammar.as_ref())?;
        let (tree, source) = parser.parse_file(&job.abs_path)?;
        let matches = query.run(&tree, &source, &job.display_path);

        let outline = build_outline(
            &job.display_path,
            &matches,
            opts.include_source,
            opts.max_source_lines.unwrap_or(DEFAULT_OUTLINE_SOURCE_LINES),
        );

        log::info!(
            "outline: {} ({} imports, {} symbols)",
            outline.file,
            outline.imports.len(),
            outline.symbols.len()
        );
        Ok(outline)
    }

    /// Every place the search term appears in a capture of the refs query
    pub fn refs(&self, opts: &RefsOptions) -> Result<RefsResult> {
        if opts.symbol.is_empty() {
            return Err(TsqError::MissingSymbol);
        }

        let grammar = self.grammar(opts.target.language.as_deref())?;
        let query = compile(grammar.refs_query(), grammar.as_ref())?;
        let files = self.collect_files(grammar.as_ref(), &opts.target)?;

        log::info!("refs: '{}' across {} files", opts.symbol, files.len());

        let references = dispatch(
            grammar.as_ref(),
            &query,
            &files,
            resolve_jobs(opts.target.jobs),
            |job, matches, source| {
                find_references(
                    &job.display_path,
                    &matches,
                    source,
                    &opts.symbol,
                    opts.include_context,
                )
            },
        )?;

        log::info!("refs: {} references", references.len());
        Ok(RefsResult {
            symbol: opts.symbol.clone(),
            references,
        })
    }

    fn grammar(&self, language: Option<&str>) -> Result<Arc<dyn Grammar>> {
        self.registry.get(language.unwrap_or(DEFAULT_LANGUAGE))
    }

    fn collect_files(&self, grammar: &dyn Grammar, target: &Target) -> Result<Vec<FileJob>> {
        if let Some(file) = &target.file {
            return Ok(vec![scanner::single(file)?]);
        }

        let root = target.path.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut config = ScanConfig::for_extensions(grammar.extensions().iter().copied());
        config.max_bytes = target.max_bytes.unwrap_or(DEFAULT_MAX_BYTES);
        config.respect_gitignore = target.respect_gitignore;
        config.ignore_dirs.extend(target.extra_ignore_dirs.iter().cloned());

        scanner::discover(&root, &config)
    }
}

/// 0 means one worker per CPU
fn resolve_jobs(jobs: isize) -> isize {
    if jobs == 0 {
        isize::try_from(num_cpus::get()).unwrap_or(1)
    } else {
        jobs
    }
}
