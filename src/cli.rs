//! CLI argument parsing and command handlers

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Config, Defaults};
use crate::models::VisibilityFilter;
use crate::output;
use crate::parsers::LanguageRegistry;
use crate::query::{OutlineOptions, QueryEngine, QueryOptions, RefsOptions, SymbolsOptions, Target};

/// tsq: structural code queries for AI agents
#[derive(Parser, Debug)]
#[command(
    name = "tsq",
    version,
    about = "Query code structure with tree-sitter and get JSON back",
    long_about = "tsq runs tree-sitter queries over source files and projects the matches \
                  into symbols, file outlines and references, printed as JSON. \
                  Designed for AI coding agents and scripts."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ./.tsq.toml, then the user config dir)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which files to run over
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Run on a single file instead of scanning
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Language (inferred from --file when omitted, else go)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'j', long, allow_negative_numbers = true)]
    pub jobs: Option<isize>,

    /// Skip files larger than this many bytes (0 = no limit, default 2 MiB)
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a raw tree-sitter query and print every match
    ///
    /// Examples:
    ///   tsq query -q '(function_declaration name: (identifier) @name)'
    ///   tsq query --query-file funcs.scm --path ./pkg
    Query {
        /// Query pattern text
        #[arg(short, long, conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Option<String>,

        /// Read the query pattern from a file
        #[arg(long, value_name = "FILE")]
        query_file: Option<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// List functions, methods, types, constants and variables
    ///
    /// Examples:
    ///   tsq symbols --path .
    ///   tsq symbols --visibility public --include-source
    Symbols {
        #[command(flatten)]
        target: TargetArgs,

        /// Filter by visibility: all, public, private
        #[arg(long, default_value = "all")]
        visibility: VisibilityFilter,

        /// Include declaration source
        #[arg(long)]
        include_source: bool,

        /// Lines of source to keep per symbol (0 or negative = all, default 10)
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        max_source_lines: Option<isize>,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Show the package, imports and declarations of one file
    ///
    /// Examples:
    ///   tsq outline -f server.go
    Outline {
        /// File to outline
        #[arg(short = 'f', long, value_name = "FILE")]
        file: PathBuf,

        /// Language (inferred from the file extension when omitted)
        #[arg(long, value_name = "LANG")]
        lang: Option<String>,

        /// Include declaration source
        #[arg(long)]
        include_source: bool,

        /// Lines of source to keep per symbol (0 or negative = all, default 5)
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        max_source_lines: Option<isize>,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Find references to a symbol by name
    ///
    /// Examples:
    ///   tsq refs -s NewServer
    ///   tsq refs -s Config --path ./internal --no-context
    Refs {
        /// Symbol name to search for (exact match)
        #[arg(short, long)]
        symbol: String,

        /// Omit the source line of each reference
        #[arg(long)]
        no_context: bool,

        #[command(flatten)]
        target: TargetArgs,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Print example query patterns (grep-friendly)
    ///
    /// Examples:
    ///   tsq example-queries | grep struct
    ExampleQueries {
        /// Language to show examples for
        #[arg(long, value_name = "LANG")]
        lang: Option<String>,
    },

    /// List supported languages and their extensions
    Languages {
        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
}

impl Cli {
    /// Execute the parsed command
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        let config = Config::load(self.config.as_deref())?;
        if let Some(path) = &config.source {
            log::info!("Using config {}", path.display());
        }
        let engine = QueryEngine::new(LanguageRegistry::with_defaults());

        match self.command {
            Command::Query { query, query_file, target, compact } => {
                handle_query(&engine, &config.defaults, query, query_file, target, compact)
            }
            Command::Symbols { target, visibility, include_source, max_source_lines, compact } => {
                handle_symbols(
                    &engine,
                    &config.defaults,
                    target,
                    visibility,
                    include_source,
                    source_line_limit(max_source_lines),
                    compact,
                )
            }
            Command::Outline { file, lang, include_source, max_source_lines, compact } => {
                handle_outline(
                    &engine,
                    &config.defaults,
                    file,
                    lang,
                    include_source,
                    source_line_limit(max_source_lines),
                    compact,
                )
            }
            Command::Refs { symbol, no_context, target, compact } => {
                handle_refs(&engine, &config.defaults, symbol, no_context, target, compact)
            }
            Command::ExampleQueries { lang } => handle_example_queries(&engine, &config.defaults, lang),
            Command::Languages { compact } => handle_languages(&engine, compact),
        }
    }
}

/// Non-positive line limits mean "keep everything"
fn source_line_limit(flag: Option<isize>) -> Option<usize> {
    flag.map(|n| usize::try_from(n).unwrap_or(0))
}

/// Explicit flag, then the file's extension, then the config default
fn resolve_language(
    registry: &LanguageRegistry,
    defaults: &Defaults,
    lang: Option<String>,
    file: Option<&Path>,
) -> Option<String> {
    lang.or_else(|| {
        file.and_then(|f| registry.for_path(f))
            .map(|g| g.name().to_string())
    })
    .or_else(|| defaults.language.clone())
}

/// Merge CLI flags over config defaults
fn build_target(registry: &LanguageRegistry, defaults: &Defaults, args: TargetArgs) -> Target {
    let language = resolve_language(registry, defaults, args.lang, args.file.as_deref());
    Target {
        path: args.path,
        file: args.file,
        language,
        jobs: args.jobs.or(defaults.jobs).unwrap_or(0),
        max_bytes: args.max_bytes.or(defaults.max_bytes),
        respect_gitignore: defaults.respect_gitignore.unwrap_or(false),
        extra_ignore_dirs: defaults.ignore_dirs.clone(),
    }
}

fn handle_query(
    engine: &QueryEngine,
    defaults: &Defaults,
    query: Option<String>,
    query_file: Option<PathBuf>,
    target: TargetArgs,
    compact: bool,
) -> Result<()> {
    let query = match (query, query_file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read query file: {}", path.display()))?,
        _ => bail!("exactly one of --query or --query-file is required"),
    };

    let opts = QueryOptions {
        query,
        target: build_target(engine.registry(), defaults, target),
    };

    let mut matches = engine.query(&opts)?;
    matches.sort_by(|a, b| a.file.cmp(&b.file));
    output::print_json(&matches, compact)
}

fn handle_symbols(
    engine: &QueryEngine,
    defaults: &Defaults,
    target: TargetArgs,
    visibility: VisibilityFilter,
    include_source: bool,
    max_source_lines: Option<usize>,
    compact: bool,
) -> Result<()> {
    let opts = SymbolsOptions {
        target: build_target(engine.registry(), defaults, target),
        visibility,
        include_source,
        max_source_lines: max_source_lines.or(defaults.max_source_lines),
    };

    let mut results = engine.symbols(&opts)?;
    results.sort_by(|a, b| a.file.cmp(&b.file));
    output::print_json(&results, compact)
}

fn handle_outline(
    engine: &QueryEngine,
    defaults: &Defaults,
    file: PathBuf,
    lang: Option<String>,
    include_source: bool,
    max_source_lines: Option<usize>,
    compact: bool,
) -> Result<()> {
    let language = resolve_language(engine.registry(), defaults, lang, Some(&file));
    let opts = OutlineOptions {
        file: Some(file),
        language,
        include_source,
        max_source_lines: max_source_lines.or(defaults.outline_max_source_lines),
    };

    let outline = engine.outline(&opts)?;
    output::print_json(&outline, compact)
}

fn handle_refs(
    engine: &QueryEngine,
    defaults: &Defaults,
    symbol: String,
    no_context: bool,
    target: TargetArgs,
    compact: bool,
) -> Result<()> {
    let opts = RefsOptions {
        symbol,
        include_context: !no_context,
        target: build_target(engine.registry(), defaults, target),
    };

    let mut result = engine.refs(&opts)?;
    result
        .references
        .sort_by(|a, b| (&a.file, a.position).cmp(&(&b.file, b.position)));
    output::print_json(&result, compact)
}

fn handle_example_queries(engine: &QueryEngine, defaults: &Defaults, lang: Option<String>) -> Result<()> {
    let name = lang
        .or_else(|| defaults.language.clone())
        .unwrap_or_else(|| crate::query::DEFAULT_LANGUAGE.to_string());
    let grammar = engine.registry().get(&name)?;
    print!("{}", grammar.example_queries());
    Ok(())
}

fn handle_languages(engine: &QueryEngine, compact: bool) -> Result<()> {
    let languages: Vec<serde_json::Value> = engine
        .registry()
        .iter()
        .map(|g| serde_json::json!({ "name": g.name(), "extensions": g.extensions() }))
        .collect();
    output::print_json(&languages, compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_symbols_flags() {
        let cli = Cli::try_parse_from([
            "tsq", "-vv", "symbols", "--path", "src", "--visibility", "public", "-j", "4",
            "--include-source", "--max-source-lines", "3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Symbols { target, visibility, include_source, max_source_lines, compact } => {
                assert_eq!(target.path, Some(PathBuf::from("src")));
                assert_eq!(target.jobs, Some(4));
                assert_eq!(visibility, VisibilityFilter::Public);
                assert!(include_source);
                assert_eq!(max_source_lines, Some(3));
                assert!(!compact);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_negative_max_source_lines_means_all() {
        let cli = Cli::try_parse_from(["tsq", "outline", "-f", "a.go", "--max-source-lines", "-1"])
            .unwrap();

        match cli.command {
            Command::Outline { max_source_lines, .. } => {
                assert_eq!(max_source_lines, Some(-1));
                assert_eq!(source_line_limit(max_source_lines), Some(0));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["tsq", "symbols", "--max-source-lines", "-7"]).unwrap();
        match cli.command {
            Command::Symbols { max_source_lines, .. } => {
                assert_eq!(source_line_limit(max_source_lines), Some(0));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert_eq!(source_line_limit(Some(4)), Some(4));
        assert_eq!(source_line_limit(None), None);
    }

    #[test]
    fn test_parse_rejects_bad_visibility() {
        assert!(Cli::try_parse_from(["tsq", "symbols", "--visibility", "secret"]).is_err());
    }

    #[test]
    fn test_query_needs_exactly_one_source() {
        assert!(Cli::try_parse_from(["tsq", "query"]).is_err());
        assert!(Cli::try_parse_from(["tsq", "query", "-q", "(x)", "--query-file", "q.scm"]).is_err());
        assert!(Cli::try_parse_from(["tsq", "query", "--query-file", "q.scm"]).is_ok());
    }

    #[test]
    fn test_negative_jobs_accepted() {
        let cli = Cli::try_parse_from(["tsq", "refs", "-s", "Foo", "-j", "-2"]).unwrap();
        match cli.command {
            Command::Refs { target, .. } => assert_eq!(target.jobs, Some(-2)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_target_precedence() {
        let registry = LanguageRegistry::with_defaults();
        let defaults = Defaults {
            jobs: Some(2),
            max_bytes: Some(10),
            language: Some("go".to_string()),
            respect_gitignore: Some(true),
            ignore_dirs: vec!["testdata".to_string()],
            ..Default::default()
        };

        let target = build_target(
            &registry,
            &defaults,
            TargetArgs {
                jobs: Some(8),
                ..Default::default()
            },
        );
        assert_eq!(target.jobs, 8);
        assert_eq!(target.max_bytes, Some(10));
        assert!(target.respect_gitignore);
        assert_eq!(target.extra_ignore_dirs, vec!["testdata"]);

        let bare = build_target(&registry, &Defaults::default(), TargetArgs::default());
        assert_eq!(bare.jobs, 0);
        assert_eq!(bare.max_bytes, None);
        assert_eq!(bare.language, None);
    }

    #[test]
    fn test_language_inferred_from_file() {
        let registry = LanguageRegistry::with_defaults();
        let defaults = Defaults {
            language: Some("other".to_string()),
            ..Default::default()
        };

        let inferred = resolve_language(&registry, &defaults, None, Some(Path::new("x/main.go")));
        assert_eq!(inferred.as_deref(), Some("go"));

        let fallback = resolve_language(&registry, &defaults, None, Some(Path::new("notes.txt")));
        assert_eq!(fallback.as_deref(), Some("other"));

        let explicit = resolve_language(&registry, &defaults, Some("go".to_string()), None);
        assert_eq!(explicit.as_deref(), Some("go"));
    }
}
