//! File discovery
//!
//! Walks a root directory and produces the ordered list of [`FileJob`]s for
//! the dispatcher. Ignored directories are pruned without descending, files
//! above the byte ceiling are dropped, and `.gitignore` rules only apply when
//! asked for.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{Result, TsqError};
use crate::models::FileJob;

/// Directory names never descended into
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".jj",
    "node_modules",
    "vendor",
    "dist",
    "build",
    "target",
    ".venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".next",
    ".cache",
    ".turbo",
    "coverage",
];

/// Default per-file byte ceiling (2 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// Discovery settings
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Accepted extensions, lowercase without the dot
    pub extensions: BTreeSet<String>,
    /// Directory names to prune
    pub ignore_dirs: BTreeSet<String>,
    /// Largest file accepted, in bytes; 0 disables the ceiling
    pub max_bytes: u64,
    /// Honor .gitignore / .ignore files
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: BTreeSet::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            max_bytes: DEFAULT_MAX_BYTES,
            respect_gitignore: false,
        }
    }
}

impl ScanConfig {
    /// Config accepting the given extensions (dot optional, any case)
    pub fn for_extensions<'a>(extensions: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ..Self::default()
        }
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }
}

/// Discover files under `root`, sorted by path
///
/// # Errors
///
/// Returns [`TsqError::Scan`] if the root cannot be resolved. Entries the
/// walker cannot read are logged and skipped.
pub fn discover(root: &Path, config: &ScanConfig) -> Result<Vec<FileJob>> {
    let abs_root = resolve(root)?;
    std::fs::metadata(&abs_root).map_err(|source| TsqError::Scan {
        path: abs_root.clone(),
        source,
    })?;

    let ignored = config.ignore_dirs.clone();
    let walker = WalkBuilder::new(&abs_root)
        .standard_filters(false)
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .parents(config.respect_gitignore)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            !entry
                .file_name()
                .to_str()
                .is_some_and(|name| ignored.contains(name))
        })
        .build();

    let mut jobs = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if !config.accepts_extension(path) {
            continue;
        }

        if config.max_bytes > 0 {
            match entry.metadata() {
                Ok(meta) if meta.len() > config.max_bytes => {
                    log::debug!("Skipping {} (too large: {} bytes)", path.display(), meta.len());
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    log::debug!("Skipping {} (cannot stat: {})", path.display(), e);
                    continue;
                }
            }
        }

        jobs.push(FileJob::new(path, display_path(&abs_root, path)));
    }

    log::debug!("Discovered {} files under {}", jobs.len(), abs_root.display());
    Ok(jobs)
}

/// Build the job for a single explicitly named file
///
/// No extension check and no size ceiling; the display path is the file name.
pub fn single(path: &Path) -> Result<FileJob> {
    let abs_path = resolve(path)?;
    let display = abs_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| abs_path.to_string_lossy().into_owned());
    Ok(FileJob::new(abs_path, display))
}

fn resolve(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| TsqError::Scan {
        path: path.to_path_buf(),
        source,
    })
}

/// Root-relative path with `/` separators
fn display_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        // Root was the file itself
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        joined
    }
}
