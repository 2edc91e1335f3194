//! Concurrent file dispatcher
//!
//! Fans a list of [`FileJob`]s out to a fixed-size worker pool. Each worker
//! owns a [`SourceParser`], drains the shared job queue, runs the compiled
//! query and hands the matches to a caller-supplied projection. Projected
//! items fan back in through a single bounded result channel which the
//! calling thread drains while the workers run.
//!
//! Files that cannot be read or parsed are skipped (logged at debug) and
//! never abort the batch. Results carry no cross-file ordering.

use crossbeam_channel::{Receiver, Sender};

use crate::ast_query::{CompiledQuery, SourceParser};
use crate::error::Result;
use crate::models::{FileJob, QueryMatch};
use crate::parsers::Grammar;

/// Capacity of the result channel
const RESULT_BUFFER: usize = 128;

/// Clamp a requested worker count to `[1, file_count]`
///
/// Zero and negative requests yield a single worker.
pub fn effective_worker_count(requested: isize, file_count: usize) -> usize {
    let requested = usize::try_from(requested).unwrap_or(0);
    requested.min(file_count).max(1)
}

/// Parse and match every file concurrently, projecting matches with `process`
///
/// # Errors
///
/// Fails only when the grammar cannot be loaded or the worker pool cannot be
/// started. Per-file failures are absorbed.
pub fn dispatch<T, F>(
    grammar: &dyn Grammar,
    query: &CompiledQuery,
    files: &[FileJob],
    requested_workers: isize,
    process: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&FileJob, Vec<QueryMatch>, &[u8]) -> Vec<T> + Sync,
{
    if files.is_empty() {
        return Ok(Vec::new());
    }

    // Surface grammar problems once, before any worker starts
    SourceParser::new(grammar)?;

    let workers = effective_worker_count(requested_workers, files.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("tsq-worker-{}", i))
        .build()?;

    log::debug!("Dispatching {} files to {} workers", files.len(), workers);

    let (job_tx, job_rx) = crossbeam_channel::bounded::<&FileJob>(files.len());
    for job in files {
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);

    let (result_tx, result_rx) = crossbeam_channel::bounded::<T>(RESULT_BUFFER);
    let process = &process;

    let results = std::thread::scope(|s| {
        // Coordinator: result_tx is dropped once every worker has returned
        s.spawn(move || {
            pool.scope(|scope| {
                for id in 0..workers {
                    let jobs = job_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move |_| run_worker(id, grammar, query, jobs, results, process));
                }
            });
        });

        result_rx.iter().collect::<Vec<T>>()
    });

    Ok(results)
}

fn run_worker<T, F>(
    id: usize,
    grammar: &dyn Grammar,
    query: &CompiledQuery,
    jobs: Receiver<&FileJob>,
    results: Sender<T>,
    process: &F,
) where
    F: Fn(&FileJob, Vec<QueryMatch>, &[u8]) -> Vec<T>,
{
    let mut parser = match SourceParser::new(grammar) {
        Ok(parser) => parser,
        Err(e) => {
            log::error!("Worker {} could not create parser: {}", id, e);
            return;
        }
    };

    for job in jobs.iter() {
        let (tree, source) = match parser.parse_file(&job.abs_path) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("Skipping {}: {}", job.display_path, e);
                continue;
            }
        };

        let matches = query.run(&tree, &source, &job.display_path);
        let items = process(job, matches, &source);
        log::debug!("{}: {} results", job.display_path, items.len());

        for item in items {
            if results.send(item).is_err() {
                return;
            }
        }
    }
}
