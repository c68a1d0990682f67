//! Bounded fan-out over the document set.
//!
//! Almost every hook's per-document work goes through here: a worker pool of
//! fixed size applies a function to each document (or a filtered subset),
//! with each document owned by exactly one worker for the duration of the
//! pass. Failures never cancel the other documents; they are collected and
//! returned as one aggregate error after everything has been attempted.
//!
//! Completion order across documents is unspecified. Hooks that need
//! cross-document aggregation must do it in a sequential pass after the
//! concurrent one, not inside the worker function.

use rayon::prelude::*;

use super::error::{DocumentErrors, DocumentFailure};
use crate::document::Document;

/// Apply `f` to every document, at most `pool`-many at a time.
///
/// `f` is called exactly once per document. Mutations made by `f` are visible
/// after the call returns, for failed documents' siblings too.
pub fn process_concurrently<F>(
    pool: &rayon::ThreadPool,
    docs: &mut [Document],
    f: F,
) -> Result<(), DocumentErrors>
where
    F: Fn(&mut Document) -> Result<(), anyhow::Error> + Send + Sync,
{
    process_matching(pool, docs, |_| true, f)
}

/// Like [`process_concurrently`], but only for documents matching `pred`.
pub fn process_matching<P, F>(
    pool: &rayon::ThreadPool,
    docs: &mut [Document],
    pred: P,
    f: F,
) -> Result<(), DocumentErrors>
where
    P: Fn(&Document) -> bool + Send + Sync,
    F: Fn(&mut Document) -> Result<(), anyhow::Error> + Send + Sync,
{
    // Collected failures keep document order, so aggregate errors are
    // reproducible across runs regardless of worker completion order.
    let failures: Vec<DocumentFailure> = pool.install(|| {
        docs.par_iter_mut()
            .filter(|doc| pred(doc))
            .filter_map(|doc| {
                f(doc).err().map(|e| DocumentFailure {
                    path: doc.source_path.clone(),
                    message: format!("{e:#}"),
                })
            })
            .collect()
    });

    if failures.is_empty() {
        Ok(())
    } else {
        Err(DocumentErrors::new(failures))
    }
}

/// Build the per-run worker pool. `workers = None` sizes it to the machine.
pub fn build_pool(workers: Option<usize>) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.unwrap_or(0))
        .build()
}
