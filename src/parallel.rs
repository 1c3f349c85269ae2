//! Fixed-size worker pools for the two parallel phases.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::CourierError;

/// Builds a dedicated pool with exactly `num_threads` workers.
pub(crate) fn worker_pool(num_threads: usize) -> Result<ThreadPool, CourierError> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .build()
        .map_err(|e| CourierError::ThreadPool(e.to_string()))
}

/// Runs `op` once per job on a dedicated pool and returns the results in
/// job order. `op` receives the job's index alongside the job.
pub(crate) fn run_jobs<T, R, F>(num_threads: usize, jobs: Vec<T>, op: F) -> Result<Vec<R>, CourierError>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync + Send,
{
    let pool = worker_pool(num_threads)?;
    Ok(pool.install(|| {
        jobs.into_par_iter()
            .enumerate()
            .map(|(index, job)| op(index, job))
            .collect()
    }))
}

/// Deals `items` round-robin into `buckets` vectors.
pub(crate) fn round_robin<T>(items: impl IntoIterator<Item = T>, buckets: usize) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = (0..buckets.max(1)).map(|_| Vec::new()).collect();
    let len = out.len();
    for (i, item) in items.into_iter().enumerate() {
        out[i % len].push(item);
    }
    out
}
