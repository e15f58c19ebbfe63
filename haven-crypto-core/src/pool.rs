//! The process-wide verification thread pool.
//!
//! Independent sub-verifications (one task per legacy range proof, one per
//! ring signature) run on a fixed-size rayon pool. The pool is created
//! once: either explicitly via [`init`] (multi-tenant hosts should size and
//! inject it at startup) or lazily with one worker per available core on
//! first use.
//!
//! Verification calls join every task they spawn before returning; a
//! failing sibling never cancels the others and no shared state is mutated
//! on failure.

use once_cell::sync::OnceCell;
use rayon::ThreadPool;

use crate::types::errors::{RctError, RctResult};

static POOL: OnceCell<ThreadPool> = OnceCell::new();

/// Initialise the pool with a fixed worker count. Must be called before
/// the first verification to take effect; fails if the pool already
/// exists.
pub fn init(num_threads: usize) -> RctResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("rct-verify-{i}"))
        .build()
        .map_err(|_| RctError::PoolAlreadyInitialised)?;
    POOL.set(pool).map_err(|_| RctError::PoolAlreadyInitialised)
}

/// The pool, created on demand when [`init`] was never called.
pub(crate) fn get() -> &'static ThreadPool {
    POOL.get_or_init(|| {
        rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("rct-verify-{i}"))
            .build()
            .expect("default verification pool construction cannot fail")
    })
}

/// Run every task on the pool and collect all results in submission
/// order. Every task runs to completion; a failing sibling never cancels
/// the others.
pub(crate) fn run_all<F>(tasks: Vec<F>) -> Vec<bool>
where
    F: FnOnce() -> bool + Send,
{
    use rayon::prelude::*;
    get().install(|| tasks.into_par_iter().map(|task| task()).collect())
}
