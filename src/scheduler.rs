//! A bounded pool of worker threads with a `scope` primitive: submit any
//! number of unit-of-work closures, block until all of them complete,
//! propagate the first failure. Built on `rayon`'s thread pool and scope —
//! the teacher already reaches for `rayon` (`par_chunks().reduce(...)` in
//! `search_parallel`) for its data-parallel case; here we use the same
//! crate's lower-level `ThreadPool::in_place_scope` to get the exact
//! bounded-pool / explicit-submit / join-on-exit contract `spec.md` §4.3
//! specifies, which `par_iter`-style combinators don't expose directly.
//!
//! ## State machine
//!
//! `Idle -> Running(pending > 0) -> Draining -> Done | Failed(e)`. A scope
//! begins `Running` as soon as it is entered; `schedule_work` increments
//! `pending`, each task's completion decrements it; `Draining` begins when
//! the scope body returns (no more `schedule_work` calls are possible after
//! that, since the `Scope` borrow has ended) and ends when `pending` reaches
//! zero, at which point the scheduler reports `Done` or, if any task
//! recorded a failure, `Failed`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::LoadError;

/// Identifies a worker slot requested by a caller of [`Scheduler::with_scheduler`].
/// The scheduler does not pin OS threads to specific `WorkerId`s; the list's
/// *length* sizes the pool (an empty list means "use all available cores"),
/// per `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub usize);

/// Failure cell plus pending-task counter shared between a scope and its
/// worker tasks. `parking_lot::Mutex` is used instead of `std::sync::Mutex`
/// for the same uncontended-fast-path reason the teacher's `RwLock` choice
/// documents: the failure cell is checked and written far more often than it
/// is contended, so a non-futex fast path matters.
struct ScopeState {
    pending: AtomicUsize,
    failure: Mutex<Option<LoadError>>,
}

impl ScopeState {
    fn new() -> Self {
        ScopeState {
            pending: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Record `err` as the scope's failure if none has been recorded yet.
    /// Only the first failure is kept, matching `spec.md` §4.3's "re-raises
    /// the first failure observed".
    fn record_failure(&self, err: LoadError) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn has_failed(&self) -> bool {
        self.failure.lock().is_some()
    }

    fn take_failure(&self) -> Option<LoadError> {
        self.failure.lock().take()
    }
}

/// A bounded region in which tasks are submitted and joined. Borrowed from
/// inside [`Scheduler::with_scheduler`]'s callback; cannot outlive it.
pub struct ScopeHandle<'scope, 'pool> {
    inner: &'scope rayon::Scope<'pool>,
    state: Arc<ScopeState>,
}

impl<'scope, 'pool> ScopeHandle<'scope, 'pool> {
    /// Submit a unit of work. Runs on a worker thread, never on the caller.
    /// No new work is dispatched once a failure has been recorded — tasks
    /// already running are left to settle, but tasks not yet started check
    /// the failure cell before doing anything.
    pub fn schedule_work<F>(&self, task: F)
    where
        F: FnOnce() -> Result<(), LoadError> + Send + 'pool,
    {
        self.state.pending.fetch_add(1, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        self.inner.spawn(move |_| {
            if !state.has_failed() {
                if let Err(e) = task() {
                    state.record_failure(e);
                }
            }
            state.pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// The number of worker threads backing this scope's pool. Used by the
    /// load engine to size row/chunk splits.
    pub fn num_workers(&self) -> usize {
        self.inner.current_num_threads()
    }
}

/// Entry point: build a private pool sized by `worker_ids` and run `body`
/// inside a scope over it, blocking until every submitted task has
/// completed and re-raising the first captured failure.
///
/// An empty `worker_ids` means "use all available cores"
/// (`rayon::current_num_threads()`); otherwise the pool has
/// `max(1, worker_ids.len())` workers.
pub struct Scheduler;

impl Scheduler {
    pub fn with_scheduler<R>(
        worker_ids: &[WorkerId],
        body: impl FnOnce(&ScopeHandle<'_, '_>) -> R,
    ) -> Result<R, LoadError> {
        let num_workers = if worker_ids.is_empty() {
            rayon::current_num_threads()
        } else {
            worker_ids.len().max(1)
        };

        tracing::debug!(num_workers, "scheduler scope starting");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .build()
            .map_err(|e| LoadError::Scheduler(anyhow::Error::new(e)))?;

        let state = Arc::new(ScopeState::new());
        let result = pool.in_place_scope(|scope| {
            let handle = ScopeHandle {
                inner: scope,
                state: Arc::clone(&state),
            };
            body(&handle)
        });

        // `in_place_scope` already blocks until every spawned task has
        // completed (including tasks spawned by other tasks, transitively)
        // before returning — this is the "Draining" phase of spec.md §4.8.
        debug_assert_eq!(state.pending.load(Ordering::SeqCst), 0);

        match state.take_failure() {
            Some(e) => {
                tracing::debug!("scheduler scope failed");
                Err(e)
            }
            None => {
                tracing::debug!("scheduler scope completed");
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    #[test]
    fn test_all_scheduled_tasks_complete_before_scope_returns() {
        let counter = Arc::new(StdAtomicUsize::new(0));
        let result = Scheduler::with_scheduler(&[], |scope| {
            for _ in 0..100 {
                let c = Arc::clone(&counter);
                scope.schedule_work(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
            }
        });
        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_num_workers_reflects_requested_pool_size() {
        let ids = vec![WorkerId(0), WorkerId(1), WorkerId(2)];
        let observed = Scheduler::with_scheduler(&ids, |scope| scope.num_workers()).unwrap();
        assert_eq!(observed, 3);
    }

    #[test]
    fn test_empty_worker_list_uses_all_available_cores() {
        let observed = Scheduler::with_scheduler(&[], |scope| scope.num_workers()).unwrap();
        assert_eq!(observed, rayon::current_num_threads());
    }

    #[test]
    fn test_first_failure_is_propagated() {
        let result: Result<(), LoadError> = Scheduler::with_scheduler(&[WorkerId(0), WorkerId(1)], |scope| {
            scope.schedule_work(|| Err(LoadError::ElementFn(anyhow::anyhow!("boom"))));
            scope.schedule_work(|| Ok(()));
        });
        assert!(result.is_err());
        match result {
            Err(LoadError::ElementFn(e)) => assert_eq!(e.to_string(), "boom"),
            other => panic!("expected ElementFn failure, got {other:?}"),
        }
    }

    #[test]
    fn test_no_new_tasks_dispatch_after_a_failure_is_recorded() {
        let executed = Arc::new(StdAtomicUsize::new(0));
        let _ = Scheduler::with_scheduler(&[WorkerId(0)], |scope| {
            scope.schedule_work(|| Err(LoadError::ElementFn(anyhow::anyhow!("first"))));
            // Give the failing task a head start so its failure is visible
            // to the check inside subsequently scheduled tasks.
            std::thread::sleep(std::time::Duration::from_millis(20));
            let e = Arc::clone(&executed);
            scope.schedule_work(move || {
                e.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        });
        // The second task may still run its body if it had already been
        // dispatched before the failure check; what's guaranteed is that the
        // failure recorded is the first one observed, not that every
        // in-flight task is skipped (spec.md §4.3: "already-running tasks
        // have settled", not cancelled).
        assert!(executed.load(Ordering::SeqCst) <= 1);
    }
}
