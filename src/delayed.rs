//! Delayed arrays: a shape plus a pure `index -> element` function and a
//! parallelism hint. No storage — `at` is evaluated on demand by the load
//! engine.

use crate::index::Index;
use crate::scheduler::WorkerId;
use crate::LoadError;

/// How a load over this array should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeMode {
    /// Run on the calling thread; task submission is forbidden.
    Sequential,
    /// Fan out across a worker pool. An empty list means "use all available
    /// cores", matching `Scheduler::with_scheduler`.
    Parallel(Vec<WorkerId>),
}

impl Default for ComputeMode {
    fn default() -> Self {
        ComputeMode::Sequential
    }
}

/// A shape plus a pure indexing function.
///
/// `F` is the concrete closure type, not `Box<dyn Fn>` — per `spec.md` §9's
/// design notes, storing the indexing function generically lets the
/// compiler inline the call at the load site instead of paying for a vtable
/// dispatch inside the innermost, per-element loop.
#[derive(Clone)]
pub struct DelayedArray<I, E, F>
where
    I: Index,
    F: Fn(I) -> Result<E, LoadError>,
{
    pub comp: ComputeMode,
    pub shape: I,
    pub at: F,
}

impl<I, E, F> DelayedArray<I, E, F>
where
    I: Index,
    F: Fn(I) -> Result<E, LoadError>,
{
    /// Construct a sequential delayed array over `shape` with indexing
    /// function `at`. `at` must be defined for every `ix` with
    /// `isSafeIndex(shape, ix)`; behavior outside that range is undefined,
    /// per `spec.md` §3 — the loader never calls `at` outside it.
    pub fn new(shape: I, at: F) -> Self {
        DelayedArray {
            comp: ComputeMode::Sequential,
            shape,
            at,
        }
    }

    pub fn with_comp(mut self, comp: ComputeMode) -> Self {
        self.comp = comp;
        self
    }
}
