//! The load engine: materializes a [`WindowedDelayedArray`] into a
//! [`LinearBuffer`], sequentially ([`load_seq`]) or across a worker pool
//! ([`load_par`]).
//!
//! Dispatch is rank-generic via the private [`Loadable`] trait: rank 1 and
//! rank 2 are hand-specialized directly on [`Ix1`](crate::index::Ix1) and
//! [`Ix2`](crate::index::Ix2) (see [`rank1`], [`rank2`]), rank 3 and above
//! recurse by peeling the outermost axis one dimension at a time
//! ([`recursive`]) until they reach a hand-specialized base case — or, for
//! [`IxN`](crate::index::IxN), a generic fallback of the same shape that
//! doesn't get to assume a fixed-size array underneath it.

mod offset_buffer;
mod rank1;
mod rank2;
mod recursive;

use crate::buffer::LinearBuffer;
use crate::error::LoadError;
use crate::index::{Index, Ix1, Ix2, Ix3, Ix4, Ix5, IxN};
use crate::scheduler::{ScopeHandle, Scheduler, WorkerId};
use crate::windowed::WindowedDelayedArray;

/// Rank-generic load dispatch. Not exposed outside the crate — callers use
/// the free functions [`load_seq`]/[`load_par`], which are generic over any
/// `Loadable` index type.
pub(crate) trait Loadable: Index {
    fn load_seq_impl<E, FB, FW, B>(
        wd: &WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &B,
    ) -> Result<(), LoadError>
    where
        FB: Fn(Self) -> Result<E, LoadError>,
        FW: Fn(Self) -> Result<E, LoadError>,
        B: LinearBuffer<E>,
        Self::Lower: Loadable,
    {
        recursive::load_seq_recursive(wd, buffer)
    }

    fn load_par_impl<'scope, 'pool, E, FB, FW, B>(
        scope: &ScopeHandle<'scope, 'pool>,
        wd: &'pool WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &'pool B,
    ) where
        E: Send + 'pool,
        FB: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        FW: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        B: LinearBuffer<E> + Sync + 'pool,
        Self::Lower: Loadable,
    {
        recursive::load_par_recursive(scope, wd, buffer)
    }
}

impl Loadable for Ix1 {
    fn load_seq_impl<E, FB, FW, B>(
        wd: &WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &B,
    ) -> Result<(), LoadError>
    where
        FB: Fn(Self) -> Result<E, LoadError>,
        FW: Fn(Self) -> Result<E, LoadError>,
        B: LinearBuffer<E>,
    {
        rank1::load_seq(wd, buffer)
    }

    fn load_par_impl<'scope, 'pool, E, FB, FW, B>(
        scope: &ScopeHandle<'scope, 'pool>,
        wd: &'pool WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &'pool B,
    ) where
        E: Send + 'pool,
        FB: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        FW: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        B: LinearBuffer<E> + Sync + 'pool,
    {
        rank1::load_par(scope, wd, buffer)
    }
}

impl Loadable for Ix2 {
    fn load_seq_impl<E, FB, FW, B>(
        wd: &WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &B,
    ) -> Result<(), LoadError>
    where
        FB: Fn(Self) -> Result<E, LoadError>,
        FW: Fn(Self) -> Result<E, LoadError>,
        B: LinearBuffer<E>,
    {
        rank2::load_seq(wd, buffer)
    }

    fn load_par_impl<'scope, 'pool, E, FB, FW, B>(
        scope: &ScopeHandle<'scope, 'pool>,
        wd: &'pool WindowedDelayedArray<Self, E, FB, FW>,
        buffer: &'pool B,
    ) where
        E: Send + 'pool,
        FB: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        FW: Fn(Self) -> Result<E, LoadError> + Sync + 'pool,
        B: LinearBuffer<E> + Sync + 'pool,
    {
        rank2::load_par(scope, wd, buffer)
    }
}

// Rank 3 and above: the default trait bodies recurse down to `Ix2`'s
// hand-specialized base case one axis at a time.
impl Loadable for Ix3 {}
impl Loadable for Ix4 {}
impl Loadable for Ix5 {}

// `IxN`'s own `Lower` is itself, so its recursion bottoms out inside
// `recursive::load_seq_recursive`/`load_par_recursive`'s rank <= 2 branch
// rather than ever reaching `Ix1`/`Ix2` directly.
impl Loadable for IxN {}

/// Fill `buffer[0 .. totalElem(wd.size()))` on the calling thread.
///
/// `base.at`/`win_at` are called exactly once per cell, border cells from
/// `base.at`, interior cells from `win_at`. A failing call aborts the load
/// and propagates the error; cells already written remain in `buffer`.
pub fn load_seq<I, E, FB, FW, B>(
    wd: &WindowedDelayedArray<I, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    I: Loadable,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let _span = tracing::debug_span!("load_seq", rank = wd.size().rank()).entered();
    I::load_seq_impl(wd, buffer)
}

/// Fill `buffer[0 .. totalElem(wd.size()))` across a private pool sized by
/// `worker_ids` (empty means "use all available cores"). Blocks until every
/// submitted task has completed and re-raises the first failure observed.
///
/// `loadSeq` and `loadPar` agree bit-for-bit on the written buffer for the
/// same `wd`, regardless of `worker_ids` — the decomposition always targets
/// disjoint linear-index ranges, so execution order never affects the
/// result.
pub fn load_par<I, E, FB, FW, B>(
    worker_ids: &[WorkerId],
    wd: &WindowedDelayedArray<I, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    I: Loadable,
    E: Send,
    FB: Fn(I) -> Result<E, LoadError> + Sync,
    FW: Fn(I) -> Result<E, LoadError> + Sync,
    B: LinearBuffer<E> + Sync,
{
    let _span = tracing::debug_span!("load_par", rank = wd.size().rank(), requested_workers = worker_ids.len()).entered();
    Scheduler::with_scheduler(worker_ids, |scope| {
        I::load_par_impl(scope, wd, buffer);
    })
}
