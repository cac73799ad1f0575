//! # ndwindow — Parallel Load Engine for Windowed Delayed Arrays
//!
//! ## Architecture Overview
//!
//! A *delayed array* is a shape plus a pure `index -> element` function and
//! carries no storage of its own. A *windowed delayed array* additionally
//! distinguishes an interior rectangle (the "window") for which a cheap,
//! non-bounds-checked indexing function applies, from a border where a
//! (potentially more expensive) bounds-aware function applies. Materializing
//! either kind into a contiguous, row-major buffer is called a *load*.
//!
//! This crate is the loader: given a windowed delayed array and a
//! pre-allocated linear buffer, it writes every element exactly once, either
//! on the calling thread ([`load_seq`]) or fanned out across a bounded worker
//! pool ([`load_par`]). The fan-out is recursive over dimensions with rank-1
//! and rank-2 hand-specialized as the performance-critical leaves — the
//! rank-2 interior loop additionally uses row-block unroll-and-jam
//! ([`unroll`]) to expose instruction-level parallelism in stencil-style
//! access patterns.
//!
//! ### Why a private `rayon` pool per load
//!
//! `load_par` owns a [`Scheduler`](scheduler::Scheduler) for the duration of
//! one call: a bounded pool of worker threads that accept unit-of-work
//! closures and block the caller until all of them complete, propagating the
//! first failure. This gives callers precise control over how many threads a
//! single load uses — important when multiple loads run concurrently from
//! different call sites and must not oversubscribe the machine.
//!
//! ### Why `unsafe` in the buffer sink
//!
//! The output buffer is shared *by index range*, not by location: the loader
//! proves at construction time that the sub-ranges handed to each worker task
//! are pairwise disjoint, so no task ever observes another task's writes and
//! no lock is needed. [`buffer::SliceSink`] is the thin `unsafe impl Send +
//! Sync` wrapper that makes this provable disjointness available to multiple
//! threads at once; see its doc comment for the safety argument.

// Global Allocator: mimalloc
//
// Loads are allocation-light in steady state, but the index algebra and
// scheduler bookkeeping (per-task index/shape values, recursive slice
// construction) allocate small, short-lived values on every call. mimalloc's
// per-thread heaps keep that cheap under the worker pool's concurrent access
// pattern.
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod buffer;
pub mod delayed;
pub mod error;
pub mod index;
pub mod iterate;
pub mod load;
pub mod scheduler;
pub mod unroll;
pub mod windowed;

pub use buffer::{LinearBuffer, SliceSink};
pub use delayed::{ComputeMode, DelayedArray};
pub use error::{LoadError, ShapeError};
pub use index::{Dim, Index, Ix0, Ix1, Ix2, Ix3, Ix4, Ix5, IxN};
pub use load::{load_par, load_seq};
pub use scheduler::{Scheduler, WorkerId};
pub use windowed::WindowedDelayedArray;
