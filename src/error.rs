//! Error taxonomy for the load engine.
//!
//! The core distinguishes two very different kinds of failure:
//!
//! - **Programmer misuse** (malformed window, rank mismatch): these are bugs
//!   at the call site, not data-dependent conditions a caller can sensibly
//!   recover from. They are reported as panics carrying the offending values,
//!   the same way the teacher's `AbkveInner::new`/`add` use `assert!` rather
//!   than `Result` for dimension mismatches. [`ShapeError`] gives that panic
//!   message a structured payload — `WindowedDelayedArray::new` constructs it
//!   and panics with its `Display` output — but it is never *returned* from a
//!   public function; it only ever reaches a caller as a panic message.
//! - **Data-dependent failure raised by a caller-supplied indexing closure**,
//!   or an internal scheduler fault: these propagate as [`LoadError`] through
//!   ordinary `Result` plumbing, because a failing stencil/border function is
//!   entirely expected to happen (e.g. a shape mismatch the caller's own
//!   kernel detects) and the caller needs the value back to decide what to do.

use std::fmt;

/// A malformed window or rank mismatch detected at [`WindowedDelayedArray`]
/// construction time.
///
/// [`WindowedDelayedArray`]: crate::windowed::WindowedDelayedArray
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// `win_start` has a negative component.
    WindowStartOutOfBounds {
        shape: String,
        win_start: String,
    },
    /// `win_start + win_size` exceeds `shape` on at least one axis.
    WindowExceedsShape {
        shape: String,
        win_start: String,
        win_size: String,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::WindowStartOutOfBounds { shape, win_start } => write!(
                f,
                "window start {win_start} has a negative component (shape {shape})"
            ),
            ShapeError::WindowExceedsShape {
                shape,
                win_start,
                win_size,
            } => write!(
                f,
                "window start {win_start} + size {win_size} exceeds shape {shape}"
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Failure surfaced from a running load.
///
/// Every writer path already performed before the failure remains in the
/// buffer, making the buffer invalid for any further use once a load returns
/// `Err`, per the core's error policy: the loader never retries.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// `base.at` or `win_at` failed for some index — a data-dependent error
    /// raised by the caller's own indexing function, not a bug in the loader.
    #[error("element function failed: {0}")]
    ElementFn(#[source] anyhow::Error),

    /// The scheduler itself faulted (broken worker, queue corruption).
    #[error("scheduler failure: {0}")]
    Scheduler(#[source] anyhow::Error),
}
