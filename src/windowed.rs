//! Windowed delayed arrays: a delayed array plus a distinguished interior
//! rectangle (the "window") evaluated by a separate, typically cheaper,
//! function, and an optional stencil footprint hint used by the rank-2 load
//! path to pick its unroll factor.

use crate::delayed::{ComputeMode, DelayedArray};
use crate::error::ShapeError;
use crate::index::{Dim, Index};
use crate::LoadError;

/// A delayed array with an interior window.
///
/// `FB` and `FW` are the concrete closure types of `base.at` and `win_at`
/// respectively — kept generic rather than boxed so the load engine's
/// per-element calls monomorphize and inline, per `spec.md` §9.
pub struct WindowedDelayedArray<I, E, FB, FW>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
{
    pub base: DelayedArray<I, E, FB>,
    /// A small odd-side stencil footprint hint; only its last two components
    /// (the two innermost axes) matter — they drive the rank-2 load path's
    /// unroll factor.
    pub stencil_size: Option<I>,
    pub win_start: I,
    pub win_size: I,
    pub win_at: FW,
}

impl<I, E, FB, FW> WindowedDelayedArray<I, E, FB, FW>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
{
    /// Construct a windowed delayed array, validating the invariants from
    /// `spec.md` §3:
    ///
    /// - `win_start >= 0` componentwise.
    /// - `win_start + win_size <= base.shape` componentwise.
    ///
    /// Note this is deliberately *not* `win_start.is_safe_index(&base.shape)`:
    /// that check requires `win_start_d < shape_d` on every axis, which
    /// rejects the spec-mandated "zero-size window at the far corner"
    /// placement (`spec.md` §8 scenario 6 — `win_start == shape`,
    /// `win_size == 0`). Such a window never has any of its points
    /// dereferenced (there are none), so it is safe by construction; the
    /// `win_start + win_size <= shape` check below already catches a
    /// `win_start` that overshoots `shape` on an axis where `win_size` isn't
    /// zero.
    ///
    /// Both are programmer-misuse conditions (a malformed window is a bug
    /// at the call site, not data the loader can sensibly recover from), so
    /// violations panic — with the message formatted through [`ShapeError`]'s
    /// `Display` so the offending values are reported consistently — rather
    /// than returning a `Result`, the same tradeoff the teacher makes in
    /// `AbkveInner::new` and `AbkveInner::add` with `assert!`/`assert_eq!`.
    pub fn new(
        base: DelayedArray<I, E, FB>,
        win_start: I,
        win_size: I,
        win_at: FW,
        stencil_size: Option<I>,
    ) -> Self {
        for d in 1..=base.shape.rank() {
            let dim = Dim::new(d).expect("d starts at 1");
            let start_d = win_start
                .get_dim(dim)
                .expect("dim within rank by loop bound");
            if start_d < 0 {
                panic!(
                    "{}",
                    ShapeError::WindowStartOutOfBounds {
                        shape: format!("{:?}", base.shape),
                        win_start: format!("{win_start:?}"),
                    }
                );
            }
        }

        let win_end = win_start.lift2(win_size, |s, w| s + w);
        for d in 1..=base.shape.rank() {
            let dim = Dim::new(d).expect("d starts at 1");
            let end = win_end
                .get_dim(dim)
                .expect("dim within rank by loop bound");
            let shape_d = base
                .shape
                .get_dim(dim)
                .expect("dim within rank by loop bound");
            if end > shape_d {
                panic!(
                    "{}",
                    ShapeError::WindowExceedsShape {
                        shape: format!("{:?}", base.shape),
                        win_start: format!("{win_start:?}"),
                        win_size: format!("{win_size:?}"),
                    }
                );
            }
        }

        WindowedDelayedArray {
            base,
            stencil_size,
            win_start,
            win_size,
            win_at,
        }
    }

    /// Replace the compute mode.
    pub fn set_comp(mut self, comp: ComputeMode) -> Self {
        self.base.comp = comp;
        self
    }

    /// The current compute mode.
    pub fn comp(&self) -> &ComputeMode {
        &self.base.comp
    }

    /// The array's overall shape (unaffected by windowing).
    pub fn size(&self) -> I {
        self.base.shape
    }

    /// Compose `f` with both the border and interior indexing functions.
    pub fn map<E2, G>(
        self,
        f: G,
    ) -> WindowedDelayedArray<I, E2, impl Fn(I) -> Result<E2, LoadError>, impl Fn(I) -> Result<E2, LoadError>>
    where
        G: Fn(E) -> E2 + Clone,
    {
        let WindowedDelayedArray {
            base,
            stencil_size,
            win_start,
            win_size,
            win_at,
        } = self;
        let DelayedArray { comp, shape, at } = base;

        let f_base = f.clone();
        let new_base = DelayedArray {
            comp,
            shape,
            at: move |ix: I| at(ix).map(|e| f_base(e)),
        };
        let new_win_at = move |ix: I| win_at(ix).map(|e| f(e));

        WindowedDelayedArray {
            base: new_base,
            stencil_size,
            win_start,
            win_size,
            win_at: new_win_at,
        }
    }
}

impl<I, E, FB> WindowedDelayedArray<I, E, FB, FB>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError> + Clone,
{
    /// Build the default windowed array for a plain delayed array: an empty
    /// window at the origin, with `win_at` defaulting to `base.at` — per
    /// `spec.md` §3's "Default" clause.
    pub fn from_delayed(base: DelayedArray<I, E, FB>) -> Self {
        let win_at = base.at.clone();
        WindowedDelayedArray {
            stencil_size: None,
            win_start: I::pure(0),
            win_size: I::pure(0),
            win_at,
            base,
        }
    }
}
