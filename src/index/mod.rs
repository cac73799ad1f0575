//! Index algebra: a family of n-D index/shape types, ranks 0 through 5
//! hand-specialized, rank 6 and above handled by a single rank-generic
//! fallback ([`IxN`]) that recurses through the same [`Index`] trait.
//!
//! An `Ix_r` value doubles as both an *index* (a point) and a *shape* (an
//! extent) — the distinction is purely in how the caller uses it, matching
//! `spec.md`'s data model. Components are stored outermost-first: position
//! `0` is dimension `r` (slowest-varying), position `r - 1` is dimension `1`
//! (fastest-varying, contiguous). [`Dim`] selects one of those by its
//! 1-based, innermost-first number, not by storage position — see
//! [`Index::get_dim`].

mod ops;

use std::fmt;
use std::num::NonZeroUsize;

/// A 1-based dimension selector, valid for a given index of rank `r` iff
/// `1 <= dim <= r`. Backed by `NonZeroUsize` so "dimension zero" cannot even
/// be constructed — the only remaining failure mode for
/// `get_dim`/`set_dim`/`drop_dim`/`insert_dim`/`pull_out_dim` is "out of
/// range for this rank", reported as `None`, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dim(NonZeroUsize);

impl Dim {
    /// Construct a dimension selector. Returns `None` for `d == 0`.
    pub fn new(d: usize) -> Option<Dim> {
        NonZeroUsize::new(d).map(Dim)
    }

    /// The 1-based dimension number.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Rank-generic operations shared by every concrete index/shape type.
///
/// `Lower` is the rank-`r-1` type reachable via [`Index::uncons`] /
/// [`Index::drop_dim`] / [`Index::pull_out_dim`]; it bottoms out at
/// [`Ix0`], whose own `Lower` is itself (rank 0 has no dimension to drop).
pub trait Index: Copy + Clone + PartialEq + Eq + fmt::Debug + Send + Sync + 'static {
    /// The next rank down.
    type Lower: Index;

    /// This type's fixed rank.
    const RANK: usize;

    /// `pure(k)` replicates `k` across every axis.
    fn pure(k: i64) -> Self;

    /// Build an index/shape from its outermost-first component vector.
    /// Panics if `v.len() != Self::RANK` — an internal invariant of this
    /// module, never reachable from a public API with mismatched ranks.
    fn from_vec(v: Vec<i64>) -> Self;

    /// The outermost-first component vector.
    fn to_vec(&self) -> Vec<i64>;

    /// This value's rank. Always equal to `Self::RANK`.
    fn rank(&self) -> usize {
        Self::RANK
    }

    /// Product of all components; `totalElem` in `spec.md` §3. `1` at rank 0.
    fn total_elem(&self) -> i64;

    /// `0 <= self_d < shape_d` on every axis.
    fn is_safe_index(&self, shape: &Self) -> bool;

    /// Row-major linear index of `self` within `shape`, outermost axis
    /// slowest-varying. Undefined (but total) outside `[0, shape)`.
    fn to_linear_index(&self, shape: &Self) -> i64;

    /// Inverse of [`Index::to_linear_index`] for `k` in `[0, total_elem(shape))`.
    fn from_linear_index(shape: &Self, k: i64) -> Self;

    /// Read the component at 1-based, innermost-first dimension `d`.
    /// `None` if `d` exceeds this value's rank.
    fn get_dim(&self, d: Dim) -> Option<i64> {
        ops::get(&self.to_vec(), d)
    }

    /// Replace the component at dimension `d`. `None` if out of range.
    fn set_dim(&self, d: Dim, v: i64) -> Option<Self> {
        ops::set(&self.to_vec(), d, v).map(Self::from_vec)
    }

    /// Remove the component at dimension `d`, yielding a rank-`r-1` value.
    /// `None` if out of range.
    fn drop_dim(&self, d: Dim) -> Option<Self::Lower> {
        ops::drop_at(&self.to_vec(), d).map(Self::Lower::from_vec)
    }

    /// Insert `v` at dimension `d` of a rank-`r-1` value, yielding rank `r`.
    /// `None` if `d` exceeds the *resulting* rank.
    fn insert_dim(lower: Self::Lower, d: Dim, v: i64) -> Option<Self> {
        ops::insert(&lower.to_vec(), d, v).map(Self::from_vec)
    }

    /// `get_dim` and `drop_dim` in one pass. `None` if out of range.
    fn pull_out_dim(&self, d: Dim) -> Option<(i64, Self::Lower)> {
        ops::pull_out(&self.to_vec(), d).map(|(h, t)| (h, Self::Lower::from_vec(t)))
    }

    /// Componentwise binary map.
    fn lift2(self, other: Self, f: impl Fn(i64, i64) -> i64) -> Self {
        Self::from_vec(ops::lift2(&self.to_vec(), &other.to_vec(), f))
    }

    /// Prepend a new outermost axis.
    fn cons(h: i64, tail: Self::Lower) -> Self {
        Self::from_vec(ops::cons(h, &tail.to_vec()))
    }

    /// Inverse of [`Index::cons`]: split off the outermost axis.
    fn uncons(self) -> (i64, Self::Lower) {
        let (h, t) = ops::uncons(&self.to_vec());
        (h, Self::Lower::from_vec(t))
    }

    /// Append a new innermost axis.
    fn snoc(init: Self::Lower, inner: i64) -> Self {
        Self::from_vec(ops::snoc(&init.to_vec(), inner))
    }

    /// Inverse of [`Index::snoc`]: split off the innermost axis.
    fn unsnoc(self) -> (Self::Lower, i64) {
        let (i, x) = ops::unsnoc(&self.to_vec());
        (Self::Lower::from_vec(i), x)
    }

    /// Rank-generic nested loop over `[start, end)` with independent
    /// per-axis `step` and continuation predicate `cont(cur, end)` (normally
    /// `<`). The outermost axis is the outer loop, matching row-major order.
    /// `body` may fail; the first failure short-circuits the remaining
    /// axes/iterations. `spec.md` §4.1's `iterM`, built over
    /// [`crate::iterate::loop_m_`] — one nested loop per axis.
    fn iter_m<E>(
        start: Self,
        end: Self,
        step: impl Fn(i64) -> i64 + Copy,
        cont: impl Fn(i64, i64) -> bool + Copy,
        body: impl FnMut(Self) -> Result<(), E>,
    ) -> Result<(), E> {
        ops::iter_m(start.to_vec(), end.to_vec(), step, cont, body, Self::from_vec)
    }

    /// Pure variant of [`Index::iter_m`] for an infallible `body` — `iter` in
    /// `spec.md` §4.1.
    fn iter(
        start: Self,
        end: Self,
        step: impl Fn(i64) -> i64 + Copy,
        cont: impl Fn(i64, i64) -> bool + Copy,
        mut body: impl FnMut(Self),
    ) {
        let result: Result<(), std::convert::Infallible> = Self::iter_m(start, end, step, cont, |ix| {
            body(ix);
            Ok(())
        });
        result.unwrap();
    }
}

/// The rank-0 unit index/shape. Acts as the base case for `cons`/`uncons` on
/// [`Ix1`]. Its own `Lower` is itself — there is no rank below zero, and no
/// public code path ever calls `uncons`/`drop_dim`/`unsnoc` on a rank-0
/// value (doing so would be a programmer error, not a data-dependent one).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ix0;

impl fmt::Debug for Ix0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ix0")
    }
}

impl Index for Ix0 {
    type Lower = Ix0;
    const RANK: usize = 0;

    fn pure(_k: i64) -> Self {
        Ix0
    }
    fn from_vec(v: Vec<i64>) -> Self {
        assert!(v.is_empty(), "Ix0::from_vec: expected 0 components, got {}", v.len());
        Ix0
    }
    fn to_vec(&self) -> Vec<i64> {
        Vec::new()
    }
    fn total_elem(&self) -> i64 {
        1
    }
    fn is_safe_index(&self, _shape: &Self) -> bool {
        true
    }
    fn to_linear_index(&self, _shape: &Self) -> i64 {
        0
    }
    fn from_linear_index(_shape: &Self, _k: i64) -> Self {
        Ix0
    }
    fn uncons(self) -> (i64, Self::Lower) {
        unreachable!("uncons on a rank-0 index: caller bug, there is no outer axis to split off")
    }
    fn unsnoc(self) -> (Self::Lower, i64) {
        unreachable!("unsnoc on a rank-0 index: caller bug, there is no inner axis to split off")
    }
}

macro_rules! impl_rank {
    ($name:ident, $rank:literal, $lower:ty) => {
        #[doc = concat!("Rank-", stringify!($rank), " index/shape, outermost component first.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub [i64; $rank]);

        impl $name {
            /// Build directly from outermost-first components.
            pub fn new(components: [i64; $rank]) -> Self {
                $name(components)
            }

            /// Borrow the outermost-first components.
            pub fn as_slice(&self) -> &[i64] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                for (i, c) in self.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ":.")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }

        impl Index for $name {
            type Lower = $lower;
            const RANK: usize = $rank;

            fn pure(k: i64) -> Self {
                $name([k; $rank])
            }

            fn from_vec(v: Vec<i64>) -> Self {
                assert_eq!(
                    v.len(),
                    $rank,
                    "{}::from_vec: expected {} components, got {}",
                    stringify!($name),
                    $rank,
                    v.len()
                );
                let mut arr = [0i64; $rank];
                arr.copy_from_slice(&v);
                $name(arr)
            }

            fn to_vec(&self) -> Vec<i64> {
                self.0.to_vec()
            }

            fn total_elem(&self) -> i64 {
                self.0.iter().product()
            }

            fn is_safe_index(&self, shape: &Self) -> bool {
                self.0
                    .iter()
                    .zip(shape.0.iter())
                    .all(|(&i, &s)| i >= 0 && i < s)
            }

            fn to_linear_index(&self, shape: &Self) -> i64 {
                let mut acc = 0i64;
                for (&s, &i) in shape.0.iter().zip(self.0.iter()) {
                    acc = acc * s + i;
                }
                acc
            }

            fn from_linear_index(shape: &Self, k: i64) -> Self {
                let mut out = [0i64; $rank];
                let mut rem = k;
                for idx in (0..$rank).rev() {
                    let s = shape.0[idx];
                    out[idx] = rem.rem_euclid(s);
                    rem = rem.div_euclid(s);
                }
                $name(out)
            }
        }
    };
}

impl_rank!(Ix1, 1, Ix0);
impl_rank!(Ix2, 2, Ix1);
impl_rank!(Ix3, 3, Ix2);
impl_rank!(Ix4, 4, Ix3);
impl_rank!(Ix5, 5, Ix4);

/// Rank-generic fallback for rank 6 and above. Not hand-specialized: the
/// load engine's recursion (`spec.md` §4.5/§4.6, "rank >= 3") bottoms out at
/// the [`Ix2`] base case long before reaching here for any of the shapes
/// this crate's benchmarks and tests exercise; `IxN` exists so the index
/// algebra itself has no hard rank ceiling.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IxN(pub Vec<i64>);

impl fmt::Debug for IxN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IxN(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":.")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

impl Index for IxN {
    // `IxN`'s own `Lower` is itself: dropping one axis of a rank-N value
    // (N >= 6) still needs the same dynamically-sized representation, just
    // one element shorter. This intentionally breaks the "Lower bottoms out
    // at Ix0" chain used by the fixed-rank types; `IxN` is only ever reached
    // recursively from another `IxN`, never mixed with the fixed ranks.
    type Lower = IxN;
    const RANK: usize = usize::MAX;

    fn pure(_k: i64) -> Self {
        panic!("IxN::pure needs an explicit rank; construct with IxN(vec![k; rank]) instead")
    }

    fn from_vec(v: Vec<i64>) -> Self {
        IxN(v)
    }

    fn to_vec(&self) -> Vec<i64> {
        self.0.clone()
    }

    fn rank(&self) -> usize {
        self.0.len()
    }

    fn total_elem(&self) -> i64 {
        self.0.iter().product()
    }

    fn is_safe_index(&self, shape: &Self) -> bool {
        self.0.len() == shape.0.len()
            && self.0.iter().zip(shape.0.iter()).all(|(&i, &s)| i >= 0 && i < s)
    }

    fn to_linear_index(&self, shape: &Self) -> i64 {
        let mut acc = 0i64;
        for (&s, &i) in shape.0.iter().zip(self.0.iter()) {
            acc = acc * s + i;
        }
        acc
    }

    fn from_linear_index(shape: &Self, k: i64) -> Self {
        let mut out = vec![0i64; shape.0.len()];
        let mut rem = k;
        for idx in (0..shape.0.len()).rev() {
            let s = shape.0[idx];
            out[idx] = rem.rem_euclid(s);
            rem = rem.div_euclid(s);
        }
        IxN(out)
    }

    fn drop_dim(&self, d: Dim) -> Option<Self::Lower> {
        ops::drop_at(&self.0, d).map(IxN)
    }

    fn insert_dim(lower: Self::Lower, d: Dim, v: i64) -> Option<Self> {
        ops::insert(&lower.0, d, v).map(IxN)
    }

    fn pull_out_dim(&self, d: Dim) -> Option<(i64, Self::Lower)> {
        ops::pull_out(&self.0, d).map(|(h, t)| (h, IxN(t)))
    }

    fn cons(h: i64, tail: Self::Lower) -> Self {
        IxN(ops::cons(h, &tail.0))
    }

    fn uncons(self) -> (i64, Self::Lower) {
        let (h, t) = ops::uncons(&self.0);
        (h, IxN(t))
    }

    fn snoc(init: Self::Lower, inner: i64) -> Self {
        IxN(ops::snoc(&init.0, inner))
    }

    fn unsnoc(self) -> (Self::Lower, i64) {
        let (i, x) = ops::unsnoc(&self.0);
        (IxN(i), x)
    }
}
