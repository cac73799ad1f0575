//! Shared, rank-agnostic implementations of the index algebra's
//! rank-changing and dimension-selector operations, written once over
//! `&[i64]` slices and reused by every concrete rank in [`super`].
//!
//! Components are stored outermost-first (position `0` = dimension `r`,
//! position `len - 1` = dimension `1`), so dimension `d` lives at position
//! `len - d`.

use super::Dim;
use crate::iterate::loop_m_;

fn pos_for(len: usize, d: Dim) -> Option<usize> {
    if d.get() > len {
        None
    } else {
        Some(len - d.get())
    }
}

pub fn get(ix: &[i64], d: Dim) -> Option<i64> {
    pos_for(ix.len(), d).map(|p| ix[p])
}

pub fn set(ix: &[i64], d: Dim, v: i64) -> Option<Vec<i64>> {
    let p = pos_for(ix.len(), d)?;
    let mut out = ix.to_vec();
    out[p] = v;
    Some(out)
}

pub fn drop_at(ix: &[i64], d: Dim) -> Option<Vec<i64>> {
    let p = pos_for(ix.len(), d)?;
    let mut out = ix.to_vec();
    out.remove(p);
    Some(out)
}

pub fn insert(lower: &[i64], d: Dim, v: i64) -> Option<Vec<i64>> {
    let target_len = lower.len() + 1;
    let p = pos_for(target_len, d)?;
    let mut out = lower.to_vec();
    out.insert(p, v);
    Some(out)
}

pub fn pull_out(ix: &[i64], d: Dim) -> Option<(i64, Vec<i64>)> {
    let p = pos_for(ix.len(), d)?;
    let mut out = ix.to_vec();
    let val = out.remove(p);
    Some((val, out))
}

pub fn lift2(a: &[i64], b: &[i64], f: impl Fn(i64, i64) -> i64) -> Vec<i64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()
}

pub fn cons(h: i64, tail: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(tail.len() + 1);
    out.push(h);
    out.extend_from_slice(tail);
    out
}

pub fn uncons(ix: &[i64]) -> (i64, Vec<i64>) {
    (ix[0], ix[1..].to_vec())
}

pub fn snoc(init: &[i64], inner: i64) -> Vec<i64> {
    let mut out = init.to_vec();
    out.push(inner);
    out
}

pub fn unsnoc(ix: &[i64]) -> (Vec<i64>, i64) {
    let (last, init) = ix.split_last().expect("unsnoc on an empty index: caller bug");
    (init.to_vec(), *last)
}

/// Rank-generic nested loop over `[start, end)`, per `spec.md` §4.1's
/// `iter`/`iterM`: independent per-axis `step` and continuation predicate
/// `cont(cur, end)` (normally `<`), outermost axis (position `0`) as the
/// outer loop. One nested call to [`loop_m_`] per axis, peeling the
/// outermost component first so the visit order matches row-major write
/// order.
pub fn iter_m<T, E, S, C, F>(
    start: Vec<i64>,
    end: Vec<i64>,
    step: S,
    cont: C,
    mut body: F,
    from_vec: impl Fn(Vec<i64>) -> T + Copy,
) -> Result<(), E>
where
    S: Fn(i64) -> i64 + Copy,
    C: Fn(i64, i64) -> bool + Copy,
    F: FnMut(T) -> Result<(), E>,
{
    let mut cur = Vec::with_capacity(start.len());
    iter_axis(&start, &end, step, cont, &mut cur, &mut body, from_vec)
}

fn iter_axis<T, E, S, C, F>(
    start: &[i64],
    end: &[i64],
    step: S,
    cont: C,
    cur: &mut Vec<i64>,
    body: &mut F,
    from_vec: impl Fn(Vec<i64>) -> T + Copy,
) -> Result<(), E>
where
    S: Fn(i64) -> i64 + Copy,
    C: Fn(i64, i64) -> bool + Copy,
    F: FnMut(T) -> Result<(), E>,
{
    let (Some(&s0), Some(&e0)) = (start.first(), end.first()) else {
        return body(from_vec(cur.clone()));
    };
    loop_m_(s0, |c| cont(c, e0), step, |c| {
        cur.push(c);
        let r = iter_axis(&start[1..], &end[1..], step, cont, cur, body, from_vec);
        cur.pop();
        r
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_for_maps_dim1_to_last_position() {
        assert_eq!(pos_for(3, Dim::new(1).unwrap()), Some(2));
        assert_eq!(pos_for(3, Dim::new(3).unwrap()), Some(0));
        assert_eq!(pos_for(3, Dim::new(4).unwrap()), None);
    }

    #[test]
    fn test_cons_then_uncons_is_identity() {
        let tail = vec![7, 8];
        let full = cons(3, &tail);
        assert_eq!(full, vec![3, 7, 8]);
        let (h, t) = uncons(&full);
        assert_eq!(h, 3);
        assert_eq!(t, tail);
    }
}
