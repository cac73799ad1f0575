//! Rank-2 load: four border rectangles plus an interior filled by
//! unroll-and-jam. Hand-specialized directly on [`Ix2`] — `spec.md`
//! §4.5/§4.6's "Rank 2" clause.

use crate::buffer::LinearBuffer;
use crate::error::LoadError;
use crate::index::Ix2;
use crate::scheduler::ScopeHandle;
use crate::unroll::unroll_and_jam;
use crate::windowed::WindowedDelayedArray;

fn stencil_h<E, FB, FW>(wd: &WindowedDelayedArray<Ix2, E, FB, FW>) -> usize
where
    FB: Fn(Ix2) -> Result<E, LoadError>,
    FW: Fn(Ix2) -> Result<E, LoadError>,
{
    wd.stencil_size.map(|s| s.0[0].max(1) as usize).unwrap_or(1)
}

/// Write `[row_lo, row_hi) x [col_lo, col_hi)` from `base.at` at its natural
/// (unwindowed) position in an `n`-wide row-major buffer.
fn write_border_rect<E, FB, B>(
    at: &FB,
    n: i64,
    row_lo: i64,
    row_hi: i64,
    col_lo: i64,
    col_hi: i64,
    buffer: &B,
) -> Result<(), LoadError>
where
    FB: Fn(Ix2) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    for i in row_lo..row_hi {
        for j in col_lo..col_hi {
            buffer.write((i * n + j) as usize, at(Ix2::new([i, j]))?);
        }
    }
    Ok(())
}

pub fn load_seq<E, FB, FW, B>(
    wd: &WindowedDelayedArray<Ix2, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    FB: Fn(Ix2) -> Result<E, LoadError>,
    FW: Fn(Ix2) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let [m, n] = wd.base.shape.0;
    let [it, jt] = wd.win_start.0;
    let [wm, wn] = wd.win_size.0;
    let ib = it + wm;
    let jb = jt + wn;

    write_border_rect(&wd.base.at, n, 0, it, 0, n, buffer)?;
    write_border_rect(&wd.base.at, n, ib, m, 0, n, buffer)?;
    write_border_rect(&wd.base.at, n, it, ib, 0, jt, buffer)?;
    write_border_rect(&wd.base.at, n, it, ib, jb, n, buffer)?;

    let h = stencil_h(wd);
    unroll_and_jam(h, (it, ib), (jt, jb), |i, j| {
        buffer.write((i * n + j) as usize, (wd.win_at)(Ix2::new([i, j]))?);
        Ok(())
    })
}

pub fn load_par<'scope, 'pool, E, FB, FW, B>(
    scope: &ScopeHandle<'scope, 'pool>,
    wd: &'pool WindowedDelayedArray<Ix2, E, FB, FW>,
    buffer: &'pool B,
) where
    E: Send + 'pool,
    FB: Fn(Ix2) -> Result<E, LoadError> + Sync + 'pool,
    FW: Fn(Ix2) -> Result<E, LoadError> + Sync + 'pool,
    B: LinearBuffer<E> + Sync + 'pool,
{
    let [m, n] = wd.base.shape.0;
    let [it, jt] = wd.win_start.0;
    let [wm, wn] = wd.win_size.0;
    let ib = it + wm;
    let jb = jt + wn;

    if it > 0 {
        scope.schedule_work(move || write_border_rect(&wd.base.at, n, 0, it, 0, n, buffer));
    }
    if ib < m {
        scope.schedule_work(move || write_border_rect(&wd.base.at, n, ib, m, 0, n, buffer));
    }
    if jt > 0 {
        scope.schedule_work(move || write_border_rect(&wd.base.at, n, it, ib, 0, jt, buffer));
    }
    if jb < n {
        scope.schedule_work(move || write_border_rect(&wd.base.at, n, it, ib, jb, n, buffer));
    }

    let p = scope.num_workers().max(1) as i64;
    let chunk_height = wm / p;
    let slack_height = wm % p;
    let h = stencil_h(wd);

    if chunk_height > 0 {
        for block in 0..p {
            let row_lo = it + block * chunk_height;
            let row_hi = row_lo + chunk_height;
            scope.schedule_work(move || {
                unroll_and_jam(h, (row_lo, row_hi), (jt, jb), |i, j| {
                    buffer.write((i * n + j) as usize, (wd.win_at)(Ix2::new([i, j]))?);
                    Ok(())
                })
            });
        }
    }
    if slack_height > 0 {
        let row_lo = it + p * chunk_height;
        scope.schedule_work(move || {
            unroll_and_jam(h, (row_lo, ib), (jt, jb), |i, j| {
                buffer.write((i * n + j) as usize, (wd.win_at)(Ix2::new([i, j]))?);
                Ok(())
            })
        });
    }
}
