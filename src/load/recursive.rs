//! The rank >= 3 decomposition (`spec.md` §4.5/§4.6, "Rank >= 3"), generic
//! over any [`Loadable`] index type. Also supplies the generic (allocating,
//! not hand-specialized) rank-1/rank-2 algorithms that [`IxN`](crate::index::IxN)
//! falls back to once its own recursive peel brings it down to one of those
//! ranks — `IxN` has no fixed-rank sibling to delegate to at that point, so
//! it runs the same algorithm shape as `Ix1`/`Ix2` but through the
//! `Index::to_vec`/`from_vec` trait API instead of a stack array.

use crate::buffer::LinearBuffer;
use crate::delayed::{ComputeMode, DelayedArray};
use crate::error::LoadError;
use crate::index::Index;
use crate::load::offset_buffer::OffsetBuffer;
use crate::load::Loadable;
use crate::scheduler::ScopeHandle;
use crate::unroll::unroll_and_jam;
use crate::windowed::WindowedDelayedArray;

pub fn generic_rank1_seq<I, E, FB, FW, B>(
    wd: &WindowedDelayedArray<I, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let m = wd.base.shape.to_vec()[0];
    let s = wd.win_start.to_vec()[0];
    let e = s + wd.win_size.to_vec()[0];

    for k in 0..s {
        buffer.write(k as usize, (wd.base.at)(I::from_vec(vec![k]))?);
    }
    for k in s..e {
        buffer.write(k as usize, (wd.win_at)(I::from_vec(vec![k]))?);
    }
    for k in e..m {
        buffer.write(k as usize, (wd.base.at)(I::from_vec(vec![k]))?);
    }
    Ok(())
}

pub fn generic_rank2_seq<I, E, FB, FW, B>(
    wd: &WindowedDelayedArray<I, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let shape = wd.base.shape.to_vec();
    let start = wd.win_start.to_vec();
    let size = wd.win_size.to_vec();
    let (m, n) = (shape[0], shape[1]);
    let (it, jt) = (start[0], start[1]);
    let (ib, jb) = (it + size[0], jt + size[1]);
    let h = wd
        .stencil_size
        .as_ref()
        .map(|s| s.to_vec()[0].max(1) as usize)
        .unwrap_or(1);

    let write_rect = |row_lo: i64, row_hi: i64, col_lo: i64, col_hi: i64| -> Result<(), LoadError> {
        for i in row_lo..row_hi {
            for j in col_lo..col_hi {
                buffer.write((i * n + j) as usize, (wd.base.at)(I::from_vec(vec![i, j]))?);
            }
        }
        Ok(())
    };
    write_rect(0, it, 0, n)?;
    write_rect(ib, m, 0, n)?;
    write_rect(it, ib, 0, jt)?;
    write_rect(it, ib, jb, n)?;

    unroll_and_jam(h, (it, ib), (jt, jb), |i, j| {
        buffer.write((i * n + j) as usize, (wd.win_at)(I::from_vec(vec![i, j]))?);
        Ok(())
    })
}

fn fill_slab<I, E, FB, B>(
    at: &FB,
    outer: i64,
    inner_shape: &I::Lower,
    buffer: &OffsetBuffer<'_, B>,
) -> Result<(), LoadError>
where
    I: Index,
    FB: Fn(I) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let inner_total = inner_shape.total_elem();
    for k in 0..inner_total {
        let lx = I::Lower::from_linear_index(inner_shape, k);
        buffer.write(k as usize, at(I::cons(outer, lx))?);
    }
    Ok(())
}

pub fn load_seq_recursive<I, E, FB, FW, B>(
    wd: &WindowedDelayedArray<I, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    I: Loadable,
    I::Lower: Loadable,
    FB: Fn(I) -> Result<E, LoadError>,
    FW: Fn(I) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    match wd.size().rank() {
        1 => generic_rank1_seq(wd, buffer),
        2 => generic_rank2_seq(wd, buffer),
        _ => {
            let (m, inner_shape) = wd.base.shape.uncons();
            let (t, inner_win_start) = wd.win_start.uncons();
            let (w, inner_win_size) = wd.win_size.uncons();
            let inner_stencil = wd.stencil_size.map(|s| s.uncons().1);
            let inner_total = inner_shape.total_elem();
            let tb = t + w;

            for i in 0..t {
                let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
                fill_slab::<I, E, _, _>(&wd.base.at, i, &inner_shape, &view)?;
            }
            for i in tb..m {
                let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
                fill_slab::<I, E, _, _>(&wd.base.at, i, &inner_shape, &view)?;
            }

            for i in t..tb {
                let base_at = &wd.base.at;
                let win_at = &wd.win_at;
                let slice_base = DelayedArray {
                    comp: ComputeMode::Sequential,
                    shape: inner_shape,
                    at: move |lx: I::Lower| base_at(I::cons(i, lx)),
                };
                let slice = WindowedDelayedArray {
                    base: slice_base,
                    stencil_size: inner_stencil,
                    win_start: inner_win_start,
                    win_size: inner_win_size,
                    win_at: move |lx: I::Lower| win_at(I::cons(i, lx)),
                };
                let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
                I::Lower::load_seq_impl(&slice, &view)?;
            }
            Ok(())
        }
    }
}

pub fn load_par_recursive<'scope, 'pool, I, E, FB, FW, B>(
    scope: &ScopeHandle<'scope, 'pool>,
    wd: &'pool WindowedDelayedArray<I, E, FB, FW>,
    buffer: &'pool B,
) where
    I: Loadable,
    I::Lower: Loadable,
    E: Send + 'pool,
    FB: Fn(I) -> Result<E, LoadError> + Sync + 'pool,
    FW: Fn(I) -> Result<E, LoadError> + Sync + 'pool,
    B: LinearBuffer<E> + Sync + 'pool,
{
    let rank = wd.size().rank();
    if rank <= 2 {
        // No recursive structure to fan out over below rank 3: run the
        // whole (small) region as a single task.
        scope.schedule_work(move || {
            if rank <= 1 {
                generic_rank1_seq(wd, buffer)
            } else {
                generic_rank2_seq(wd, buffer)
            }
        });
        return;
    }

    let (m, inner_shape) = wd.base.shape.uncons();
    let (t, inner_win_start) = wd.win_start.uncons();
    let (w, inner_win_size) = wd.win_size.uncons();
    let inner_stencil = wd.stencil_size.map(|s| s.uncons().1);
    let inner_total = inner_shape.total_elem();
    let tb = t + w;

    if t > 0 {
        scope.schedule_work(move || {
            for i in 0..t {
                let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
                fill_slab::<I, E, _, _>(&wd.base.at, i, &inner_shape, &view)?;
            }
            Ok(())
        });
    }
    if tb < m {
        scope.schedule_work(move || {
            for i in tb..m {
                let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
                fill_slab::<I, E, _, _>(&wd.base.at, i, &inner_shape, &view)?;
            }
            Ok(())
        });
    }

    for i in t..tb {
        let base_at = &wd.base.at;
        let win_at = &wd.win_at;
        let slice_base = DelayedArray {
            comp: ComputeMode::Sequential,
            shape: inner_shape,
            at: move |lx: I::Lower| base_at(I::cons(i, lx)),
        };
        let slice = WindowedDelayedArray {
            base: slice_base,
            stencil_size: inner_stencil,
            win_start: inner_win_start,
            win_size: inner_win_size,
            win_at: move |lx: I::Lower| win_at(I::cons(i, lx)),
        };
        scope.schedule_work(move || {
            let view = OffsetBuffer::new(buffer, (i * inner_total) as usize);
            I::Lower::load_seq_impl(&slice, &view)
        });
    }
}
