//! Rank-1 load: three contiguous runs. Hand-specialized directly on [`Ix1`]
//! so index construction is a stack array literal, never a `Vec` allocation
//! — `spec.md` §4.5/§4.6's "Rank 1" clause.

use crate::buffer::LinearBuffer;
use crate::error::LoadError;
use crate::index::Ix1;
use crate::scheduler::ScopeHandle;
use crate::windowed::WindowedDelayedArray;

pub fn load_seq<E, FB, FW, B>(
    wd: &WindowedDelayedArray<Ix1, E, FB, FW>,
    buffer: &B,
) -> Result<(), LoadError>
where
    FB: Fn(Ix1) -> Result<E, LoadError>,
    FW: Fn(Ix1) -> Result<E, LoadError>,
    B: LinearBuffer<E>,
{
    let m = wd.base.shape.0[0];
    let s = wd.win_start.0[0];
    let e = s + wd.win_size.0[0];

    for k in 0..s {
        buffer.write(k as usize, (wd.base.at)(Ix1::new([k]))?);
    }
    for k in s..e {
        buffer.write(k as usize, (wd.win_at)(Ix1::new([k]))?);
    }
    for k in e..m {
        buffer.write(k as usize, (wd.base.at)(Ix1::new([k]))?);
    }
    Ok(())
}

pub fn load_par<'scope, 'pool, E, FB, FW, B>(
    scope: &ScopeHandle<'scope, 'pool>,
    wd: &'pool WindowedDelayedArray<Ix1, E, FB, FW>,
    buffer: &'pool B,
) where
    E: Send + 'pool,
    FB: Fn(Ix1) -> Result<E, LoadError> + Sync + 'pool,
    FW: Fn(Ix1) -> Result<E, LoadError> + Sync + 'pool,
    B: LinearBuffer<E> + Sync + 'pool,
{
    let m = wd.base.shape.0[0];
    let s = wd.win_start.0[0];
    let w = wd.win_size.0[0];
    let e = s + w;

    if s > 0 {
        scope.schedule_work(move || {
            for k in 0..s {
                buffer.write(k as usize, (wd.base.at)(Ix1::new([k]))?);
            }
            Ok(())
        });
    }
    if e < m {
        scope.schedule_work(move || {
            for k in e..m {
                buffer.write(k as usize, (wd.base.at)(Ix1::new([k]))?);
            }
            Ok(())
        });
    }

    let p = scope.num_workers().max(1) as i64;
    let chunk = w / p;
    let slack = w % p;

    if chunk > 0 {
        for block in 0..p {
            let lo = s + block * chunk;
            let hi = lo + chunk;
            scope.schedule_work(move || {
                for k in lo..hi {
                    buffer.write(k as usize, (wd.win_at)(Ix1::new([k]))?);
                }
                Ok(())
            });
        }
    }
    if slack > 0 {
        let lo = s + p * chunk;
        let hi = e;
        scope.schedule_work(move || {
            for k in lo..hi {
                buffer.write(k as usize, (wd.win_at)(Ix1::new([k]))?);
            }
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SliceSink;
    use crate::delayed::DelayedArray;
    use crate::scheduler::Scheduler;

    fn wd_fixture() -> WindowedDelayedArray<Ix1, i64, impl Fn(Ix1) -> Result<i64, LoadError> + Clone, impl Fn(Ix1) -> Result<i64, LoadError> + Clone>
    {
        let base = DelayedArray::new(Ix1::new([10]), |_ix: Ix1| Ok(-1i64));
        WindowedDelayedArray::new(
            base,
            Ix1::new([2]),
            Ix1::new([5]),
            |ix: Ix1| Ok(ix.0[0]),
            None,
        )
    }

    #[test]
    fn test_sequential_matches_spec_scenario_1() {
        let wd = wd_fixture();
        let mut data = vec![0i64; 10];
        load_seq(&wd, &SliceSink::new(&mut data)).unwrap();
        assert_eq!(data, vec![-1, -1, 2, 3, 4, 5, 6, -1, -1, -1]);
    }

    #[test]
    fn test_parallel_matches_sequential_for_several_worker_counts() {
        let expected = {
            let wd = wd_fixture();
            let mut data = vec![0i64; 10];
            load_seq(&wd, &SliceSink::new(&mut data)).unwrap();
            data
        };

        for workers in [1usize, 2, 3, 4, 7] {
            let wd = wd_fixture();
            let mut data = vec![0i64; 10];
            {
                let sink = SliceSink::new(&mut data);
                let ids: Vec<_> = (0..workers).map(crate::scheduler::WorkerId).collect();
                Scheduler::with_scheduler(&ids, |scope| {
                    load_par(scope, &wd, &sink);
                })
                .unwrap();
            }
            assert_eq!(data, expected, "mismatch at {workers} workers");
        }
    }
}
