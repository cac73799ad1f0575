//! End-to-end scenarios exercising the full public surface: construction,
//! sequential load, and parallel load across several worker counts.

use ndwindow::{DelayedArray, Index, Ix1, Ix2, Ix3, LoadError, SliceSink, WindowedDelayedArray, WorkerId};

#[test]
fn test_scenario_1_one_d_identity_window() {
    let base = DelayedArray::new(Ix1::new([10]), |_ix: Ix1| Ok::<i64, LoadError>(-1));
    let wd = WindowedDelayedArray::new(base, Ix1::new([2]), Ix1::new([5]), |ix: Ix1| Ok(ix.0[0]), None);

    let mut seq = vec![0i64; 10];
    ndwindow::load_seq(&wd, &SliceSink::new(&mut seq)).unwrap();
    assert_eq!(seq, vec![-1, -1, 2, 3, 4, 5, 6, -1, -1, -1]);

    let mut par_data = vec![0i64; 10];
    {
        let sink = SliceSink::new(&mut par_data);
        let ids = vec![WorkerId(0), WorkerId(1), WorkerId(2)];
        ndwindow::load_par(&ids, &wd, &sink).unwrap();
    }
    assert_eq!(par_data, seq);
}

#[test]
fn test_scenario_2_two_d_full_window() {
    let base = DelayedArray::new(Ix2::new([4, 4]), |_ix: Ix2| Ok::<i64, LoadError>(0));
    let wd = WindowedDelayedArray::new(
        base,
        Ix2::new([0, 0]),
        Ix2::new([4, 4]),
        |ix: Ix2| Ok(ix.0[0] * 10 + ix.0[1]),
        None,
    );
    let expected = vec![0, 1, 2, 3, 10, 11, 12, 13, 20, 21, 22, 23, 30, 31, 32, 33];

    let mut seq = vec![0i64; 16];
    ndwindow::load_seq(&wd, &SliceSink::new(&mut seq)).unwrap();
    assert_eq!(seq, expected);

    for workers in [1usize, 4] {
        let mut data = vec![0i64; 16];
        {
            let sink = SliceSink::new(&mut data);
            let ids: Vec<_> = (0..workers).map(WorkerId).collect();
            ndwindow::load_par(&ids, &wd, &sink).unwrap();
        }
        assert_eq!(data, expected, "mismatch at {workers} workers");
    }
}

#[test]
fn test_scenario_3_two_d_centered_window_with_stencil_hint() {
    let base = DelayedArray::new(Ix2::new([6, 6]), |_ix: Ix2| Ok::<i64, LoadError>(-1));
    let wd = WindowedDelayedArray::new(
        base,
        Ix2::new([1, 1]),
        Ix2::new([4, 4]),
        |_ix: Ix2| Ok(1i64),
        Some(Ix2::new([3, 3])),
    );
    let mut data = vec![0i64; 36];
    ndwindow::load_seq(&wd, &SliceSink::new(&mut data)).unwrap();

    for i in 0..6i64 {
        for j in 0..6i64 {
            let v = data[(i * 6 + j) as usize];
            if (1..5).contains(&i) && (1..5).contains(&j) {
                assert_eq!(v, 1, "expected interior 1 at ({i},{j})");
            } else {
                assert_eq!(v, -1, "expected border -1 at ({i},{j})");
            }
        }
    }
}

#[test]
fn test_scenario_4_three_d_recursive() {
    let base = DelayedArray::new(Ix3::new([3, 3, 3]), |_ix: Ix3| Ok::<i64, LoadError>(0));
    let wd = WindowedDelayedArray::new(
        base,
        Ix3::new([1, 1, 1]),
        Ix3::new([1, 1, 1]),
        |_ix: Ix3| Ok(7i64),
        None,
    );
    let mut data = vec![0i64; 27];
    ndwindow::load_seq(&wd, &SliceSink::new(&mut data)).unwrap();

    for k in 0..27usize {
        if k == 13 {
            assert_eq!(data[k], 7);
        } else {
            assert_eq!(data[k], 0, "expected 0 at linear index {k}");
        }
    }
}

#[test]
fn test_scenario_5_parallel_determinism() {
    let fixture = || {
        let base = DelayedArray::new(Ix2::new([100, 100]), |ix: Ix2| Ok::<i64, LoadError>(-(ix.0[0] + ix.0[1])));
        WindowedDelayedArray::new(
            base,
            Ix2::new([10, 10]),
            Ix2::new([80, 80]),
            |ix: Ix2| Ok(ix.0[0] + ix.0[1]),
            None,
        )
    };

    let wd0 = fixture();
    let mut baseline = vec![0i64; 10_000];
    ndwindow::load_seq(&wd0, &SliceSink::new(&mut baseline)).unwrap();

    for workers in [1usize, 2, 4, 8] {
        let wd = fixture();
        let mut data = vec![0i64; 10_000];
        {
            let sink = SliceSink::new(&mut data);
            let ids: Vec<_> = (0..workers).map(WorkerId).collect();
            ndwindow::load_par(&ids, &wd, &sink).unwrap();
        }
        assert_eq!(data, baseline, "mismatch at {workers} workers");
    }
}

#[test]
fn test_scenario_6_window_edge_placements() {
    // No border: window covers the whole shape.
    let base_full = DelayedArray::new(Ix2::new([5, 5]), |_ix: Ix2| Ok::<i64, LoadError>(-1));
    let wd_full = WindowedDelayedArray::new(
        base_full,
        Ix2::new([0, 0]),
        Ix2::new([5, 5]),
        |ix: Ix2| Ok(ix.0[0] * 5 + ix.0[1]),
        None,
    );
    let mut data_full = vec![0i64; 25];
    ndwindow::load_seq(&wd_full, &SliceSink::new(&mut data_full)).unwrap();
    for k in 0..25i64 {
        assert_eq!(data_full[k as usize], k);
    }

    // No interior: zero-size window placed at the far corner.
    let base_empty = DelayedArray::new(Ix2::new([5, 5]), |ix: Ix2| Ok::<i64, LoadError>(ix.0[0] * 5 + ix.0[1]));
    let wd_empty = WindowedDelayedArray::new(
        base_empty,
        Ix2::new([5, 5]),
        Ix2::new([0, 0]),
        |_ix: Ix2| Ok(-1i64),
        None,
    );
    let mut data_empty = vec![0i64; 25];
    ndwindow::load_seq(&wd_empty, &SliceSink::new(&mut data_empty)).unwrap();
    for k in 0..25i64 {
        assert_eq!(data_empty[k as usize], k);
    }
}

#[test]
fn test_index_algebra_round_trip_holds_for_every_safe_index() {
    let shape = Ix2::new([7, 5]);
    for k in 0..shape.total_elem() {
        let ix = Ix2::from_linear_index(&shape, k);
        assert!(ix.is_safe_index(&shape));
        assert_eq!(ix.to_linear_index(&shape), k);
    }
}

#[test]
fn test_a_failing_border_function_propagates_through_load_par() {
    let base = DelayedArray::new(Ix2::new([8, 8]), |ix: Ix2| {
        if ix.0[0] == 0 && ix.0[1] == 0 {
            Err(LoadError::ElementFn(anyhow::anyhow!("border kernel rejected origin")))
        } else {
            Ok(0i64)
        }
    });
    let wd = WindowedDelayedArray::new(base, Ix2::new([2, 2]), Ix2::new([4, 4]), |_ix: Ix2| Ok(1i64), None);
    let mut data = vec![0i64; 64];
    let sink = SliceSink::new(&mut data);
    let result = ndwindow::load_par(&[WorkerId(0), WorkerId(1)], &wd, &sink);
    assert!(matches!(result, Err(LoadError::ElementFn(_))));
}
