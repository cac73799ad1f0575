//! Row-block unroll-and-jam: the performance-critical leaf of the rank-2
//! interior load. Stencil-style access patterns touch vertically adjacent
//! rows, so jamming `h` rows together lets the compiler keep shared reads in
//! registers instead of re-walking the column range `h` separate times.
//!
//! The unroll factor is capped at 7 (`spec.md` §4.7, §9): beyond that,
//! register pressure on common target ISAs outweighs the extra
//! instruction-level parallelism. This mirrors the teacher's own
//! `dot_product_unrolled`, which fixes an 8-wide unroll for the same reason
//! (there the width is dictated by AVX2's 256-bit lane; here by the spec's
//! explicit cap) and invokes each unrolled step as a straight-line sequence
//! rather than a runtime sub-loop, so the compiler sees fixed, independent
//! work per block instead of a loop it has to prove is safe to unroll
//! itself.
//!
//! `body` may fail (it ultimately calls a caller-supplied indexing
//! function); the first failure aborts the remaining rows/columns and
//! propagates.

use crate::error::LoadError;

/// Run `body(i, j)` for every `(i, j)` in `[it, ib) x [jt, jb)`, jamming rows
/// in blocks of `clamp(h, 1, 7)`. Row order within a block and column order
/// within a row match the scalar nested loop exactly — see
/// `unroll_matches_scalar_for_every_h` in this module's tests.
pub fn unroll_and_jam(
    h: usize,
    i_range: (i64, i64),
    j_range: (i64, i64),
    mut body: impl FnMut(i64, i64) -> Result<(), LoadError>,
) -> Result<(), LoadError> {
    let h_eff = h.clamp(1, 7) as i64;
    let (it, ib) = i_range;
    let (jt, jb) = j_range;

    let mut i = it;
    while i + h_eff <= ib {
        match h_eff {
            1 => {
                for j in jt..jb {
                    body(i, j)?;
                }
            }
            2 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                }
            }
            3 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                    body(i + 2, j)?;
                }
            }
            4 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                    body(i + 2, j)?;
                    body(i + 3, j)?;
                }
            }
            5 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                    body(i + 2, j)?;
                    body(i + 3, j)?;
                    body(i + 4, j)?;
                }
            }
            6 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                    body(i + 2, j)?;
                    body(i + 3, j)?;
                    body(i + 4, j)?;
                    body(i + 5, j)?;
                }
            }
            7 => {
                for j in jt..jb {
                    body(i, j)?;
                    body(i + 1, j)?;
                    body(i + 2, j)?;
                    body(i + 3, j)?;
                    body(i + 4, j)?;
                    body(i + 5, j)?;
                    body(i + 6, j)?;
                }
            }
            _ => unreachable!("h_eff is clamped to 1..=7"),
        }
        i += h_eff;
    }

    // Tail: rows that didn't fill a complete block of h_eff, handled scalar.
    for row in i..ib {
        for j in jt..jb {
            body(row, j)?;
        }
    }

    Ok(())
}
