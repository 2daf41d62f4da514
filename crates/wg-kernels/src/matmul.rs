//! Tiled row-by-column dot-product kernel.
//!
//! One work-group instance computes one row of `C = A x B`. The instance
//! first copies its row of `A` into group-private scratch. Then, for each
//! output column, the lanes cooperatively stage that column of `B` into
//! group-shared scratch using a strided partition, cross the group-wide
//! barrier, and compute the dot product against the staged row. The
//! staging amortizes the strided global reads of `B` across the lanes;
//! the barrier is the single ordering point that makes the cooperative
//! writes visible.

use crate::error::{KernelError, Result};
use wg_runtime::{
    strided_indices, DeviceBuffer, GridConfig, GridKernel, LaneCtx, LaneView, LocalScratch,
};

/// Tiled matrix multiply over three device buffers.
///
/// Dispatch with a grid of exactly `n` work-group instances (one per
/// output row); `TiledMatMul::grid` builds the config. Any lane count from
/// 1 up to the device limit is correct, including counts that do not
/// divide `n` (trailing lanes just stage fewer elements per column).
#[derive(Debug)]
pub struct TiledMatMul<'a> {
    a: &'a [f32],
    b: &'a [f32],
    c: LaneView<'a>,
    n: usize,
}

/// State built once per work-group instance, before its lanes start.
pub struct RowState {
    /// Private copy of row `i` of `A`; read-only once lanes run.
    a_row: Vec<f32>,
    /// Cooperatively staged column of `B`, rewritten once per output column.
    b_col: LocalScratch,
}

impl<'a> TiledMatMul<'a> {
    /// Bind the kernel to its buffers.
    ///
    /// # Errors
    /// Returns an error if `n` is zero, any buffer does not hold exactly
    /// `n * n` elements, or `c` is not lane-writable.
    pub fn new(
        a: &'a DeviceBuffer,
        b: &'a DeviceBuffer,
        c: &'a mut DeviceBuffer,
        n: usize,
    ) -> Result<Self> {
        if n == 0 {
            return Err(KernelError::EmptyDimension);
        }
        let expected = n * n;
        for (name, len) in [("A", a.len()), ("B", b.len()), ("C", c.len())] {
            if len != expected {
                return Err(KernelError::MatrixSizeMismatch {
                    name,
                    n,
                    expected,
                    got: len,
                });
            }
        }
        Ok(TiledMatMul {
            a: a.as_slice(),
            b: b.as_slice(),
            c: c.lane_view()?,
            n,
        })
    }

    /// Grid shape for this kernel: one work-group instance per output row.
    pub fn grid(&self, lanes_per_group: usize) -> GridConfig {
        GridConfig {
            groups: self.n,
            lanes_per_group,
        }
    }
}

impl GridKernel for TiledMatMul<'_> {
    type GroupState = RowState;

    fn group_init(&self, row: usize) -> RowState {
        let n = self.n;
        RowState {
            a_row: self.a[row * n..(row + 1) * n].to_vec(),
            b_col: LocalScratch::new(n),
        }
    }

    fn lane_main(&self, state: &RowState, lane: &LaneCtx<'_>) {
        let n = self.n;
        let row = lane.group_id();
        for j in 0..n {
            // Stage column j of B: each lane owns a disjoint stride.
            for k in strided_indices(lane.lane_id(), lane.lane_count(), n) {
                unsafe { state.b_col.write(k, self.b[k * n + j]) };
            }
            lane.barrier_local();

            // Every lane computes the full dot product; recomputing is
            // cheaper than a broadcast. Ascending k keeps the summation
            // order fixed across lane and worker counts.
            let b_col = unsafe { state.b_col.as_slice() };
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += state.a_row[k] * b_col[k];
            }
            if lane.lane_id() == 0 {
                // Designated writer: one store per output cell.
                unsafe { self.c.store(row * n + j, sum) };
            }

            // Staging for column j+1 must not start while another lane is
            // still reading this column.
            lane.barrier_local();
        }
    }
}
