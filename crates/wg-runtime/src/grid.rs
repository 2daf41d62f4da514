//! Work-group grid execution.
//!
//! A dispatch is a grid of independent work-group instances. Each instance
//! builds its group state once, then runs `lanes_per_group` cooperating
//! lanes that share the state and a barrier. Instances are spread
//! round-robin over a pool of worker threads; no ordering exists between
//! instances, and none may be assumed by kernels.

use std::cell::UnsafeCell;
use std::sync::Barrier;
use std::thread;

/// Shape of one dispatch: how many work-group instances to run and how
/// many lanes cooperate inside each instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub groups: usize,
    pub lanes_per_group: usize,
}

/// A kernel executable on the work-group grid.
///
/// `group_init` runs once per work-group instance before any lane starts;
/// the state it returns is shared read-only (or via interior mutability,
/// see `LocalScratch`) by all lanes of that instance. `lane_main` is the
/// per-lane body.
pub trait GridKernel: Sync {
    type GroupState: Sync;

    fn group_init(&self, group_id: usize) -> Self::GroupState;

    fn lane_main(&self, state: &Self::GroupState, lane: &LaneCtx<'_>);
}

/// Per-lane execution context: identity within the grid plus the
/// group-wide barrier.
pub struct LaneCtx<'g> {
    group_id: usize,
    lane_id: usize,
    lane_count: usize,
    barrier: &'g Barrier,
}

impl LaneCtx<'_> {
    /// Index of this lane's work-group instance within the grid.
    pub fn group_id(&self) -> usize {
        self.group_id
    }

    /// Index of this lane within its work-group, `0 <= lane_id < lane_count`.
    pub fn lane_id(&self) -> usize {
        self.lane_id
    }

    /// Number of lanes in this work-group.
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Group-wide barrier with local-memory visibility.
    ///
    /// Every lane of the work-group must reach the barrier before any lane
    /// proceeds past it; all scratch writes made before the barrier are
    /// visible to every lane after it. A lane that skips the barrier on a
    /// data-dependent branch deadlocks its whole work-group.
    pub fn barrier_local(&self) {
        self.barrier.wait();
    }
}

/// Indices of the strided partition owned by one lane: `lane_id`,
/// `lane_id + lane_count`, `lane_id + 2*lane_count`, ... below `len`.
///
/// Over all lanes the partitions are disjoint and cover `[0, len)`
/// exactly. When `lane_count` does not divide `len`, trailing lanes own
/// one index fewer; that is load imbalance, not an error.
///
/// # Panics
/// Panics if `lane_count` is zero.
pub fn strided_indices(
    lane_id: usize,
    lane_count: usize,
    len: usize,
) -> impl Iterator<Item = usize> {
    assert!(lane_count > 0, "strided_indices: lane_count must be > 0");
    (lane_id..len).step_by(lane_count)
}

/// Work-group-local scratch memory, shared by the lanes of one instance.
///
/// The write/read split mirrors local memory on a barrier-synchronized
/// accelerator: lanes write disjoint slots, cross the barrier, then read
/// freely until the next write phase begins.
pub struct LocalScratch {
    cells: Box<[UnsafeCell<f32>]>,
}

// Shared across lane threads; soundness rests on the disjoint-writes /
// barrier-before-reads contract of the unsafe accessors.
unsafe impl Send for LocalScratch {}
unsafe impl Sync for LocalScratch {}

impl LocalScratch {
    /// Zero-initialized scratch of `len` elements.
    pub fn new(len: usize) -> Self {
        LocalScratch {
            cells: (0..len).map(|_| UnsafeCell::new(0.0)).collect(),
        }
    }

    /// Number of scratch elements.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the scratch holds no elements.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Write one scratch slot.
    ///
    /// # Safety
    /// No other lane may write or read `idx` until a barrier orders this
    /// store. Disjoint strided partitions satisfy this by construction.
    pub unsafe fn write(&self, idx: usize, value: f32) {
        unsafe { *self.cells[idx].get() = value };
    }

    /// Read one scratch slot.
    ///
    /// # Safety
    /// All writes to `idx` by other lanes must be ordered before this read
    /// by a barrier, and no lane may write `idx` while the read happens.
    pub unsafe fn read(&self, idx: usize) -> f32 {
        unsafe { *self.cells[idx].get() }
    }

    /// View the whole scratch as a slice for a read phase.
    ///
    /// # Safety
    /// Same contract as `read`, for every index: the returned slice must
    /// not outlive the read phase — it must be dead before any lane starts
    /// the next write phase.
    pub unsafe fn as_slice(&self) -> &[f32] {
        // UnsafeCell<f32> has the same layout as f32.
        unsafe { &*(self.cells.as_ref() as *const [UnsafeCell<f32>] as *const [f32]) }
    }
}

impl std::fmt::Debug for LocalScratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalScratch")
            .field("len", &self.len())
            .finish()
    }
}

/// Run a grid to completion on `workers` threads, blocking the caller.
///
/// Group ids are assigned round-robin: worker `w` runs groups
/// `w, w + workers, w + 2*workers, ...`. The assignment is a scheduling
/// detail only; correct kernels produce identical output for every worker
/// count.
///
/// The caller is responsible for validating the config against device
/// limits (`CommandQueue::enqueue_grid` does); this function only clamps
/// `workers` into `1..=groups`.
pub fn run_grid<K: GridKernel>(cfg: &GridConfig, workers: usize, kernel: &K) {
    if cfg.groups == 0 || cfg.lanes_per_group == 0 {
        return;
    }
    let workers = workers.clamp(1, cfg.groups);
    if workers == 1 {
        for group_id in 0..cfg.groups {
            run_group(group_id, cfg.lanes_per_group, kernel);
        }
        return;
    }
    thread::scope(|scope| {
        for w in 0..workers {
            scope.spawn(move || {
                let mut group_id = w;
                while group_id < cfg.groups {
                    run_group(group_id, cfg.lanes_per_group, kernel);
                    group_id += workers;
                }
            });
        }
    });
}

fn run_group<K: GridKernel>(group_id: usize, lanes: usize, kernel: &K) {
    let state = kernel.group_init(group_id);
    if lanes == 1 {
        // Single-lane groups need no spawn; the barrier is a no-op.
        let barrier = Barrier::new(1);
        let ctx = LaneCtx {
            group_id,
            lane_id: 0,
            lane_count: 1,
            barrier: &barrier,
        };
        kernel.lane_main(&state, &ctx);
        return;
    }
    let barrier = Barrier::new(lanes);
    thread::scope(|scope| {
        for lane_id in 0..lanes {
            let state = &state;
            let barrier = &barrier;
            scope.spawn(move || {
                let ctx = LaneCtx {
                    group_id,
                    lane_id,
                    lane_count: lanes,
                    barrier,
                };
                kernel.lane_main(state, &ctx);
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often each (group, lane) cell runs.
    struct CountingKernel {
        counts: Vec<AtomicUsize>,
        lanes: usize,
    }

    impl GridKernel for CountingKernel {
        type GroupState = ();

        fn group_init(&self, _group_id: usize) {}

        fn lane_main(&self, _state: &(), lane: &LaneCtx<'_>) {
            assert_eq!(lane.lane_count(), self.lanes);
            let cell = lane.group_id() * self.lanes + lane.lane_id();
            self.counts[cell].fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_every_cell_runs_exactly_once() {
        for workers in [1, 2, 5] {
            let groups = 7;
            let lanes = 3;
            let kernel = CountingKernel {
                counts: (0..groups * lanes).map(|_| AtomicUsize::new(0)).collect(),
                lanes,
            };
            run_grid(
                &GridConfig {
                    groups,
                    lanes_per_group: lanes,
                },
                workers,
                &kernel,
            );
            for (cell, count) in kernel.counts.iter().enumerate() {
                assert_eq!(count.load(Ordering::Relaxed), 1, "cell {cell}");
            }
        }
    }

    #[test]
    fn test_empty_grid_is_a_no_op() {
        let kernel = CountingKernel {
            counts: vec![],
            lanes: 1,
        };
        run_grid(
            &GridConfig {
                groups: 0,
                lanes_per_group: 1,
            },
            4,
            &kernel,
        );
    }

    /// Lanes cooperatively fill scratch with a strided partition, cross the
    /// barrier, and every lane checks the complete contents.
    struct FillCheckKernel {
        len: usize,
    }

    impl GridKernel for FillCheckKernel {
        type GroupState = LocalScratch;

        fn group_init(&self, _group_id: usize) -> LocalScratch {
            LocalScratch::new(self.len)
        }

        fn lane_main(&self, scratch: &LocalScratch, lane: &LaneCtx<'_>) {
            for k in strided_indices(lane.lane_id(), lane.lane_count(), self.len) {
                // Disjoint slots per lane.
                unsafe { scratch.write(k, k as f32 + 1.0) };
            }
            lane.barrier_local();
            let contents = unsafe { scratch.as_slice() };
            for (k, &v) in contents.iter().enumerate() {
                assert_eq!(v, k as f32 + 1.0);
            }
        }
    }

    #[test]
    fn test_barrier_makes_cooperative_writes_visible() {
        for lanes in [1, 2, 3, 8] {
            run_grid(
                &GridConfig {
                    groups: 4,
                    lanes_per_group: lanes,
                },
                2,
                &FillCheckKernel { len: 13 },
            );
        }
    }

    #[test]
    fn test_strided_partition_complete_and_disjoint() {
        for len in [1usize, 2, 3, 7, 16, 33] {
            for lane_count in 1..=len {
                let mut hits = vec![0u32; len];
                for lane_id in 0..lane_count {
                    for k in strided_indices(lane_id, lane_count, len) {
                        hits[k] += 1;
                    }
                }
                assert!(
                    hits.iter().all(|&h| h == 1),
                    "len={len} lane_count={lane_count}: {hits:?}"
                );
            }
        }
    }

    #[test]
    fn test_strided_partition_uneven_lane_count() {
        // 3 lanes over 5 indices: lane 0 -> {0,3}, lane 1 -> {1,4}, lane 2 -> {2}.
        let spans: Vec<Vec<usize>> = (0..3).map(|l| strided_indices(l, 3, 5).collect()).collect();
        assert_eq!(spans[0], vec![0, 3]);
        assert_eq!(spans[1], vec![1, 4]);
        assert_eq!(spans[2], vec![2]);
    }

    #[test]
    #[should_panic(expected = "lane_count must be > 0")]
    fn test_strided_indices_zero_lanes_panics() {
        let _ = strided_indices(0, 0, 4).count();
    }

    #[test]
    fn test_local_scratch_len() {
        let s = LocalScratch::new(5);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert!(LocalScratch::new(0).is_empty());
    }
}
