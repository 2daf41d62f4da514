use crate::error::{DeviceError, Result};
use std::cell::UnsafeCell;
use std::fmt;

/// Kernel-side access mode of a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Kernels read, host writes. Inputs.
    ReadOnly,
    /// Kernels write, host reads back. Outputs.
    WriteOnly,
    /// Kernels read and write.
    ReadWrite,
}

/// A device-resident buffer of `f32` elements.
///
/// Buffers are allocated through `Context::create_buffer` and moved to and
/// from host memory with the blocking `CommandQueue` transfer calls. The
/// storage is released when the buffer is dropped; there is no explicit
/// free call.
#[derive(Debug)]
pub struct DeviceBuffer {
    data: Vec<f32>,
    usage: BufferUsage,
}

impl DeviceBuffer {
    pub(crate) fn new(usage: BufferUsage, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(DeviceError::AllocationFailure {
                reason: "zero-length buffer".to_string(),
            });
        }
        Ok(DeviceBuffer {
            data: vec![0.0; len],
            usage,
        })
    }

    /// Number of `f32` elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer contains no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Kernel-side read view of the buffer contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn copy_from_host(&mut self, src: &[f32]) -> Result<()> {
        if self.usage == BufferUsage::WriteOnly {
            return Err(DeviceError::UsageViolation(
                "host write to a write-only (output) buffer".to_string(),
            ));
        }
        if src.len() != self.data.len() {
            return Err(DeviceError::TransferMismatch {
                buffer: self.data.len(),
                host: src.len(),
            });
        }
        self.data.copy_from_slice(src);
        Ok(())
    }

    pub(crate) fn copy_to_host(&self, dst: &mut [f32]) -> Result<()> {
        if dst.len() != self.data.len() {
            return Err(DeviceError::TransferMismatch {
                buffer: self.data.len(),
                host: dst.len(),
            });
        }
        dst.copy_from_slice(&self.data);
        Ok(())
    }

    /// Kernel-side mutable view, shared across the lanes of a dispatch.
    ///
    /// Takes `&mut self` so the view is exclusive against the host for as
    /// long as it lives; lanes coordinate among themselves through the
    /// disjoint-writer discipline documented on `LaneView`.
    ///
    /// # Errors
    /// Returns `UsageViolation` for `ReadOnly` buffers.
    pub fn lane_view(&mut self) -> Result<LaneView<'_>> {
        if self.usage == BufferUsage::ReadOnly {
            return Err(DeviceError::UsageViolation(
                "lane store access to a read-only (input) buffer".to_string(),
            ));
        }
        Ok(LaneView::new(&mut self.data))
    }
}

/// Shared-mutable view of a `DeviceBuffer` handed to kernel lanes.
///
/// The view is created from an exclusive borrow, so no host access can
/// overlap it. Between any two barriers, each index must have at most one
/// lane storing to it and no lane loading it while it is being stored;
/// the strided-partition and designated-writer patterns used by the
/// shipped kernels satisfy this by construction.
pub struct LaneView<'a> {
    cells: &'a [UnsafeCell<f32>],
}

// Lanes on different threads share the view; soundness rests on the
// disjoint-access contract of `store`/`load`.
unsafe impl Send for LaneView<'_> {}
unsafe impl Sync for LaneView<'_> {}

impl<'a> LaneView<'a> {
    fn new(slice: &'a mut [f32]) -> Self {
        // UnsafeCell<f32> has the same layout as f32.
        let cells = unsafe { &*(slice as *mut [f32] as *const [UnsafeCell<f32>]) };
        LaneView { cells }
    }

    /// Number of elements visible through the view.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the view is over an empty buffer.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Store one element.
    ///
    /// # Safety
    /// No other lane may store to or load from `idx` between the same pair
    /// of barriers (or, absent barriers, during the whole dispatch).
    pub unsafe fn store(&self, idx: usize, value: f32) {
        unsafe { *self.cells[idx].get() = value };
    }

    /// Load one element.
    ///
    /// # Safety
    /// No lane may be storing to `idx` concurrently; a barrier must order
    /// any prior store by another lane before this load.
    pub unsafe fn load(&self, idx: usize) -> f32 {
        unsafe { *self.cells[idx].get() }
    }
}

impl fmt::Debug for LaneView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaneView").field("len", &self.len()).finish()
    }
}
