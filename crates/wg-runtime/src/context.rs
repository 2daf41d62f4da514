use crate::buffer::{BufferUsage, DeviceBuffer};
use crate::error::{DeviceError, Result};
use crate::grid::{run_grid, GridConfig, GridKernel};
use crate::platform::Device;

/// A compute context bound to one device.
///
/// Owns nothing the OS must release beyond what `Drop` on its buffers and
/// queues already handles; the type exists to scope buffer creation to a
/// selected device, the way the source API ties allocations to a context.
#[derive(Debug, Clone)]
pub struct Context {
    device: Device,
}

impl Context {
    pub fn new(device: Device) -> Self {
        Context { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Allocate a zero-initialized device buffer of `len` `f32` elements.
    ///
    /// # Errors
    /// Returns `AllocationFailure` for zero-length buffers.
    pub fn create_buffer(&self, usage: BufferUsage, len: usize) -> Result<DeviceBuffer> {
        DeviceBuffer::new(usage, len)
    }
}

/// Blocking command queue for one context.
///
/// Every call completes its work before returning: transfers copy
/// synchronously and `enqueue_grid` runs the whole grid to completion,
/// folding the source's enqueue-then-finish pair into one call. There is
/// no progress reporting, cancellation, or timeout.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    device: Device,
}

impl CommandQueue {
    pub fn new(context: &Context) -> Self {
        CommandQueue {
            device: context.device().clone(),
        }
    }

    /// Copy host data into a device buffer.
    ///
    /// # Errors
    /// Returns `TransferMismatch` unless `src.len()` equals the buffer
    /// length, and `UsageViolation` for write-only (output) buffers.
    pub fn enqueue_write(&self, buffer: &mut DeviceBuffer, src: &[f32]) -> Result<()> {
        buffer.copy_from_host(src)
    }

    /// Copy a device buffer back to host memory.
    ///
    /// # Errors
    /// Returns `TransferMismatch` unless `dst.len()` equals the buffer
    /// length.
    pub fn enqueue_read(&self, buffer: &DeviceBuffer, dst: &mut [f32]) -> Result<()> {
        buffer.copy_to_host(dst)
    }

    /// Dispatch a kernel over the grid and block until every work-group
    /// instance has completed.
    ///
    /// # Errors
    /// Returns `BuildFailure` if the grid is empty, has zero lanes per
    /// group, or asks for more lanes than the device supports.
    pub fn enqueue_grid<K: GridKernel>(&self, cfg: &GridConfig, kernel: &K) -> Result<()> {
        if cfg.groups == 0 {
            return Err(DeviceError::BuildFailure {
                reason: "empty dispatch grid".to_string(),
            });
        }
        if cfg.lanes_per_group == 0 {
            return Err(DeviceError::BuildFailure {
                reason: "work-groups need at least one lane".to_string(),
            });
        }
        if cfg.lanes_per_group > self.device.max_lanes() {
            return Err(DeviceError::BuildFailure {
                reason: format!(
                    "{} lanes per group exceeds device limit {}",
                    cfg.lanes_per_group,
                    self.device.max_lanes()
                ),
            });
        }
        log::debug!(
            "dispatching {} groups x {} lanes on {} workers",
            cfg.groups,
            cfg.lanes_per_group,
            self.device.compute_units()
        );
        run_grid(cfg, self.device.compute_units(), kernel);
        Ok(())
    }
}
