//! `wg-runtime` - Host-side compute runtime for workgrid.
//!
//! This crate provides:
//! - Platform and device enumeration and selection
//! - A `Context` and blocking `CommandQueue` for buffer transfers and dispatch
//! - `DeviceBuffer` with kernel-side usage flags
//! - The work-group grid executor: `GridKernel`, `LaneCtx`, `LocalScratch`
//!
//! Work-group instances run on a pool of worker threads; the lanes inside
//! one instance are scoped threads sharing a barrier, so kernels written
//! against this runtime carry real cooperative-synchronization semantics.

pub mod buffer;
pub mod context;
pub mod error;
pub mod grid;
pub mod platform;

// Re-export primary types at the crate root for convenience.
pub use buffer::{BufferUsage, DeviceBuffer, LaneView};
pub use context::{CommandQueue, Context};
pub use error::{DeviceError, Result};
pub use grid::{run_grid, strided_indices, GridConfig, GridKernel, LaneCtx, LocalScratch};
pub use platform::{find_platform, platforms, Device, DeviceType, Platform};
