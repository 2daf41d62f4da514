//! `wg-kernels` - Compute kernels for the workgrid runtime.
//!
//! Two kernels, matching the two demo programs:
//! - `Square`: elementwise square, one element per work-group instance
//! - `TiledMatMul`: row-per-group matrix multiply with cooperative,
//!   barrier-synchronized staging of the right-hand matrix's columns
//!
//! Plus a naive sequential multiply (`matmul_naive`) used as the
//! verification reference.

pub mod error;
pub mod matmul;
pub mod reference;
pub mod square;

pub use error::{KernelError, Result};
pub use matmul::TiledMatMul;
pub use reference::{matmul_naive, matrices_equal, EPSILON};
pub use square::Square;
