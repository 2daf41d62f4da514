use crate::platform::DeviceType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no compute platforms available")]
    PlatformNotFound,
    #[error("no {requested} device on platform '{platform}'")]
    DeviceNotFound {
        requested: DeviceType,
        platform: String,
    },
    #[error("kernel build rejected: {reason}")]
    BuildFailure { reason: String },
    #[error("buffer allocation failed: {reason}")]
    AllocationFailure { reason: String },
    #[error("transfer size mismatch: buffer holds {buffer} elements, host side has {host}")]
    TransferMismatch { buffer: usize, host: usize },
    #[error("buffer usage violation: {0}")]
    UsageViolation(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
