use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("matrix dimension must be at least 1")]
    EmptyDimension,
    #[error("{name} buffer holds {got} elements, expected {expected} for n={n}")]
    MatrixSizeMismatch {
        name: &'static str,
        n: usize,
        expected: usize,
        got: usize,
    },
    #[error("input holds {input} elements but output holds {output}")]
    LengthMismatch { input: usize, output: usize },
    #[error("device error: {0}")]
    Device(#[from] wg_runtime::DeviceError),
}

pub type Result<T> = std::result::Result<T, KernelError>;
