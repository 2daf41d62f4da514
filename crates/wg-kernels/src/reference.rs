//! Sequential reference implementation used for verification.

/// Per-element absolute tolerance when comparing against the reference.
pub const EPSILON: f32 = 1e-4;

/// Naive triple-loop multiply of two row-major `n x n` matrices.
///
/// Accumulates in the same ascending-`k` order as the tiled kernel, so
/// integer-valued inputs compare exactly.
///
/// # Panics
/// Panics if `a` or `b` does not hold `n * n` elements.
pub fn matmul_naive(a: &[f32], b: &[f32], n: usize) -> Vec<f32> {
    assert_eq!(a.len(), n * n, "matmul_naive: a has wrong length");
    assert_eq!(b.len(), n * n, "matmul_naive: b has wrong length");
    let mut c = vec![0.0f32; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += a[i * n + k] * b[k * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    c
}

/// Elementwise comparison within an absolute tolerance.
pub fn matrices_equal(x: &[f32], y: &[f32], tolerance: f32) -> bool {
    x.len() == y.len()
        && x.iter()
            .zip(y.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
}
