//! Multiplies two random square matrices with the tiled work-group kernel
//! and verifies the result against the naive host multiply.
//!
//! Usage: `matmult [N]` (default N = 256). One work-group instance per
//! output row; lanes per group follow the device's compute units. Any
//! failure, including a verification mismatch, prints a diagnostic and
//! exits non-zero.

use rand::Rng;
use std::error::Error;
use std::process;
use std::time::Instant;
use wg_kernels::{matmul_naive, matrices_equal, TiledMatMul, EPSILON};
use wg_runtime::{find_platform, platforms, BufferUsage, CommandQueue, Context, DeviceType};

const DEFAULT_MAT_SIZE: usize = 256;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("matmult: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let n = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_MAT_SIZE,
    };

    let ps = platforms()?;
    let platform = find_platform(&ps, "workgrid")?;
    let device = platform.devices(DeviceType::Cpu)?.remove(0);
    log::info!("using device '{}' on '{}'", device.name(), platform.name());

    let context = Context::new(device);
    let queue = CommandQueue::new(&context);

    // Integer-valued inputs in [0, 10) keep the verification exact enough
    // for the fixed tolerance at moderate sizes.
    let mut rng = rand::thread_rng();
    let a: Vec<f32> = (0..n * n).map(|_| rng.gen_range(0..10) as f32).collect();
    let b: Vec<f32> = (0..n * n).map(|_| rng.gen_range(0..10) as f32).collect();

    let mut a_buf = context.create_buffer(BufferUsage::ReadOnly, n * n)?;
    let mut b_buf = context.create_buffer(BufferUsage::ReadOnly, n * n)?;
    let mut c_buf = context.create_buffer(BufferUsage::WriteOnly, n * n)?;
    queue.enqueue_write(&mut a_buf, &a)?;
    queue.enqueue_write(&mut b_buf, &b)?;

    let lanes = context
        .device()
        .compute_units()
        .min(context.device().max_lanes())
        .min(n);

    let kernel = TiledMatMul::new(&a_buf, &b_buf, &mut c_buf, n)?;
    let start = Instant::now();
    queue.enqueue_grid(&kernel.grid(lanes), &kernel)?;
    let elapsed = start.elapsed();

    let mut c = vec![0.0f32; n * n];
    queue.enqueue_read(&c_buf, &mut c)?;
    println!("{n}x{n} multiply with {lanes} lanes per group: {elapsed:.2?}");

    let expected = matmul_naive(&a, &b, n);
    if !matrices_equal(&c, &expected, EPSILON) {
        eprintln!("matmult: verification FAILED against host reference");
        process::exit(1);
    }
    println!("verification OK (tolerance {EPSILON})");
    Ok(())
}
