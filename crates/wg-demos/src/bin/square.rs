//! Squares ten floating-point numbers on a compute device.
//!
//! Walks the whole host ceremony once: enumerate platforms, pick a device,
//! create a context and command queue, transfer the input, run the kernel,
//! read back and print the results. Any failure prints a diagnostic and
//! exits non-zero.

use std::error::Error;
use std::process;
use wg_kernels::Square;
use wg_runtime::{find_platform, platforms, BufferUsage, CommandQueue, Context, DeviceType};

const DATA_SIZE: usize = 10;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("square: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let ps = platforms()?;
    let platform = find_platform(&ps, "workgrid")?;
    let device = platform.devices(DeviceType::Cpu)?.remove(0);
    log::info!("using device '{}' on '{}'", device.name(), platform.name());

    let context = Context::new(device);
    let queue = CommandQueue::new(&context);

    let data: Vec<f32> = (1..=DATA_SIZE).map(|v| v as f32).collect();
    let mut input = context.create_buffer(BufferUsage::ReadOnly, DATA_SIZE)?;
    let mut output = context.create_buffer(BufferUsage::WriteOnly, DATA_SIZE)?;
    queue.enqueue_write(&mut input, &data)?;

    let kernel = Square::new(&input, &mut output)?;
    queue.enqueue_grid(&kernel.grid(), &kernel)?;

    let mut results = vec![0.0f32; DATA_SIZE];
    queue.enqueue_read(&output, &mut results)?;

    for (x, y) in data.iter().zip(results.iter()) {
        println!("{x}^2 = {y}");
    }
    Ok(())
}
