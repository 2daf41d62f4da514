use crate::error::{KernelError, Result};
use wg_runtime::{DeviceBuffer, GridConfig, GridKernel, LaneCtx, LaneView};

/// Elementwise square: `output[i] = input[i] * input[i]`.
///
/// One element per work-group instance; dispatch with `Square::grid`.
#[derive(Debug)]
pub struct Square<'a> {
    input: &'a [f32],
    output: LaneView<'a>,
}

impl<'a> Square<'a> {
    /// Bind the kernel to its buffers.
    ///
    /// # Errors
    /// Returns an error if the buffer lengths differ or `output` is not
    /// lane-writable.
    pub fn new(input: &'a DeviceBuffer, output: &'a mut DeviceBuffer) -> Result<Self> {
        if input.len() != output.len() {
            return Err(KernelError::LengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        Ok(Square {
            input: input.as_slice(),
            output: output.lane_view()?,
        })
    }

    /// Grid shape: one single-lane work-group instance per element.
    pub fn grid(&self) -> GridConfig {
        GridConfig {
            groups: self.input.len(),
            lanes_per_group: 1,
        }
    }
}

impl GridKernel for Square<'_> {
    type GroupState = ();

    fn group_init(&self, _group_id: usize) {}

    fn lane_main(&self, _state: &(), lane: &LaneCtx<'_>) {
        // Lane 0 owns the element, so over-provisioned lane counts stay
        // race-free.
        if lane.lane_id() != 0 {
            return;
        }
        let i = lane.group_id();
        let x = self.input[i];
        unsafe { self.output.store(i, x * x) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wg_runtime::{platforms, BufferUsage, CommandQueue, Context, DeviceType};

    #[test]
    fn test_squares_one_through_ten() {
        let ps = platforms().unwrap();
        let device = ps[0].devices(DeviceType::Cpu).unwrap().remove(0);
        let ctx = Context::new(device);
        let queue = CommandQueue::new(&ctx);

        let data: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        let mut input = ctx.create_buffer(BufferUsage::ReadOnly, 10).unwrap();
        let mut output = ctx.create_buffer(BufferUsage::WriteOnly, 10).unwrap();
        queue.enqueue_write(&mut input, &data).unwrap();

        let kernel = Square::new(&input, &mut output).unwrap();
        queue.enqueue_grid(&kernel.grid(), &kernel).unwrap();

        let mut results = vec![0.0; 10];
        queue.enqueue_read(&output, &mut results).unwrap();
        let expected: Vec<f32> = data.iter().map(|x| x * x).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let ps = platforms().unwrap();
        let device = ps[0].devices(DeviceType::Cpu).unwrap().remove(0);
        let ctx = Context::new(device);
        let input = ctx.create_buffer(BufferUsage::ReadOnly, 10).unwrap();
        let mut output = ctx.create_buffer(BufferUsage::WriteOnly, 5).unwrap();
        let err = Square::new(&input, &mut output).unwrap_err();
        assert!(matches!(
            err,
            KernelError::LengthMismatch {
                input: 10,
                output: 5
            }
        ));
    }
}
