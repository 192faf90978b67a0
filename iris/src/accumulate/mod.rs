//! Running weighted sum of per-sample renders.
//!
//! An [`AccumulationKernel`] is the program; [`AccumulationKernel::allocate`]
//! creates an [`Accumulator`] that owns the accumulation buffer (and, for
//! GPU kernels, the device-side frame buffer) for the duration of one
//! capture. Resources are released when the accumulator is dropped.
//!
//! Every kernel computes `accumulator[p] += frame[p] * weight` over the
//! image in [`TILE_SIZE`]×[`TILE_SIZE`] tiles, skipping positions of the
//! trailing tiles that fall outside the image.

mod cpu;
#[cfg(feature = "wgpu")]
mod gpu;
#[cfg(feature = "wgpu")]
mod pipeline;

pub use cpu::{accumulate_tiled, CpuAccumulationKernel};
#[cfg(feature = "wgpu")]
pub use gpu::GpuAccumulationKernel;

use crate::error::{Error, Result};
use crate::image::{ImageDesc, LinearImage};

/// Tile edge length, matching the compute shader's workgroup size.
pub const TILE_SIZE: u32 = 8;

/// Number of tiles along each axis needed to cover `desc`.
pub fn tile_count(desc: ImageDesc) -> (u32, u32) {
    (desc.width.div_ceil(TILE_SIZE), desc.height.div_ceil(TILE_SIZE))
}

/// An accumulation program able to allocate per-capture buffers.
pub trait AccumulationKernel {
    fn name(&self) -> &str;

    /// Allocates a zeroed accumulator of size `desc` applying `weight` to every frame.
    fn allocate(&self, desc: ImageDesc, weight: f32) -> Result<Box<dyn Accumulator + '_>>;
}

/// Accumulation buffers for one capture.
pub trait Accumulator {
    fn desc(&self) -> ImageDesc;

    /// Adds `frame * weight` into the accumulator. Returns once the frame
    /// has been consumed, so the caller may overwrite it immediately.
    fn accumulate(&mut self, frame: &LinearImage) -> Result<()>;

    /// Number of frames accumulated so far.
    fn frame_count(&self) -> u32;

    /// Copies the current accumulator contents out.
    fn resolve(&self) -> Result<LinearImage>;
}

pub(crate) fn check_frame(expected: ImageDesc, frame: &LinearImage) -> Result<()> {
    if *frame.desc() != expected {
        return Err(Error::SizeMismatch {
            expected: expected.to_string(),
            actual: frame.desc().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests;
