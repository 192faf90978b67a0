//! CPU accumulation with rayon, one task per row of tiles.

use rayon::prelude::*;

use super::{check_frame, AccumulationKernel, Accumulator, TILE_SIZE};
use crate::error::Result;
use crate::image::{ImageDesc, LinearImage, Rgba};

/// Adds `frame * weight` into `accumulator`, walking the image tile by tile.
///
/// # Panics
/// Panics if either slice does not hold exactly `desc.pixel_count()` pixels.
pub fn accumulate_tiled(accumulator: &mut [Rgba], frame: &[Rgba], desc: ImageDesc, weight: f32) {
    assert_eq!(accumulator.len(), desc.pixel_count(), "accumulator size mismatch");
    assert_eq!(frame.len(), desc.pixel_count(), "frame size mismatch");

    if desc.is_empty() {
        return;
    }

    let width = desc.width as usize;
    let tile = TILE_SIZE as usize;
    let band = width * tile;
    let tiles_x = width.div_ceil(tile);

    accumulator
        .par_chunks_mut(band)
        .zip(frame.par_chunks(band))
        .for_each(|(acc_band, frame_band)| {
            // The last band may hold fewer than TILE_SIZE rows.
            let rows = acc_band.len() / width;

            for tile_x in 0..tiles_x {
                for local_y in 0..tile {
                    if local_y >= rows {
                        continue;
                    }
                    for local_x in 0..tile {
                        let x = tile_x * tile + local_x;
                        if x >= width {
                            continue;
                        }

                        let i = local_y * width + x;
                        let src = frame_band[i];
                        let dst = &mut acc_band[i];
                        for c in 0..4 {
                            dst[c] += src[c] * weight;
                        }
                    }
                }
            }
        });
}

/// Accumulation kernel running on the CPU thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuAccumulationKernel;

impl AccumulationKernel for CpuAccumulationKernel {
    fn name(&self) -> &str {
        "cpu"
    }

    fn allocate(&self, desc: ImageDesc, weight: f32) -> Result<Box<dyn Accumulator + '_>> {
        tracing::debug!("Allocating CPU accumulator {} (weight {})", desc, weight);

        Ok(Box::new(CpuAccumulator {
            sum: LinearImage::new_empty(desc),
            weight,
            frame_count: 0,
        }))
    }
}

#[derive(Debug)]
struct CpuAccumulator {
    sum: LinearImage,
    weight: f32,
    frame_count: u32,
}

impl Accumulator for CpuAccumulator {
    fn desc(&self) -> ImageDesc {
        *self.sum.desc()
    }

    fn accumulate(&mut self, frame: &LinearImage) -> Result<()> {
        check_frame(self.desc(), frame)?;

        let desc = self.desc();
        accumulate_tiled(self.sum.pixels_mut(), frame.pixels(), desc, self.weight);
        self.frame_count += 1;

        Ok(())
    }

    fn frame_count(&self) -> u32 {
        self.frame_count
    }

    fn resolve(&self) -> Result<LinearImage> {
        Ok(self.sum.clone())
    }
}
