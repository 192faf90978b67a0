use super::*;
use crate::image::Rgba;

fn gradient_frame(desc: ImageDesc, seed: f32) -> LinearImage {
    let pixels = (0..desc.pixel_count())
        .map(|i| {
            let v = (i as f32 * 0.37 + seed).fract();
            [v, 1.0 - v, v * 0.5, 1.0]
        })
        .collect();
    LinearImage::new_with_pixels(desc, pixels).unwrap()
}

fn assert_images_near(a: &LinearImage, b: &LinearImage, eps: f32) {
    assert_eq!(a.desc(), b.desc());
    for (i, (pa, pb)) in a.pixels().iter().zip(b.pixels()).enumerate() {
        for c in 0..4 {
            assert!(
                (pa[c] - pb[c]).abs() <= eps,
                "pixel {} channel {}: {} vs {}",
                i,
                c,
                pa[c],
                pb[c]
            );
        }
    }
}

fn reference_sum(frames: &[LinearImage], weight: f32) -> LinearImage {
    let desc = *frames[0].desc();
    let mut pixels: Vec<Rgba> = vec![[0.0; 4]; desc.pixel_count()];
    for frame in frames {
        for (dst, src) in pixels.iter_mut().zip(frame.pixels()) {
            for c in 0..4 {
                dst[c] += src[c] * weight;
            }
        }
    }
    LinearImage::new_with_pixels(desc, pixels).unwrap()
}

#[test]
fn test_tile_count_rounds_up() {
    assert_eq!(tile_count(ImageDesc::new(16, 8)), (2, 1));
    assert_eq!(tile_count(ImageDesc::new(17, 9)), (3, 2));
    assert_eq!(tile_count(ImageDesc::new(1, 1)), (1, 1));
}

#[test]
fn test_cpu_accumulate_matches_reference() {
    // Neither dimension is a multiple of the tile size.
    let desc = ImageDesc::new(13, 11);
    let frames: Vec<LinearImage> = (0..3).map(|i| gradient_frame(desc, i as f32 * 0.1)).collect();
    let weight = 0.25;

    let kernel = CpuAccumulationKernel;
    let mut accumulator = kernel.allocate(desc, weight).unwrap();
    for frame in &frames {
        accumulator.accumulate(frame).unwrap();
    }

    assert_eq!(accumulator.frame_count(), 3);
    assert_images_near(&accumulator.resolve().unwrap(), &reference_sum(&frames, weight), 1e-6);
}

#[test]
fn test_cpu_accumulate_touches_every_pixel_once() {
    for (w, h) in [(1, 1), (7, 3), (8, 8), (9, 17), (33, 2)] {
        let desc = ImageDesc::new(w, h);
        let mut sum = vec![[0.0; 4]; desc.pixel_count()];
        let ones = vec![[1.0; 4]; desc.pixel_count()];

        accumulate_tiled(&mut sum, &ones, desc, 1.0);

        assert!(sum.iter().all(|p| *p == [1.0; 4]), "{}x{}", w, h);
    }
}

#[test]
fn test_weighted_sum_underrepresents_rejected_samples() {
    // N = 4 requested, k = 3 accepted: the sum is 3/4 of the accepted average.
    let desc = ImageDesc::new(5, 4);
    let requested = 4;
    let frames = [
        LinearImage::new_filled(desc, [0.2, 0.4, 0.6, 1.0]),
        LinearImage::new_filled(desc, [0.4, 0.4, 0.2, 1.0]),
        LinearImage::new_filled(desc, [0.6, 0.4, 0.4, 1.0]),
    ];

    let kernel = CpuAccumulationKernel;
    let mut accumulator = kernel.allocate(desc, 1.0 / requested as f32).unwrap();
    for frame in &frames {
        accumulator.accumulate(frame).unwrap();
    }
    let result = accumulator.resolve().unwrap();

    let average: Rgba = [0.4, 0.4, 0.4, 1.0];
    let fraction = frames.len() as f32 / requested as f32;
    let expected = LinearImage::new_filled(desc, average.map(|v| v * fraction));
    assert_images_near(&result, &expected, 1e-6);
}

#[test]
fn test_accumulate_rejects_mismatched_frame() {
    let kernel = CpuAccumulationKernel;
    let mut accumulator = kernel.allocate(ImageDesc::new(4, 4), 1.0).unwrap();
    let frame = LinearImage::new_empty(ImageDesc::new(4, 5));

    assert!(matches!(
        accumulator.accumulate(&frame),
        Err(Error::SizeMismatch { .. })
    ));
    assert_eq!(accumulator.frame_count(), 0);
}

#[cfg(feature = "wgpu")]
mod gpu_tests {
    use super::*;
    use crate::gpu::test_gpu;

    #[test]
    fn test_gpu_matches_cpu_on_ragged_size() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let desc = ImageDesc::new(21, 10);
        let frames: Vec<LinearImage> =
            (0..4).map(|i| gradient_frame(desc, i as f32 * 0.3)).collect();
        let weight = 1.0 / 6.0;

        let gpu_kernel = GpuAccumulationKernel::new(&gpu).unwrap();
        let mut gpu_acc = gpu_kernel.allocate(desc, weight).unwrap();
        let cpu_kernel = CpuAccumulationKernel;
        let mut cpu_acc = cpu_kernel.allocate(desc, weight).unwrap();

        for frame in &frames {
            gpu_acc.accumulate(frame).unwrap();
            cpu_acc.accumulate(frame).unwrap();
        }

        assert_eq!(gpu_acc.frame_count(), 4);
        assert_images_near(&gpu_acc.resolve().unwrap(), &cpu_acc.resolve().unwrap(), 1e-5);
    }

    #[test]
    fn test_gpu_accumulator_starts_zeroed() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let kernel = GpuAccumulationKernel::new(&gpu).unwrap();
        let desc = ImageDesc::new(9, 9);
        let accumulator = kernel.allocate(desc, 0.5).unwrap();

        assert_eq!(accumulator.resolve().unwrap(), LinearImage::new_empty(desc));
    }

    #[test]
    fn test_invalid_kernel_source_is_missing_resource() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let result = GpuAccumulationKernel::with_source(&gpu, "fn main( {");
        assert!(matches!(result, Err(Error::ResourceMissing(_))));
    }

    #[test]
    fn test_missing_kernel_file_is_missing_resource() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        let result = GpuAccumulationKernel::from_file(&gpu, "does/not/exist/accumulate.wgsl");
        assert!(matches!(result, Err(Error::ResourceMissing(_))));
    }
}
