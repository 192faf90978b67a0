//! Linear to display (sRGB gamma) conversion.

use rayon::prelude::*;

use crate::image::LinearImage;

/// sRGB transfer function for one linear channel value.
///
/// Values above 1 use a plain 1/2.2 power so over-range highlights keep growing smoothly.
#[inline]
pub fn linear_to_gamma(value: f32) -> f32 {
    if value <= 0.0 {
        0.0
    } else if value <= 0.003_130_8 {
        value * 12.92
    } else if value < 1.0 {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    } else if value == 1.0 {
        1.0
    } else {
        value.powf(1.0 / 2.2)
    }
}

/// Converts an image in place to display encoding and makes it fully opaque.
pub fn to_display(image: &mut LinearImage) {
    let width = image.width().max(1) as usize;

    image.pixels_mut().par_chunks_mut(width).for_each(|row| {
        for pixel in row {
            pixel[0] = linear_to_gamma(pixel[0]);
            pixel[1] = linear_to_gamma(pixel[1]);
            pixel[2] = linear_to_gamma(pixel[2]);
            pixel[3] = 1.0;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageDesc;

    #[test]
    fn test_endpoints() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(1.0), 1.0);
        assert_eq!(linear_to_gamma(-0.5), 0.0);
    }

    #[test]
    fn test_known_values() {
        // Linear 0.2140 is sRGB 0.5 (128/255).
        assert!((linear_to_gamma(0.214_041) - 0.5).abs() < 1e-4);
        assert!((linear_to_gamma(0.001) - 0.012_92).abs() < 1e-6);
        assert!((linear_to_gamma(0.18) - 0.461_356).abs() < 1e-4);
    }

    #[test]
    fn test_monotonic_and_continuous() {
        let mut previous = 0.0;
        for i in 1..=2000 {
            let v = linear_to_gamma(i as f32 / 1000.0);
            assert!(v >= previous, "not monotonic at {}", i);
            assert!(v - previous < 0.02, "jump at {}", i);
            previous = v;
        }
        // Both branches agree at the linear segment boundary.
        let lo = linear_to_gamma(0.003_130_8);
        let hi = 1.055 * 0.003_130_8f32.powf(1.0 / 2.4) - 0.055;
        assert!((lo - hi).abs() < 1e-5);
    }

    #[test]
    fn test_to_display_forces_opaque_alpha() {
        let desc = ImageDesc::new(3, 2);
        let mut image = LinearImage::new_filled(desc, [0.0, 1.0, 0.214_041, 0.25]);
        image.set_pixel(2, 1, [1.0, 0.0, 0.0, 0.0]);

        to_display(&mut image);

        for pixel in image.pixels() {
            assert_eq!(pixel[3], 1.0);
        }
        let p = image.pixel(0, 0);
        assert_eq!(p[0], 0.0);
        assert_eq!(p[1], 1.0);
        assert!((p[2] - 0.5).abs() < 1e-4);
        assert_eq!(image.pixel(2, 1), [1.0, 0.0, 0.0, 1.0]);
    }
}
