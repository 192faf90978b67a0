use crate::error::{Error, Result};

/// Linear RGBA pixel, 32-bit float per channel.
pub type Rgba = [f32; 4];

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
}

impl ImageDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn size_in_bytes(&self) -> usize {
        self.pixel_count() * std::mem::size_of::<Rgba>()
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} RGBA_F32", self.width, self.height)
    }
}

/// Tightly packed, row-major RGBA f32 image in linear color space.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearImage {
    desc: ImageDesc,
    pixels: Vec<Rgba>,
}

impl LinearImage {
    /// Creates an image with every pixel set to transparent black.
    pub fn new_empty(desc: ImageDesc) -> Self {
        Self::new_filled(desc, [0.0; 4])
    }

    pub fn new_filled(desc: ImageDesc, value: Rgba) -> Self {
        Self {
            desc,
            pixels: vec![value; desc.pixel_count()],
        }
    }

    pub fn new_with_pixels(desc: ImageDesc, pixels: Vec<Rgba>) -> Result<Self> {
        if pixels.len() != desc.pixel_count() {
            return Err(Error::SizeMismatch {
                expected: format!("{} pixels for {}", desc.pixel_count(), desc),
                actual: format!("{} pixels", pixels.len()),
            });
        }

        Ok(Self { desc, pixels })
    }

    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: Rgba) {
        let index = self.index(x, y);
        self.pixels[index] = value;
    }

    pub fn fill(&mut self, value: Rgba) {
        self.pixels.fill(value);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.desc.width && y < self.desc.height);
        y as usize * self.desc.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty_is_zeroed() {
        let image = LinearImage::new_empty(ImageDesc::new(3, 2));
        assert_eq!(image.pixels().len(), 6);
        assert!(image.pixels().iter().all(|p| *p == [0.0; 4]));
        assert_eq!(image.bytes().len(), 6 * 16);
    }

    #[test]
    fn test_new_with_pixels_checks_length() {
        let desc = ImageDesc::new(2, 2);
        assert!(LinearImage::new_with_pixels(desc, vec![[1.0; 4]; 4]).is_ok());
        assert!(matches!(
            LinearImage::new_with_pixels(desc, vec![[1.0; 4]; 3]),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_pixel_addressing_is_row_major() {
        let mut image = LinearImage::new_empty(ImageDesc::new(4, 3));
        image.set_pixel(1, 2, [0.5, 0.25, 0.125, 1.0]);
        assert_eq!(image.pixels()[2 * 4 + 1], [0.5, 0.25, 0.125, 1.0]);
        assert_eq!(image.pixel(1, 2), [0.5, 0.25, 0.125, 1.0]);
    }

    #[test]
    fn test_desc_display_and_aspect() {
        let desc = ImageDesc::new(1920, 1080);
        assert_eq!(desc.to_string(), "1920x1080 RGBA_F32");
        assert!((desc.aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert!(ImageDesc::new(0, 4).is_empty());
    }
}
