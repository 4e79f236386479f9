//! Offscreen surface: an RGBA8 color buffer with an f32 depth buffer

use image::RgbaImage;
use stillframe_core::{Error, Result};

/// The offscreen draw target
///
/// Allocated once when the renderer is constructed and reused across render
/// calls; `clear` resets it between frames.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Allocate a surface of the given resolution
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Render(format!(
                "surface resolution must be positive, got {}x{}",
                width, height
            )));
        }

        let pixels = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            color: vec![0; pixels * 4],
            depth: vec![f32::INFINITY; pixels],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Reset color to the background and depth to the far plane
    pub fn clear(&mut self, background: [f32; 4]) {
        let rgba = [
            channel_to_u8(background[0]),
            channel_to_u8(background[1]),
            channel_to_u8(background[2]),
            channel_to_u8(background[3]),
        ];
        for pixel in self.color.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Depth-tested store; returns whether the fragment was written
    pub fn set_pixel(&mut self, x: u32, y: u32, depth: f32, rgba: [u8; 4]) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = (y * self.width + x) as usize;
        if depth >= self.depth[index] {
            return false;
        }
        self.depth[index] = depth;
        self.color[index * 4..index * 4 + 4].copy_from_slice(&rgba);
        true
    }

    /// Raw RGBA8 pixel rows, top-left origin
    pub fn pixels(&self) -> &[u8] {
        &self.color
    }

    /// Copy the color buffer out as an owned image
    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.color.clone())
            .ok_or_else(|| Error::Render("color buffer does not match surface size".to_string()))
    }
}

fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(Framebuffer::new(0, 10), Err(Error::Render(_))));
        assert!(matches!(Framebuffer::new(10, 0), Err(Error::Render(_))));
    }

    #[test]
    fn test_clear_fills_background() {
        let mut fb = Framebuffer::new(2, 2).unwrap();
        fb.clear([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&fb.pixels()[0..4], &[255, 0, 0, 255]);
        assert_eq!(&fb.pixels()[12..16], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_depth_test() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear([0.0, 0.0, 0.0, 1.0]);

        assert!(fb.set_pixel(1, 1, 0.5, [10, 20, 30, 255]));
        // Farther fragment loses
        assert!(!fb.set_pixel(1, 1, 0.7, [99, 99, 99, 255]));
        // Nearer fragment wins
        assert!(fb.set_pixel(1, 1, 0.2, [1, 2, 3, 255]));

        let index = (1 * 4 + 1) * 4;
        assert_eq!(&fb.pixels()[index..index + 4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = Framebuffer::new(2, 2).unwrap();
        assert!(!fb.set_pixel(2, 0, 0.0, [255, 255, 255, 255]));
        assert!(!fb.set_pixel(0, 5, 0.0, [255, 255, 255, 255]));
    }

    #[test]
    fn test_to_image_dimensions() {
        let fb = Framebuffer::new(3, 2).unwrap();
        let image = fb.to_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
    }
}
