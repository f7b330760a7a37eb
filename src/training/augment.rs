//! Random affine augmentation on CHW image buffers.
//!
//! Each output pixel is mapped back into the source image and takes the value
//! of the nearest source pixel; coordinates falling outside are clamped to the
//! border, which repeats the edge pixels.

use crate::preprocess::CHANNELS;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    /// Maximum rotation in degrees, either direction.
    pub rotation_degrees: f32,
    /// Zoom factors are drawn from `[1 - zoom, 1 + zoom]` per axis.
    pub zoom: f32,
    /// Maximum horizontal shift as a fraction of the width.
    pub width_shift: f32,
    /// Maximum vertical shift as a fraction of the height.
    pub height_shift: f32,
    /// Maximum shear angle in degrees.
    pub shear_degrees: f32,
    pub horizontal_flip: bool,
}

impl Default for Augmentation {
    fn default() -> Self {
        Self {
            rotation_degrees: 20.0,
            zoom: 0.2,
            width_shift: 0.2,
            height_shift: 0.2,
            shear_degrees: 0.2,
            horizontal_flip: true,
        }
    }
}

/// One concrete draw of the augmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    pub rotation: f32,
    pub shear: f32,
    pub zoom_x: f32,
    pub zoom_y: f32,
    /// Shift in pixels.
    pub shift_x: f32,
    pub shift_y: f32,
    pub flip: bool,
}

impl AffineParams {
    pub fn identity() -> Self {
        Self {
            rotation: 0.0,
            shear: 0.0,
            zoom_x: 1.0,
            zoom_y: 1.0,
            shift_x: 0.0,
            shift_y: 0.0,
            flip: false,
        }
    }
}

impl Augmentation {
    pub fn sample<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> AffineParams {
        let size = size as f32;
        AffineParams {
            rotation: symmetric(rng, self.rotation_degrees).to_radians(),
            shear: symmetric(rng, self.shear_degrees).to_radians(),
            zoom_x: 1.0 + symmetric(rng, self.zoom),
            zoom_y: 1.0 + symmetric(rng, self.zoom),
            shift_x: symmetric(rng, self.width_shift) * size,
            shift_y: symmetric(rng, self.height_shift) * size,
            flip: self.horizontal_flip && rng.gen_bool(0.5),
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, image: &[f32], size: usize, rng: &mut R) -> Vec<f32> {
        warp(image, size, &self.sample(size, rng))
    }
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}

/// Applies `params` to a square CHW image of side `size`.
pub fn warp(image: &[f32], size: usize, params: &AffineParams) -> Vec<f32> {
    let plane = size * size;
    let mut out = vec![0.0f32; image.len()];
    if size == 0 || image.len() != CHANNELS * plane {
        out.copy_from_slice(image);
        return out;
    }

    let (sin_r, cos_r) = params.rotation.sin_cos();
    let (sin_s, cos_s) = params.shear.sin_cos();

    // rotation * shear * zoom, mapping output offsets to source offsets
    let m00 = cos_r * params.zoom_x;
    let m01 = (-cos_r * sin_s - sin_r * cos_s) * params.zoom_y;
    let m10 = sin_r * params.zoom_x;
    let m11 = (-sin_r * sin_s + cos_r * cos_s) * params.zoom_y;

    let center = (size as f32 - 1.0) / 2.0;
    let max = (size - 1) as f32;

    for y in 0..size {
        for x in 0..size {
            let ox = if params.flip { size - 1 - x } else { x };
            let dx = ox as f32 - center;
            let dy = y as f32 - center;

            let sx = (m00 * dx + m01 * dy + center + params.shift_x).round().clamp(0.0, max) as usize;
            let sy = (m10 * dx + m11 * dy + center + params.shift_y).round().clamp(0.0, max) as usize;

            for c in 0..CHANNELS {
                out[c * plane + y * size + x] = image[c * plane + sy * size + sx];
            }
        }
    }

    out
}
