//! Image to tensor conversion shared by training and inference.
//!
//! Every image is decoded to RGB, resized to a square of `image_size`, scaled
//! to `[0, 1]` and laid out channel-first. The model rescales to `[-1, 1]`
//! internally, so callers never normalize further.

use crate::{Error, Result};
use image::{DynamicImage, ImageReader, RgbImage, imageops::FilterType};
use std::path::Path;

/// Input side length the classifier is trained on.
pub const IMAGE_SIZE: usize = 224;

pub const CHANNELS: usize = 3;

/// A single preprocessed image, shape `[1, 3, size, size]`, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub data: Vec<f32>,
    pub size: usize,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        [1, CHANNELS, self.size, self.size]
    }
}

pub fn preprocess_path(path: &Path, image_size: usize) -> Result<ImageTensor> {
    let image = ImageReader::open(path)
        .map_err(|e| Error::preprocessing(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| Error::preprocessing(e.to_string()))?
        .decode()
        .map_err(|e| Error::preprocessing(e.to_string()))?;

    Ok(preprocess_image(&image, image_size))
}

pub fn preprocess_bytes(bytes: &[u8], image_size: usize) -> Result<ImageTensor> {
    let image =
        image::load_from_memory(bytes).map_err(|e| Error::preprocessing(e.to_string()))?;
    Ok(preprocess_image(&image, image_size))
}

pub fn preprocess_image(image: &DynamicImage, image_size: usize) -> ImageTensor {
    let rgb = image
        .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
        .to_rgb8();

    ImageTensor {
        data: to_chw(&rgb),
        size: image_size,
    }
}

/// Flattens an RGB image into channel-first floats in `[0, 1]`.
pub fn to_chw(rgb: &RgbImage) -> Vec<f32> {
    let (width, height) = rgb.dimensions();
    let plane = (width * height) as usize;
    let mut data = vec![0.0f32; CHANNELS * plane];

    for (i, pixel) in rgb.pixels().enumerate() {
        data[i] = pixel[0] as f32 / 255.0;
        data[plane + i] = pixel[1] as f32 / 255.0;
        data[2 * plane + i] = pixel[2] as f32 / 255.0;
    }

    data
}
