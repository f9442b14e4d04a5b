//! Image decoding and tensor conversion.
//!
//! Mirrors what the classifier saw during training: the upload is converted
//! to RGB, resized to the fixed input size with nearest-neighbour sampling,
//! and handed to the model as raw 0..255 pixel values in a batch of one.

use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbImage};
use ndarray::Array4;
use serde::Deserialize;

use crate::error::{PredictError, Result};

/// Spatial input size of the plant disease model.
pub const INPUT_SIZE: u32 = 128;

/// Memory layout expected by the model's input tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, the Keras default.
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

/// Input geometry of a model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub layout: TensorLayout,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            width: INPUT_SIZE,
            height: INPUT_SIZE,
            layout: TensorLayout::Nhwc,
        }
    }
}

impl InputSpec {
    /// Shape of a batch-of-one input tensor.
    pub fn shape(&self) -> [usize; 4] {
        let (w, h) = (self.width as usize, self.height as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }
}

/// Decode uploaded bytes. Only JPEG and PNG are accepted.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(PredictError::ImageDecode("empty payload".into()));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| PredictError::ImageDecode(format!("unrecognised image data: {}", e)))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        other => {
            return Err(PredictError::ImageDecode(format!(
                "unsupported image format {:?}, expected JPEG or PNG",
                other
            )))
        }
    }

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PredictError::ImageDecode(e.to_string()))
}

/// Convert to RGB and resample to the model's spatial size.
pub fn resize_to_input(image: &DynamicImage, spec: &InputSpec) -> RgbImage {
    let rgb = image.to_rgb8();
    image::imageops::resize(&rgb, spec.width, spec.height, FilterType::Nearest)
}

/// Pack an RGB image into a batch-of-one f32 tensor.
pub fn to_tensor(image: &RgbImage, layout: TensorLayout) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut tensor = match layout {
        TensorLayout::Nhwc => Array4::zeros((1, h, w, 3)),
        TensorLayout::Nchw => Array4::zeros((1, 3, h, w)),
    };

    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = pixel[c] as f32;
            match layout {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
            }
        }
    }

    tensor
}

/// Decode, resize and tensorise an upload in one go.
pub fn preprocess(bytes: &[u8], spec: &InputSpec) -> Result<Array4<f32>> {
    let image = decode_image(bytes)?;
    let resized = resize_to_input(&image, spec);
    Ok(to_tensor(&resized, spec.layout))
}
