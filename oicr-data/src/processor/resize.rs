//! Image resizing primitives.

use crate::common::*;
use image::{
    imageops::{self, FilterType},
    ImageBuffer, Rgb32FImage,
};

/// Resize an H×W×C array by a uniform ratio.
pub trait Resize
where
    Self: Debug,
{
    /// The output size is `round(h * ratio) × round(w * ratio)`.
    fn resize(&self, image: ArrayView3<f32>, ratio: f64) -> Result<Array3<f32>>;
}

/// Bilinear resizing of three-channel images backed by the triangle filter
/// of [image::imageops::resize].
///
/// The filter clamps float samples to `[0, 1]`, so values are mapped into
/// that range before resizing and mapped back afterwards. Mean-subtracted
/// pixels keep their sign.
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearResize;

impl Resize for BilinearResize {
    fn resize(&self, image: ArrayView3<f32>, ratio: f64) -> Result<Array3<f32>> {
        ensure!(
            ratio.is_finite() && ratio > 0.0,
            "resize ratio must be positive, but get {}",
            ratio
        );
        let (src_h, src_w, channels) = image.dim();
        ensure!(src_h > 0 && src_w > 0, "cannot resize an empty image");
        ensure!(
            channels == 3,
            "expect an image with 3 channels, but get {}",
            channels
        );

        let dst_h = ((src_h as f64 * ratio).round() as usize).max(1);
        let dst_w = ((src_w as f64 * ratio).round() as usize).max(1);

        if dst_h == src_h && dst_w == src_w {
            return Ok(image.to_owned());
        }

        let (min, max) = image
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
                (min.min(value), max.max(value))
            });
        ensure!(
            min.is_finite() && max.is_finite(),
            "cannot resize an image with non-finite values"
        );
        let range = if max > min { max - min } else { 1.0 };

        let buffer: Rgb32FImage = {
            let values: Vec<f32> = image.iter().map(|&value| (value - min) / range).collect();
            ImageBuffer::from_raw(src_w as u32, src_h as u32, values)
                .ok_or_else(|| format_err!("image buffer size mismatch"))?
        };
        let resized = imageops::resize(&buffer, dst_w as u32, dst_h as u32, FilterType::Triangle);

        let values: Vec<f32> = resized
            .into_raw()
            .into_iter()
            .map(|value| value * range + min)
            .collect();
        Ok(Array3::from_shape_vec((dst_h, dst_w, channels), values)?)
    }
}
