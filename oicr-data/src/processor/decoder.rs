//! Image file decoding.

use crate::common::*;
use image::RgbImage;

/// Decodes image files into H×W×C arrays in BGR channel order.
pub trait ImageDecoder
where
    Self: Debug,
{
    fn decode_image(&self, path: &Path) -> Result<Array3<f32>>;

    /// Decode a saliency map. It must have the same layout as the image it
    /// belongs to.
    fn decode_saliency(&self, path: &Path) -> Result<Array3<f32>> {
        self.decode_image(path)
    }
}

/// The decoder that reads image files from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode_image(&self, path: &Path) -> Result<Array3<f32>> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode image '{}'", path.display()))?
            .into_rgb8();
        Ok(rgb_to_bgr_array(&image))
    }

    fn decode_saliency(&self, path: &Path) -> Result<Array3<f32>> {
        let image = image::open(path)
            .with_context(|| format!("failed to decode saliency map '{}'", path.display()))?
            .into_rgb8();
        Ok(rgb_to_bgr_array(&image))
    }
}

impl<D> ImageDecoder for &D
where
    D: ImageDecoder,
{
    fn decode_image(&self, path: &Path) -> Result<Array3<f32>> {
        (**self).decode_image(path)
    }

    fn decode_saliency(&self, path: &Path) -> Result<Array3<f32>> {
        (**self).decode_saliency(path)
    }
}

/// Convert an RGB image into an H×W×3 array with channels reversed to BGR.
pub fn rgb_to_bgr_array(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        image.get_pixel(x as u32, y as u32)[2 - c] as f32
    })
}
