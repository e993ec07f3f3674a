//! Saliency based image masking.

use crate::common::*;

/// Locate the saliency map of an image. Maps are PNG files named after the
/// image file, whatever extension the image has.
pub fn saliency_map_path(image_path: &Path, saliency_dir: &Path) -> Result<PathBuf> {
    let file_name = image_path
        .file_name()
        .ok_or_else(|| format_err!("'{}' is not a file path", image_path.display()))?;
    Ok(saliency_dir.join(file_name).with_extension("png"))
}

/// Resets non-salient pixels to the pixel mean.
#[derive(Debug, Clone)]
pub struct SaliencyMask {
    pixel_means: Array1<f32>,
    threshold: f32,
}

impl SaliencyMask {
    pub fn new(pixel_means: [f32; 3], threshold: f32) -> Self {
        Self {
            pixel_means: Array1::from(pixel_means.to_vec()),
            threshold,
        }
    }

    /// Mask the image in mean-subtracted space, so that masked pixels end up
    /// exactly at the mean. The map is compared element-wise, channel by
    /// channel.
    pub fn forward(&self, image: Array3<f32>, saliency: ArrayView3<f32>) -> Result<Array3<f32>> {
        ensure!(
            image.dim() == saliency.dim(),
            "saliency map shape {:?} does not match image shape {:?}",
            saliency.dim(),
            image.dim()
        );
        let (_, _, channels) = image.dim();
        ensure!(
            channels == self.pixel_means.len(),
            "expect {} channels, but get {}",
            self.pixel_means.len(),
            channels
        );

        let threshold = self.threshold;
        let mut image = image;
        image -= &self.pixel_means;
        Zip::from(&mut image).and(saliency).for_each(|pixel, &value| {
            if value <= threshold {
                *pixel = 0.0;
            }
        });
        image += &self.pixel_means;

        Ok(image)
    }
}
