//! Image loading, normalization, rescaling and batching.

use super::{saliency_map_path, BilinearResize, ImageDecoder, Resize, SaliencyMask};
use crate::{common::*, dataset::RoiRecord, profiling::Timing};

/// Compute the resize ratio that brings the shorter side to `target_size`,
/// clipped so that the longer side does not exceed `max_size`.
pub fn compute_scale(size: &HW<usize>, target_size: usize, max_size: usize) -> f64 {
    let min_side = size.min_side() as f64;
    let max_side = size.max_side() as f64;
    let scale = target_size as f64 / min_side;

    if (scale * max_side).round() > max_size as f64 {
        max_size as f64 / max_side
    } else {
        scale
    }
}

/// Mirror an H×W×C image along its vertical axis.
pub fn flip_horizontal(image: ArrayView3<f32>) -> Array3<f32> {
    image.slice(s![.., ..;-1, ..]).to_owned()
}

/// Copy H×W×C images into an N×C×H×W blob. Each image is anchored at the
/// top-left corner of its slot and the rest of the slot is zero.
pub fn images_to_blob(images: &[Array3<f32>]) -> Result<Array4<f32>> {
    let channels = match images.first() {
        Some(first) => first.dim().2,
        None => bail!("cannot build an image blob without images"),
    };
    ensure!(
        images.iter().all(|image| image.dim().2 == channels),
        "images must have the same number of channels"
    );

    let max_h = images.iter().map(|image| image.dim().0).max().unwrap_or(0);
    let max_w = images.iter().map(|image| image.dim().1).max().unwrap_or(0);

    let mut blob = Array4::zeros((images.len(), channels, max_h, max_w));
    blob.outer_iter_mut()
        .zip(images)
        .for_each(|(mut slot, image)| {
            let (h, w, _) = image.dim();
            slot.slice_mut(s![.., ..h, ..w])
                .assign(&image.view().permuted_axes([2, 0, 1]));
        });

    Ok(blob)
}

/// A normalized and rescaled image.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    pub image: Array3<f32>,
    /// The ratio from original to rescaled pixel coordinates.
    pub scale: f64,
    pub size: HW<usize>,
}

/// The batched images of one minibatch.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    /// N×C×H×W pixels.
    pub data: Array4<f32>,
    pub scales: Vec<f64>,
    pub sizes: Vec<HW<usize>>,
}

/// Builds the image blob of dataset records.
#[derive(Debug, Clone)]
pub struct ImageBlobBuilder<Z = BilinearResize>
where
    Z: Resize,
{
    pixel_means: Array1<f32>,
    max_size: usize,
    saliency: Option<SaliencyMask>,
    resize: Z,
}

impl ImageBlobBuilder<BilinearResize> {
    pub fn new(pixel_means: [f32; 3], max_size: usize) -> Result<Self> {
        Self::with_resize(pixel_means, max_size, BilinearResize)
    }
}

impl<Z> ImageBlobBuilder<Z>
where
    Z: Resize,
{
    pub fn with_resize(pixel_means: [f32; 3], max_size: usize, resize: Z) -> Result<Self> {
        ensure!(max_size > 0, "max_size must be positive");
        ensure!(
            pixel_means.iter().all(|mean| mean.is_finite()),
            "pixel means must be finite"
        );

        Ok(Self {
            pixel_means: Array1::from(pixel_means.to_vec()),
            max_size,
            saliency: None,
            resize,
        })
    }

    /// Mask every loaded image with its saliency map before any geometric
    /// transform.
    pub fn saliency_mask(self, saliency: SaliencyMask) -> Self {
        Self {
            saliency: Some(saliency),
            ..self
        }
    }

    /// Flip if requested, subtract pixel means and rescale.
    pub fn prepare(
        &self,
        image: Array3<f32>,
        flipped: bool,
        target_size: usize,
    ) -> Result<ScaledImage> {
        let (orig_h, orig_w, channels) = image.dim();
        ensure!(
            orig_h > 0 && orig_w > 0,
            "image must have positive height and width"
        );
        ensure!(
            channels == self.pixel_means.len(),
            "expect {} channels, but get {}",
            self.pixel_means.len(),
            channels
        );

        let mut image = if flipped {
            flip_horizontal(image.view())
        } else {
            image
        };
        image -= &self.pixel_means;

        let scale = compute_scale(&HW::from_hw([orig_h, orig_w]), target_size, self.max_size);
        let image = self.resize.resize(image.view(), scale)?;
        let (new_h, new_w, _) = image.dim();

        Ok(ScaledImage {
            image,
            scale,
            size: HW::from_hw([new_h, new_w]),
        })
    }

    /// Decode the image of a record, apply the saliency mask if enabled, then
    /// [prepare](Self::prepare) it.
    pub fn load<D>(
        &self,
        decoder: &D,
        record: &RoiRecord,
        target_size: usize,
    ) -> Result<ScaledImage>
    where
        D: ImageDecoder,
    {
        let mut timing = Timing::new("image_blob");

        let image = decoder.decode_image(&record.image)?;
        timing.set_record("decode");

        let image = match &self.saliency {
            Some(saliency) => {
                let saliency_dir = record.saliency_dir.as_ref().ok_or_else(|| {
                    format_err!(
                        "saliency masking requires a saliency directory for '{}'",
                        record.image.display()
                    )
                })?;
                let map_path = saliency_map_path(&record.image, saliency_dir)?;
                let map = decoder.decode_saliency(&map_path)?;
                let image = saliency
                    .forward(image, map.view())
                    .with_context(|| format!("failed to mask '{}'", record.image.display()))?;
                timing.set_record("saliency");
                image
            }
            None => image,
        };

        let output = self.prepare(image, record.flipped, target_size)?;
        timing.set_record("resize");
        timing.report();

        Ok(output)
    }

    /// Load every record at its target size and batch the results.
    pub fn build<D, T>(
        &self,
        decoder: &D,
        records: &[T],
        target_sizes: &[usize],
    ) -> Result<ImageBlob>
    where
        D: ImageDecoder,
        T: Borrow<RoiRecord>,
    {
        ensure!(
            records.len() == target_sizes.len(),
            "expect {} target sizes, but get {}",
            records.len(),
            target_sizes.len()
        );

        let (images, scales, sizes) = izip!(records, target_sizes)
            .map(|(record, &target_size)| self.load(decoder, record.borrow(), target_size))
            .try_fold(
                (vec![], vec![], vec![]),
                |(mut images, mut scales, mut sizes), result| -> Result<_> {
                    let ScaledImage { image, scale, size } = result?;
                    images.push(image);
                    scales.push(scale);
                    sizes.push(size);
                    Ok((images, scales, sizes))
                },
            )?;

        let data = images_to_blob(&images)?;

        Ok(ImageBlob {
            data,
            scales,
            sizes,
        })
    }
}
