use super::MinibatchBlob;
use crate::{
    common::*,
    config::MinibatchConfig,
    dataset::RoiRecord,
    processor::{
        sample_rois, select_rows, DedupOutput, FileImageDecoder, ImageBlob, ImageBlobBuilder,
        ImageDecoder, RoiDeduplicator, SaliencyMask, SampledRois,
    },
    profiling::Timing,
};

/// Minibatch construction options.
#[derive(Debug, Clone)]
pub struct MinibatchInit {
    pub config: MinibatchConfig,
    /// Mask images with their saliency maps and emit one label row per region.
    pub saliency_masked: bool,
}

impl MinibatchInit {
    pub fn build(self) -> Result<MinibatchBuilder<FileImageDecoder>> {
        self.build_with_decoder(FileImageDecoder)
    }

    pub fn build_with_decoder<D>(self, decoder: D) -> Result<MinibatchBuilder<D>>
    where
        D: ImageDecoder,
    {
        let Self {
            config:
                MinibatchConfig {
                    pixel_means,
                    scales,
                    max_size,
                    dedup_boxes,
                    saliency_thresh,
                },
            saliency_masked,
        } = self;

        ensure!(!scales.is_empty(), "scales must not be empty");

        let pixel_means = pixel_means.map(|mean| mean.raw() as f32);
        let image_blob = {
            let builder = ImageBlobBuilder::new(pixel_means, max_size.get())?;
            if saliency_masked {
                builder.saliency_mask(SaliencyMask::new(
                    pixel_means,
                    saliency_thresh.raw() as f32,
                ))
            } else {
                builder
            }
        };

        Ok(MinibatchBuilder {
            scales: scales.into_iter().map(NonZeroUsize::get).collect(),
            saliency_masked,
            image_blob,
            dedup: RoiDeduplicator::new(dedup_boxes),
            decoder,
        })
    }
}

/// Turns dataset records into [MinibatchBlob]s.
#[derive(Debug, Clone)]
pub struct MinibatchBuilder<D>
where
    D: ImageDecoder,
{
    scales: Vec<usize>,
    saliency_masked: bool,
    image_blob: ImageBlobBuilder,
    dedup: RoiDeduplicator,
    decoder: D,
}

impl<D> MinibatchBuilder<D>
where
    D: ImageDecoder,
{
    pub fn saliency_masked(&self) -> bool {
        self.saliency_masked
    }

    /// Build the minibatch of a batch of records. The batch must hold exactly
    /// one record.
    pub fn build<T, R>(
        &self,
        records: &[T],
        num_classes: usize,
        rng: &mut R,
    ) -> Result<MinibatchBlob>
    where
        T: Borrow<RoiRecord>,
        R: Rng + ?Sized,
    {
        ensure!(
            records.len() == 1,
            "batch size should equal to 1, but get {}",
            records.len()
        );
        records.iter().try_for_each(|record| -> Result<_> {
            let record = record.borrow();
            record.validate()?;
            ensure!(
                record.num_classes() == num_classes,
                "'{}' has {} classes, but {} is expected",
                record.image.display(),
                record.num_classes(),
                num_classes
            );
            if let Some(flags) = &record.flags {
                ensure!(
                    flags.ncols() == num_classes,
                    "flag rows of '{}' have {} columns, but {} is expected",
                    record.image.display(),
                    flags.ncols(),
                    num_classes
                );
            }
            Ok(())
        })?;

        let mut timing = Timing::new("minibatch");

        // sample random scales to use for each image in this batch
        let target_sizes: Vec<usize> = records
            .iter()
            .map(|_| self.scales[rng.gen_range(0..self.scales.len())])
            .collect();

        let ImageBlob { data, scales, .. } =
            self.image_blob.build(&self.decoder, records, &target_sizes)?;
        timing.set_record("image blob");

        let mut rois_blocks = Vec::with_capacity(records.len());
        let mut label_rows = Vec::with_capacity(records.len());
        let mut flag_blocks = Vec::with_capacity(records.len());

        for (batch_index, (record, &scale)) in izip!(records, &scales).enumerate() {
            let record = record.borrow();
            let SampledRois {
                labels,
                boxes,
                flags,
            } = sample_rois(record, rng);

            let rois = project_rois(&boxes, scale, batch_index)?;
            let DedupOutput { rois, keep } = self.dedup.forward(rois.view())?;
            let flags = flags.map(|flags| select_rows(&flags, &keep));

            if rois.nrows() < boxes.len() {
                debug!(
                    "removed {} duplicated rois from '{}'",
                    boxes.len() - rois.nrows(),
                    record.image.display()
                );
            }

            rois_blocks.push(rois);
            label_rows.push(labels);
            flag_blocks.push(flags);
        }
        timing.set_record("rois");

        let rois = {
            let views: Vec<_> = rois_blocks.iter().map(|block| block.view()).collect();
            concatenate(Axis(0), &views)?.mapv(|value| value as f32)
        };
        let labels = {
            let views: Vec<_> = label_rows.iter().map(|row| row.view()).collect();
            stack(Axis(0), &views)?
        };
        let labels = if self.saliency_masked {
            tile_rows(&labels, rois.nrows())
        } else {
            labels
        };
        let flg = concat_flags(flag_blocks)?;

        timing.report();
        debug!(
            "built minibatch with data {:?}, {} rois",
            data.dim(),
            rois.nrows()
        );

        Ok(MinibatchBlob {
            data,
            rois,
            labels,
            flg,
        })
    }
}

/// Scale boxes into the rescaled image and prefix the batch index, giving
/// `[batch_index, x1, y1, x2, y2]` rows.
pub fn project_rois(boxes: &[TLBR<f64>], scale: f64, batch_index: usize) -> Result<Array2<f64>> {
    let transform = Transform::from_scale(scale);
    let values: Vec<f64> = boxes
        .iter()
        .flat_map(|bbox| {
            let [x1, y1, x2, y2] = (&transform * bbox).xyxy();
            [batch_index as f64, x1, y1, x2, y2]
        })
        .collect();
    Ok(Array2::from_shape_vec((boxes.len(), 5), values)?)
}

/// Repeat the whole block `count` times along the rows.
pub fn tile_rows(block: &Array2<f32>, count: usize) -> Array2<f32> {
    let (rows, cols) = block.dim();
    Array2::from_shape_fn((rows * count, cols), |(row, col)| block[[row % rows, col]])
}

fn concat_flags(blocks: Vec<Option<Array2<f32>>>) -> Result<Option<Array2<f32>>> {
    let num_present = blocks.iter().filter(|block| block.is_some()).count();
    if num_present == 0 {
        return Ok(None);
    }
    ensure!(
        num_present == blocks.len(),
        "either all or none of the records in a batch must carry flags"
    );

    let blocks: Vec<_> = blocks.into_iter().flatten().collect();
    let views: Vec<_> = blocks.iter().map(|block| block.view()).collect();
    Ok(Some(concatenate(Axis(0), &views)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn project_prefixes_batch_index() {
        let boxes = vec![
            TLBR::try_from_xyxy([10.0, 20.0, 30.0, 40.0]).unwrap(),
            TLBR::try_from_xyxy([0.0, 0.0, 5.0, 5.0]).unwrap(),
        ];
        let rois = project_rois(&boxes, 2.0, 3).unwrap();
        assert_eq!(
            rois,
            array![[3.0, 20.0, 40.0, 60.0, 80.0], [3.0, 0.0, 0.0, 10.0, 10.0]]
        );
    }

    #[test]
    fn tile_repeats_block() {
        let block = array![[1.0, 0.0], [0.0, 1.0]];
        let tiled = tile_rows(&block, 2);
        assert_eq!(
            tiled,
            array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]]
        );
        assert_eq!(tile_rows(&block, 0).dim(), (0, 2));
    }

    #[test]
    fn mixed_flags_rejected() {
        let blocks = vec![Some(Array2::zeros((2, 3))), None];
        assert!(concat_flags(blocks).is_err());
        assert_eq!(concat_flags(vec![None, None]).unwrap(), None);
    }

    #[test]
    fn empty_scales_rejected() {
        let init = MinibatchInit {
            config: MinibatchConfig {
                scales: vec![],
                ..Default::default()
            },
            saliency_masked: false,
        };
        assert!(init.build().is_err());
    }
}
