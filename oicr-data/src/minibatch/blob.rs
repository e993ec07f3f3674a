use crate::common::*;

/// The tensors handed to the detection network.
#[derive(Debug, Clone, PartialEq)]
pub struct MinibatchBlob {
    /// N×3×H×W images, zero padded to the largest image of the batch.
    pub data: Array4<f32>,
    /// R×5 regions as `[batch_index, x1, y1, x2, y2]` in rescaled pixels.
    pub rois: Array2<f32>,
    /// One label row per image, or one per region in saliency-masked mode.
    pub labels: Array2<f32>,
    /// R×C flag rows aligned with `rois`, present only when the records carry
    /// flags.
    pub flg: Option<Array2<f32>>,
}

impl MinibatchBlob {
    pub fn num_images(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_rois(&self) -> usize {
        self.rois.nrows()
    }

    /// The blobs keyed by name. The `flg` key exists only when flags are
    /// present.
    pub fn into_named(self) -> IndexMap<&'static str, ArrayD<f32>> {
        let Self {
            data,
            rois,
            labels,
            flg,
        } = self;

        let mut blobs = IndexMap::new();
        blobs.insert("data", data.into_dyn());
        blobs.insert("rois", rois.into_dyn());
        blobs.insert("labels", labels.into_dyn());
        if let Some(flg) = flg {
            blobs.insert("flg", flg.into_dyn());
        }
        blobs
    }

    /// Copy the blobs into libtorch tensors on the given device.
    #[cfg(feature = "tch")]
    pub fn to_tensors(&self, device: tch::Device) -> IndexMap<&'static str, tch::Tensor> {
        self.clone()
            .into_named()
            .into_iter()
            .map(|(name, array)| {
                let shape: Vec<i64> = array.shape().iter().map(|&dim| dim as i64).collect();
                let values: Vec<f32> = array.iter().cloned().collect();
                let tensor = tch::Tensor::of_slice(&values)
                    .view(shape.as_slice())
                    .to_device(device);
                (name, tensor)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_blobs_omit_absent_flags() {
        let blob = MinibatchBlob {
            data: Array4::zeros((1, 3, 4, 4)),
            rois: Array2::zeros((2, 5)),
            labels: Array2::zeros((1, 20)),
            flg: None,
        };
        assert_eq!(blob.num_images(), 1);
        assert_eq!(blob.num_rois(), 2);

        let keys: Vec<_> = blob.into_named().keys().copied().collect();
        assert_eq!(keys, vec!["data", "rois", "labels"]);
    }

    #[test]
    fn named_blobs_keep_flags() {
        let blob = MinibatchBlob {
            data: Array4::zeros((1, 3, 4, 4)),
            rois: Array2::zeros((0, 5)),
            labels: Array2::zeros((1, 20)),
            flg: Some(Array2::zeros((0, 20))),
        };
        let named = blob.into_named();
        let keys: Vec<_> = named.keys().copied().collect();
        assert_eq!(keys, vec!["data", "rois", "labels", "flg"]);
        assert_eq!(named["flg"].shape(), &[0, 20]);
    }
}
