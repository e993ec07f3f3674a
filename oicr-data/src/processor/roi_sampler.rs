//! Region sampling of a dataset record.

use crate::{common::*, dataset::RoiRecord};

/// The regions of one record in sampled order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledRois {
    pub labels: Array1<f32>,
    pub boxes: Vec<TLBR<f64>>,
    /// Flag rows reordered together with `boxes`.
    pub flags: Option<Array2<f32>>,
}

/// Draw a uniformly random permutation of all regions of the record. No
/// region is dropped.
pub fn sample_rois<R>(record: &RoiRecord, rng: &mut R) -> SampledRois
where
    R: Rng + ?Sized,
{
    let mut keep: Vec<usize> = (0..record.boxes.len()).collect();
    keep.shuffle(rng);

    let boxes = keep.iter().map(|&index| record.boxes[index]).collect();
    let flags = record.flags.as_ref().map(|flags| select_rows(flags, &keep));

    SampledRois {
        labels: record.labels.clone(),
        boxes,
        flags,
    }
}

/// Gather rows by index. An empty index list yields an empty array with the
/// same number of columns.
pub fn select_rows<A>(array: &Array2<A>, indices: &[usize]) -> Array2<A>
where
    A: Clone + num_traits::Zero,
{
    if indices.is_empty() {
        Array2::zeros((0, array.ncols()))
    } else {
        array.select(Axis(0), indices)
    }
}
