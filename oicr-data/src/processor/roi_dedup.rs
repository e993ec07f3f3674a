//! Duplicate region removal.

use crate::common::*;

/// Per-column weights of the region hash, applied to
/// `[batch_index, x1, y1, x2, y2]`.
pub const ROI_HASH_WEIGHTS: [f64; 5] = [1.0, 1e3, 1e6, 1e9, 1e12];

/// Hash a `[batch_index, x1, y1, x2, y2]` row after rounding it to the
/// precision given by `scale`.
///
/// The hash is a weighted sum and therefore lossy. Coordinates beyond a few
/// thousand pixels after scaling may collide with other rows.
pub fn roi_hash(row: &[f64], scale: f64) -> f64 {
    row.iter()
        .zip(ROI_HASH_WEIGHTS)
        .map(|(&value, weight)| (value * scale).round_ties_even() * weight)
        .sum()
}

/// The deduplicated rows and the original indices of the kept rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutput {
    pub rois: Array2<f64>,
    pub keep: Vec<usize>,
}

/// Collapses rows that fall into the same hash bucket.
#[derive(Debug, Clone)]
pub struct RoiDeduplicator {
    scale: Option<f64>,
}

impl RoiDeduplicator {
    /// A non-positive scale disables deduplication.
    pub fn new(scale: R64) -> Self {
        Self {
            scale: (scale > 0.0).then(|| scale.raw()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.scale.is_some()
    }

    /// Keep the first row of every hash bucket, in the original row order.
    pub fn forward(&self, rois: ArrayView2<f64>) -> Result<DedupOutput> {
        ensure!(
            rois.ncols() == 5,
            "rois must have 5 columns, but get {}",
            rois.ncols()
        );

        let scale = match self.scale {
            Some(scale) => scale,
            None => {
                return Ok(DedupOutput {
                    rois: rois.to_owned(),
                    keep: (0..rois.nrows()).collect(),
                })
            }
        };

        let mut buckets: IndexMap<R64, usize> = IndexMap::new();
        for (index, row) in rois.outer_iter().enumerate() {
            let row: Vec<f64> = row.to_vec();
            let key = R64::try_new(roi_hash(&row, scale))
                .ok_or_else(|| format_err!("roi {} has non-finite coordinates {:?}", index, row))?;
            buckets.entry(key).or_insert(index);
        }

        let keep: Vec<usize> = buckets.values().copied().collect();
        let rois = if keep.is_empty() {
            Array2::zeros((0, 5))
        } else {
            rois.select(Axis(0), &keep)
        };

        Ok(DedupOutput { rois, keep })
    }
}
