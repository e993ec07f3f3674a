use crate::common::*;

/// One image of the dataset with its region proposals and image-level labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiRecord {
    /// The image file path.
    pub image: PathBuf,
    /// Mirror the image horizontally before processing. The boxes are
    /// expected to be mirrored already.
    pub flipped: bool,
    /// Region proposals in pixel units of the original image.
    pub boxes: Vec<TLBR<f64>>,
    /// Multi-label ground truth, one 0/1 entry per class.
    pub labels: Array1<f32>,
    /// Optional per-region auxiliary rows, aligned with `boxes`.
    pub flags: Option<Array2<f32>>,
    /// The directory of precomputed saliency maps for this image.
    pub saliency_dir: Option<PathBuf>,
}

impl RoiRecord {
    /// The number of classes covered by the label vector.
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_boxes(&self) -> usize {
        self.boxes.len()
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            image,
            boxes,
            labels,
            flags,
            ..
        } = self;

        ensure!(
            !labels.is_empty(),
            "the label vector of '{}' is empty",
            image.display()
        );
        ensure!(
            labels.iter().all(|&val| val == 0.0 || val == 1.0),
            "labels of '{}' must be either 0 or 1",
            image.display()
        );

        if let Some(flags) = flags {
            ensure!(
                flags.nrows() == boxes.len(),
                "'{}' has {} boxes but {} flag rows",
                image.display(),
                boxes.len(),
                flags.nrows()
            );
        }

        Ok(())
    }

    /// Build the horizontally mirrored copy of this record for an image
    /// `width` pixels wide.
    pub fn to_flipped(&self, width: usize) -> Self {
        let transform = Transform::horizontal_flip(width as f64);
        let boxes = self.boxes.iter().map(|bbox| &transform * bbox).collect();

        Self {
            flipped: !self.flipped,
            boxes,
            ..self.clone()
        }
    }
}

/// The serialized form of [RoiRecord].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoidbEntry {
    pub image: PathBuf,
    #[serde(default)]
    pub flipped: bool,
    /// Boxes in `[x1, y1, x2, y2]` order.
    pub boxes: Vec<[f64; 4]>,
    pub labels: Vec<f32>,
    #[serde(default)]
    pub flg: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    pub saliency_dir: Option<PathBuf>,
}

impl TryFrom<RoidbEntry> for RoiRecord {
    type Error = Error;

    fn try_from(from: RoidbEntry) -> Result<Self, Self::Error> {
        let RoidbEntry {
            image,
            flipped,
            boxes,
            labels,
            flg,
            saliency_dir,
        } = from;

        let boxes: Vec<_> = boxes
            .into_iter()
            .map(|xyxy| {
                TLBR::try_from_xyxy(xyxy)
                    .with_context(|| format!("invalid box {:?} in '{}'", xyxy, image.display()))
            })
            .try_collect()?;

        let flags = flg
            .map(|rows| -> Result<_> {
                let ncols = rows
                    .first()
                    .map(|row| row.len())
                    .unwrap_or_else(|| labels.len());
                ensure!(
                    rows.iter().all(|row| row.len() == ncols),
                    "flag rows of '{}' have inconsistent lengths",
                    image.display()
                );
                let nrows = rows.len();
                let values: Vec<f32> = rows.into_iter().flatten().collect();
                Ok(Array2::from_shape_vec((nrows, ncols), values)?)
            })
            .transpose()?;

        let record = Self {
            image,
            flipped,
            boxes,
            labels: Array1::from(labels),
            flags,
            saliency_dir,
        };
        record.validate()?;

        Ok(record)
    }
}

impl From<&RoiRecord> for RoidbEntry {
    fn from(from: &RoiRecord) -> Self {
        let RoiRecord {
            image,
            flipped,
            boxes,
            labels,
            flags,
            saliency_dir,
        } = from;

        Self {
            image: image.clone(),
            flipped: *flipped,
            boxes: boxes.iter().map(|bbox| bbox.xyxy()).collect(),
            labels: labels.to_vec(),
            flg: flags
                .as_ref()
                .map(|flags| flags.outer_iter().map(|row| row.to_vec()).collect()),
            saliency_dir: saliency_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RoidbEntry {
        RoidbEntry {
            image: PathBuf::from("JPEGImages/000005.jpg"),
            flipped: false,
            boxes: vec![[0.0, 0.0, 10.0, 20.0], [5.0, 5.0, 40.0, 30.0]],
            labels: vec![0.0, 1.0, 0.0],
            flg: Some(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]),
            saliency_dir: None,
        }
    }

    #[test]
    fn record_from_entry() {
        let record = RoiRecord::try_from(entry()).unwrap();
        assert_eq!(record.num_boxes(), 2);
        assert_eq!(record.num_classes(), 3);
        assert_eq!(record.boxes[1].xyxy(), [5.0, 5.0, 40.0, 30.0]);
        assert_eq!(record.flags.as_ref().unwrap().dim(), (2, 3));
        assert_eq!(RoidbEntry::from(&record), entry());
    }

    #[test]
    fn reject_misaligned_flags() {
        let entry = RoidbEntry {
            flg: Some(vec![vec![1.0, 0.0, 0.0]]),
            ..entry()
        };
        assert!(RoiRecord::try_from(entry).is_err());
    }

    #[test]
    fn reject_non_binary_labels() {
        let entry = RoidbEntry {
            labels: vec![0.0, 0.5, 1.0],
            ..entry()
        };
        assert!(RoiRecord::try_from(entry).is_err());
    }

    #[test]
    fn flip_record() {
        let record = RoiRecord::try_from(entry()).unwrap();
        let flipped = record.to_flipped(100);
        assert!(flipped.flipped);
        assert_eq!(flipped.boxes[0].xyxy(), [89.0, 0.0, 99.0, 20.0]);
        assert_eq!(flipped.boxes[1].xyxy(), [59.0, 5.0, 94.0, 30.0]);
        assert_eq!(flipped.labels, record.labels);
        assert_eq!(flipped.flags, record.flags);
    }
}
