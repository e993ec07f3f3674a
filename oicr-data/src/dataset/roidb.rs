use super::*;
use crate::common::*;
use std::{fs::File, io::BufReader};

/// The list of records consumed by the minibatch pipeline.
#[derive(Debug, Clone)]
pub struct Roidb {
    num_classes: usize,
    records: Vec<Arc<RoiRecord>>,
}

impl Roidb {
    pub fn new(records: impl IntoIterator<Item = RoiRecord>) -> Result<Self> {
        let records: Vec<_> = records.into_iter().map(Arc::new).collect();
        let num_classes = match records.first() {
            Some(first) => first.num_classes(),
            None => bail!("the roidb has no records"),
        };

        records.iter().try_for_each(|record| -> Result<_> {
            record.validate()?;
            ensure!(
                record.num_classes() == num_classes,
                "'{}' has {} classes, but {} is expected",
                record.image.display(),
                record.num_classes(),
                num_classes
            );
            Ok(())
        })?;

        Ok(Self {
            num_classes,
            records,
        })
    }

    /// Load a JSON list of [RoidbEntry]. Relative image paths are resolved
    /// against the directory of the file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let entries: Vec<RoidbEntry> = {
            let file = File::open(path)
                .with_context(|| format!("failed to open roidb file '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse roidb file '{}'", path.display()))?
        };

        let records: Vec<RoiRecord> = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let entry = RoidbEntry {
                    image: base_dir.join(&entry.image),
                    ..entry
                };
                RoiRecord::try_from(entry)
                    .with_context(|| format!("invalid entry {} in '{}'", index, path.display()))
            })
            .try_collect()?;

        let empty_count = records
            .iter()
            .filter(|record| record.boxes.is_empty())
            .count();
        if empty_count > 0 {
            warn!(
                "{} records in '{}' have no region proposals",
                empty_count,
                path.display()
            );
        }

        let roidb = Self::new(records)?;
        info!(
            "loaded {} records with {} classes from '{}'",
            roidb.records.len(),
            roidb.num_classes,
            path.display()
        );

        Ok(roidb)
    }

    pub fn records(&self) -> &[Arc<RoiRecord>] {
        &self.records
    }

    /// Point every record to the same saliency map directory.
    pub fn set_saliency_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        self.records.iter_mut().for_each(|record| {
            Arc::make_mut(record).saliency_dir = Some(dir.to_owned());
        });
    }

    /// Append a horizontally mirrored copy of every record. Image widths are
    /// read from the image file headers.
    pub fn append_flipped(&mut self) -> Result<()> {
        let flipped: Vec<_> = self
            .records
            .iter()
            .map(|record| -> Result<_> {
                let imagesize::ImageSize { width, .. } = imagesize::size(&record.image)
                    .map_err(|err| format_err!("{:?}", err))
                    .with_context(|| {
                        format!("failed to read the size of '{}'", record.image.display())
                    })?;
                Ok(Arc::new(record.to_flipped(width)))
            })
            .try_collect()?;

        info!("appended {} flipped records", flipped.len());
        self.records.extend(flipped);
        Ok(())
    }
}

impl GenericDataset for Roidb {
    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl RandomAccessDataset for Roidb {
    fn num_records(&self) -> usize {
        self.records.len()
    }

    fn nth(&self, index: usize) -> Result<Arc<RoiRecord>> {
        self.records
            .get(index)
            .cloned()
            .ok_or_else(|| format_err!("invalid index {}", index))
    }
}
