use super::{MinibatchBlob, MinibatchBuilder};
use crate::{common::*, dataset::RandomAccessDataset, processor::ImageDecoder};

/// Endless minibatch iterator over a dataset.
///
/// Records are visited in a new random order every epoch, one record per
/// minibatch.
#[derive(Debug)]
pub struct MinibatchIter<'a, S, D, R>
where
    S: RandomAccessDataset,
    D: ImageDecoder,
    R: Rng,
{
    dataset: &'a S,
    builder: &'a MinibatchBuilder<D>,
    rng: R,
    order: Vec<usize>,
    cursor: usize,
    epoch: usize,
}

impl<'a, S, D, R> MinibatchIter<'a, S, D, R>
where
    S: RandomAccessDataset,
    D: ImageDecoder,
    R: Rng,
{
    pub fn new(dataset: &'a S, builder: &'a MinibatchBuilder<D>, rng: R) -> Self {
        let order: Vec<_> = (0..dataset.num_records()).collect();
        let cursor = order.len();

        Self {
            dataset,
            builder,
            rng,
            order,
            cursor,
            epoch: 0,
        }
    }

    /// The number of started epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    fn next_minibatch(&mut self) -> Result<MinibatchBlob> {
        if self.cursor >= self.order.len() {
            self.order.shuffle(&mut self.rng);
            self.cursor = 0;
            self.epoch += 1;
            debug!("start epoch {}", self.epoch);
        }

        let index = self.order[self.cursor];
        self.cursor += 1;

        let record = self.dataset.nth(index)?;
        self.builder
            .build(&[record], self.dataset.num_classes(), &mut self.rng)
            .with_context(|| format!("failed to build minibatch for record {}", index))
    }
}

impl<'a, S, D, R> Iterator for MinibatchIter<'a, S, D, R>
where
    S: RandomAccessDataset,
    D: ImageDecoder,
    R: Rng,
{
    type Item = Result<MinibatchBlob>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.order.is_empty() {
            return None;
        }
        Some(self.next_minibatch())
    }
}
