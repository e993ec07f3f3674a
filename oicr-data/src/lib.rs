//! Minibatch construction for training weakly supervised detectors on region
//! proposals.
//!
//! A [dataset::RoiRecord] describes one image, its region proposals and its
//! image-level labels. [minibatch::MinibatchBuilder] turns a batch of records
//! into a [minibatch::MinibatchBlob] holding the rescaled image tensor, the
//! projected and deduplicated regions, the labels and the optional per-region
//! flags.

mod common;
pub mod config;
pub mod dataset;
pub mod minibatch;
pub mod processor;
pub mod profiling;

pub use config::MinibatchConfig;
pub use dataset::{GenericDataset, RandomAccessDataset, RoiRecord, Roidb, RoidbEntry};
pub use minibatch::{MinibatchBlob, MinibatchBuilder, MinibatchInit, MinibatchIter};
