//! Dataset records and record lists.

mod dataset_;
mod record;
mod roidb;

pub use dataset_::*;
pub use record::*;
pub use roidb::*;
