//! Data preprocessing building blocks.

pub mod decoder;
pub mod image_blob;
pub mod resize;
pub mod roi_dedup;
pub mod roi_sampler;
pub mod saliency;

pub use decoder::*;
pub use image_blob::*;
pub use resize::*;
pub use roi_dedup::*;
pub use roi_sampler::*;
pub use saliency::*;
