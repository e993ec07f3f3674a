//! Minibatch assembly from dataset records.

mod blob;
mod builder;
mod iter;

pub use blob::*;
pub use builder::*;
pub use iter::*;
