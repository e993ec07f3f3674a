pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{prelude::*, Transform, HW, TLBR};
pub use indexmap::IndexMap;
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info, warn};
pub use ndarray::{
    concatenate, s, stack, Array1, Array2, Array3, Array4, ArrayD, ArrayView2, ArrayView3, Axis,
    Zip,
};
pub use noisy_float::prelude::*;
pub use rand::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt::Debug,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

#[cfg(feature = "profiling")]
pub use lazy_static::lazy_static;
#[cfg(feature = "profiling")]
pub use std::time::Instant;

#[cfg(test)]
pub use approx::assert_abs_diff_eq;
