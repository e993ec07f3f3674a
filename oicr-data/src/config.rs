//! Minibatch construction configuration format.

use crate::common::*;

/// The settings shared by every minibatch construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinibatchConfig {
    /// Per-channel mean in BGR order, subtracted from every pixel.
    pub pixel_means: [R64; 3],
    /// Candidate lengths of the shorter image side. One is drawn per image.
    pub scales: Vec<NonZeroUsize>,
    /// The upper bound on the longer image side after resizing.
    pub max_size: NonZeroUsize,
    /// Precision of the duplicate-box hash. Non-positive disables deduplication.
    pub dedup_boxes: R64,
    /// Pixels whose saliency value is at most this are reset to the mean.
    pub saliency_thresh: R64,
}

impl MinibatchConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config = json5::from_str(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }
}

impl Default for MinibatchConfig {
    fn default() -> Self {
        Self {
            pixel_means: [r64(102.9801), r64(115.9465), r64(122.7717)],
            scales: [480, 576, 688, 864, 1200]
                .into_iter()
                .map(|size| NonZeroUsize::new(size).unwrap())
                .collect(),
            max_size: NonZeroUsize::new(2000).unwrap(),
            dedup_boxes: r64(1.0 / 16.0),
            saliency_thresh: r64(0.0),
        }
    }
}
