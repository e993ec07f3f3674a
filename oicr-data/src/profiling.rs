//! Stage timings of the minibatch pipeline, compiled out unless the
//! `profiling` feature is enabled.

use crate::common::*;
use std::time::Duration;

#[cfg(feature = "profiling")]
lazy_static! {
    static ref PROFILING_CONFIG: ProfilingConfig = ProfilingConfig::from_vars(std::env::vars());
    static ref REGISTERED_TIMINGS: dashmap::DashSet<&'static str> = dashmap::DashSet::new();
}

/// Selects the timings that are reported. Read from `OICR_PROFILING_WHITELIST`
/// as a comma separated list. Every timing is reported when it is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    pub profiling_whitelist: Option<HashSet<String>>,
}

impl ProfilingConfig {
    #[cfg(feature = "profiling")]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("OICR_")
            .from_iter(vars)
            .unwrap_or_else(|err| {
                warn!(
                    "failed to load profiling environment variables, fallback to default values: {:?}",
                    err
                );
                Self::default()
            })
    }

    pub fn is_reported(&self, name: &str) -> bool {
        self.profiling_whitelist
            .as_ref()
            .map(|whitelist| whitelist.contains(name))
            .unwrap_or(true)
    }
}

/// Records the time spent between consecutive named checkpoints.
#[cfg(feature = "profiling")]
#[derive(Debug)]
pub struct Timing {
    name: &'static str,
    instant: Instant,
    records: Vec<(&'static str, Duration)>,
}

#[cfg(not(feature = "profiling"))]
#[derive(Debug)]
pub struct Timing;

impl Timing {
    pub fn new(name: &'static str) -> Self {
        #[cfg(feature = "profiling")]
        {
            if REGISTERED_TIMINGS.insert(name) {
                info!("registered timing profile '{}'", name);
            }

            Self {
                name,
                instant: Instant::now(),
                records: vec![],
            }
        }

        #[cfg(not(feature = "profiling"))]
        {
            let _ = name;
            Self
        }
    }

    /// Record the time spent since the last record.
    pub fn set_record(&mut self, name: &'static str) {
        #[cfg(feature = "profiling")]
        {
            self.records.push((name, self.instant.elapsed()));
            self.instant = Instant::now();
        }

        #[cfg(not(feature = "profiling"))]
        let _ = name;
    }

    /// The stages recorded so far. Always empty without the `profiling`
    /// feature.
    pub fn records(&self) -> &[(&'static str, Duration)] {
        #[cfg(feature = "profiling")]
        {
            &self.records
        }

        #[cfg(not(feature = "profiling"))]
        {
            &[]
        }
    }

    pub fn report(&self) {
        #[cfg(feature = "profiling")]
        {
            if PROFILING_CONFIG.is_reported(self.name) {
                let total: Duration = self.records.iter().map(|(_, elapsed)| *elapsed).sum();
                info!("profiling report for '{}', total {:?}", self.name, total);
                self.records.iter().for_each(|(name, elapsed)| {
                    info!("- {}\t{:?}", name, elapsed);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_keeps_stage_order() {
        let mut timing = Timing::new("timing_keeps_stage_order");
        timing.set_record("decode");
        timing.set_record("resize");
        timing.report();

        let names: Vec<_> = timing.records().iter().map(|(name, _)| *name).collect();
        if cfg!(feature = "profiling") {
            assert_eq!(names, vec!["decode", "resize"]);
        } else {
            assert!(names.is_empty());
        }
    }

    #[test]
    fn whitelist_selects_reports() {
        assert!(ProfilingConfig::default().is_reported("minibatch"));

        let config = ProfilingConfig {
            profiling_whitelist: Some(["image_blob".to_string()].into_iter().collect()),
        };
        assert!(config.is_reported("image_blob"));
        assert!(!config.is_reported("minibatch"));
    }

    #[cfg(feature = "profiling")]
    #[test]
    fn whitelist_from_env_vars() {
        let vars = vec![(
            "OICR_PROFILING_WHITELIST".to_string(),
            "image_blob,minibatch".to_string(),
        )];
        let config = ProfilingConfig::from_vars(vars);
        assert!(config.is_reported("minibatch"));
        assert!(!config.is_reported("other"));

        let config = ProfilingConfig::from_vars(vec![]);
        assert_eq!(config, ProfilingConfig::default());
    }
}
