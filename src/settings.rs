use crate::error::{Result, SampleError};

/// Settings for a single sampling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSettings {
    /// Seed for the generator. Every draw of a run comes from one generator
    /// seeded with this value, so equal seeds give bit-identical samples.
    pub seed: u64,
    /// Report stage progress and the diagnostic summary at `info` level
    /// instead of `debug`.
    pub verbose: bool,
    /// Number of equal segments of the velocity proposal envelope.
    pub nx: usize,
    /// Maximum number of rejection rounds per mass component. `None` keeps
    /// retrying until every particle is accepted.
    pub max_rounds: Option<u64>,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            seed: 199,
            verbose: false,
            nx: 10,
            max_rounds: Some(10_000),
        }
    }
}

impl SampleSettings {
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 {
            return Err(SampleError::InvalidSettings(
                "nx must be at least 1".to_string(),
            ));
        }
        if self.max_rounds == Some(0) {
            return Err(SampleError::InvalidSettings(
                "max_rounds must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn log_level(&self) -> log::Level {
        if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}
