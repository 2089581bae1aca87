use std::fmt;
use std::str::FromStr;

use crate::OptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Repeat,
    Consensus,
    Workers,
}

impl OptionKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::Consensus => "consensus",
            Self::Workers => "workers",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repeat" => Ok(Self::Repeat),
            "consensus" => Ok(Self::Consensus),
            "workers" => Ok(Self::Workers),
            other => Err(OptionError::UnknownOption(other.to_string())),
        }
    }
}

/// Settings for one batch run.
///
/// Built from defaults by the caller and passed into each run; nothing reads
/// process-wide state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckerOptions {
    repeat: u32,
    consensus: f64,
    workers: usize,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            repeat: 1,
            consensus: 0.5,
            workers: 5,
        }
    }
}

impl CheckerOptions {
    /// How many times each file is inspected.
    #[must_use]
    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Fraction of runs an issue must appear in to be reported.
    #[must_use]
    pub fn consensus(&self) -> f64 {
        self.consensus
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat.max(1);
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_consensus(mut self, consensus: f64) -> Self {
        if is_valid_consensus(consensus) {
            self.consensus = consensus;
        }
        self
    }

    /// Validates `raw` and stores it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::InvalidValue`] when `raw` does not parse or is
    /// out of range. The options are left unchanged in that case.
    pub fn apply(&mut self, key: OptionKey, raw: &str) -> Result<(), OptionError> {
        let value = raw.trim();
        let invalid = |reason| OptionError::InvalidValue {
            key,
            value: raw.to_string(),
            reason,
        };

        match key {
            OptionKey::Repeat => {
                let repeat: u32 = value.parse().map_err(|_| invalid("expected an integer"))?;
                if repeat == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.repeat = repeat;
            }
            OptionKey::Consensus => {
                let consensus: f64 = value.parse().map_err(|_| invalid("expected a number"))?;
                if !is_valid_consensus(consensus) {
                    return Err(invalid("must be greater than 0 and at most 1"));
                }
                self.consensus = consensus;
            }
            OptionKey::Workers => {
                let workers: usize = value.parse().map_err(|_| invalid("expected an integer"))?;
                if workers == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.workers = workers;
            }
        }

        Ok(())
    }

    /// Like [`apply`](Self::apply) but with the option given by name.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::UnknownOption`] for an unrecognized name, or the
    /// errors of [`apply`](Self::apply).
    pub fn apply_named(&mut self, name: &str, raw: &str) -> Result<(), OptionError> {
        let key: OptionKey = name.parse()?;
        self.apply(key, raw)
    }
}

fn is_valid_consensus(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 1.0
}
