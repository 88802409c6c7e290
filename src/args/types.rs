use std::num::NonZeroUsize;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ValidationError;

/// Mean reduction selected on the command line; the threshold for
/// `trimmed` comes from `--percent-threshold`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MeanKind {
    #[default]
    Arithmetic,
    Trimmed,
}

/// Percentage in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentThreshold(u8);

impl PercentThreshold {
    pub const MAX: u8 = 100;

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for PercentThreshold {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(ValidationError::ValueTooSmall { min: 1 });
        }
        u8::try_from(value)
            .ok()
            .filter(|percent| *percent <= Self::MAX)
            .map(PercentThreshold)
            .ok_or(ValidationError::ValueTooLarge {
                max: u64::from(Self::MAX),
            })
    }
}

impl std::str::FromStr for PercentThreshold {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PercentThreshold::try_from(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}
