use heist_dda_core::{DifficultyLevel, DifficultyRange};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs controlling how quickly and in which direction difficulty moves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Lowest difficulty the tracker may report.
    pub min: i32,
    /// Highest difficulty the tracker may report.
    pub max: i32,
    /// Difficulty at playthrough start and after a hard reset.
    pub initial: i32,
    /// Simultaneous pursuits that on their own push difficulty up.
    pub pursuit_pressure_threshold: u32,
    /// Seconds without pursuits or carried paintings before difficulty eases off.
    pub cool_down_secs: f32,
    /// Minimum seconds between two consecutive steps.
    pub min_step_interval_secs: f32,
}

const DEFAULT_MIN: i32 = 1;
const DEFAULT_MAX: i32 = 5;
const DEFAULT_INITIAL: i32 = 3;
const DEFAULT_PURSUIT_PRESSURE_THRESHOLD: u32 = 3;
const DEFAULT_COOL_DOWN_SECS: f32 = 30.0;
const DEFAULT_MIN_STEP_INTERVAL_SECS: f32 = 5.0;

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            initial: DEFAULT_INITIAL,
            pursuit_pressure_threshold: DEFAULT_PURSUIT_PRESSURE_THRESHOLD,
            cool_down_secs: DEFAULT_COOL_DOWN_SECS,
            min_step_interval_secs: DEFAULT_MIN_STEP_INTERVAL_SECS,
        }
    }
}

/// Reasons a [`DifficultyConfig`] cannot drive a tracker.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The lower bound exceeds the upper bound.
    #[error("difficulty minimum {min} exceeds maximum {max}")]
    InvertedRange {
        /// Configured lower bound.
        min: i32,
        /// Configured upper bound.
        max: i32,
    },
    /// The initial level lies outside the configured range.
    #[error("initial difficulty {initial} outside [{min}, {max}]")]
    InitialOutOfRange {
        /// Configured initial level.
        initial: i32,
        /// Configured lower bound.
        min: i32,
        /// Configured upper bound.
        max: i32,
    },
    /// A duration is negative or not a number.
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was rejected.
        value: f32,
    },
    /// The pursuit threshold is zero, which would raise difficulty forever.
    #[error("pursuit_pressure_threshold must be at least 1")]
    ZeroPursuitThreshold,
}

/// Checked form of [`DifficultyConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Validated {
    pub(crate) range: DifficultyRange,
    pub(crate) initial: DifficultyLevel,
    pub(crate) pursuit_pressure_threshold: u32,
    pub(crate) cool_down_secs: f32,
    pub(crate) min_step_interval_secs: f32,
}

impl Validated {
    /// Checked form of `DifficultyConfig::default()`, verified at compile time.
    pub(crate) const DEFAULT: Self = Self {
        range: match DifficultyRange::new(
            DifficultyLevel::new(DEFAULT_MIN),
            DifficultyLevel::new(DEFAULT_MAX),
        ) {
            Some(range) => range,
            None => panic!("default difficulty range is inverted"),
        },
        initial: DifficultyLevel::new(DEFAULT_INITIAL),
        pursuit_pressure_threshold: DEFAULT_PURSUIT_PRESSURE_THRESHOLD,
        cool_down_secs: DEFAULT_COOL_DOWN_SECS,
        min_step_interval_secs: DEFAULT_MIN_STEP_INTERVAL_SECS,
    };
}

impl DifficultyConfig {
    /// Checks every invariant the tracker relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.checked().map(|_| ())
    }

    pub(crate) fn checked(&self) -> Result<Validated, ConfigError> {
        let range = DifficultyRange::new(DifficultyLevel::new(self.min), DifficultyLevel::new(self.max))
            .ok_or(ConfigError::InvertedRange {
                min: self.min,
                max: self.max,
            })?;

        let initial = DifficultyLevel::new(self.initial);
        if !range.contains(initial) {
            return Err(ConfigError::InitialOutOfRange {
                initial: self.initial,
                min: self.min,
                max: self.max,
            });
        }

        if self.pursuit_pressure_threshold == 0 {
            return Err(ConfigError::ZeroPursuitThreshold);
        }

        check_duration("cool_down_secs", self.cool_down_secs)?;
        check_duration("min_step_interval_secs", self.min_step_interval_secs)?;

        Ok(Validated {
            range,
            initial,
            pursuit_pressure_threshold: self.pursuit_pressure_threshold,
            cool_down_secs: self.cool_down_secs,
            min_step_interval_secs: self.min_step_interval_secs,
        })
    }
}

fn check_duration(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}
