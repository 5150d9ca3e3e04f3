#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative difficulty scalar and the rule that moves it.
//!
//! The tracker turns a [`DifficultyInputs`] snapshot into at most one step of
//! difficulty change per recompute. Successful evasions and heavy pursuit
//! pressure raise the challenge; a sustained calm stretch with no chase and
//! nothing stolen lowers it. Steps are rate-limited so a burst of events
//! cannot produce a visible spike, and every published value stays inside
//! the configured range.

mod config;
mod handle;

use heist_dda_core::{DdaSample, DifficultyInputs, DifficultyLevel, DifficultyRange, StepDirection};

pub use config::{ConfigError, DifficultyConfig};
pub use handle::DifficultyReader;

use config::Validated;
use handle::DifficultyHandle;

/// A completed difficulty step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyChange {
    /// Difficulty in effect before the step.
    pub previous: DifficultyLevel,
    /// Sample describing the new value and when it took effect.
    pub sample: DdaSample,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Smoothing {
    evasions_seen: u32,
    calm_since: Option<f32>,
    last_step_at: Option<f32>,
    last_elapsed: f32,
}

/// Owns the single authoritative difficulty value of a playthrough.
#[derive(Debug)]
pub struct DifficultyTracker {
    tuning: Validated,
    current: DifficultyLevel,
    smoothing: Smoothing,
    handle: DifficultyHandle,
}

impl Default for DifficultyTracker {
    fn default() -> Self {
        Self::with_tuning(Validated::DEFAULT)
    }
}

impl DifficultyTracker {
    /// Creates a tracker at the configured initial difficulty.
    pub fn new(config: DifficultyConfig) -> Result<Self, ConfigError> {
        config.checked().map(Self::with_tuning)
    }

    fn with_tuning(tuning: Validated) -> Self {
        Self {
            current: tuning.initial,
            smoothing: Smoothing::default(),
            handle: DifficultyHandle::new(tuning.initial),
            tuning,
        }
    }

    /// Creates a tracker, falling back to the default tuning when `config` is invalid.
    #[must_use]
    pub fn new_or_default(config: DifficultyConfig) -> Self {
        Self::new(config).unwrap_or_else(|error| {
            log::warn!("invalid difficulty config ({error}); using defaults");
            Self::default()
        })
    }

    /// Current difficulty.
    #[must_use]
    pub fn difficulty(&self) -> DifficultyLevel {
        self.current
    }

    /// Difficulty a fresh playthrough starts with.
    #[must_use]
    pub fn initial(&self) -> DifficultyLevel {
        self.tuning.initial
    }

    /// Admissible difficulty range.
    #[must_use]
    pub fn range(&self) -> DifficultyRange {
        self.tuning.range
    }

    /// Creates a read-only view of the published difficulty for planners.
    #[must_use]
    pub fn reader(&self) -> DifficultyReader {
        self.handle.reader()
    }

    /// Moves the difficulty at most one step toward the target implied by `inputs`.
    ///
    /// Returns the change when the value moved. Non-finite or backwards
    /// timestamps hold the current value.
    pub fn recompute(&mut self, inputs: DifficultyInputs) -> Option<DifficultyChange> {
        let elapsed = inputs.elapsed;
        if !elapsed.is_finite() || elapsed < self.smoothing.last_elapsed {
            log::warn!(
                "ignoring recompute at t={elapsed} (last t={}); holding difficulty {}",
                self.smoothing.last_elapsed,
                self.current.get()
            );
            return None;
        }
        self.smoothing.last_elapsed = elapsed;

        let calm = inputs.active_pursuits == 0 && inputs.stolen_paintings == 0;
        if calm {
            let _ = self.smoothing.calm_since.get_or_insert(elapsed);
        } else {
            self.smoothing.calm_since = None;
        }

        let direction = self.target_direction(&inputs);
        if direction == StepDirection::Hold || !self.step_allowed(elapsed) {
            return None;
        }

        match direction {
            StepDirection::Up => self.smoothing.evasions_seen = inputs.evasions,
            StepDirection::Down => self.smoothing.calm_since = Some(elapsed),
            StepDirection::Hold => {}
        }

        let previous = self.current;
        let next = self.tuning.range.step(previous, direction);
        if next == previous {
            return None;
        }

        self.current = next;
        self.smoothing.last_step_at = Some(elapsed);
        self.handle.publish(next);
        log::debug!(
            "difficulty {} -> {} at t={elapsed:.2} ({direction:?})",
            previous.get(),
            next.get()
        );

        Some(DifficultyChange {
            previous,
            sample: DdaSample::new(elapsed, next),
        })
    }

    /// Restores the initial difficulty and forgets all smoothing memory.
    pub fn hard_reset(&mut self) {
        self.current = self.tuning.initial;
        self.smoothing = Smoothing::default();
        self.handle.publish(self.current);
    }

    /// Forgets every timestamp so a clock restarted at zero is accepted.
    ///
    /// The difficulty and the evasions already consumed are kept.
    pub fn restart_clock(&mut self) {
        self.smoothing.last_elapsed = 0.0;
        self.smoothing.calm_since = None;
        self.smoothing.last_step_at = None;
    }

    fn target_direction(&self, inputs: &DifficultyInputs) -> StepDirection {
        let new_evasions = inputs.evasions.saturating_sub(self.smoothing.evasions_seen);
        if new_evasions > 0 || inputs.active_pursuits >= self.tuning.pursuit_pressure_threshold {
            return StepDirection::Up;
        }

        match self.smoothing.calm_since {
            Some(since) if inputs.elapsed - since >= self.tuning.cool_down_secs => {
                StepDirection::Down
            }
            _ => StepDirection::Hold,
        }
    }

    fn step_allowed(&self, elapsed: f32) -> bool {
        match self.smoothing.last_step_at {
            Some(last) => elapsed - last >= self.tuning.min_step_interval_secs,
            None => true,
        }
    }
}
