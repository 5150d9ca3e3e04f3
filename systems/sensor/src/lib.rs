#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Planner-facing sensor exposing the current difficulty as a world fact.

use heist_dda_core::{AgentId, DifficultyLevel};
use heist_dda_system_difficulty::{DifficultyReader, DifficultyTracker};

/// Seam through which a planner samples one world fact per planning cycle.
///
/// Implementations must return immediately; the planner calls them on its
/// latency-sensitive tick for every agent.
pub trait Sensor {
    /// Value written into the planner's world state.
    type Fact;

    /// Samples the fact on behalf of `agent`.
    fn sense(&self, agent: AgentId) -> Self::Fact;
}

/// Stateless bridge from the difficulty tracker to planning agents.
///
/// Difficulty is global, so every agent observes the same value within a tick.
#[derive(Clone, Debug)]
pub struct DifficultySensor {
    reader: DifficultyReader,
}

impl DifficultySensor {
    /// Creates a sensor reading the tracker's published value.
    #[must_use]
    pub fn new(tracker: &DifficultyTracker) -> Self {
        Self::from_reader(tracker.reader())
    }

    /// Creates a sensor from an existing reader.
    #[must_use]
    pub fn from_reader(reader: DifficultyReader) -> Self {
        Self { reader }
    }
}

impl Sensor for DifficultySensor {
    type Fact = DifficultyLevel;

    fn sense(&self, _agent: AgentId) -> DifficultyLevel {
        self.reader.get()
    }
}
