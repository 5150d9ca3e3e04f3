#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the heist difficulty-adjustment engine.
//!
//! This crate defines the message surface that connects gameplay adapters,
//! the authoritative playthrough session, and pure systems. Gameplay sources
//! submit [`Command`] values describing pursuit, theft and clock changes, the
//! session executes them via its `apply` entry point, and then broadcasts
//! [`Event`] values for subscribers to react to deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible playthrough mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the playthrough clock and runs the per-tick difficulty recompute.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that a guard started chasing the player.
    StartPursuit {
        /// Guard that initiated the chase.
        pursuer: PursuerId,
    },
    /// Reports that a guard stopped chasing the player.
    EndPursuit {
        /// Guard whose chase ended.
        pursuer: PursuerId,
        /// Whether the chase ended because the player escaped.
        evaded: bool,
    },
    /// Forcibly ends every active chase without crediting evasions.
    ForceEndPursuits,
    /// Reports that the player picked up a painting.
    StealPainting {
        /// Painting taken from its wall.
        painting: PaintingId,
    },
    /// Reports that the player handed a carried painting in at a drop point.
    DeliverPainting {
        /// Painting that was delivered.
        painting: PaintingId,
    },
    /// Requests an out-of-cadence difficulty recompute at the current clock.
    RequestRecompute,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the playthrough clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Seconds elapsed since the playthrough started, after the tick.
        elapsed: f32,
    },
    /// Confirms that a pursuit is now tracked.
    PursuitStarted {
        /// Guard that initiated the chase.
        pursuer: PursuerId,
        /// Number of active pursuits after the change.
        active: u32,
    },
    /// Confirms that a tracked pursuit ended.
    PursuitEnded {
        /// Guard whose chase ended.
        pursuer: PursuerId,
        /// Whether the player escaped.
        evaded: bool,
        /// Number of active pursuits after the change.
        active: u32,
    },
    /// Confirms that every active pursuit was dropped without credit.
    PursuitsCleared {
        /// Number of pursuits that were active before clearing.
        cleared: u32,
    },
    /// Confirms that the player now carries a painting.
    PaintingStolen {
        /// Painting that was taken.
        painting: PaintingId,
    },
    /// Confirms that a carried painting reached a drop point.
    PaintingDelivered {
        /// Painting that was delivered.
        painting: PaintingId,
    },
    /// Announces a new difficulty value.
    DifficultyChanged {
        /// Sample recorded for the change.
        sample: DdaSample,
        /// Difficulty observed before the change.
        previous: DifficultyLevel,
    },
    /// Reports that a command violated a tracking invariant and was ignored.
    CommandRejected {
        /// Specific reason the command was ignored.
        reason: RejectionReason,
    },
}

/// Reasons a gameplay command may be ignored by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// A pursuit ended for a guard that was not chasing.
    UnknownPursuer(PursuerId),
    /// A painting was stolen while already being carried.
    PaintingAlreadyCarried(PaintingId),
    /// A painting was delivered without being carried.
    PaintingNotCarried(PaintingId),
}

/// Unique identifier assigned to a pursuing guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a planning agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a stealable painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaintingId(u32);

impl PaintingId {
    /// Creates a new painting identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a trigger volume in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Discrete difficulty scalar consumed by the planner as a sensed fact.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DifficultyLevel(i32);

impl DifficultyLevel {
    /// Creates a difficulty level with the provided raw value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw integer value.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Closed interval of admissible difficulty levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyRange {
    min: DifficultyLevel,
    max: DifficultyLevel,
}

impl DifficultyRange {
    /// Creates a range, returning `None` when `min` exceeds `max`.
    #[must_use]
    pub const fn new(min: DifficultyLevel, max: DifficultyLevel) -> Option<Self> {
        if min.get() > max.get() {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Lowest admissible level.
    #[must_use]
    pub const fn min(&self) -> DifficultyLevel {
        self.min
    }

    /// Highest admissible level.
    #[must_use]
    pub const fn max(&self) -> DifficultyLevel {
        self.max
    }

    /// Reports whether the level lies inside the range.
    #[must_use]
    pub const fn contains(&self, level: DifficultyLevel) -> bool {
        level.get() >= self.min.get() && level.get() <= self.max.get()
    }

    /// Clamps the provided level into the range.
    #[must_use]
    pub fn clamp(&self, level: DifficultyLevel) -> DifficultyLevel {
        DifficultyLevel::new(level.get().clamp(self.min.get(), self.max.get()))
    }

    /// Moves `level` one step in `direction`, saturating at the bounds.
    #[must_use]
    pub fn step(&self, level: DifficultyLevel, direction: StepDirection) -> DifficultyLevel {
        let delta = match direction {
            StepDirection::Up => 1,
            StepDirection::Down => -1,
            StepDirection::Hold => 0,
        };
        self.clamp(DifficultyLevel::new(level.get().saturating_add(delta)))
    }
}

/// Direction a recompute nudges the difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepDirection {
    /// Raise the challenge by one step.
    Up,
    /// Lower the challenge by one step.
    Down,
    /// Keep the current level.
    Hold,
}

/// Immutable time-series record of a difficulty value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DdaSample {
    /// Seconds since the playthrough started.
    pub timestamp: f32,
    /// Difficulty in effect from `timestamp` onwards.
    pub difficulty: DifficultyLevel,
}

impl DdaSample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(timestamp: f32, difficulty: DifficultyLevel) -> Self {
        Self {
            timestamp,
            difficulty,
        }
    }
}

/// Snapshot of the tracked counters that drive a difficulty recompute.
///
/// The recompute rule is a pure function of this snapshot and the tracker's
/// smoothing memory, so tests can drive it without a running simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DifficultyInputs {
    /// Number of guards currently chasing the player.
    pub active_pursuits: u32,
    /// Evasions credited since the playthrough started.
    pub evasions: u32,
    /// Paintings currently carried and not yet delivered.
    pub stolen_paintings: u32,
    /// Seconds since the playthrough started.
    pub elapsed: f32,
}

/// State that lives for exactly one playthrough and is cleared on return to the menu.
pub trait PlaythroughScoped {
    /// Restores the state a fresh playthrough starts with.
    fn reset_for_new_playthrough(&mut self);
}
