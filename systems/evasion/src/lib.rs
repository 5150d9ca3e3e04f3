#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit and evasion counters feeding the difficulty tracker.

use std::collections::BTreeSet;

use heist_dda_core::PursuerId;
use thiserror::Error;

/// Invariant violations reported by the evasion tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EvasionError {
    /// A pursuit ended for a guard that was not being tracked.
    #[error("pursuit ended for untracked pursuer {}", .0.get())]
    UnknownPursuer(PursuerId),
}

/// Tracks which guards are chasing the player and how many chases were escaped.
#[derive(Debug, Default)]
pub struct EvasionTracker {
    active: BTreeSet<PursuerId>,
    evasions: u32,
}

impl EvasionTracker {
    /// Creates a tracker with no active pursuits and no evasions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chase by `pursuer`.
    ///
    /// Returns `false` when the pursuer was already tracked, in which case the
    /// active count is left untouched.
    pub fn pursuit_started(&mut self, pursuer: PursuerId) -> bool {
        let inserted = self.active.insert(pursuer);
        if !inserted {
            log::debug!("pursuer {} already tracked", pursuer.get());
        }
        inserted
    }

    /// Ends the chase by `pursuer`, crediting an evasion when `was_evaded`.
    ///
    /// Ending a chase that was never started changes nothing and reports
    /// [`EvasionError::UnknownPursuer`].
    pub fn pursuit_ended(&mut self, pursuer: PursuerId, was_evaded: bool) -> Result<(), EvasionError> {
        if !self.active.remove(&pursuer) {
            log::warn!("pursuit ended for untracked pursuer {}", pursuer.get());
            return Err(EvasionError::UnknownPursuer(pursuer));
        }

        if was_evaded {
            self.evasions = self.evasions.saturating_add(1);
        }
        Ok(())
    }

    /// Drops every active chase without crediting evasions.
    ///
    /// Returns the number of chases that were active.
    pub fn reset_all_pursuits(&mut self) -> u32 {
        let cleared = self.active_pursuit_count();
        self.active.clear();
        cleared
    }

    /// Clears the cumulative evasion counter.
    pub fn reset_evasion_count(&mut self) {
        self.evasions = 0;
    }

    /// Number of guards currently chasing the player.
    #[must_use]
    pub fn active_pursuit_count(&self) -> u32 {
        u32::try_from(self.active.len()).unwrap_or(u32::MAX)
    }

    /// Evasions credited since the last reset.
    #[must_use]
    pub fn evasion_count(&self) -> u32 {
        self.evasions
    }

    /// Reports whether `pursuer` is currently chasing.
    #[must_use]
    pub fn is_pursuing(&self, pursuer: PursuerId) -> bool {
        self.active.contains(&pursuer)
    }
}
