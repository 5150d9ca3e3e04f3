#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Return-to-menu reset of all playthrough-scoped state.

use heist_dda_core::PlaythroughScoped;
use heist_dda_session::Session;
use heist_dda_system_log::{PersistedRecord, SampleSink};

/// Single entry point that prepares a session for a fresh playthrough.
#[derive(Debug)]
pub struct GameResetService<S> {
    sink: S,
    last_export: Option<PersistedRecord>,
}

impl<S: SampleSink> GameResetService<S> {
    /// Creates a service exporting finished playthroughs to `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_export: None,
        }
    }

    /// Sink receiving exported difficulty logs.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record written by the most recent successful export.
    #[must_use]
    pub fn last_export(&self) -> Option<&PersistedRecord> {
        self.last_export.as_ref()
    }

    /// Resets every playthrough-scoped system of `session`.
    ///
    /// Runs in this order:
    ///
    /// 1. export the finished playthrough's difficulty log (best effort),
    /// 2. `DifficultyTracker::hard_reset`,
    /// 3. `EvasionTracker::reset_all_pursuits`,
    /// 4. `EvasionTracker::reset_evasion_count`,
    /// 5. the session's run data, then each of `collaborators` in slice order,
    /// 6. `Session::begin_playthrough`, which restarts the clock and the log.
    ///
    /// The hard reset does not read the evasion counters. An export failure is
    /// logged and never prevents the reset.
    pub fn reset_persistent_systems(
        &mut self,
        session: &mut Session,
        collaborators: &mut [&mut dyn PlaythroughScoped],
    ) {
        self.last_export = match session.flush_log(&mut self.sink) {
            Ok(record) => Some(record),
            Err(error) => {
                log::error!("failed to export difficulty log: {error}");
                None
            }
        };

        let systems = session.systems_mut();
        systems.difficulty.hard_reset();
        let cleared = systems.evasion.reset_all_pursuits();
        systems.evasion.reset_evasion_count();
        systems.run_data.reset_for_new_playthrough();
        for collaborator in collaborators.iter_mut() {
            collaborator.reset_for_new_playthrough();
        }
        log::debug!(
            "reset playthrough state ({cleared} pursuits dropped, {} collaborators)",
            collaborators.len()
        );

        session.begin_playthrough();
    }

    /// Extension point for clearing planner state.
    ///
    /// Planner state is owned by the planner itself and is left untouched.
    pub fn reset_goap_systems(&self) {
        log::debug!("planner reset requested; planner state is not owned here");
    }
}
