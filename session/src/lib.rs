#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative playthrough state for the heist difficulty-adjustment engine.
//!
//! A [`Session`] owns every piece of playthrough-scoped state: the evasion
//! counters, the difficulty tracker, the difficulty log and the run data.
//! Gameplay collaborators mutate it only through [`apply`], and read it
//! through the [`query`] module or a [`DifficultySensor`].

mod channel;
mod config;
mod run_data;

use std::time::Duration;

use heist_dda_core::{Command, DifficultyInputs, Event, RejectionReason};
use heist_dda_system_difficulty::DifficultyTracker;
use heist_dda_system_evasion::{EvasionError, EvasionTracker};
use heist_dda_system_log::{DdaLog, PersistError, PersistedRecord, SampleSink};
use heist_dda_system_sensor::DifficultySensor;

pub use channel::{EventChannel, Subscription};
pub use config::SessionConfig;
pub use run_data::{RunData, RunDataError};

/// Session context owning all state of the current playthrough.
#[derive(Debug)]
pub struct Session {
    elapsed: Duration,
    playthrough: u32,
    evasion: EvasionTracker,
    difficulty: DifficultyTracker,
    log: DdaLog,
    run: RunData,
    channel: EventChannel,
}

/// Mutable access to the playthrough-scoped systems, used by the reset flow.
#[derive(Debug)]
pub struct PlaythroughSystems<'a> {
    /// Authoritative difficulty.
    pub difficulty: &'a mut DifficultyTracker,
    /// Pursuit and evasion counters.
    pub evasion: &'a mut EvasionTracker,
    /// Stolen and delivered paintings.
    pub run_data: &'a mut RunData,
}

impl Session {
    /// Creates a session at the start of its first playthrough.
    ///
    /// An invalid difficulty configuration is replaced by the defaults.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let difficulty = DifficultyTracker::new_or_default(config.difficulty.clone());
        let mut log = DdaLog::new();
        log.record(0.0, difficulty.difficulty());

        Self {
            elapsed: Duration::ZERO,
            playthrough: 0,
            evasion: EvasionTracker::new(),
            difficulty,
            log,
            run: RunData::default(),
            channel: EventChannel::new(),
        }
    }

    /// Subscribes to every event applied from now on.
    #[must_use]
    pub fn subscribe(&mut self) -> Subscription {
        self.channel.subscribe()
    }

    /// Subscribes to the applied events accepted by `filter`.
    #[must_use]
    pub fn subscribe_filtered(&mut self, filter: fn(&Event) -> bool) -> Subscription {
        self.channel.subscribe_filtered(filter)
    }

    /// Creates a planner sensor observing this session's difficulty.
    #[must_use]
    pub fn sensor(&self) -> DifficultySensor {
        DifficultySensor::new(&self.difficulty)
    }

    /// Exposes the playthrough-scoped systems for resetting.
    pub fn systems_mut(&mut self) -> PlaythroughSystems<'_> {
        PlaythroughSystems {
            difficulty: &mut self.difficulty,
            evasion: &mut self.evasion,
            run_data: &mut self.run,
        }
    }

    /// Writes the difficulty log of the current playthrough to `sink`.
    pub fn flush_log(&self, sink: &mut dyn SampleSink) -> Result<PersistedRecord, PersistError> {
        self.log.flush(sink)
    }

    /// Restarts the clock and the difficulty log for a new playthrough.
    ///
    /// The fresh log opens with a baseline sample of the current difficulty at
    /// time zero. Difficulty and counters are kept; use the reset service to
    /// clear them.
    pub fn begin_playthrough(&mut self) {
        self.elapsed = Duration::ZERO;
        self.difficulty.restart_clock();
        self.playthrough = self.playthrough.saturating_add(1);
        self.log.clear();
        self.log.record(0.0, self.difficulty.difficulty());
        log::info!(
            "playthrough {} started at difficulty {}",
            self.playthrough,
            self.difficulty.difficulty().get()
        );
    }

    fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    fn inputs(&self) -> DifficultyInputs {
        DifficultyInputs {
            active_pursuits: self.evasion.active_pursuit_count(),
            evasions: self.evasion.evasion_count(),
            stolen_paintings: self.run.carried_count(),
            elapsed: self.elapsed_secs(),
        }
    }

    fn recompute(&mut self, out_events: &mut Vec<Event>) {
        let inputs = self.inputs();
        if let Some(change) = self.difficulty.recompute(inputs) {
            self.log
                .record(change.sample.timestamp, change.sample.difficulty);
            out_events.push(Event::DifficultyChanged {
                sample: change.sample,
                previous: change.previous,
            });
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

/// Applies the provided command to the session, appending resulting events.
///
/// Invariant violations never abort the caller: the command is ignored and
/// reported as [`Event::CommandRejected`].
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    let first = out_events.len();

    match command {
        Command::Tick { dt } => {
            session.elapsed = session.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                elapsed: session.elapsed_secs(),
            });
            session.recompute(out_events);
        }
        Command::StartPursuit { pursuer } => {
            if session.evasion.pursuit_started(pursuer) {
                out_events.push(Event::PursuitStarted {
                    pursuer,
                    active: session.evasion.active_pursuit_count(),
                });
            }
        }
        Command::EndPursuit { pursuer, evaded } => {
            match session.evasion.pursuit_ended(pursuer, evaded) {
                Ok(()) => out_events.push(Event::PursuitEnded {
                    pursuer,
                    evaded,
                    active: session.evasion.active_pursuit_count(),
                }),
                Err(EvasionError::UnknownPursuer(pursuer)) => out_events.push(
                    Event::CommandRejected {
                        reason: RejectionReason::UnknownPursuer(pursuer),
                    },
                ),
            }
        }
        Command::ForceEndPursuits => {
            let cleared = session.evasion.reset_all_pursuits();
            out_events.push(Event::PursuitsCleared { cleared });
        }
        Command::StealPainting { painting } => match session.run.steal(painting) {
            Ok(()) => out_events.push(Event::PaintingStolen { painting }),
            Err(error) => reject(out_events, &error),
        },
        Command::DeliverPainting { painting } => match session.run.deliver(painting) {
            Ok(()) => out_events.push(Event::PaintingDelivered { painting }),
            Err(error) => reject(out_events, &error),
        },
        Command::RequestRecompute => session.recompute(out_events),
    }

    session.channel.publish(&out_events[first..]);
}

fn reject(out_events: &mut Vec<Event>, error: &RunDataError) {
    log::warn!("ignoring command: {error}");
    let reason = match *error {
        RunDataError::AlreadyCarried(painting) => RejectionReason::PaintingAlreadyCarried(painting),
        RunDataError::NotCarried(painting) => RejectionReason::PaintingNotCarried(painting),
    };
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use heist_dda_core::{DdaSample, DifficultyLevel, PaintingId, PursuerId};

    use super::Session;

    /// Current difficulty.
    #[must_use]
    pub fn difficulty(session: &Session) -> DifficultyLevel {
        session.difficulty.difficulty()
    }

    /// Difficulty every playthrough starts with.
    #[must_use]
    pub fn initial_difficulty(session: &Session) -> DifficultyLevel {
        session.difficulty.initial()
    }

    /// Number of guards currently chasing the player.
    #[must_use]
    pub fn active_pursuit_count(session: &Session) -> u32 {
        session.evasion.active_pursuit_count()
    }

    /// Reports whether `pursuer` is currently chasing the player.
    #[must_use]
    pub fn is_pursuing(session: &Session, pursuer: PursuerId) -> bool {
        session.evasion.is_pursuing(pursuer)
    }

    /// Evasions credited during the current playthrough.
    #[must_use]
    pub fn evasion_count(session: &Session) -> u32 {
        session.evasion.evasion_count()
    }

    /// Difficulty samples recorded during the current playthrough.
    #[must_use]
    pub fn samples(session: &Session) -> &[DdaSample] {
        session.log.samples()
    }

    /// Simulated time since the current playthrough started.
    #[must_use]
    pub fn elapsed(session: &Session) -> Duration {
        session.elapsed
    }

    /// Paintings currently carried.
    #[must_use]
    pub fn carried_paintings(session: &Session) -> Vec<PaintingId> {
        session.run.carried().collect()
    }

    /// Paintings delivered during the current playthrough.
    #[must_use]
    pub fn delivered_paintings(session: &Session) -> &[PaintingId] {
        session.run.delivered()
    }

    /// Zero-based index of the current playthrough.
    #[must_use]
    pub fn playthrough(session: &Session) -> u32 {
        session.playthrough
    }
}

#[cfg(test)]
mod tests {
    use heist_dda_core::{DdaSample, DifficultyLevel, PaintingId, PursuerId};

    use super::*;

    fn seconds(secs: u64) -> Command {
        Command::Tick {
            dt: Duration::from_secs(secs),
        }
    }

    #[test]
    fn new_session_logs_baseline_sample() {
        let session = Session::default();
        let samples = query::samples(&session);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].timestamp, 0.0);
        assert_eq!(samples[0].difficulty, DifficultyLevel::new(3));
    }

    #[test]
    fn tick_reports_time_before_difficulty() {
        let mut session = Session::default();
        let mut events = Vec::new();
        apply(
            &mut session,
            Command::StartPursuit {
                pursuer: PursuerId::new(1),
            },
            &mut events,
        );
        apply(
            &mut session,
            Command::EndPursuit {
                pursuer: PursuerId::new(1),
                evaded: true,
            },
            &mut events,
        );
        events.clear();

        apply(&mut session, seconds(1), &mut events);

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: Duration::from_secs(1),
                    elapsed: 1.0,
                },
                Event::DifficultyChanged {
                    sample: DdaSample::new(1.0, DifficultyLevel::new(4)),
                    previous: DifficultyLevel::new(3),
                },
            ]
        );
        assert_eq!(query::samples(&session).len(), 2);
    }

    #[test]
    fn invariant_violations_are_rejected_not_applied() {
        let mut session = Session::default();
        let mut events = Vec::new();

        apply(
            &mut session,
            Command::EndPursuit {
                pursuer: PursuerId::new(7),
                evaded: true,
            },
            &mut events,
        );
        apply(
            &mut session,
            Command::DeliverPainting {
                painting: PaintingId::new(2),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::CommandRejected {
                    reason: RejectionReason::UnknownPursuer(PursuerId::new(7)),
                },
                Event::CommandRejected {
                    reason: RejectionReason::PaintingNotCarried(PaintingId::new(2)),
                },
            ]
        );
        assert_eq!(query::evasion_count(&session), 0);
        assert!(query::delivered_paintings(&session).is_empty());
    }

    #[test]
    fn duplicate_pursuit_start_emits_nothing() {
        let mut session = Session::default();
        let mut events = Vec::new();
        let start = Command::StartPursuit {
            pursuer: PursuerId::new(3),
        };
        apply(&mut session, start.clone(), &mut events);
        apply(&mut session, start, &mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(query::active_pursuit_count(&session), 1);
    }

    #[test]
    fn begin_playthrough_restarts_clock_and_log() {
        let mut session = Session::default();
        let mut events = Vec::new();
        apply(&mut session, seconds(1), &mut events);
        apply(&mut session, seconds(40), &mut events);
        assert_eq!(query::difficulty(&session), DifficultyLevel::new(2));
        assert_eq!(query::samples(&session).len(), 2);

        session.begin_playthrough();

        assert_eq!(query::elapsed(&session), Duration::ZERO);
        assert_eq!(query::playthrough(&session), 1);
        assert_eq!(query::samples(&session).len(), 1);
        assert_eq!(
            query::samples(&session)[0].difficulty,
            query::difficulty(&session)
        );
    }

    #[test]
    fn difficulty_keeps_moving_after_playthrough_restart() {
        let mut session = Session::default();
        let mut events = Vec::new();
        apply(&mut session, seconds(100), &mut events);

        session.begin_playthrough();
        apply(
            &mut session,
            Command::StartPursuit {
                pursuer: PursuerId::new(1),
            },
            &mut events,
        );
        apply(
            &mut session,
            Command::EndPursuit {
                pursuer: PursuerId::new(1),
                evaded: true,
            },
            &mut events,
        );
        apply(&mut session, seconds(10), &mut events);

        assert_eq!(query::difficulty(&session), DifficultyLevel::new(4));
        assert_eq!(
            query::samples(&session),
            &[
                DdaSample::new(0.0, DifficultyLevel::new(3)),
                DdaSample::new(10.0, DifficultyLevel::new(4)),
            ]
        );
    }

    #[test]
    fn subscribers_receive_applied_events() {
        let mut session = Session::default();
        let deliveries =
            session.subscribe_filtered(|event| matches!(event, Event::PaintingDelivered { .. }));
        let mut events = Vec::new();

        apply(
            &mut session,
            Command::StealPainting {
                painting: PaintingId::new(5),
            },
            &mut events,
        );
        apply(
            &mut session,
            Command::DeliverPainting {
                painting: PaintingId::new(5),
            },
            &mut events,
        );

        assert_eq!(
            deliveries.drain(),
            vec![Event::PaintingDelivered {
                painting: PaintingId::new(5)
            }]
        );
    }
}
