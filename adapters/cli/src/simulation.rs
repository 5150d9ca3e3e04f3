//! Seeded scripted playthroughs that drive a session the way gameplay systems would.

use std::{fmt, time::Duration};

use heist_dda_core::{AgentId, Command, DifficultyLevel, Event, PaintingId, PickupId, PursuerId};
use heist_dda_session::{apply, query, Session};
use heist_dda_system_pickups::{
    Carrier, Pickup, PickupKind, PickupSet, Trigger, TriggerError, TriggerState,
};
use heist_dda_system_sensor::Sensor;
use rand::Rng;

const DROP_POINT: PickupId = PickupId::new(0);

const SPOT_CHANCE: f64 = 0.02;
const CHASE_END_CHANCE: f64 = 0.04;
const ESCAPE_CHANCE: f64 = 0.6;
const STEAL_CHANCE: f64 = 0.01;
const DELIVER_CHANCE: f64 = 0.02;

/// Pacing of a scripted playthrough.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Script {
    /// Simulated length of one playthrough.
    pub(crate) duration: Duration,
    /// Simulated time per tick.
    pub(crate) tick: Duration,
    /// Guards patrolling the level; each also runs a planner.
    pub(crate) guards: u32,
}

/// Outcome of one scripted playthrough.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PlaythroughReport {
    pub(crate) playthrough: u32,
    pub(crate) ticks: u32,
    pub(crate) difficulty_changes: u32,
    pub(crate) rejected: u32,
    pub(crate) evasions: u32,
    pub(crate) delivered: usize,
    pub(crate) final_difficulty: DifficultyLevel,
    pub(crate) sensed_min: DifficultyLevel,
    pub(crate) sensed_max: DifficultyLevel,
}

impl fmt::Display for PlaythroughReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "playthrough {}: {} ticks, {} difficulty changes, {} evasions, {} delivered, \
             final difficulty {} (planners sensed {}..={})",
            self.playthrough,
            self.ticks,
            self.difficulty_changes,
            self.evasions,
            self.delivered,
            self.final_difficulty.get(),
            self.sensed_min.get(),
            self.sensed_max.get()
        )?;
        if self.rejected > 0 {
            write!(f, ", {} rejected commands", self.rejected)?;
        }
        Ok(())
    }
}

/// Builds a level with one drop point and `paintings` stealable paintings.
pub(crate) fn heist_level(paintings: u32) -> PickupSet {
    let stealables = (1..=paintings).map(|id| {
        Pickup::new(
            PickupId::new(id),
            PickupKind::StealablePickup {
                painting: PaintingId::new(id),
            },
        )
    });
    PickupSet::new(std::iter::once(Pickup::new(DROP_POINT, PickupKind::DropPoint)).chain(stealables))
}

/// Plays one scripted playthrough against `session`.
///
/// Each tick first applies the gameplay commands rolled for that frame, then
/// the tick itself, and finally lets every guard's planner sense the difficulty.
pub(crate) fn run_playthrough<R: Rng>(
    session: &mut Session,
    level: &mut PickupSet,
    script: &Script,
    rng: &mut R,
) -> PlaythroughReport {
    let sensor = session.sensor();
    let agents: Vec<AgentId> = (0..script.guards).map(AgentId::new).collect();
    let start = query::difficulty(session);
    let mut report = PlaythroughReport {
        playthrough: query::playthrough(session),
        ticks: 0,
        difficulty_changes: 0,
        rejected: 0,
        evasions: 0,
        delivered: 0,
        final_difficulty: start,
        sensed_min: start,
        sensed_max: start,
    };
    let mut carrier = Carrier::default();
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;

    while elapsed < script.duration && !script.tick.is_zero() {
        drive_guards(session, script.guards, rng, &mut events);
        drive_player(session, level, &mut carrier, rng, &mut events);
        apply(session, Command::Tick { dt: script.tick }, &mut events);
        elapsed = elapsed.saturating_add(script.tick);
        report.ticks = report.ticks.saturating_add(1);

        for agent in &agents {
            let sensed = sensor.sense(*agent);
            report.sensed_min = report.sensed_min.min(sensed);
            report.sensed_max = report.sensed_max.max(sensed);
        }

        for event in events.drain(..) {
            match event {
                Event::DifficultyChanged { .. } => {
                    report.difficulty_changes = report.difficulty_changes.saturating_add(1);
                }
                Event::CommandRejected { reason } => {
                    log::debug!("scripted command rejected: {reason:?}");
                    report.rejected = report.rejected.saturating_add(1);
                }
                _ => {}
            }
        }
    }

    report.evasions = query::evasion_count(session);
    report.delivered = query::delivered_paintings(session).len();
    report.final_difficulty = query::difficulty(session);
    report
}

fn drive_guards<R: Rng>(session: &mut Session, guards: u32, rng: &mut R, events: &mut Vec<Event>) {
    for pursuer in (0..guards).map(PursuerId::new) {
        let command = if query::is_pursuing(session, pursuer) {
            if rng.gen_bool(CHASE_END_CHANCE) {
                Some(Command::EndPursuit {
                    pursuer,
                    evaded: rng.gen_bool(ESCAPE_CHANCE),
                })
            } else {
                None
            }
        } else {
            rng.gen_bool(SPOT_CHANCE)
                .then_some(Command::StartPursuit { pursuer })
        };

        if let Some(command) = command {
            apply(session, command, events);
        }
    }
}

fn drive_player<R: Rng>(
    session: &mut Session,
    level: &mut PickupSet,
    carrier: &mut Carrier,
    rng: &mut R,
    events: &mut Vec<Event>,
) {
    let (target, chance) = match carrier.carrying {
        Some(_) => (Some(DROP_POINT), DELIVER_CHANCE),
        None => (next_painting(level), STEAL_CHANCE),
    };
    let Some(target) = target else {
        return;
    };
    if !rng.gen_bool(chance) {
        return;
    }

    match interact(level, target, carrier) {
        Ok(Some(command)) => {
            match command {
                Command::StealPainting { painting } => carrier.carrying = Some(painting),
                Command::DeliverPainting { .. } => carrier.carrying = None,
                _ => {}
            }
            apply(session, command, events);
        }
        Ok(None) => {}
        Err(error) => log::warn!("scripted interaction failed: {error}"),
    }
}

fn next_painting(level: &PickupSet) -> Option<PickupId> {
    level
        .iter()
        .find(|pickup| {
            matches!(pickup.kind(), PickupKind::StealablePickup { .. })
                && pickup.state() == TriggerState::Idle
        })
        .map(Pickup::id)
}

fn interact(
    level: &mut PickupSet,
    target: PickupId,
    carrier: &Carrier,
) -> Result<Option<Command>, TriggerError> {
    level.enter(target)?;
    let prompted = level
        .get(target)
        .is_some_and(|pickup| pickup.on_stay(carrier));
    let command = if prompted {
        level.activate(target, carrier)?
    } else {
        None
    };
    level.exit(target)?;
    Ok(command)
}
