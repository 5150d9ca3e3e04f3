use heist_dda_core::{DifficultyInputs, DifficultyLevel};
use heist_dda_system_difficulty::{DifficultyConfig, DifficultyTracker};
use proptest::prelude::*;

fn calm(elapsed: f32) -> DifficultyInputs {
    DifficultyInputs {
        elapsed,
        ..DifficultyInputs::default()
    }
}

#[test]
fn evasion_raises_difficulty_by_one_step() {
    let mut tracker = DifficultyTracker::default();
    assert_eq!(tracker.difficulty(), DifficultyLevel::new(3));

    let opening = DifficultyInputs {
        active_pursuits: 2,
        evasions: 0,
        stolen_paintings: 0,
        elapsed: 0.0,
    };
    assert!(tracker.recompute(opening).is_none(), "two pursuits alone hold");

    let after_escape = DifficultyInputs {
        active_pursuits: 1,
        evasions: 1,
        stolen_paintings: 0,
        elapsed: 10.0,
    };
    let change = tracker.recompute(after_escape).expect("evasion must step");
    assert_eq!(change.previous, DifficultyLevel::new(3));
    assert_eq!(change.sample.difficulty, DifficultyLevel::new(4));
    assert!((change.sample.timestamp - 10.0).abs() < f32::EPSILON);
    assert_eq!(tracker.difficulty(), DifficultyLevel::new(4));
}

#[test]
fn sustained_calm_lowers_difficulty_down_to_minimum() {
    let mut tracker = DifficultyTracker::default();

    assert!(tracker.recompute(calm(0.0)).is_none());
    assert!(tracker.recompute(calm(29.0)).is_none(), "cool-down not elapsed");

    let first = tracker.recompute(calm(30.0)).expect("cool-down elapsed");
    assert_eq!(first.sample.difficulty, DifficultyLevel::new(2));

    assert!(tracker.recompute(calm(45.0)).is_none(), "cool-down restarts");

    let second = tracker.recompute(calm(60.0)).expect("second cool-down elapsed");
    assert_eq!(second.sample.difficulty, DifficultyLevel::new(1));

    assert!(tracker.recompute(calm(90.0)).is_none(), "never below minimum");
    assert_eq!(tracker.difficulty(), DifficultyLevel::new(1));
}

#[test]
fn carried_painting_interrupts_cool_down() {
    let mut tracker = DifficultyTracker::default();
    assert!(tracker.recompute(calm(0.0)).is_none());

    let carrying = DifficultyInputs {
        stolen_paintings: 1,
        elapsed: 20.0,
        ..DifficultyInputs::default()
    };
    assert!(tracker.recompute(carrying).is_none());
    assert!(tracker.recompute(calm(35.0)).is_none(), "calm window restarted at 35s");
    assert!(tracker.recompute(calm(64.0)).is_none());
    assert!(tracker.recompute(calm(65.0)).is_some());
}

#[test]
fn pursuit_pressure_raises_difficulty_at_step_cadence() {
    let mut tracker = DifficultyTracker::default();
    let swarm = |elapsed| DifficultyInputs {
        active_pursuits: 3,
        elapsed,
        ..DifficultyInputs::default()
    };

    assert!(tracker.recompute(swarm(1.0)).is_some());
    assert!(tracker.recompute(swarm(2.0)).is_none(), "step interval not elapsed");
    assert!(tracker.recompute(swarm(6.0)).is_some());
    assert!(tracker.recompute(swarm(11.0)).is_none(), "never above maximum");
    assert_eq!(tracker.difficulty(), DifficultyLevel::new(5));
}

#[test]
fn hard_reset_restores_initial_value_for_readers() {
    let mut tracker = DifficultyTracker::new(DifficultyConfig {
        initial: 2,
        ..DifficultyConfig::default()
    })
    .expect("valid config");
    let reader = tracker.reader();

    let evaded = DifficultyInputs {
        evasions: 1,
        elapsed: 1.0,
        ..DifficultyInputs::default()
    };
    let _ = tracker.recompute(evaded);
    assert_eq!(reader.get(), DifficultyLevel::new(3));

    tracker.hard_reset();
    assert_eq!(tracker.difficulty(), DifficultyLevel::new(2));
    assert_eq!(reader.get(), DifficultyLevel::new(2));

    // Smoothing memory is gone, so the same evasion total counts again.
    assert!(tracker.recompute(evaded).is_some());
}

#[derive(Clone, Debug)]
struct Frame {
    active_pursuits: u32,
    evasion_delta: u32,
    stolen_paintings: u32,
    dt: f32,
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    (0u32..6, 0u32..3, 0u32..3, 0.0f32..20.0).prop_map(
        |(active_pursuits, evasion_delta, stolen_paintings, dt)| Frame {
            active_pursuits,
            evasion_delta,
            stolen_paintings,
            dt,
        },
    )
}

proptest! {
    #[test]
    fn difficulty_stays_in_range_and_moves_one_step_at_most(
        frames in prop::collection::vec(frame_strategy(), 1..128)
    ) {
        let mut tracker = DifficultyTracker::default();
        let range = tracker.range();
        let mut elapsed = 0.0f32;
        let mut evasions = 0u32;

        for frame in frames {
            elapsed += frame.dt;
            evasions += frame.evasion_delta;
            let before = tracker.difficulty();
            let _ = tracker.recompute(DifficultyInputs {
                active_pursuits: frame.active_pursuits,
                evasions,
                stolen_paintings: frame.stolen_paintings,
                elapsed,
            });
            let after = tracker.difficulty();

            prop_assert!(range.contains(after));
            prop_assert!((after.get() - before.get()).abs() <= 1);
            prop_assert_eq!(tracker.reader().get(), after);
        }
    }

    #[test]
    fn hard_reset_is_idempotent(
        frames in prop::collection::vec(frame_strategy(), 0..32)
    ) {
        let mut once = DifficultyTracker::default();
        let mut twice = DifficultyTracker::default();
        let mut elapsed = 0.0f32;
        let mut evasions = 0u32;

        for frame in &frames {
            elapsed += frame.dt;
            evasions += frame.evasion_delta;
            let inputs = DifficultyInputs {
                active_pursuits: frame.active_pursuits,
                evasions,
                stolen_paintings: frame.stolen_paintings,
                elapsed,
            };
            let _ = once.recompute(inputs);
            let _ = twice.recompute(inputs);
        }

        once.hard_reset();
        twice.hard_reset();
        twice.hard_reset();

        prop_assert_eq!(once.difficulty(), twice.difficulty());
        prop_assert_eq!(once.difficulty(), once.initial());

        // Identical follow-up behaviour proves the smoothing memory matches too.
        for frame in &frames {
            let inputs = DifficultyInputs {
                active_pursuits: frame.active_pursuits,
                evasions: frame.evasion_delta,
                stolen_paintings: frame.stolen_paintings,
                elapsed: frame.dt,
            };
            prop_assert_eq!(once.recompute(inputs), twice.recompute(inputs));
        }
    }
}
