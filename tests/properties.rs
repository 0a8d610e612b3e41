//! Property tests for scoring, progression, collision and spawning

use bottle_catch::Tuning;
use bottle_catch::sim::{
    Bottle, GamePhase, GameState, MissOutcome, PlayArea, PowerUpKind, Scheduler, SpawnTask,
    Spawner, check_collision,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Catch { golden: bool, perfect: bool },
    Miss,
    Shield,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (any::<bool>(), any::<bool>())
            .prop_map(|(golden, perfect)| Op::Catch { golden, perfect }),
        2 => Just(Op::Miss),
        1 => Just(Op::Shield),
    ]
}

fn playing(tuning: &Tuning) -> GameState {
    let mut state = GameState::new(tuning.game.max_lives);
    assert!(state.open_model_selection());
    assert!(state.start_game("model1", 0));
    state
}

proptest! {
    #[test]
    fn session_invariants_hold(ops in prop::collection::vec(op(), 1..300)) {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut game_overs = 0;

        for (step, op) in ops.into_iter().enumerate() {
            let now = step as u64 * 100;
            let before = state.clone();
            match op {
                Op::Catch { golden, perfect } => {
                    let base = if golden {
                        tuning.game.golden_bottle_points
                    } else {
                        tuning.game.points_per_bottle
                    };
                    let added = state.add_score(base, golden, perfect, &tuning, now);
                    if before.phase == GamePhase::Playing {
                        let mut expected = base;
                        if before.combo >= tuning.game.combo_threshold {
                            expected *= tuning.game.combo_multiplier;
                        }
                        if perfect {
                            expected += tuning.game.perfect_catch_bonus;
                        }
                        prop_assert_eq!(added, expected);
                        prop_assert_eq!(state.score, before.score + added);
                        prop_assert_eq!(state.combo, before.combo + 1);
                        prop_assert!(state.level <= before.level + 1);
                    } else {
                        prop_assert_eq!(added, 0);
                        prop_assert_eq!(state.score, before.score);
                    }
                }
                Op::Miss => {
                    let outcome = state.lose_life(now);
                    match outcome {
                        MissOutcome::Absorbed => {
                            prop_assert_eq!(state.lives, before.lives);
                            prop_assert_eq!(state.combo, before.combo);
                            prop_assert!(!state.power_ups.shield);
                        }
                        MissOutcome::LifeLost | MissOutcome::GameOver => {
                            prop_assert_eq!(state.lives, before.lives - 1);
                            prop_assert_eq!(state.combo, 0);
                        }
                        MissOutcome::Ignored => {
                            prop_assert_eq!(before.phase, GamePhase::GameOver);
                        }
                    }
                    if outcome == MissOutcome::GameOver {
                        game_overs += 1;
                        prop_assert_eq!(state.lives, 0);
                    }
                }
                Op::Shield => state.set_power_up(PowerUpKind::Shield, true),
            }

            prop_assert!(state.score >= before.score);
            prop_assert!(state.lives <= before.lives);
            prop_assert!(state.max_combo >= state.combo);
            prop_assert!(state.level <= tuning.final_level_index());
        }
        prop_assert!(game_overs <= 1);
    }

    #[test]
    fn perfect_iff_close_to_center(
        bottle_x in 0.0f32..100.0,
        box_x in 0.0f32..100.0,
        y in 600.0f32..760.0,
        wider in any::<bool>(),
    ) {
        let tuning = Tuning::default();
        let area = PlayArea::new(1000.0, 800.0);
        let bottle = Bottle::new(0, bottle_x, y, false);
        let result = check_collision(&bottle, box_x, wider, &tuning.game, &area);

        let width = if wider { 225.0 } else { 150.0 };
        let distance = ((bottle_x - box_x) * 10.0).abs();
        // Stay clear of float rounding at the exact boundaries
        prop_assume!((distance - width / 4.0).abs() > 0.01);
        prop_assume!((distance - (width / 2.0 + 15.5)).abs() > 0.01);

        prop_assert_eq!(result.hit, distance < width / 2.0 + 15.5);
        prop_assert_eq!(result.perfect, result.hit && distance < width / 4.0);
    }

    #[test]
    fn spawner_is_silent_unless_playing(
        seed in any::<u64>(),
        level in 0usize..6,
        horizon in 0u64..60_000,
        phase in prop_oneof![
            Just(GamePhase::Menu),
            Just(GamePhase::ModelSelection),
            Just(GamePhase::Paused),
            Just(GamePhase::GameOver),
        ],
    ) {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(seed);
        let mut scheduler: Scheduler<SpawnTask> = Scheduler::new(0);
        spawner.start(&mut scheduler, level);

        let mut spawned = 0;
        while let Some((_, task)) = scheduler.pop_until(horizon) {
            match task {
                SpawnTask::Batch => {
                    spawner.on_batch(&mut scheduler, phase, level, &tuning, |_| spawned += 1)
                }
                SpawnTask::Staggered { x } => {
                    spawner.on_staggered(x, phase, level, |_| spawned += 1)
                }
            }
        }
        prop_assert_eq!(spawned, 0);
    }

    #[test]
    fn batch_positions_stay_in_range(seed in any::<u64>(), count in 1usize..4) {
        let mut spawner = Spawner::new(seed);
        let xs = spawner.batch_positions(count);
        prop_assert_eq!(xs.len(), count);
        for x in xs {
            prop_assert!((5.0..=70.0).contains(&x));
        }
    }
}
