//! Per-frame simulation tick
//!
//! One display-synced frame: move every bottle, retire the ones that fell
//! out of the play area (misses), then test the rest against the box
//! (catches). Movement always finishes and reports its misses before
//! collision runs.

use super::collision::{PlayArea, check_all_collisions};
use super::scoring::MissOutcome;
use super::state::{Bottle, GameEvent, GameState};
use crate::consts::{OFFSCREEN_MARGIN, SLOW_MOTION_FACTOR};
use crate::tuning::Tuning;

/// Input for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Catching box center, percent of play-area width
    pub box_x: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self { box_x: 50.0 }
    }
}

/// Fall distance per frame for a level.
///
/// Units are pixels per tick at a nominal 60 Hz; the frame's real duration
/// is deliberately ignored.
pub fn fall_speed(tuning: &Tuning, level: usize, slow_motion: bool) -> f32 {
    let speed = tuning.bottle_speed(level);
    if slow_motion {
        speed * SLOW_MOTION_FACTOR
    } else {
        speed
    }
}

/// Advance every bottle by `speed` and remove those more than the margin
/// below the play area. `on_miss` runs once per removed bottle.
pub fn step_bottles(
    bottles: &mut Vec<Bottle>,
    speed: f32,
    area_height: f32,
    mut on_miss: impl FnMut(&Bottle),
) {
    // An unmeasured area counts as zero height
    let floor = area_height.max(0.0) + OFFSCREEN_MARGIN;
    for bottle in bottles.iter_mut() {
        bottle.y += speed;
    }
    bottles.retain(|bottle| {
        let off_screen = bottle.y > floor;
        if off_screen {
            on_miss(bottle);
        }
        !off_screen
    });
}

/// Advance the session by one frame. Does nothing outside `Playing`.
pub fn tick(state: &mut GameState, tuning: &Tuning, area: &PlayArea, input: &TickInput, now_ms: u64) {
    if !state.is_playing() {
        return;
    }

    // Movement pass
    let speed = fall_speed(tuning, state.level, state.power_ups.slow_motion);
    let mut missed = Vec::new();
    step_bottles(&mut state.bottles, speed, area.height, |b| missed.push(b.id()));

    for id in missed {
        state.emit(GameEvent::BottleMissed { id });
        if state.lose_life(now_ms) == MissOutcome::GameOver {
            break;
        }
    }

    // A miss may have ended the run; the remaining bottles are frozen
    if !state.is_playing() {
        return;
    }

    // Collision pass
    let mut caught = Vec::new();
    check_all_collisions(
        &mut state.bottles,
        input.box_x,
        state.power_ups.wider_box,
        &tuning.game,
        area,
        |b, perfect| caught.push((b.clone(), perfect)),
    );

    for (bottle, perfect) in caught {
        let points = if bottle.is_golden() {
            tuning.game.golden_bottle_points
        } else {
            tuning.game.points_per_bottle
        };
        // Announce the catch before any level-up or unlock it triggers
        state.emit(GameEvent::BottleCaught {
            id: bottle.id(),
            golden: bottle.is_golden(),
            perfect,
            points: state.catch_points(points, perfect, tuning),
        });
        state.add_score(points, bottle.is_golden(), perfect, tuning, now_ms);
    }
}
