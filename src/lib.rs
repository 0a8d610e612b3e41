//! Bottle Catch - a falling-bottle arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, scoring)
//! - `game`: Session driver wiring the simulation to timers and storage
//! - `tuning`: Data-driven game balance (levels, achievements, models)
//! - `persistence`: Storage backends for high scores, achievements and settings
//! - `audio`: Event-driven sound cue collaborator
//! - `platform`: Browser/native platform abstraction

pub mod achievements;
pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use achievements::UnlockedAchievements;
pub use error::{AudioError, StoreError, TuningError};
pub use game::Game;
pub use highscores::{HighScoreEntry, HighScores};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Conceptual display refresh rate the per-tick speeds are tuned for
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Virtual milliseconds per display tick (rounded)
    pub const TICK_MS: u64 = 1000 / TICKS_PER_SECOND as u64;

    /// Spawn interval used when no level data is available
    pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 1500;
    /// Fall speed used when the level table is empty
    pub const DEFAULT_BOTTLE_SPEED: f32 = 2.0;
    /// Delay before the first spawn batch after the spawner starts
    pub const FIRST_SPAWN_DELAY_MS: u64 = 1000;
    /// Delay between bottles of one spawn batch
    pub const BATCH_STAGGER_MS: u64 = 500;
    /// Levels from this index on spawn larger batches
    pub const LARGE_BATCH_LEVEL: usize = 4;
    pub const SMALL_BATCH_SIZE: usize = 2;
    pub const LARGE_BATCH_SIZE: usize = 3;

    /// Horizontal spawn range (percent of play-area width)
    pub const SPAWN_X_MIN: f32 = 5.0;
    pub const SPAWN_X_MAX: f32 = 70.0;
    /// Minimum horizontal distance between bottles of one batch (percent)
    pub const MIN_BATCH_SPACING: f32 = 15.0;
    /// Rejected candidates before a position is accepted regardless of spacing
    pub const MAX_PLACEMENT_RETRIES: u32 = 10;
    /// Vertical position bottles spawn at (above the visible area)
    pub const SPAWN_Y: f32 = -100.0;

    /// Golden bottle appears once per level, on a bottle ordinal in [MIN, MAX)
    pub const GOLDEN_TARGET_MIN: u32 = 15;
    pub const GOLDEN_TARGET_MAX: u32 = 25;

    /// Bottles are retired once they fall this far below the play area
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Slow motion halves fall speed
    pub const SLOW_MOTION_FACTOR: f32 = 0.5;
    /// Wider box power-up multiplies the box width
    pub const WIDE_BOX_FACTOR: f32 = 1.5;

    /// Catching box vertical band, measured up from the bottom of the play area
    pub const BOX_TOP_OFFSET: f32 = 140.0;
    pub const BOX_BOTTOM_OFFSET: f32 = 40.0;
}
