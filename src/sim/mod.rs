//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (no wall-clock reads)
//! - Seeded RNG only
//! - Stable iteration order (bottles by id)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod scheduler;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, PlayArea, check_all_collisions, check_collision};
pub use scheduler::{Scheduler, TaskHandle};
pub use scoring::MissOutcome;
pub use spawner::{GoldenCadence, SpawnTask, Spawner, batch_size};
pub use state::{ActivePowerUps, Bottle, GameEvent, GamePhase, GameState, PowerUpKind};
pub use tick::{TickInput, fall_speed, step_bottles, tick};
