//! Game state and core simulation types

use serde::{Deserialize, Serialize};

use crate::achievements::UnlockedAchievements;
use crate::highscores::HighScoreEntry;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    #[default]
    Menu,
    /// Picking a model before the run starts
    ModelSelection,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended, stats frozen
    GameOver,
}

/// A falling bottle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottle {
    id: u32,
    /// Horizontal center, percent of play-area width
    pub x: f32,
    /// Top edge in pixels, negative above the play area
    pub y: f32,
    golden: bool,
}

impl Bottle {
    pub fn new(id: u32, x: f32, y: f32, golden: bool) -> Self {
        Self { id, x, y, golden }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Fixed at creation
    pub fn is_golden(&self) -> bool {
        self.golden
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Halves fall speed
    SlowMotion,
    /// Box is 1.5x wider
    WiderBox,
    /// Absorbs one miss
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::SlowMotion,
        PowerUpKind::WiderBox,
        PowerUpKind::Shield,
    ];
}

/// Active power-up effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUps {
    pub slow_motion: bool,
    pub wider_box: bool,
    pub shield: bool,
}

impl ActivePowerUps {
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::WiderBox => self.wider_box,
            PowerUpKind::Shield => self.shield,
        }
    }

    pub fn set(&mut self, kind: PowerUpKind, active: bool) {
        match kind {
            PowerUpKind::SlowMotion => self.slow_motion = active,
            PowerUpKind::WiderBox => self.wider_box = active,
            PowerUpKind::Shield => self.shield = active,
        }
    }
}

/// Notifications for the renderer, audio and other collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BottleSpawned { id: u32, x: f32, golden: bool },
    BottleCaught { id: u32, golden: bool, perfect: bool, points: u64 },
    BottleMissed { id: u32 },
    /// A miss was absorbed by the shield
    ShieldConsumed,
    LifeLost { lives: u32 },
    LevelChanged { level: usize },
    PowerUpActivated { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    AchievementUnlocked { id: u32 },
    PhaseChanged { from: GamePhase, to: GamePhase },
    GameOver { record: HighScoreEntry },
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// Current level index (0-based)
    pub level: usize,
    /// Combo streak
    pub combo: u32,
    pub max_combo: u32,
    pub perfect_catches: u32,
    pub bottles_collected: u32,
    pub golden_collected: u32,
    pub power_ups: ActivePowerUps,
    pub selected_model: Option<String>,
    /// Virtual clock time the run started
    pub started_at_ms: Option<u64>,
    /// Persistent across sessions, loaded from the store
    pub unlocked: UnlockedAchievements,
    /// Active bottles (sorted by id)
    pub bottles: Vec<Bottle>,
    /// Pending notifications, drained by the owner
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    max_lives: u32,
}

impl GameState {
    pub fn new(max_lives: u32) -> Self {
        Self {
            phase: GamePhase::Menu,
            score: 0,
            lives: max_lives,
            level: 0,
            combo: 0,
            max_combo: 0,
            perfect_catches: 0,
            bottles_collected: 0,
            golden_collected: 0,
            power_ups: ActivePowerUps::default(),
            selected_model: None,
            started_at_ms: None,
            unlocked: UnlockedAchievements::new(),
            bottles: Vec::new(),
            events: Vec::new(),
            max_lives,
        }
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Queue a notification for collaborators
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Change phase, emitting a notification when it actually changes
    pub(crate) fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from != to {
            self.phase = to;
            self.emit(GameEvent::PhaseChanged { from, to });
        }
    }

    /// Add a freshly spawned bottle to the active set
    pub fn add_bottle(&mut self, bottle: Bottle) {
        self.emit(GameEvent::BottleSpawned {
            id: bottle.id(),
            x: bottle.x,
            golden: bottle.is_golden(),
        });
        self.bottles.push(bottle);
    }

    /// Reset every per-run field; unlocked achievements survive
    pub(crate) fn reset_run(&mut self) {
        self.score = 0;
        self.lives = self.max_lives;
        self.level = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.perfect_catches = 0;
        self.bottles_collected = 0;
        self.golden_collected = 0;
        self.power_ups = ActivePowerUps::default();
        self.started_at_ms = None;
        self.bottles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_up_flags() {
        let mut p = ActivePowerUps::default();
        for kind in PowerUpKind::ALL {
            assert!(!p.is_active(kind));
            p.set(kind, true);
            assert!(p.is_active(kind));
        }
        p.set(PowerUpKind::WiderBox, false);
        assert!(p.slow_motion && !p.wider_box && p.shield);
    }

    #[test]
    fn test_phase_change_emits_once() {
        let mut state = GameState::new(3);
        state.set_phase(GamePhase::ModelSelection);
        state.set_phase(GamePhase::ModelSelection);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Menu,
                to: GamePhase::ModelSelection
            }]
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_add_bottle_emits_spawn() {
        let mut state = GameState::new(3);
        state.add_bottle(Bottle::new(7, 40.0, -100.0, true));
        assert_eq!(state.bottles.len(), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::BottleSpawned {
                id: 7,
                x: 40.0,
                golden: true
            }]
        );
    }
}
