//! Progression and scoring state machine
//!
//! ```text
//! Menu -> ModelSelection -> Playing <-> Paused
//!                           Playing -> GameOver -> Menu (reset)
//! ```
//!
//! Catches raise score, combo and possibly level; misses cost a life unless
//! a shield absorbs them. Lives reaching zero ends the run exactly once.

use super::state::{GameEvent, GamePhase, GameState, PowerUpKind};
use crate::achievements::AchievementProgress;
use crate::highscores::HighScoreEntry;
use crate::tuning::Tuning;

/// What a miss did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissOutcome {
    /// Shield consumed, nothing else changed
    Absorbed,
    /// A life was lost, combo reset
    LifeLost,
    /// The last life was lost
    GameOver,
    /// Not playing; nothing happened
    Ignored,
}

impl GameState {
    /// Menu -> ModelSelection
    pub fn open_model_selection(&mut self) -> bool {
        if self.phase != GamePhase::Menu {
            log::warn!("Model selection requested from {:?}", self.phase);
            return false;
        }
        self.set_phase(GamePhase::ModelSelection);
        true
    }

    /// ModelSelection -> Playing, resetting every per-run field
    pub fn start_game(&mut self, model_id: &str, now_ms: u64) -> bool {
        if self.phase != GamePhase::ModelSelection {
            log::warn!("Start requested from {:?}", self.phase);
            return false;
        }
        self.reset_run();
        self.selected_model = Some(model_id.to_string());
        self.started_at_ms = Some(now_ms);
        self.set_phase(GamePhase::Playing);
        log::info!("Game started with model {}", model_id);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Playing);
        true
    }

    /// Back to the menu from anywhere, clearing the run
    pub fn reset(&mut self) {
        self.reset_run();
        self.selected_model = None;
        self.set_phase(GamePhase::Menu);
    }

    /// Points for one catch before it is applied.
    ///
    /// The multiplier looks at the combo *before* this catch is counted, so
    /// with a threshold of 5 the sixth consecutive catch is the first doubled.
    pub fn catch_points(&self, base: u64, perfect: bool, tuning: &Tuning) -> u64 {
        let cfg = &tuning.game;
        let mut total = base;
        if self.combo >= cfg.combo_threshold {
            total *= cfg.combo_multiplier;
        }
        if perfect {
            total += cfg.perfect_catch_bonus;
        }
        total
    }

    /// Apply a catch. Returns the points actually added.
    pub fn add_score(
        &mut self,
        points: u64,
        golden: bool,
        perfect: bool,
        tuning: &Tuning,
        now_ms: u64,
    ) -> u64 {
        if !self.is_playing() {
            return 0;
        }

        let total = self.catch_points(points, perfect, tuning);
        if perfect {
            self.perfect_catches += 1;
        }

        self.score += total;
        self.bottles_collected += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        if golden {
            self.golden_collected += 1;
        }

        if self.can_level_up(tuning) {
            self.level_up(tuning);
        }
        self.check_achievements(tuning, now_ms);
        total
    }

    /// Apply a miss
    pub fn lose_life(&mut self, now_ms: u64) -> MissOutcome {
        if !self.is_playing() {
            return MissOutcome::Ignored;
        }

        if self.power_ups.shield {
            self.power_ups.shield = false;
            self.emit(GameEvent::ShieldConsumed);
            return MissOutcome::Absorbed;
        }

        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.emit(GameEvent::LifeLost { lives: self.lives });

        if self.lives == 0 {
            self.end_game(now_ms);
            return MissOutcome::GameOver;
        }
        MissOutcome::LifeLost
    }

    /// Score has reached the next level's threshold
    pub fn can_level_up(&self, tuning: &Tuning) -> bool {
        tuning
            .level(self.level + 1)
            .is_some_and(|next| self.score >= next.score_required)
    }

    /// Advance exactly one level (never past the last)
    pub fn level_up(&mut self, tuning: &Tuning) -> bool {
        if self.level >= tuning.final_level_index() {
            return false;
        }
        self.level += 1;
        log::info!("Level up! Now level {}", self.level + 1);
        self.emit(GameEvent::LevelChanged { level: self.level });
        true
    }

    /// Percent progress toward the next level threshold (100 at the last level)
    pub fn progress(&self, tuning: &Tuning) -> f32 {
        let (Some(current), Some(next)) = (tuning.level(self.level), tuning.level(self.level + 1))
        else {
            return 100.0;
        };
        let in_level = self.score.saturating_sub(current.score_required) as f32;
        let needed = next.score_required.saturating_sub(current.score_required) as f32;
        if needed <= 0.0 {
            return 100.0;
        }
        (in_level / needed * 100.0).min(100.0)
    }

    /// Whole seconds since the run started
    pub fn game_time_secs(&self, now_ms: u64) -> u64 {
        self.started_at_ms
            .map(|start| now_ms.saturating_sub(start) / 1000)
            .unwrap_or(0)
    }

    /// Turn a power-up flag on or off, emitting the matching event
    pub fn set_power_up(&mut self, kind: PowerUpKind, active: bool) {
        if self.power_ups.is_active(kind) == active {
            return;
        }
        self.power_ups.set(kind, active);
        self.emit(if active {
            GameEvent::PowerUpActivated { kind }
        } else {
            GameEvent::PowerUpExpired { kind }
        });
    }

    fn achievement_progress(&self, tuning: &Tuning, now_ms: u64) -> AchievementProgress {
        AchievementProgress {
            bottles_collected: self.bottles_collected,
            golden_collected: self.golden_collected,
            combo: self.combo,
            score: self.score,
            lives: self.lives,
            max_lives: self.max_lives(),
            level: self.level,
            final_level: tuning.levels.len().checked_sub(1),
            elapsed_secs: self.game_time_secs(now_ms),
        }
    }

    /// Unlock every achievement newly satisfied. Returns the new ids.
    pub fn check_achievements(&mut self, tuning: &Tuning, now_ms: u64) -> Vec<u32> {
        let progress = self.achievement_progress(tuning, now_ms);
        let newly = self.unlocked.evaluate(&tuning.achievements, &progress);
        for &id in &newly {
            self.emit(GameEvent::AchievementUnlocked { id });
        }
        newly
    }

    /// Playing -> GameOver, freezing the run into a score record
    pub fn end_game(&mut self, now_ms: u64) -> Option<HighScoreEntry> {
        if self.phase == GamePhase::GameOver {
            return None;
        }
        let record = HighScoreEntry {
            score: self.score,
            level: self.level as u32 + 1,
            time_secs: self.game_time_secs(now_ms),
            timestamp: now_ms as f64,
            model: self.selected_model.clone(),
        };
        self.set_phase(GamePhase::GameOver);
        log::info!(
            "Game over: score {} at level {} after {}s",
            record.score,
            record.level,
            record.time_secs
        );
        self.emit(GameEvent::GameOver {
            record: record.clone(),
        });
        Some(record)
    }
}
