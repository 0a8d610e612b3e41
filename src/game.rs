//! Session driver
//!
//! Owns the simulation state together with everything time- and
//! storage-dependent around it: the virtual-clock scheduler, the spawner's
//! timers, power-up expiry, and the persistent store. Collaborators read
//! `state()` and `drain_events()`; only `Game` mutates.

use std::collections::HashMap;

use crate::achievements::UnlockedAchievements;
use crate::highscores::HighScores;
use crate::persistence::Storage;
use crate::platform;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameState, PlayArea, PowerUpKind, Scheduler, SpawnTask, Spawner, TaskHandle,
    TickInput, tick,
};
use crate::tuning::{LevelConfig, ModelInfo, Tuning};

/// Everything that can sit on the timer queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTask {
    Spawn(SpawnTask),
    PowerUpExpiry(PowerUpKind),
}

impl From<SpawnTask> for TimerTask {
    fn from(task: SpawnTask) -> Self {
        TimerTask::Spawn(task)
    }
}

/// Game instance holding all state
pub struct Game {
    tuning: Tuning,
    state: GameState,
    spawner: Spawner,
    scheduler: Scheduler<TimerTask>,
    play_area: PlayArea,
    storage: Box<dyn Storage>,
    high_scores: HighScores,
    settings: Settings,
    power_up_timers: HashMap<PowerUpKind, TaskHandle>,
    /// Frame loop running; frames are ignored while false
    loop_running: bool,
    /// Leaderboard rank of the last finished run
    last_rank: Option<usize>,
}

impl Game {
    /// Create a game at the menu. Stored data that fails to load is replaced
    /// by defaults.
    pub fn new(tuning: Tuning, storage: Box<dyn Storage>, seed: u64) -> Self {
        let high_scores = HighScores::load(storage.as_ref());
        let settings = Settings::load(storage.as_ref());
        let mut state = GameState::new(tuning.game.max_lives);
        state.unlocked = UnlockedAchievements::load(storage.as_ref());

        Self {
            tuning,
            state,
            spawner: Spawner::new(seed),
            scheduler: Scheduler::new(0),
            play_area: PlayArea::default(),
            storage,
            high_scores,
            settings,
            power_up_timers: HashMap::new(),
            loop_running: false,
            last_rank: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn play_area(&self) -> PlayArea {
        self.play_area
    }

    /// Update the measured play-area size (on layout or resize)
    pub fn set_play_area(&mut self, width: f32, height: f32) {
        self.play_area = PlayArea::new(width, height);
    }

    pub fn is_loop_running(&self) -> bool {
        self.loop_running
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_running()
    }

    /// Take pending notifications for the renderer/audio
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Whole seconds since the run started
    pub fn game_time_secs(&self) -> u64 {
        self.state.game_time_secs(self.now_ms())
    }

    /// Percent progress toward the next level
    pub fn progress(&self) -> f32 {
        self.state.progress(&self.tuning)
    }

    pub fn current_level(&self) -> Option<&LevelConfig> {
        self.tuning.level(self.state.level)
    }

    pub fn can_level_up(&self) -> bool {
        self.state.can_level_up(&self.tuning)
    }

    /// The selected model, if it is a known one
    pub fn current_model(&self) -> Option<&ModelInfo> {
        self.tuning.model(self.state.selected_model.as_deref()?)
    }

    /// Image of the selected model in the current level's outfit
    pub fn current_outfit(&self) -> Option<&str> {
        let model = self.state.selected_model.as_deref()?;
        self.tuning.outfit(model, self.state.level)
    }

    pub fn open_model_selection(&mut self) -> bool {
        self.state.open_model_selection()
    }

    /// Start a run with the chosen model at `now_ms`: resets the session,
    /// starts the spawner and the frame loop
    pub fn start(&mut self, model_id: &str, now_ms: u64) -> bool {
        self.advance(now_ms);
        if self.tuning.model(model_id).is_none() {
            log::warn!("Unknown model '{}', starting anyway", model_id);
        }
        let now = self.now_ms();
        if !self.state.start_game(model_id, now) {
            return false;
        }
        self.cancel_power_up_timers();
        self.spawner.start(&mut self.scheduler, self.state.level);
        self.loop_running = true;
        self.last_rank = None;
        true
    }

    pub fn pause(&mut self) -> bool {
        self.state.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.state.resume()
    }

    /// Stop the frame loop and every pending timer
    pub fn stop(&mut self) {
        self.spawner.stop(&mut self.scheduler);
        self.cancel_power_up_timers();
        self.loop_running = false;
    }

    /// Back to the menu
    pub fn reset(&mut self) {
        self.stop();
        self.state.reset();
    }

    /// Turn on a power-up for its configured duration. Re-activating restarts
    /// the duration instead of stacking.
    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        let duration = self.tuning.game.power_up(kind).duration_ms;
        if let Some(previous) = self.power_up_timers.remove(&kind) {
            self.scheduler.cancel(previous);
        }
        self.state.set_power_up(kind, true);
        let handle = self
            .scheduler
            .schedule(duration, TimerTask::PowerUpExpiry(kind));
        self.power_up_timers.insert(kind, handle);
        log::debug!("Power-up {:?} active for {}ms", kind, duration);
        true
    }

    /// Flip sound effects on/off and persist the choice
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = self.settings.toggle_sound();
        self.settings.save(self.storage.as_ref());
        enabled
    }

    /// Flip background music on/off and persist the choice
    pub fn toggle_music(&mut self) -> bool {
        let enabled = self.settings.toggle_music();
        self.settings.save(self.storage.as_ref());
        enabled
    }

    /// Fire every timer due up to `now_ms`, in order
    pub fn advance(&mut self, now_ms: u64) {
        while let Some((_, task)) = self.scheduler.pop_until(now_ms) {
            self.fire(task);
        }
    }

    /// One display frame: physics, misses, collisions, catches
    pub fn frame(&mut self, input: &TickInput) {
        if !self.loop_running {
            return;
        }
        let first_new = self.state.events.len();
        tick(
            &mut self.state,
            &self.tuning,
            &self.play_area,
            input,
            self.scheduler.now_ms(),
        );
        self.persist_outcomes(first_new);
    }

    /// Advance timers to `now_ms`, then run one frame
    pub fn update(&mut self, now_ms: u64, input: &TickInput) {
        self.advance(now_ms);
        self.frame(input);
    }

    fn fire(&mut self, task: TimerTask) {
        let phase = self.state.phase;
        let level = self.state.level;
        match task {
            TimerTask::Spawn(SpawnTask::Batch) => {
                let state = &mut self.state;
                self.spawner.on_batch(
                    &mut self.scheduler,
                    phase,
                    level,
                    &self.tuning,
                    |bottle| state.add_bottle(bottle),
                );
            }
            TimerTask::Spawn(SpawnTask::Staggered { x }) => {
                let state = &mut self.state;
                self.spawner
                    .on_staggered(x, phase, level, |bottle| state.add_bottle(bottle));
            }
            TimerTask::PowerUpExpiry(kind) => {
                self.power_up_timers.remove(&kind);
                self.state.set_power_up(kind, false);
                log::debug!("Power-up {:?} expired", kind);
            }
        }
    }

    /// Write through anything the last frame produced that must outlive it
    fn persist_outcomes(&mut self, first_new: usize) {
        let mut record = None;
        let mut unlocked = false;
        for event in &self.state.events[first_new..] {
            match event {
                GameEvent::GameOver { record: r } => record = Some(r.clone()),
                GameEvent::AchievementUnlocked { .. } => unlocked = true,
                _ => {}
            }
        }

        if unlocked {
            self.state.unlocked.save(self.storage.as_ref());
        }

        if let Some(mut record) = record {
            // The simulation clock is virtual; the leaderboard wants wall time
            record.timestamp = platform::now_ms();
            self.last_rank = self.high_scores.record(record);
            self.high_scores.save(self.storage.as_ref());
            if let Some(rank) = self.last_rank {
                log::info!("Run placed #{} on the leaderboard", rank);
            }
            self.stop();
        }
    }

    fn cancel_power_up_timers(&mut self) {
        for (_, handle) in self.power_up_timers.drain() {
            self.scheduler.cancel(handle);
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("now_ms", &self.scheduler.now_ms())
            .field("loop_running", &self.loop_running)
            .finish()
    }
}
