//! Audio system
//!
//! Sound is a collaborator of the core, not part of it: `AudioManager` turns
//! `GameEvent`s into cues and hands them to an `AudioBackend`. Backend
//! failures never reach the game; they are logged and dropped.

use std::collections::HashSet;

use crate::error::AudioError;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Regular bottle caught
    Catch,
    /// Golden bottle caught
    Golden,
    /// Bottle fell past the box
    Miss,
    /// New level reached
    LevelUp,
    /// Power-up activated
    PowerUp,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 6] = [
        SoundEffect::Catch,
        SoundEffect::Golden,
        SoundEffect::Miss,
        SoundEffect::LevelUp,
        SoundEffect::PowerUp,
        SoundEffect::GameOver,
    ];

    /// Asset name for the cue
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Catch => "catch",
            SoundEffect::Golden => "golden",
            SoundEffect::Miss => "miss",
            SoundEffect::LevelUp => "levelup",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::GameOver => "gameover",
        }
    }
}

/// Cue for a core event, if it has one
pub fn cue_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::BottleCaught { golden: true, .. } => Some(SoundEffect::Golden),
        GameEvent::BottleCaught { .. } => Some(SoundEffect::Catch),
        GameEvent::BottleMissed { .. } => Some(SoundEffect::Miss),
        GameEvent::LevelChanged { .. } => Some(SoundEffect::LevelUp),
        GameEvent::PowerUpActivated { .. } => Some(SoundEffect::PowerUp),
        GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        _ => None,
    }
}

/// Whatever actually makes noise
pub trait AudioBackend {
    /// Prepare a cue for playback
    fn load(&mut self, effect: SoundEffect) -> Result<(), AudioError>;

    /// Play a loaded cue once at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;

    /// Start or stop the looped background track
    fn set_music_playing(&mut self, playing: bool, volume: f32) -> Result<(), AudioError>;

    /// Free everything `load` acquired
    fn release(&mut self);
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    settings: Settings,
    loaded: HashSet<SoundEffect>,
    initialized: bool,
    /// Music should be audible (a run is in progress)
    music_wanted: bool,
    music_playing: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, settings: Settings) -> Self {
        Self {
            backend,
            settings,
            loaded: HashSet::new(),
            initialized: false,
            music_wanted: false,
            music_playing: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    /// Preload every cue. Calling again only retries cues that failed.
    pub fn init(&mut self) {
        for effect in SoundEffect::ALL {
            if self.loaded.contains(&effect) {
                continue;
            }
            match self.backend.load(effect) {
                Ok(()) => {
                    self.loaded.insert(effect);
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        self.initialized = true;
        log::debug!("Audio ready ({} cues)", self.loaded.len());
    }

    /// Stop music and release every loaded cue
    pub fn teardown(&mut self) {
        if !self.initialized {
            return;
        }
        self.apply_music(false);
        self.backend.release();
        self.loaded.clear();
        self.initialized = false;
    }

    /// Swap in new preferences, starting or stopping music to match
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.sync_music();
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.settings.effective_sfx_volume();
        if vol <= 0.0 {
            return;
        }
        if !self.loaded.contains(&effect) {
            log::warn!("{} ({})", AudioError::NotInitialized, effect.name());
            return;
        }
        if let Err(e) = self.backend.play(effect, vol) {
            log::warn!("{}", e);
        }
    }

    /// React to one core event
    pub fn handle_event(&mut self, event: &GameEvent) {
        if let Some(effect) = cue_for(event) {
            self.play(effect);
        }
        if let GameEvent::PhaseChanged { to, .. } = event {
            self.music_wanted = *to == GamePhase::Playing;
            self.sync_music();
        }
    }

    fn sync_music(&mut self) {
        let audible = self.initialized && self.music_wanted && self.settings.music_enabled;
        self.apply_music(audible);
    }

    fn apply_music(&mut self, playing: bool) {
        if playing == self.music_playing {
            return;
        }
        let volume = self.settings.effective_music_volume();
        match self.backend.set_music_playing(playing, volume) {
            Ok(()) => self.music_playing = playing,
            Err(e) => log::warn!("{}", e),
        }
    }
}

/// Headless backend that logs every cue
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn load(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        log::trace!("load {}", effect.name());
        Ok(())
    }

    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        log::debug!("♪ {} ({:.2})", effect.name(), volume);
        Ok(())
    }

    fn set_music_playing(&mut self, playing: bool, volume: f32) -> Result<(), AudioError> {
        if playing {
            log::debug!("♪ music on ({:.2})", volume);
        } else {
            log::debug!("♪ music off");
        }
        Ok(())
    }

    fn release(&mut self) {}
}
