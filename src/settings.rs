//! Player preferences
//!
//! Persisted separately from the leaderboard through the storage backend.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, load_json, save_json, storage_key};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sound effects on/off
    pub sound_enabled: bool,
    /// Background music on/off
    pub music_enabled: bool,

    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            master_volume: 1.0,
            sfx_volume: 0.5,
            music_volume: 0.3,
        }
    }
}

impl Settings {
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music_enabled = !self.music_enabled;
        self.music_enabled
    }

    /// Effective volume for sound effects (0 when disabled)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_enabled {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Effective volume for background music (0 when disabled)
    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Storage key suffix
    const STORAGE_KEY: &'static str = "settings";

    /// Load settings, using defaults when missing or unreadable
    pub fn load(storage: &dyn Storage) -> Self {
        load_json(storage, &storage_key(Self::STORAGE_KEY))
    }

    pub fn save(&self, storage: &dyn Storage) -> bool {
        let saved = save_json(storage, &storage_key(Self::STORAGE_KEY), self);
        if saved {
            log::info!("Settings saved");
        }
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_toggles_mute_volumes() {
        let mut settings = Settings::default();
        assert!(settings.effective_sfx_volume() > 0.0);

        assert!(!settings.toggle_sound());
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert!(settings.effective_music_volume() > 0.0);

        assert!(!settings.toggle_music());
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set_item("bottle_catch_settings", r#"{"sound_enabled":false}"#)
            .unwrap();
        let settings = Settings::load(&storage);
        assert!(!settings.sound_enabled);
        assert!(settings.music_enabled);
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut settings = Settings::default();
        settings.toggle_music();
        assert!(settings.save(&storage));
        assert_eq!(Settings::load(&storage), settings);
    }
}
