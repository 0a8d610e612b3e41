//! Data-driven game balance
//!
//! Level thresholds, scoring constants, achievements and selectable models.
//! These are inputs to the simulation, never mutated by it. `Tuning::default()`
//! carries the shipped tables; `Tuning::from_json` loads an override.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::achievements::{Achievement, Requirement};
use crate::consts::{DEFAULT_BOTTLE_SPEED, DEFAULT_SPAWN_INTERVAL_MS};
use crate::error::TuningError;
use crate::sim::PowerUpKind;

/// Per power-up duration and drop chance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpConfig {
    pub duration_ms: u64,
    pub spawn_chance: f32,
}

/// Scoring and geometry constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub max_lives: u32,
    pub points_per_bottle: u64,
    pub golden_bottle_points: u64,
    pub perfect_catch_bonus: u64,
    pub combo_multiplier: u64,
    /// Combo streak (before the current catch) at which the multiplier applies
    pub combo_threshold: u32,

    pub slow_motion: PowerUpConfig,
    pub wider_box: PowerUpConfig,
    pub shield: PowerUpConfig,

    /// Bottle sprite size in pixels
    pub bottle_width: f32,
    pub bottle_height: f32,
    /// Catching box size in pixels (before power-ups)
    pub box_width: f32,
    pub box_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            points_per_bottle: 100,
            golden_bottle_points: 500,
            perfect_catch_bonus: 50,
            combo_multiplier: 2,
            combo_threshold: 5,
            slow_motion: PowerUpConfig {
                duration_ms: 5000,
                spawn_chance: 0.05,
            },
            wider_box: PowerUpConfig {
                duration_ms: 8000,
                spawn_chance: 0.04,
            },
            shield: PowerUpConfig {
                duration_ms: 10000,
                spawn_chance: 0.03,
            },
            bottle_width: 31.0,
            bottle_height: 61.0,
            box_width: 150.0,
            box_height: 100.0,
        }
    }
}

impl GameConfig {
    pub fn power_up(&self, kind: PowerUpKind) -> PowerUpConfig {
        match kind {
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::WiderBox => self.wider_box,
            PowerUpKind::Shield => self.shield,
        }
    }
}

/// One entry of the difficulty curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Display ordinal (1-based)
    pub level: u32,
    /// Score needed to enter this level
    pub score_required: u64,
    /// Fall speed in pixels per tick
    pub bottle_speed: f32,
    pub spawn_interval_ms: u64,
    // Cosmetic, passed through to the UI
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub outfit: String,
    #[serde(default)]
    pub compliment: String,
}

/// A selectable character shown next to the play area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Portrait shown on the selection screen
    #[serde(default)]
    pub avatar: String,
    /// Level outfit key (`LevelConfig::outfit`) to image path
    #[serde(default)]
    pub outfits: HashMap<String, String>,
}

impl ModelInfo {
    /// Image for a level outfit key, if this model has one
    pub fn outfit(&self, key: &str) -> Option<&str> {
        self.outfits.get(key).map(String::as_str)
    }
}

/// Complete static configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub game: GameConfig,
    pub levels: Vec<LevelConfig>,
    pub achievements: Vec<Achievement>,
    pub models: Vec<ModelInfo>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            levels: default_levels(),
            achievements: default_achievements(),
            models: default_models(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Thresholds must be strictly increasing by index
    pub fn validate(&self) -> Result<(), TuningError> {
        for (index, pair) in self.levels.windows(2).enumerate() {
            if pair[1].score_required <= pair[0].score_required {
                return Err(TuningError::ThresholdOrder {
                    index: index + 1,
                    threshold: pair[1].score_required,
                    previous: pair[0].score_required,
                });
            }
        }
        Ok(())
    }

    pub fn level(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    /// Index of the last configured level (0 if the table is empty)
    pub fn final_level_index(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Spawn cadence for a level, 1500 ms when the level is not configured
    pub fn spawn_interval_ms(&self, index: usize) -> u64 {
        self.level(index)
            .map(|l| l.spawn_interval_ms)
            .unwrap_or(DEFAULT_SPAWN_INTERVAL_MS)
    }

    /// Fall speed for a level, clamped to the last configured level
    pub fn bottle_speed(&self, index: usize) -> f32 {
        self.level(index)
            .or_else(|| self.levels.last())
            .map(|l| l.bottle_speed)
            .unwrap_or(DEFAULT_BOTTLE_SPEED)
    }

    pub fn model(&self, id: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Outfit image a model wears at a level index
    pub fn outfit(&self, model_id: &str, level: usize) -> Option<&str> {
        let key = &self.level(level)?.outfit;
        self.model(model_id)?.outfit(key)
    }
}

fn level(
    level: u32,
    score_required: u64,
    bottle_speed: f32,
    spawn_interval_ms: u64,
    message: &str,
    outfit: &str,
    compliment: &str,
) -> LevelConfig {
    LevelConfig {
        level,
        score_required,
        bottle_speed,
        spawn_interval_ms,
        message: message.to_string(),
        outfit: outfit.to_string(),
        compliment: compliment.to_string(),
    }
}

fn default_levels() -> Vec<LevelConfig> {
    vec![
        level(1, 0, 2.0, 1500, "Hello! Let's get started", "formal", "Nice start!"),
        level(2, 3750, 3.5, 1200, "You're doing great! Keep going!", "sport", "Awesome!"),
        level(3, 9000, 5.0, 1000, "Wow, you're really fast!", "casual", "Super!"),
        level(4, 18000, 7.0, 800, "Didn't expect this much!", "elegant", "Magnificent!"),
        level(5, 30000, 9.5, 650, "Incredible! Finish it!", "party", "Legendary!"),
        level(6, 45000, 12.0, 500, "LEGEND! You're a champion!", "swimwear", "LEGEND!"),
    ]
}

fn default_achievements() -> Vec<Achievement> {
    let a = |id, name: &str, description: &str, requirement| Achievement {
        id,
        name: name.to_string(),
        description: description.to_string(),
        requirement,
    };
    vec![
        a(1, "First Steps", "Collect 10 bottles", Requirement::BottlesCollected(10)),
        a(
            2,
            "Speed Demon",
            "Reach level 5 within 3 minutes",
            Requirement::SpeedRun { seconds: 180 },
        ),
        a(
            3,
            "Perfectionist",
            "Score 1000 points without missing a bottle",
            Requirement::PerfectScore(1000),
        ),
        a(4, "Golden Hunter", "Catch 10 golden bottles", Requirement::GoldenBottles(10)),
        a(5, "Combo Master", "10 catches in a row", Requirement::Combo(10)),
        a(6, "Champion", "Reach the final level", Requirement::CompleteGame),
    ]
}

fn default_models() -> Vec<ModelInfo> {
    let m = |id: &str, name: &str, description: &str| ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        avatar: format!("/models/{id}/avatar.jpg"),
        outfits: ["formal", "sport", "casual", "elegant", "party", "swimwear"]
            .into_iter()
            .map(|key| (key.to_string(), format!("/models/{id}/{key}.jpg")))
            .collect(),
    };
    vec![
        m("model1", "Emma", "Young designer new to the fashion world"),
        m("model2", "Sofia", "World famous supermodel"),
        m("model3", "Ayse", "Social media influencer"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.levels.len(), 6);
        assert_eq!(tuning.final_level_index(), 5);
        assert_eq!(tuning.achievements.len(), 6);
    }

    #[test]
    fn test_spawn_interval_fallback() {
        let tuning = Tuning::default();
        assert_eq!(tuning.spawn_interval_ms(0), 1500);
        assert_eq!(tuning.spawn_interval_ms(5), 500);
        assert_eq!(tuning.spawn_interval_ms(42), 1500);
    }

    #[test]
    fn test_speed_clamps_to_last_level() {
        let mut tuning = Tuning::default();
        assert_eq!(tuning.bottle_speed(1), 3.5);
        assert_eq!(tuning.bottle_speed(99), 12.0);

        tuning.levels.clear();
        assert_eq!(tuning.bottle_speed(0), DEFAULT_BOTTLE_SPEED);
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.levels, Tuning::default().levels);

        let mut broken = Tuning::default();
        broken.levels[2].score_required = broken.levels[1].score_required;
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            Tuning::from_json(&json),
            Err(TuningError::ThresholdOrder { index: 2, .. })
        ));
    }

    #[test]
    fn test_model_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.model("model2").map(|m| m.name.as_str()), Some("Sofia"));
        assert!(tuning.model("nobody").is_none());
    }

    #[test]
    fn test_every_level_outfit_resolves() {
        let tuning = Tuning::default();
        for model in &tuning.models {
            assert_eq!(model.avatar, format!("/models/{}/avatar.jpg", model.id));
            for level in &tuning.levels {
                assert!(model.outfit(&level.outfit).is_some(), "{} {}", model.id, level.outfit);
            }
        }
        assert_eq!(tuning.outfit("model3", 1), Some("/models/model3/sport.jpg"));
        assert_eq!(tuning.outfit("model3", 99), None);
        assert_eq!(tuning.outfit("nobody", 0), None);
    }
}
