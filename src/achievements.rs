//! Achievement definitions and the persisted unlocked set
//!
//! Definitions are static tuning data. Unlocks are evaluated after each
//! catch and written through immediately; the set only ever grows.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, load_json, save_json, storage_key};

/// Level index that counts as "reached level 5" for the speed run
pub const SPEED_RUN_LEVEL_INDEX: usize = 4;

/// Unlock condition for an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// Bottles caught this session
    BottlesCollected(u32),
    /// Reach level 5 within the given number of seconds
    SpeedRun { seconds: u64 },
    /// Score at least this much while still at full lives
    PerfectScore(u64),
    /// Golden bottles caught this session
    GoldenBottles(u32),
    /// Current combo streak
    Combo(u32),
    /// Reach the final configured level
    CompleteGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub requirement: Requirement,
}

/// Session statistics an achievement is checked against
#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementProgress {
    pub bottles_collected: u32,
    pub golden_collected: u32,
    pub combo: u32,
    pub score: u64,
    pub lives: u32,
    pub max_lives: u32,
    pub level: usize,
    /// Index of the last level; None when no levels are configured
    pub final_level: Option<usize>,
    pub elapsed_secs: u64,
}

impl Requirement {
    pub fn is_met(&self, p: &AchievementProgress) -> bool {
        match *self {
            Requirement::BottlesCollected(n) => p.bottles_collected >= n,
            Requirement::SpeedRun { seconds } => {
                p.level >= SPEED_RUN_LEVEL_INDEX && p.elapsed_secs <= seconds
            }
            Requirement::PerfectScore(n) => p.score >= n && p.lives == p.max_lives,
            Requirement::GoldenBottles(n) => p.golden_collected >= n,
            Requirement::Combo(n) => p.combo >= n,
            Requirement::CompleteGame => p.final_level == Some(p.level),
        }
    }
}

/// Ids of every achievement unlocked so far (across sessions)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockedAchievements {
    ids: Vec<u32>,
}

impl UnlockedAchievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Mark an id unlocked. Returns false if it already was.
    pub fn unlock(&mut self, id: u32) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check every definition and unlock the ones newly satisfied.
    /// Returns the ids unlocked by this call.
    pub fn evaluate(
        &mut self,
        definitions: &[Achievement],
        progress: &AchievementProgress,
    ) -> Vec<u32> {
        let mut newly = Vec::new();
        for achievement in definitions {
            if self.contains(achievement.id) {
                continue;
            }
            if achievement.requirement.is_met(progress) && self.unlock(achievement.id) {
                log::info!("Achievement unlocked: {} ({})", achievement.name, achievement.id);
                newly.push(achievement.id);
            }
        }
        newly
    }

    const STORAGE_KEY: &'static str = "achievements";

    /// Load the unlocked set; missing or corrupt data yields an empty set
    pub fn load(storage: &dyn Storage) -> Self {
        let unlocked: Self = load_json(storage, &storage_key(Self::STORAGE_KEY));
        log::info!("Loaded {} unlocked achievements", unlocked.len());
        unlocked
    }

    pub fn save(&self, storage: &dyn Storage) -> bool {
        save_json(storage, &storage_key(Self::STORAGE_KEY), self)
    }
}
