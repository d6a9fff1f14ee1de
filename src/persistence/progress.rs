//! Cross-run progress: achievements and the furthest level reached

use serde::{Deserialize, Serialize};

use super::storage;
use crate::consts::PROGRESS_KEY;
use crate::sim::Achievement;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// In unlock order, no duplicates
    pub achievements: Vec<Achievement>,
    /// Highest campaign level index reached
    pub highest_level: usize,
    pub runs_played: u32,
    pub victories: u32,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished run in. Returns true if anything new was recorded
    /// besides the run counters.
    pub fn record_run(&mut self, level_index: usize, victory: bool, unlocked: &[Achievement]) -> bool {
        self.runs_played = self.runs_played.saturating_add(1);
        if victory {
            self.victories = self.victories.saturating_add(1);
        }
        let mut changed = false;
        if level_index > self.highest_level {
            self.highest_level = level_index;
            changed = true;
        }
        for &achievement in unlocked {
            if !self.achievements.contains(&achievement) {
                self.achievements.push(achievement);
                changed = true;
            }
        }
        changed
    }

    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    pub fn load() -> Self {
        match storage::load::<Progress>(PROGRESS_KEY) {
            Some(progress) => {
                log::info!(
                    "Loaded progress ({} achievements, level {})",
                    progress.achievements.len(),
                    progress.highest_level
                );
                progress
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        if let Err(e) = storage::save(PROGRESS_KEY, self) {
            log::warn!("Progress not saved: {}", e);
        }
    }
}
