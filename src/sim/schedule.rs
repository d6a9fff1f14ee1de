//! Timed actions on the simulation clock
//!
//! Delayed consequences (victory screen, respawn, game over) are queued here
//! and fired by `tick` once simulation time passes their due time, so nothing
//! depends on wall-clock timers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Enter the victory phase
    Victory,
    /// Bring the player back at the respawn point
    RespawnPlayer,
    /// Out of lives: end the run
    EndRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Entry {
    at: f64,
    action: ScheduledAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire `delay` seconds after `now`
    pub fn schedule(&mut self, now: f64, delay: f32, action: ScheduledAction) {
        self.entries.push(Entry {
            at: now + delay.max(0.0) as f64,
            action,
        });
    }

    /// Remove and return every action due at `now`, in the order queued
    pub fn due(&mut self, now: f64) -> Vec<ScheduledAction> {
        let mut fired = Vec::new();
        self.entries.retain(|entry| {
            if entry.at <= now {
                fired.push(entry.action);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.entries.iter().any(|e| e.action == action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut s = Scheduler::new();
        s.schedule(1.0, 2.0, ScheduledAction::Victory);
        assert!(s.due(2.9).is_empty());
        assert_eq!(s.due(3.0), vec![ScheduledAction::Victory]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_due_preserves_queue_order() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 1.0, ScheduledAction::RespawnPlayer);
        s.schedule(0.0, 0.5, ScheduledAction::EndRun);
        s.schedule(0.0, 5.0, ScheduledAction::Victory);
        assert_eq!(s.due(2.0), vec![ScheduledAction::RespawnPlayer, ScheduledAction::EndRun]);
        assert!(s.is_pending(ScheduledAction::Victory));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_negative_delay_fires_immediately() {
        let mut s = Scheduler::new();
        s.schedule(4.0, -1.0, ScheduledAction::EndRun);
        assert_eq!(s.due(4.0), vec![ScheduledAction::EndRun]);
    }
}
