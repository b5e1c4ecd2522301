//! Level progression: size goals, completion edge-trigger and the
//! "level complete" overlay countdown

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_MESSAGE_FRAMES;

/// Result of an advance command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to advance (level not complete)
    Ignored,
    /// Now playing this (1-based) level
    NextLevel(u32),
    /// Advanced past the last level
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    /// 1-based
    pub level: u32,
    /// Size goal per level
    pub goals: Vec<f32>,
    pub level_complete: bool,
    /// Frames left on the overlay message
    pub message_frames: u32,
}

impl Progression {
    pub fn new(goals: Vec<f32>) -> Self {
        Self {
            level: 1,
            goals,
            level_complete: false,
            message_frames: 0,
        }
    }

    pub fn reset(&mut self) {
        self.level = 1;
        self.level_complete = false;
        self.message_frames = 0;
    }

    pub fn level_count(&self) -> u32 {
        self.goals.len() as u32
    }

    /// Goal for the current level, `None` once past the last one
    pub fn current_goal(&self) -> Option<f32> {
        let idx = self.level.checked_sub(1)? as usize;
        self.goals.get(idx).copied()
    }

    /// Goal to show in the HUD (the last goal once every level is done)
    pub fn display_goal(&self) -> f32 {
        self.current_goal()
            .or_else(|| self.goals.last().copied())
            .unwrap_or(0.0)
    }

    /// Fires once when `size` first reaches the goal; stays quiet until the
    /// next advance no matter how long the player stays oversized.
    pub fn check(&mut self, size: f32) -> bool {
        if self.level_complete {
            return false;
        }
        match self.current_goal() {
            Some(goal) if size >= goal => {
                self.level_complete = true;
                self.message_frames = LEVEL_MESSAGE_FRAMES;
                true
            }
            _ => false,
        }
    }

    pub fn tick_message(&mut self) {
        self.message_frames = self.message_frames.saturating_sub(1);
    }

    /// Move past a completed level
    pub fn advance(&mut self) -> Advance {
        if !self.level_complete {
            return Advance::Ignored;
        }
        self.level_complete = false;
        self.message_frames = 0;
        self.level += 1;
        if self.level > self.level_count() {
            Advance::Finished
        } else {
            Advance::NextLevel(self.level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression() -> Progression {
        Progression::new(vec![100.0, 200.0])
    }

    #[test]
    fn test_completion_is_edge_triggered() {
        let mut p = progression();
        assert!(!p.check(99.9));
        assert!(p.check(100.0));
        for _ in 0..500 {
            assert!(!p.check(150.0));
        }
        assert!(p.level_complete);
        assert_eq!(p.message_frames, LEVEL_MESSAGE_FRAMES);
    }

    #[test]
    fn test_advance_requires_completion() {
        let mut p = progression();
        assert_eq!(p.advance(), Advance::Ignored);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_advance_through_all_levels() {
        let mut p = progression();
        p.check(100.0);
        assert_eq!(p.advance(), Advance::NextLevel(2));
        assert_eq!(p.current_goal(), Some(200.0));
        assert_eq!(p.level, p.level_count());
        assert!(!p.check(150.0));
        assert!(p.check(200.0));
        assert_eq!(p.advance(), Advance::Finished);
        assert_eq!(p.current_goal(), None);
        assert_eq!(p.display_goal(), 200.0);
        // Nothing left to complete
        assert!(!p.check(10_000.0));
    }

    #[test]
    fn test_message_countdown_saturates() {
        let mut p = progression();
        p.check(100.0);
        for _ in 0..(LEVEL_MESSAGE_FRAMES + 10) {
            p.tick_message();
        }
        assert_eq!(p.message_frames, 0);
        assert!(p.level_complete);
    }

    #[test]
    fn test_reset() {
        let mut p = progression();
        p.check(100.0);
        p.advance();
        p.reset();
        assert_eq!(p.level, 1);
        assert!(!p.level_complete);
    }
}
