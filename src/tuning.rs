//! Data-driven game balance
//!
//! [`Tuning`] mirrors the balance constants in [`crate::consts`]. Every field
//! defaults to its constant, so a JSON file only needs the keys it overrides:
//!
//! ```json
//! { "level_goals": [60.0, 120.0], "stacking": "RefCounted" }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How a second pickup of an already-active power-up category interacts with
/// the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StackingPolicy {
    /// Every pickup applies its modifier and every expiry reverts it
    /// unconditionally. A set-style modifier (magnet, invincible, growth) is
    /// cleared when the *first* of two overlapping instances runs out.
    #[default]
    Independent,
    /// Modifiers are reference-counted per category: reverted only when the
    /// last active instance of that category expires.
    RefCounted,
}

/// Runtime-tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world_size: f32,
    pub player_start_size: f32,
    pub min_player_size: f32,
    pub base_speed: f32,
    pub grow_factor: f32,
    pub shrink_factor: f32,
    pub level_goals: Vec<f32>,
    pub initial_objects: usize,
    pub object_floor: usize,
    pub object_batch: usize,
    pub initial_powerups: usize,
    pub powerup_floor: usize,
    pub powerup_batch: usize,
    pub spawn_max_attempts: u32,
    pub stacking: StackingPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            player_start_size: PLAYER_START_SIZE,
            min_player_size: MIN_PLAYER_SIZE,
            base_speed: BASE_SPEED,
            grow_factor: GROW_FACTOR,
            shrink_factor: SHRINK_FACTOR,
            level_goals: LEVEL_GOALS.to_vec(),
            initial_objects: INITIAL_OBJECTS,
            object_floor: OBJECT_FLOOR,
            object_batch: OBJECT_BATCH,
            initial_powerups: INITIAL_POWERUPS,
            powerup_floor: POWERUP_FLOOR,
            powerup_batch: POWERUP_BATCH,
            spawn_max_attempts: SPAWN_MAX_ATTEMPTS,
            stacking: StackingPolicy::Independent,
        }
    }
}

/// Errors raised while loading or validating a [`Tuning`]
#[derive(Debug)]
pub enum TuningError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid tuning JSON.
    Parse(serde_json::Error),
    /// A value parsed but is outside its usable range.
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(err) => write!(f, "failed to read tuning file: {}", err),
            TuningError::Parse(err) => write!(f, "failed to parse tuning JSON: {}", err),
            TuningError::Invalid { field, reason } => {
                write!(f, "invalid tuning value '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(err) => Some(err),
            TuningError::Parse(err) => Some(err),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(err: std::io::Error) -> Self {
        TuningError::Io(err)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}

/// Convenience alias: a `Result` using `TuningError` as the error type.
pub type TuningResult<T> = Result<T, TuningError>;

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> TuningResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> TuningResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!(
            "Loaded tuning from {} ({} levels, {:?} stacking)",
            path.as_ref().display(),
            tuning.level_goals.len(),
            tuning.stacking
        );
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> TuningResult<()> {
        if !(self.world_size > 0.0) {
            return Err(invalid("world_size", "must be positive"));
        }
        if self.world_size <= 2.0 * OBJECT_MAX_RADIUS as f32 {
            return Err(invalid(
                "world_size",
                format!("must exceed {} to fit the largest object", 2 * OBJECT_MAX_RADIUS),
            ));
        }
        if !(self.min_player_size > 0.0) {
            return Err(invalid("min_player_size", "must be positive"));
        }
        if self.player_start_size < self.min_player_size {
            return Err(invalid(
                "player_start_size",
                format!("must be at least min_player_size ({})", self.min_player_size),
            ));
        }
        if !(self.base_speed > 0.0) {
            return Err(invalid("base_speed", "must be positive"));
        }
        if !(self.grow_factor > 1.0) {
            return Err(invalid("grow_factor", "must be greater than 1"));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(invalid("shrink_factor", "must lie in (0, 1)"));
        }
        if self.level_goals.is_empty() {
            return Err(invalid("level_goals", "at least one level is required"));
        }
        if self.level_goals[0] <= self.player_start_size {
            return Err(invalid(
                "level_goals",
                "first goal must exceed the starting size",
            ));
        }
        if self.level_goals.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("level_goals", "goals must be strictly increasing"));
        }
        if self.spawn_max_attempts == 0 {
            return Err(invalid("spawn_max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "level_goals": [60.0, 120.0] }"#).unwrap();
        assert_eq!(tuning.level_goals, vec![60.0, 120.0]);
        assert_eq!(tuning.world_size, WORLD_SIZE);
        assert_eq!(tuning.stacking, StackingPolicy::Independent);
    }

    #[test]
    fn test_stacking_policy_from_json() {
        let tuning = Tuning::from_json(r#"{ "stacking": "RefCounted" }"#).unwrap();
        assert_eq!(tuning.stacking, StackingPolicy::RefCounted);
    }

    #[test]
    fn test_rejects_non_increasing_goals() {
        let err = Tuning::from_json(r#"{ "level_goals": [100.0, 100.0] }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "level_goals", .. }));
    }

    #[test]
    fn test_rejects_empty_goals() {
        let err = Tuning::from_json(r#"{ "level_goals": [] }"#).unwrap_err();
        assert!(err.to_string().contains("level_goals"));
    }

    #[test]
    fn test_rejects_bad_shrink_factor() {
        let err = Tuning::from_json(r#"{ "shrink_factor": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "shrink_factor", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
