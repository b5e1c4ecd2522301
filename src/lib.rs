//! Katamari Adventure - A rolling-sphere absorption arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, absorption, power-ups, levels)
//! - `view`: Camera, viewport and the per-frame render snapshot
//! - `audio`: Event-driven sound dispatch
//! - `driver`: Fixed-rate frame loop
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod driver;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod view;

pub use settings::Settings;
pub use tuning::{StackingPolicy, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Target frame rate of the driver loop
    pub const TARGET_FPS: u32 = 60;

    /// Side length of the square world
    pub const WORLD_SIZE: f32 = 3000.0;

    /// Player defaults
    pub const PLAYER_START_SIZE: f32 = 20.0;
    /// Shrinking never takes the player below this radius
    pub const MIN_PLAYER_SIZE: f32 = 10.0;
    pub const BASE_SPEED: f32 = 5.0;
    /// Derived speed never drops below this
    pub const MIN_SPEED: f32 = 2.0;
    /// Size units per unit of speed lost
    pub const SIZE_PER_SPEED: f32 = 20.0;
    pub const ACCELERATION: f32 = 0.5;
    pub const FRICTION: f32 = 0.9;
    /// Degrees per frame while rolling
    pub const ROTATION_SPEED: f32 = 3.0;
    pub const TRAIL_LENGTH: usize = 5;

    /// Absorption / collision response
    pub const GROW_FACTOR: f32 = 1.1;
    pub const SHRINK_FACTOR: f32 = 0.9;

    /// Collectible objects
    pub const OBJECT_MIN_RADIUS: u32 = 5;
    pub const OBJECT_MAX_RADIUS: u32 = 40;
    pub const INITIAL_OBJECTS: usize = 100;
    /// Replenish when the live count drops below this
    pub const OBJECT_FLOOR: usize = 100;
    pub const OBJECT_BATCH: usize = 20;

    /// Power-ups
    pub const POWERUP_RADIUS: f32 = 15.0;
    /// Power-ups are placed at least this far from the world edge
    pub const POWERUP_SPAWN_MARGIN: f32 = 20.0;
    pub const INITIAL_POWERUPS: usize = 5;
    pub const POWERUP_FLOOR: usize = 5;
    pub const POWERUP_BATCH: usize = 1;

    /// Spawning
    pub const SAFE_RADIUS_FACTOR: f32 = 3.0;
    pub const SPAWN_MAX_ATTEMPTS: u32 = 1000;

    /// Magnet field
    pub const MAGNET_RANGE_FACTOR: f32 = 5.0;
    /// Maximum pull per frame (world units), reached at the player's center
    pub const MAGNET_PULL: f32 = 2.0;

    /// Level progression
    pub const LEVEL_GOALS: [f32; 5] = [100.0, 200.0, 300.0, 400.0, 500.0];
    /// "Level complete" overlay duration (3 seconds at 60 Hz)
    pub const LEVEL_MESSAGE_FRAMES: u32 = 180;

    /// Absorption particles
    pub const ABSORB_PARTICLES: usize = 5;
    pub const MAX_PARTICLES: usize = 256;
    pub const PARTICLE_DRIFT: f32 = 0.2;

    /// Default window size
    pub const DEFAULT_SCREEN_WIDTH: u32 = 800;
    pub const DEFAULT_SCREEN_HEIGHT: u32 = 600;
}

/// Circle overlap test. Exact tangency does not count as overlap.
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let dist = delta.length();
    if dist > 0.0 {
        Some((delta / dist, dist))
    } else {
        None
    }
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}
