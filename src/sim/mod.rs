//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod effects;
pub mod entity;
pub mod level;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{Absorption, Resolution, resolve_collisions};
pub use effects::{ActiveEffect, EffectKind, EffectSpec, apply_effect, apply_magnet_pull, tick_effects};
pub use entity::{Bob, CollectibleObject, Color, ObjectKind, PLAYER_COLOR, Player, PowerUp};
pub use level::{Advance, Progression};
pub use state::{GameEvent, GamePhase, GameState, Particle};
pub use tick::{TickInput, autopilot, tick};
pub use world::{SpawnReport, SpawnRules, World, place_circle};
