//! Read-only view of the simulation for rendering layers
//!
//! Nothing here mutates `GameState`. The camera and viewport live outside the
//! core so the simulation never depends on display geometry.

pub mod camera;
pub mod snapshot;

pub use camera::{Camera, ViewportConfig};
pub use snapshot::{EffectView, ObjectView, PlayerView, PowerUpView, RenderSnapshot};
