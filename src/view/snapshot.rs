//! Per-frame render snapshot
//!
//! Flattens the game state into plain data a renderer can draw without
//! touching the simulation: world and screen positions, colors and HUD values.

use glam::Vec2;
use serde::Serialize;

use super::camera::{Camera, ViewportConfig};
use crate::settings::Settings;
use crate::sim::{
    ActiveEffect, CollectibleObject, Color, EffectKind, GamePhase, GameState, ObjectKind,
    PLAYER_COLOR, PowerUp,
};

/// An active power-up as shown in the HUD
#[derive(Debug, Clone, Serialize)]
pub struct EffectView {
    pub kind: EffectKind,
    pub icon: &'static str,
    pub color: Color,
    /// Seconds left
    pub remaining: f32,
    /// 0-1, for the timer arc
    pub fraction_left: f32,
}

impl From<&ActiveEffect> for EffectView {
    fn from(effect: &ActiveEffect) -> Self {
        Self {
            kind: effect.kind,
            icon: effect.kind.spec().icon,
            color: effect.color,
            remaining: effect.remaining.max(0.0),
            fraction_left: effect.fraction_left(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub screen_pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub color: Color,
    pub is_invincible: bool,
    pub magnet_range: f32,
    pub effects: Vec<EffectView>,
    /// Screen positions, oldest first (empty when trails are off)
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectView {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    /// Includes the bounce offset
    pub screen_pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub color: Color,
    pub on_screen: bool,
}

impl ObjectView {
    fn new(obj: &CollectibleObject, camera: &Camera, on_screen: bool) -> Self {
        Self {
            id: obj.id,
            kind: obj.kind,
            pos: obj.pos,
            screen_pos: camera.apply(obj.pos) + Vec2::new(0.0, obj.bob.offset),
            radius: obj.radius,
            rotation: obj.rotation,
            color: obj.kind.color(),
            on_screen,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub id: u32,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub screen_pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub color: Color,
    pub on_screen: bool,
}

impl PowerUpView {
    fn new(powerup: &PowerUp, camera: &Camera, on_screen: bool) -> Self {
        Self {
            id: powerup.id,
            kind: powerup.kind,
            pos: powerup.pos,
            screen_pos: camera.apply(powerup.pos) + Vec2::new(0.0, powerup.bob.offset),
            radius: powerup.radius,
            rotation: powerup.rotation,
            color: powerup.kind.color(),
            on_screen,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub screen_pos: Vec2,
    pub color: Color,
    pub size: f32,
    pub alpha: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub phase: GamePhase,
    pub viewport: ViewportConfig,
    pub camera_offset: Vec2,
    pub player: PlayerView,
    pub objects: Vec<ObjectView>,
    pub powerups: Vec<PowerUpView>,
    pub particles: Vec<ParticleView>,
    // HUD
    pub level: u32,
    pub level_count: u32,
    pub goal: f32,
    pub score: u64,
    pub objects_collected: u32,
    pub level_complete: bool,
    pub message_frames: u32,
}

impl RenderSnapshot {
    /// Capture the state after a completed tick. `camera` should already
    /// follow the player.
    pub fn capture(
        state: &GameState,
        camera: &Camera,
        viewport: &ViewportConfig,
        settings: &Settings,
    ) -> Self {
        let player = &state.player;
        let world = &state.world;
        // Entity lists are sorted by id
        let visible_objects: Vec<u32> = world.visible_objects(camera).map(|o| o.id).collect();
        let visible_powerups: Vec<u32> = world.visible_powerups(camera).map(|p| p.id).collect();
        let trail = if settings.trails {
            player.trail.iter().map(|&p| camera.apply(p)).collect()
        } else {
            Vec::new()
        };
        let particles = if settings.particles {
            state
                .particles
                .iter()
                .filter(|p| camera.is_visible(p.pos, p.size))
                .map(|p| ParticleView {
                    screen_pos: camera.apply(p.pos),
                    color: p.color,
                    size: p.size,
                    alpha: p.alpha(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            frame: state.time_ticks,
            phase: state.phase,
            viewport: *viewport,
            camera_offset: camera.offset,
            player: PlayerView {
                pos: player.pos,
                screen_pos: camera.apply(player.pos),
                radius: player.size,
                rotation: player.rotation,
                color: PLAYER_COLOR,
                is_invincible: player.is_invincible,
                magnet_range: player.magnet_range,
                effects: player.active_effects.iter().map(EffectView::from).collect(),
                trail,
            },
            objects: world
                .objects
                .iter()
                .map(|o| ObjectView::new(o, camera, visible_objects.binary_search(&o.id).is_ok()))
                .collect(),
            powerups: world
                .powerups
                .iter()
                .map(|p| PowerUpView::new(p, camera, visible_powerups.binary_search(&p.id).is_ok()))
                .collect(),
            particles,
            level: state.progression.level,
            level_count: state.progression.level_count(),
            goal: state.progression.display_goal(),
            score: player.score,
            objects_collected: player.objects_collected,
            level_complete: state.progression.level_complete,
            message_frames: state.progression.message_frames,
        }
    }

    /// Objects inside the view, the only ones a renderer needs to draw
    pub fn visible_objects(&self) -> impl Iterator<Item = &ObjectView> {
        self.objects.iter().filter(|o| o.on_screen)
    }

    pub fn visible_powerups(&self) -> impl Iterator<Item = &PowerUpView> {
        self.powerups.iter().filter(|p| p.on_screen)
    }

    /// Progress toward the current goal, 0-1
    pub fn goal_progress(&self) -> f32 {
        if self.goal > 0.0 {
            (self.player.radius / self.goal).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::apply_effect;
    use crate::tuning::StackingPolicy;

    fn capture(state: &GameState, settings: &Settings) -> RenderSnapshot {
        let viewport = ViewportConfig::default();
        let mut camera = Camera::from_viewport(&viewport);
        camera.follow(state.player.pos, state.world.size);
        RenderSnapshot::capture(state, &camera, &viewport, settings)
    }

    #[test]
    fn test_snapshot_covers_every_live_entity() {
        let state = GameState::new(31);
        let snap = capture(&state, &Settings::default());

        assert_eq!(snap.objects.len(), state.world.objects.len());
        assert_eq!(snap.powerups.len(), state.world.powerups.len());
        assert_eq!(snap.phase, GamePhase::Start);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.goal, 100.0);
        assert_eq!(snap.player.screen_pos, Vec2::new(400.0, 300.0));
        assert!(snap.visible_objects().count() < snap.objects.len());
    }

    #[test]
    fn test_on_screen_flags_match_camera() {
        let state = GameState::new(36);
        let viewport = ViewportConfig::default();
        let mut camera = Camera::from_viewport(&viewport);
        camera.follow(state.player.pos, state.world.size);
        let snap = RenderSnapshot::capture(&state, &camera, &viewport, &Settings::default());

        for obj in &snap.objects {
            assert_eq!(obj.on_screen, camera.is_visible(obj.pos, obj.radius));
        }
        for p in &snap.powerups {
            assert_eq!(p.on_screen, camera.is_visible(p.pos, p.radius));
        }
        assert_eq!(
            snap.visible_powerups().count(),
            state.world.visible_powerups(&camera).count()
        );
    }

    #[test]
    fn test_snapshot_effects_and_flags() {
        let mut state = GameState::new(32);
        apply_effect(&mut state.player, EffectKind::Invincible, StackingPolicy::Independent);
        apply_effect(&mut state.player, EffectKind::Magnet, StackingPolicy::Independent);
        let snap = capture(&state, &Settings::default());

        assert!(snap.player.is_invincible);
        assert_eq!(snap.player.magnet_range, state.player.size * 5.0);
        assert_eq!(snap.player.effects.len(), 2);
        assert_eq!(snap.player.effects[0].icon, "⭐");
        assert_eq!(snap.player.effects[0].fraction_left, 1.0);
    }

    #[test]
    fn test_snapshot_honours_visual_settings() {
        let mut state = GameState::new(33);
        state.player.record_trail();
        let pos = state.player.pos;
        state.emit_absorb_particles(pos, 10.0, [1, 1, 1]);

        let snap = capture(&state, &Settings::default());
        assert_eq!(snap.player.trail.len(), 1);
        assert!(!snap.particles.is_empty());

        let plain = Settings {
            particles: false,
            trails: false,
            ..Settings::default()
        };
        let snap = capture(&state, &plain);
        assert!(snap.player.trail.is_empty());
        assert!(snap.particles.is_empty());
    }

    #[test]
    fn test_goal_progress() {
        let mut state = GameState::new(34);
        state.player.size = 50.0;
        let snap = capture(&state, &Settings::default());
        assert!((snap.goal_progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(35);
        let snap = capture(&state, &Settings::default());
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"phase\":\"Start\""));
    }
}
