//! World entities: the player sphere, collectible objects and power-ups

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::effects::{ActiveEffect, EffectKind};
use crate::consts::*;
use crate::{circles_overlap, wrap_degrees};

/// RGB color
pub type Color = [u8; 3];

pub const PLAYER_COLOR: Color = [0, 0, 255];

/// The player-controlled sphere
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Radius
    pub size: f32,
    pub vel: Vec2,
    pub base_speed: f32,
    /// Derived from `base_speed` and `size`
    pub speed: f32,
    /// Cosmetic, degrees
    pub rotation: f32,
    pub score: u64,
    pub objects_collected: u32,
    pub active_effects: Vec<ActiveEffect>,
    pub magnet_range: f32,
    pub is_invincible: bool,
    pub growth_multiplier: f32,
    /// Shrink floor
    pub min_size: f32,
    /// Recent positions, newest last
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Player {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self::with_stats(pos, size, BASE_SPEED, MIN_PLAYER_SIZE)
    }

    pub fn with_stats(pos: Vec2, size: f32, base_speed: f32, min_size: f32) -> Self {
        let mut player = Self {
            pos,
            size,
            vel: Vec2::ZERO,
            base_speed,
            speed: base_speed,
            rotation: 0.0,
            score: 0,
            objects_collected: 0,
            active_effects: Vec::new(),
            magnet_range: 0.0,
            is_invincible: false,
            growth_multiplier: 1.0,
            min_size,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
        };
        player.recompute_speed();
        player
    }

    /// Bigger is slower
    pub fn recompute_speed(&mut self) {
        self.speed = (self.base_speed - self.size / SIZE_PER_SPEED).max(MIN_SPEED);
    }

    /// One semi-implicit Euler step. `push` is the input axis already scaled by
    /// `speed`; each component only accelerates when non-zero. The position is
    /// clamped to the world but velocity is left untouched, so holding a
    /// direction against a wall keeps the sphere pinned there.
    pub fn move_by(&mut self, push: Vec2, world_size: f32) {
        if push.x != 0.0 {
            self.vel.x += push.x * ACCELERATION;
        }
        if push.y != 0.0 {
            self.vel.y += push.y * ACCELERATION;
        }

        self.vel *= FRICTION;
        self.pos += self.vel;
        self.clamp_to_world(world_size);

        if push != Vec2::ZERO {
            self.rotation += ROTATION_SPEED;
            if self.rotation >= 360.0 {
                self.rotation = 0.0;
            }
        }
    }

    /// Keep the whole sphere inside `[size, world_size - size]` on both axes
    pub fn clamp_to_world(&mut self, world_size: f32) {
        let lo = self.size;
        let hi = (world_size - self.size).max(lo);
        self.pos = self.pos.clamp(Vec2::splat(lo), Vec2::splat(hi));
    }

    /// Absorb something worth `points`
    pub fn grow(&mut self, factor: f32, points: u32) {
        self.size *= factor * self.growth_multiplier;
        self.score += u64::from(points);
        self.objects_collected += 1;
        self.recompute_speed();
    }

    /// Bounce off something bigger. Returns false if invincibility blocked it.
    pub fn shrink(&mut self, factor: f32) -> bool {
        if self.is_invincible {
            return false;
        }
        self.size = (self.size * factor).max(self.min_size);
        self.recompute_speed();
        true
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.active_effects.iter().any(|e| e.kind == kind)
    }
}

/// Collectible object categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Rabbit,
    Stone,
    Bush,
    Flower,
    Mushroom,
    Butterfly,
    Frog,
    Bird,
    Squirrel,
    Fish,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 10] = [
        ObjectKind::Rabbit,
        ObjectKind::Stone,
        ObjectKind::Bush,
        ObjectKind::Flower,
        ObjectKind::Mushroom,
        ObjectKind::Butterfly,
        ObjectKind::Frog,
        ObjectKind::Bird,
        ObjectKind::Squirrel,
        ObjectKind::Fish,
    ];

    /// Score awarded on absorption
    pub fn points(self) -> u32 {
        match self {
            ObjectKind::Stone | ObjectKind::Bush | ObjectKind::Flower => 1,
            ObjectKind::Rabbit
            | ObjectKind::Mushroom
            | ObjectKind::Frog
            | ObjectKind::Squirrel
            | ObjectKind::Fish => 2,
            ObjectKind::Butterfly | ObjectKind::Bird => 3,
        }
    }

    pub fn color(self) -> Color {
        match self {
            ObjectKind::Rabbit => [200, 200, 200],
            ObjectKind::Stone => [128, 128, 128],
            ObjectKind::Bush => [34, 139, 34],
            ObjectKind::Flower => [255, 192, 203],
            ObjectKind::Mushroom => [255, 165, 0],
            ObjectKind::Butterfly => [128, 0, 128],
            ObjectKind::Frog => [0, 255, 0],
            ObjectKind::Bird => [255, 255, 0],
            ObjectKind::Squirrel => [139, 69, 19],
            ObjectKind::Fish => [0, 191, 255],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Rabbit => "rabbit",
            ObjectKind::Stone => "stone",
            ObjectKind::Bush => "bush",
            ObjectKind::Flower => "flower",
            ObjectKind::Mushroom => "mushroom",
            ObjectKind::Butterfly => "butterfly",
            ObjectKind::Frog => "frog",
            ObjectKind::Bird => "bird",
            ObjectKind::Squirrel => "squirrel",
            ObjectKind::Fish => "fish",
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&ObjectKind::Stone)
    }
}

/// Bounce animation shared by objects and power-ups (cosmetic)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bob {
    pub offset: f32,
    pub dir: f32,
    /// Phase offset for the renderer's sine wobble
    pub phase: f32,
    pub phase_speed: f32,
}

impl Bob {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            offset: 0.0,
            dir: 1.0,
            phase: rng.random_range(0..=100) as f32,
            phase_speed: rng.random_range(0.02..0.05),
        }
    }

    fn step(&mut self) {
        self.offset += 0.1 * self.dir;
        if self.offset.abs() > 3.0 {
            self.dir = -self.dir;
        }
    }
}

/// An inert world object the player can absorb or bounce off
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectibleObject {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    /// Fixed for the object's lifetime
    pub radius: f32,
    pub rotation: f32,
    pub bob: Bob,
}

impl CollectibleObject {
    pub fn points(&self) -> u32 {
        self.kind.points()
    }

    /// Cosmetic animation only
    pub fn update(&mut self) {
        self.bob.step();
        self.rotation = wrap_degrees(self.rotation + 0.5);
    }

    pub fn check_collision(&self, player: &Player) -> bool {
        circles_overlap(self.pos, self.radius, player.pos, player.size)
    }
}

/// A power-up waiting to be collected. Never expires unclaimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub bob: Bob,
}

impl PowerUp {
    pub fn update(&mut self) {
        self.bob.step();
        self.rotation = wrap_degrees(self.rotation + 1.0);
    }

    pub fn check_collision(&self, player: &Player) -> bool {
        circles_overlap(self.pos, self.radius, player.pos, player.size)
    }
}
