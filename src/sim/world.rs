//! The bounded play area and everything living in it
//!
//! Spawning is rejection sampling: a uniform random position is redrawn until
//! it is outside the player's safe radius and clear of every entity already in
//! the same set. Sampling is capped; on exhaustion the entity is placed at the
//! best candidate seen and the batch is flagged as relaxed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Bob, CollectibleObject, ObjectKind, Player, PowerUp};
use super::effects::EffectKind;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::view::Camera;

/// Outcome of a spawn batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnReport {
    pub placed: usize,
    /// Entities placed without the no-overlap guarantee after the attempt cap
    pub relaxed: usize,
}

impl SpawnReport {
    fn merge(&mut self, other: SpawnReport) {
        self.placed += other.placed;
        self.relaxed += other.relaxed;
    }
}

/// Spawn placement constraints
#[derive(Debug, Clone, Copy)]
pub struct SpawnRules {
    pub player_pos: Vec2,
    /// Candidates at or inside this distance from the player are rejected
    pub safe_radius: f32,
    pub max_attempts: u32,
}

impl SpawnRules {
    pub fn around(player: &Player, max_attempts: u32) -> Self {
        Self {
            player_pos: player.pos,
            safe_radius: player.size * SAFE_RADIUS_FACTOR,
            max_attempts,
        }
    }
}

/// Pick a position for a circle of `radius` kept `margin` from the edges.
/// Returns the position and whether the overlap constraint had to be dropped.
pub fn place_circle(
    rng: &mut impl Rng,
    world_size: f32,
    margin: f32,
    radius: f32,
    rules: &SpawnRules,
    occupied: &[(Vec2, f32)],
) -> (Vec2, bool) {
    let lo = margin.ceil() as i32;
    let hi = (world_size - margin).floor() as i32;
    if hi < lo {
        return (Vec2::splat(world_size / 2.0), true);
    }

    let mut fallback = None;
    for _ in 0..rules.max_attempts.max(1) {
        let candidate = Vec2::new(
            rng.random_range(lo..=hi) as f32,
            rng.random_range(lo..=hi) as f32,
        );
        if candidate.distance(rules.player_pos) <= rules.safe_radius {
            fallback.get_or_insert(candidate);
            continue;
        }
        let clear = occupied
            .iter()
            .all(|&(pos, r)| candidate.distance(pos) >= radius + r);
        if clear {
            return (candidate, false);
        }
        // Outside the safe zone beats anything found inside it
        fallback = Some(candidate);
    }

    let pos = fallback.unwrap_or(Vec2::splat(world_size / 2.0));
    (pos, true)
}

/// Owns the world bounds and the live entity sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub size: f32,
    /// Sorted by id
    pub objects: Vec<CollectibleObject>,
    /// Sorted by id
    pub powerups: Vec<PowerUp>,
    next_id: u32,
}

impl World {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            objects: Vec::new(),
            powerups: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fill a fresh world with the opening batch of objects and power-ups
    pub fn populate(&mut self, rng: &mut impl Rng, player: &Player, tuning: &Tuning) -> SpawnReport {
        let rules = SpawnRules::around(player, tuning.spawn_max_attempts);
        let mut report = self.spawn_objects(rng, tuning.initial_objects, &rules);
        report.merge(self.spawn_powerups(rng, tuning.initial_powerups, &rules));
        log::info!(
            "World populated: {} objects, {} power-ups",
            self.objects.len(),
            self.powerups.len()
        );
        report
    }

    /// Spawn `count` objects of random kind and radius
    pub fn spawn_objects(&mut self, rng: &mut impl Rng, count: usize, rules: &SpawnRules) -> SpawnReport {
        let mut occupied: Vec<(Vec2, f32)> =
            self.objects.iter().map(|o| (o.pos, o.radius)).collect();
        let mut report = SpawnReport::default();

        for _ in 0..count {
            let radius = rng.random_range(OBJECT_MIN_RADIUS..=OBJECT_MAX_RADIUS) as f32;
            let (pos, relaxed) = place_circle(rng, self.size, radius, radius, rules, &occupied);
            occupied.push((pos, radius));

            let id = self.next_entity_id();
            self.objects.push(CollectibleObject {
                id,
                kind: ObjectKind::random(rng),
                pos,
                radius,
                rotation: rng.random_range(0..=360) as f32,
                bob: Bob::random(rng),
            });
            report.placed += 1;
            if relaxed {
                report.relaxed += 1;
            }
        }

        if report.relaxed > 0 {
            log::warn!(
                "Object spawn relaxed overlap for {} of {} after {} attempts each",
                report.relaxed,
                report.placed,
                rules.max_attempts
            );
        }
        report
    }

    /// Spawn `count` power-ups of random kind
    pub fn spawn_powerups(&mut self, rng: &mut impl Rng, count: usize, rules: &SpawnRules) -> SpawnReport {
        let mut occupied: Vec<(Vec2, f32)> =
            self.powerups.iter().map(|p| (p.pos, p.radius)).collect();
        let mut report = SpawnReport::default();

        for _ in 0..count {
            let (pos, relaxed) = place_circle(
                rng,
                self.size,
                POWERUP_SPAWN_MARGIN,
                POWERUP_RADIUS,
                rules,
                &occupied,
            );
            occupied.push((pos, POWERUP_RADIUS));

            let id = self.next_entity_id();
            self.powerups.push(PowerUp {
                id,
                kind: EffectKind::random(rng),
                pos,
                radius: POWERUP_RADIUS,
                rotation: rng.random_range(0..=360) as f32,
                bob: Bob::random(rng),
            });
            report.placed += 1;
            if relaxed {
                report.relaxed += 1;
            }
        }

        if report.relaxed > 0 {
            log::warn!(
                "Power-up spawn relaxed overlap for {} of {}",
                report.relaxed,
                report.placed
            );
        }
        report
    }

    /// Top the world back up once the live counts drop below their floors
    pub fn replenish(&mut self, rng: &mut impl Rng, player: &Player, tuning: &Tuning) -> SpawnReport {
        let rules = SpawnRules::around(player, tuning.spawn_max_attempts);
        let mut report = SpawnReport::default();
        if self.objects.len() < tuning.object_floor {
            report.merge(self.spawn_objects(rng, tuning.object_batch, &rules));
        }
        if self.powerups.len() < tuning.powerup_floor {
            report.merge(self.spawn_powerups(rng, tuning.powerup_batch, &rules));
        }
        report
    }

    /// Remove absorbed objects. `ids` must be sorted.
    pub fn despawn_objects(&mut self, ids: &[u32]) {
        if !ids.is_empty() {
            self.objects.retain(|o| ids.binary_search(&o.id).is_err());
        }
    }

    /// Remove collected power-ups. `ids` must be sorted.
    pub fn despawn_powerups(&mut self, ids: &[u32]) {
        if !ids.is_empty() {
            self.powerups.retain(|p| ids.binary_search(&p.id).is_err());
        }
    }

    /// Advance cosmetic animation of every entity
    pub fn animate(&mut self) {
        for obj in &mut self.objects {
            obj.update();
        }
        for powerup in &mut self.powerups {
            powerup.update();
        }
    }

    /// Objects the camera can see
    pub fn visible_objects<'a>(&'a self, camera: &'a Camera) -> impl Iterator<Item = &'a CollectibleObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| camera.is_visible(o.pos, o.radius))
    }

    /// Power-ups the camera can see
    pub fn visible_powerups<'a>(&'a self, camera: &'a Camera) -> impl Iterator<Item = &'a PowerUp> + 'a {
        self.powerups
            .iter()
            .filter(move |p| camera.is_visible(p.pos, p.radius))
    }

    /// Ensure deterministic iteration order
    pub fn normalize_order(&mut self) {
        self.objects.sort_by_key(|o| o.id);
        self.powerups.sort_by_key(|p| p.id);
    }
}
