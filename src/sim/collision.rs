//! Collision detection and absorption resolution
//!
//! Every live object and power-up is tested against the player once per
//! frame. Hits are resolved immediately against the player, but removals are
//! deferred until the whole scan is done so no entity is skipped or tested
//! twice.

use glam::Vec2;

use super::effects::{EffectKind, apply_effect};
use super::entity::ObjectKind;
use super::state::{GameEvent, GameState};

/// An object the player swallowed this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// What one resolver pass did
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub absorbed: Vec<Absorption>,
    pub collected: Vec<(u32, EffectKind)>,
    /// Shrinks actually applied
    pub shrinks: u32,
    /// Bounces off bigger objects that invincibility ignored
    pub blocked_shrinks: u32,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.absorbed.is_empty()
            && self.collected.is_empty()
            && self.shrinks == 0
            && self.blocked_shrinks == 0
    }
}

/// Resolve all player contacts for this frame.
///
/// Smaller objects are absorbed (grow + score + particles) and removed. Equal
/// or larger objects shrink the player and stay put. Power-ups apply their
/// effect and are removed. Size comparisons use the player's size at the
/// moment each object is reached in the scan.
pub fn resolve_collisions(state: &mut GameState) -> Resolution {
    let mut resolution = Resolution::default();
    let grow_factor = state.tuning.grow_factor;
    let shrink_factor = state.tuning.shrink_factor;
    let policy = state.tuning.stacking;

    let player = &mut state.player;
    for obj in &state.world.objects {
        if !obj.check_collision(player) {
            continue;
        }
        if obj.radius < player.size {
            player.grow(grow_factor, obj.points());
            resolution.absorbed.push(Absorption {
                id: obj.id,
                kind: obj.kind,
                pos: obj.pos,
                radius: obj.radius,
            });
            state.events.push(GameEvent::Absorbed {
                kind: obj.kind,
                pos: obj.pos,
                radius: obj.radius,
            });
            state.events.push(GameEvent::Grew {
                size: player.size,
                points: obj.points(),
            });
        } else if player.shrink(shrink_factor) {
            resolution.shrinks += 1;
            state.events.push(GameEvent::Shrank { size: player.size });
        } else {
            resolution.blocked_shrinks += 1;
        }
    }

    for powerup in &state.world.powerups {
        if powerup.check_collision(player) {
            apply_effect(player, powerup.kind, policy);
            resolution.collected.push((powerup.id, powerup.kind));
            state.events.push(GameEvent::PowerUpCollected { kind: powerup.kind });
        }
    }

    let mut object_ids: Vec<u32> = resolution.absorbed.iter().map(|a| a.id).collect();
    object_ids.sort_unstable();
    state.world.despawn_objects(&object_ids);

    let mut powerup_ids: Vec<u32> = resolution.collected.iter().map(|(id, _)| *id).collect();
    powerup_ids.sort_unstable();
    state.world.despawn_powerups(&powerup_ids);

    for absorption in &resolution.absorbed {
        state.emit_absorb_particles(absorption.pos, absorption.radius, absorption.kind.color());
    }

    if !resolution.is_empty() {
        log::debug!(
            "Resolved contacts: {} absorbed, {} shrinks, {} power-ups (size {:.1})",
            resolution.absorbed.len(),
            resolution.shrinks,
            resolution.collected.len(),
            state.player.size
        );
    }

    resolution
}
