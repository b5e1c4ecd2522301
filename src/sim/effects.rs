//! Timed power-up effects and the magnet field
//!
//! Each category carries fixed metadata (duration, color, icon) and a pair of
//! modifier functions looked up through [`EffectKind::spec`]. Active effects
//! tick down in seconds and revert their modifier when they run out.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::entity::{CollectibleObject, Color, Player};
use crate::consts::*;
use crate::direction_to;
use crate::tuning::StackingPolicy;

/// Power-up categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Speed,
    Magnet,
    Invincible,
    Growth,
}

/// Fixed per-category metadata and modifier pair
pub struct EffectSpec {
    pub name: &'static str,
    pub color: Color,
    /// Seconds
    pub duration: f32,
    pub icon: &'static str,
    /// Applied on pickup
    pub apply: fn(&mut Player),
    /// Applied on expiry
    pub revert: fn(&mut Player),
    /// True when applying twice compounds (so ref-counting must skip re-application)
    pub compounds: bool,
}

const SPEED_BOOST: f32 = 1.5;
const GROWTH_BOOST: f32 = 1.5;

fn apply_speed(p: &mut Player) {
    p.base_speed *= SPEED_BOOST;
    p.recompute_speed();
}

fn revert_speed(p: &mut Player) {
    p.base_speed /= SPEED_BOOST;
    p.recompute_speed();
}

fn apply_magnet(p: &mut Player) {
    p.magnet_range = p.size * MAGNET_RANGE_FACTOR;
}

fn revert_magnet(p: &mut Player) {
    p.magnet_range = 0.0;
}

fn apply_invincible(p: &mut Player) {
    p.is_invincible = true;
}

fn revert_invincible(p: &mut Player) {
    p.is_invincible = false;
}

fn apply_growth(p: &mut Player) {
    p.growth_multiplier = GROWTH_BOOST;
}

fn revert_growth(p: &mut Player) {
    p.growth_multiplier = 1.0;
}

static EFFECT_TABLE: [EffectSpec; 4] = [
    EffectSpec {
        name: "speed",
        color: [255, 255, 0],
        duration: 5.0,
        icon: "⚡",
        apply: apply_speed,
        revert: revert_speed,
        compounds: true,
    },
    EffectSpec {
        name: "magnet",
        color: [255, 0, 255],
        duration: 7.0,
        icon: "🧲",
        apply: apply_magnet,
        revert: revert_magnet,
        compounds: false,
    },
    EffectSpec {
        name: "invincible",
        color: [0, 255, 255],
        duration: 4.0,
        icon: "⭐",
        apply: apply_invincible,
        revert: revert_invincible,
        compounds: false,
    },
    EffectSpec {
        name: "growth",
        color: [255, 150, 0],
        duration: 6.0,
        icon: "⬆",
        apply: apply_growth,
        revert: revert_growth,
        compounds: false,
    },
];

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Speed,
        EffectKind::Magnet,
        EffectKind::Invincible,
        EffectKind::Growth,
    ];

    pub fn spec(self) -> &'static EffectSpec {
        let idx = match self {
            EffectKind::Speed => 0,
            EffectKind::Magnet => 1,
            EffectKind::Invincible => 2,
            EffectKind::Growth => 3,
        };
        &EFFECT_TABLE[idx]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn color(self) -> Color {
        self.spec().color
    }

    pub fn duration(self) -> f32 {
        self.spec().duration
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&EffectKind::Speed)
    }
}

/// A power-up currently affecting the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub duration: f32,
    /// Seconds left
    pub remaining: f32,
    pub color: Color,
}

impl ActiveEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            duration: kind.duration(),
            remaining: kind.duration(),
            color: kind.color(),
        }
    }

    /// Fraction of the effect left, for the HUD timer arc
    pub fn fraction_left(&self) -> f32 {
        if self.duration > 0.0 {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Record a pickup and apply its modifier.
///
/// Every pickup appends its own record. Under `Independent` stacking the
/// modifier is applied every time; under `RefCounted` a compounding modifier
/// (speed) is only applied by the first active instance.
pub fn apply_effect(player: &mut Player, kind: EffectKind, policy: StackingPolicy) {
    let already_active = player.has_effect(kind);
    let spec = kind.spec();
    player.active_effects.push(ActiveEffect::new(kind));

    let skip = policy == StackingPolicy::RefCounted && already_active && spec.compounds;
    if !skip {
        (spec.apply)(player);
    }
    log::debug!(
        "Power-up {} picked up ({} active)",
        spec.name,
        player.active_effects.len()
    );
}

/// Advance every active effect by `dt` seconds, reverting and removing the
/// ones that ran out. Returns the kinds that expired this call.
pub fn tick_effects(player: &mut Player, dt: f32, policy: StackingPolicy) -> Vec<EffectKind> {
    for effect in &mut player.active_effects {
        effect.remaining -= dt;
    }

    let mut expired = Vec::new();
    let mut i = 0;
    while i < player.active_effects.len() {
        if player.active_effects[i].remaining <= 0.0 {
            let effect = player.active_effects.remove(i);
            expired.push(effect.kind);
            let still_active = player.has_effect(effect.kind);
            if policy == StackingPolicy::Independent || !still_active {
                (effect.kind.spec().revert)(player);
            }
            log::debug!("Power-up {} expired", effect.kind.name());
        } else {
            i += 1;
        }
    }
    expired
}

/// Pull strictly smaller objects within `magnet_range` toward the player.
/// Strength falls off linearly from `MAGNET_PULL` at the player's center to
/// zero at the edge of the field. Objects sitting exactly on the player's
/// center are skipped.
pub fn apply_magnet_pull(player: &Player, objects: &mut [CollectibleObject]) {
    let range = player.magnet_range;
    if range <= 0.0 {
        return;
    }
    for obj in objects.iter_mut() {
        if obj.radius >= player.size {
            continue;
        }
        let Some((dir, dist)) = direction_to(obj.pos, player.pos) else {
            continue;
        };
        if dist < range {
            obj.pos += dir * magnet_strength(dist, range);
        }
    }
}

/// Per-frame pull for an object `dist` away from the player's center
pub fn magnet_strength(dist: f32, range: f32) -> f32 {
    if range <= 0.0 || dist >= range {
        0.0
    } else {
        MAGNET_PULL * (1.0 - dist / range)
    }
}
