//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is one
//! frame: input → physics → magnet → collisions → effect decay → level check
//! → replenishment.

use glam::{IVec2, Vec2};

use super::collision::resolve_collisions;
use super::effects::{apply_magnet_pull, tick_effects};
use super::level::Advance;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axis, each component in {-1, 0, 1}
    pub axis: IVec2,
    /// Leave the title screen
    pub start: bool,
    /// Start over after winning
    pub restart: bool,
    /// Continue past a completed level
    pub advance_level: bool,
    /// Idle/demo mode - the sim steers the player itself
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let input = if input.idle_mode {
        autopilot(state)
    } else {
        input.clone()
    };

    handle_commands(state, &input);

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    // Physics
    let axis = input.axis.clamp(IVec2::splat(-1), IVec2::ONE);
    let push = axis.as_vec2() * state.player.speed;
    state.player.move_by(push, state.world.size);
    state.player.record_trail();

    // Cosmetic animation, then the magnet field
    state.world.animate();
    apply_magnet_pull(&state.player, &mut state.world.objects);

    resolve_collisions(state);

    let policy = state.tuning.stacking;
    for kind in tick_effects(&mut state.player, dt, policy) {
        state.emit(GameEvent::EffectExpired { kind });
    }

    if state.progression.check(state.player.size) {
        let level = state.progression.level;
        let score = state.player.score;
        log::info!(
            "Level {} complete at size {:.1} (score {})",
            level,
            state.player.size,
            score
        );
        state.emit(GameEvent::LevelComplete { level, score });
    }
    if state.progression.level_complete {
        state.progression.tick_message();
    }

    let report = state
        .world
        .replenish(&mut state.rng, &state.player, &state.tuning);
    state.note_spawn(report);

    state.update_particles();

    // Ensure deterministic ordering
    state.world.normalize_order();
}

fn handle_commands(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Start if input.start => {
            state.phase = GamePhase::Playing;
            log::info!("Game started (seed {})", state.seed);
            state.emit(GameEvent::GameStarted);
            state.emit_level_started();
        }
        GamePhase::GameOver if input.restart => state.restart(),
        GamePhase::Playing if input.advance_level => match state.progression.advance() {
            Advance::Ignored => {}
            Advance::NextLevel(level) => {
                log::info!("Advancing to level {}", level);
                state.reset_player_for_level();
                state.repopulate();
                state.emit_level_started();
            }
            Advance::Finished => {
                let score = state.player.score;
                log::info!("All levels cleared! Final score: {}", score);
                state.phase = GamePhase::GameOver;
                state.emit(GameEvent::GameWon { score });
            }
        },
        _ => {}
    }
}

/// How close (beyond touching) a bigger object has to be before the autopilot flees
const FLEE_MARGIN: f32 = 40.0;

/// Pick inputs for attract mode: chase the nearest power-up or smaller
/// object, steer away from bigger ones, and press through every menu.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    match state.phase {
        GamePhase::Start => {
            input.start = true;
            return input;
        }
        GamePhase::GameOver => {
            input.restart = true;
            return input;
        }
        GamePhase::Playing => {}
    }

    // Let the overlay show before moving on
    if state.progression.level_complete && state.progression.message_frames == 0 {
        input.advance_level = true;
    }

    let player = &state.player;

    let threat = state
        .world
        .objects
        .iter()
        .filter(|o| o.radius >= player.size)
        .map(|o| (o, o.pos.distance(player.pos) - o.radius - player.size))
        .filter(|&(_, gap)| gap < FLEE_MARGIN)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let steer = if let Some((obj, _)) = threat {
        player.pos - obj.pos
    } else {
        let nearest_powerup = state
            .world
            .powerups
            .iter()
            .map(|p| (p.pos, p.pos.distance_squared(player.pos)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let nearest_food = state
            .world
            .objects
            .iter()
            .filter(|o| o.radius < player.size)
            .map(|o| (o.pos, o.pos.distance_squared(player.pos)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        // Power-ups win unless food is much closer
        let target = match (nearest_powerup, nearest_food) {
            (Some(p), Some(f)) if f.1 * 4.0 < p.1 => Some(f.0),
            (Some(p), _) => Some(p.0),
            (None, Some(f)) => Some(f.0),
            (None, None) => None,
        };
        target.map(|t| t - player.pos).unwrap_or(Vec2::ZERO)
    };

    input.axis = steer_axis(steer);
    input
}

/// Quantize a steering vector to the 8-way input axis
fn steer_axis(steer: Vec2) -> IVec2 {
    let dir = steer.normalize_or_zero();
    let quantize = |v: f32| {
        if v > 0.38 {
            1
        } else if v < -0.38 {
            -1
        } else {
            0
        }
    };
    IVec2::new(quantize(dir.x), quantize(dir.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::effects::EffectKind;
    use crate::sim::entity::{Bob, CollectibleObject, ObjectKind, PowerUp};
    use crate::tuning::Tuning;

    fn bob() -> Bob {
        Bob {
            offset: 0.0,
            dir: 1.0,
            phase: 0.0,
            phase_speed: 0.03,
        }
    }

    fn start(state: &mut GameState) {
        let go = TickInput {
            start: true,
            ..Default::default()
        };
        tick(state, &go, SIM_DT);
        state.drain_events();
    }

    fn push_object(state: &mut GameState, pos: Vec2, radius: f32) {
        let id = state.world.next_entity_id();
        state.world.objects.push(CollectibleObject {
            id,
            kind: ObjectKind::Stone,
            pos,
            radius,
            rotation: 0.0,
            bob: bob(),
        });
    }

    #[test]
    fn test_tick_start_to_playing() {
        let mut state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Start);

        // Tick without start - should stay on the title screen
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.time_ticks, 0);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::GameStarted);
        assert!(matches!(events[1], GameEvent::LevelStarted { level: 1, .. }));
    }

    #[test]
    fn test_movement_input() {
        let mut state = GameState::new(1);
        start(&mut state);
        let before = state.player.pos;
        let right = TickInput {
            axis: IVec2::new(1, 0),
            ..Default::default()
        };
        tick(&mut state, &right, SIM_DT);
        assert!(state.player.pos.x > before.x);
        assert_eq!(state.player.pos.y, before.y);
    }

    #[test]
    fn test_axis_is_clamped() {
        let mut a = GameState::new(1);
        let mut b = GameState::new(1);
        start(&mut a);
        start(&mut b);
        let wild = TickInput {
            axis: IVec2::new(9, -9),
            ..Default::default()
        };
        let unit = TickInput {
            axis: IVec2::new(1, -1),
            ..Default::default()
        };
        tick(&mut a, &wild, SIM_DT);
        tick(&mut b, &unit, SIM_DT);
        assert_eq!(a.player.pos, b.player.pos);
    }

    #[test]
    fn test_magnet_then_absorb() {
        let mut state = GameState::new(2);
        start(&mut state);
        state.world.objects.clear();
        state.world.powerups.clear();
        state.player.size = PLAYER_START_SIZE;
        state.player.magnet_range = 100.0;
        let collected = state.player.objects_collected;
        // Just out of contact; the pull closes the gap this same frame
        let target = state.player.pos + Vec2::new(25.5, 0.0);
        push_object(&mut state, target, 5.0);

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.player.objects_collected, collected + 1);
        assert!(state.world.objects.len() >= OBJECT_BATCH);
    }

    #[test]
    fn test_replenish_after_absorption() {
        let mut state = GameState::new(3);
        start(&mut state);
        let pos = state.player.pos;
        state.world.objects.retain(|o| o.pos.distance(pos) > 300.0);
        state.world.objects.truncate(OBJECT_FLOOR - 1);
        let before = state.world.objects.len();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.world.objects.len(), before + OBJECT_BATCH);

        state.world.powerups.clear();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.world.powerups.len(), POWERUP_BATCH);
    }

    #[test]
    fn test_effect_expiry_event() {
        let mut state = GameState::new(4);
        start(&mut state);
        state.world.powerups.clear();
        let id = state.world.next_entity_id();
        state.world.powerups.push(PowerUp {
            id,
            kind: EffectKind::Invincible,
            pos: state.player.pos,
            radius: POWERUP_RADIUS,
            rotation: 0.0,
            bob: bob(),
        });

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.is_invincible);

        let mut expired = false;
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            expired |= state
                .drain_events()
                .iter()
                .any(|e| *e == GameEvent::EffectExpired { kind: EffectKind::Invincible });
        }
        assert!(expired);
        assert!(!state.player.is_invincible);
    }

    #[test]
    fn test_level_complete_fires_once() {
        let mut state = GameState::new(6);
        start(&mut state);
        state.world.objects.clear();
        state.player.size = 150.0;

        let mut completions = 0;
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            completions += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
                .count();
        }
        assert_eq!(completions, 1);
        assert!(state.progression.level_complete);
        assert_eq!(state.progression.message_frames, 0);
    }

    #[test]
    fn test_advance_level_keeps_score() {
        let mut state = GameState::new(7);
        start(&mut state);
        state.player.size = 120.0;
        state.player.score = 55;
        state.player.pos = Vec2::new(900.0, 900.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.progression.level_complete);

        let advance = TickInput {
            advance_level: true,
            ..Default::default()
        };
        tick(&mut state, &advance, SIM_DT);

        assert_eq!(state.progression.level, 2);
        assert!(!state.progression.level_complete);
        assert!(state.player.score >= 55);
        assert!(state.player.size < 30.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_advance_ignored_before_completion() {
        let mut state = GameState::new(7);
        start(&mut state);
        let advance = TickInput {
            advance_level: true,
            ..Default::default()
        };
        tick(&mut state, &advance, SIM_DT);
        assert_eq!(state.progression.level, 1);
    }

    #[test]
    fn test_win_and_restart() {
        let tuning = Tuning {
            level_goals: vec![30.0],
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(8, tuning);
        start(&mut state);
        state.player.size = 40.0;
        state.player.score = 12;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.progression.level_complete);

        let advance = TickInput {
            advance_level: true,
            ..Default::default()
        };
        tick(&mut state, &advance, SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().iter().any(|e| matches!(e, GameEvent::GameWon { .. })));

        // Frozen until restart
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progression.level, 1);
        assert!(state.player.score < 12);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state1, &idle, SIM_DT);
            tick(&mut state2, &idle, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.player.size, state2.player.size);
        assert_eq!(state1.player.score, state2.player.score);
        assert_eq!(state1.world.objects.len(), state2.world.objects.len());
    }

    #[test]
    fn test_autopilot_makes_progress() {
        let mut state = GameState::new(2024);
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(60 * 60) {
            tick(&mut state, &idle, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.objects_collected > 0);
    }

    #[test]
    fn test_steer_axis() {
        assert_eq!(steer_axis(Vec2::new(10.0, 0.0)), IVec2::new(1, 0));
        assert_eq!(steer_axis(Vec2::new(-1.0, -1.0)), IVec2::new(-1, -1));
        assert_eq!(steer_axis(Vec2::ZERO), IVec2::ZERO);
    }
}
