//! Game state and core simulation types
//!
//! Everything the frame driver mutates lives in [`GameState`]. Rendering and
//! audio only ever read it (or drain its event queue) after a tick completes.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::entity::{Color, ObjectKind, Player};
use super::level::Progression;
use super::world::{SpawnReport, World};
use crate::consts::*;
use crate::direction_to;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the start command
    Start,
    /// Active gameplay (the level-complete overlay is a flag on top of this)
    Playing,
    /// Every level cleared
    GameOver,
}

/// Discrete things that happened during a tick, for audio and effects layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    LevelStarted { level: u32, goal: f32 },
    /// The player absorbed something (audio: `on_grow`)
    Grew { size: f32, points: u32 },
    /// The player bounced off something bigger (audio: `on_shrink`)
    Shrank { size: f32 },
    Absorbed { kind: ObjectKind, pos: Vec2, radius: f32 },
    PowerUpCollected { kind: EffectKind },
    EffectExpired { kind: EffectKind },
    /// Size goal reached (audio: `on_level_complete`)
    LevelComplete { level: u32, score: u64 },
    /// Advanced past the last level (audio: `on_game_win`)
    GameWon { score: u64 },
    /// A spawn batch had to drop the no-overlap guarantee
    SpawnFallback { relaxed: usize },
}

/// An absorption particle (cosmetic, world coordinates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub color: Color,
    pub size: f32,
    /// Frames left
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Opacity in 0-1
    pub fn alpha(&self) -> f32 {
        self.life as f32 / self.max_life.max(1) as f32
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    pub world: World,
    pub progression: Progression,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = Self::fresh_player(&tuning);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world: World::new(tuning.world_size),
            progression: Progression::new(tuning.level_goals.clone()),
            tuning,
            phase: GamePhase::Start,
            player,
            time_ticks: 0,
            particles: Vec::new(),
            events: Vec::new(),
        };
        state.repopulate();
        state
    }

    fn fresh_player(tuning: &Tuning) -> Player {
        let center = Vec2::splat(tuning.world_size / 2.0);
        Player::with_stats(
            center,
            tuning.player_start_size,
            tuning.base_speed,
            tuning.min_player_size,
        )
    }

    /// Replace the world with a freshly populated one around the player
    pub fn repopulate(&mut self) {
        self.world = World::new(self.tuning.world_size);
        let report = self.world.populate(&mut self.rng, &self.player, &self.tuning);
        self.note_spawn(report);
        self.particles.clear();
    }

    /// Flag a relaxed spawn batch on the event bus
    pub fn note_spawn(&mut self, report: SpawnReport) {
        if report.relaxed > 0 {
            self.emit(GameEvent::SpawnFallback {
                relaxed: report.relaxed,
            });
        }
    }

    /// Full restart: level 1, new player at the center, new world, score discarded
    pub fn restart(&mut self) {
        self.progression.reset();
        self.player = Self::fresh_player(&self.tuning);
        self.repopulate();
        self.phase = GamePhase::Playing;
        log::info!("Game restarted");
        self.emit(GameEvent::GameStarted);
        self.emit_level_started();
    }

    /// Next level: starting radius at the current position, score carried over
    pub fn reset_player_for_level(&mut self) {
        let old = &self.player;
        let mut player = Player::with_stats(
            old.pos,
            self.tuning.player_start_size,
            self.tuning.base_speed,
            self.tuning.min_player_size,
        );
        player.score = old.score;
        player.objects_collected = old.objects_collected;
        player.clamp_to_world(self.tuning.world_size);
        self.player = player;
    }

    pub fn emit_level_started(&mut self) {
        if let Some(goal) = self.progression.current_goal() {
            let level = self.progression.level;
            self.emit(GameEvent::LevelStarted { level, goal });
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Burst of particles where an object was absorbed
    pub fn emit_absorb_particles(&mut self, pos: Vec2, radius: f32, color: Color) {
        let spread = radius.max(1.0) as i32;
        for _ in 0..ABSORB_PARTICLES {
            let jitter = Vec2::new(
                self.rng.random_range(-spread..=spread) as f32,
                self.rng.random_range(-spread..=spread) as f32,
            );
            self.particles.push(Particle {
                pos: pos + jitter,
                color,
                size: self.rng.random_range(2..=5) as f32,
                life: self.rng.random_range(15..=30),
                max_life: 30,
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Age particles and drift them into the player
    pub fn update_particles(&mut self) {
        let target = self.player.pos;
        for particle in &mut self.particles {
            particle.life = particle.life.saturating_sub(1);
            if let Some((dir, dist)) = direction_to(particle.pos, target) {
                particle.pos += dir * dist * PARTICLE_DRIFT;
            }
        }
        self.particles.retain(|p| p.life > 0);
    }
}
