//! Fixed-rate frame loop
//!
//! One frame is: shell commands → exactly one simulation tick → camera →
//! audio → render snapshot → pace to the target rate. The driver is the only
//! writer of the game state; audio and the presenter only see it after the
//! tick has finished.

use std::thread;
use std::time::{Duration, Instant};

use crate::audio::AudioManager;
use crate::consts::{SIM_DT, TARGET_FPS};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::view::{Camera, RenderSnapshot, ViewportConfig};

/// Everything the shell can ask for in one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Passed straight to the simulation
    pub tick: TickInput,
    pub toggle_sound: bool,
    pub toggle_fullscreen: bool,
    /// New window size reported by the shell
    pub resize: Option<(u32, u32)>,
    pub quit: bool,
}

impl FrameInput {
    /// Drop commands that should only fire once. Held movement and the
    /// attract-mode flag survive.
    pub fn clear_one_shots(&mut self) {
        self.tick.start = false;
        self.tick.restart = false;
        self.tick.advance_level = false;
        self.toggle_sound = false;
        self.toggle_fullscreen = false;
        self.resize = None;
    }
}

/// Blocking frame-rate cap
#[derive(Debug)]
pub struct FramePacer {
    frame_time: Duration,
    next_deadline: Option<Instant>,
    // FPS tracking
    frame_times: [Option<Instant>; 60],
    frame_index: usize,
    fps: u32,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        Self {
            frame_time: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            next_deadline: None,
            frame_times: [None; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Sleep until the next frame is due. A frame that ran long resets the
    /// schedule instead of letting later frames burst to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now + self.frame_time);
        if deadline > now {
            thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.frame_time);
        } else {
            self.next_deadline = Some(now + self.frame_time);
        }
        self.track(Instant::now());
    }

    fn track(&mut self, time: Instant) {
        self.frame_times[self.frame_index] = Some(time);
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the one we are about to overwrite
        if let Some(oldest) = self.frame_times[self.frame_index] {
            let elapsed = time.duration_since(oldest).as_secs_f64();
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 / elapsed).round() as u32;
            }
        }
    }

    /// Measured frames per second over the last 60 frames (0 until warmed up)
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Owns the game state and everything that reads it
pub struct FrameDriver {
    pub state: GameState,
    pub input: FrameInput,
    pub settings: Settings,
    pub camera: Camera,
    pub viewport: ViewportConfig,
    audio: AudioManager,
    /// Fullscreen size reported by the shell
    display: (u32, u32),
    pacer: Option<FramePacer>,
    frame_limit: Option<u64>,
    frames: u64,
    last_phase: GamePhase,
}

impl FrameDriver {
    pub fn new(state: GameState, settings: Settings, mut audio: AudioManager, display: (u32, u32)) -> Self {
        let viewport = settings.viewport(display);
        let mut camera = Camera::from_viewport(&viewport);
        camera.follow(state.player.pos, state.world.size);
        audio.start_music();
        let last_phase = state.phase;
        Self {
            state,
            input: FrameInput::default(),
            settings,
            camera,
            viewport,
            audio,
            display,
            pacer: Some(FramePacer::new(TARGET_FPS)),
            frame_limit: None,
            frames: 0,
            last_phase,
        }
    }

    /// Stop by itself after `frames` frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Run as fast as possible (tests, offline replays)
    pub fn unpaced(mut self) -> Self {
        self.pacer = None;
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> u32 {
        self.pacer.as_ref().map_or(0, FramePacer::fps)
    }

    /// Run one frame with the current input. Returns `None` once the loop
    /// should stop (quit or frame limit), without touching the state.
    pub fn step(&mut self) -> Option<RenderSnapshot> {
        if self.input.quit {
            log::info!("Quit requested after {} frames", self.frames);
            return None;
        }
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            return None;
        }

        self.apply_shell_commands();

        tick(&mut self.state, &self.input.tick, SIM_DT);
        self.input.clear_one_shots();
        self.frames += 1;

        let phase = self.state.phase;
        if phase != self.last_phase {
            log::info!("Phase {:?} -> {:?}", self.last_phase, phase);
            self.last_phase = phase;
        }

        self.camera.follow(self.state.player.pos, self.state.world.size);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::SpawnFallback { relaxed } = event {
                log::warn!("{} entities spawned overlapping this frame", relaxed);
            }
        }
        self.audio.handle_all(&events);

        Some(RenderSnapshot::capture(
            &self.state,
            &self.camera,
            &self.viewport,
            &self.settings,
        ))
    }

    fn apply_shell_commands(&mut self) {
        if self.input.toggle_sound {
            self.settings.sound_enabled = self.audio.toggle_sound();
        }
        if self.input.toggle_fullscreen {
            let windowed = self.settings.window_size();
            self.viewport = self.viewport.toggled(windowed, self.display);
            self.settings.fullscreen = self.viewport.fullscreen;
            self.camera.resize(&self.viewport);
            log::info!(
                "Viewport {}x{} (fullscreen: {})",
                self.viewport.width,
                self.viewport.height,
                self.viewport.fullscreen
            );
        }
        if let Some((width, height)) = self.input.resize {
            self.viewport = self.viewport.resized(width, height);
            if !self.viewport.fullscreen {
                self.settings.window_width = width;
                self.settings.window_height = height;
            }
            self.camera.resize(&self.viewport);
        }
    }

    /// Drive the loop until quit or the frame limit. `poll` edits the input
    /// before each frame; `present` receives every snapshot. Returns the
    /// number of frames run.
    pub fn run(
        &mut self,
        mut poll: impl FnMut(&mut FrameInput, &GameState),
        mut present: impl FnMut(&RenderSnapshot),
    ) -> u64 {
        loop {
            poll(&mut self.input, &self.state);
            let Some(snapshot) = self.step() else {
                break;
            };
            present(&snapshot);
            if let Some(pacer) = &mut self.pacer {
                pacer.wait();
            }
        }
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(seed: u64) -> FrameDriver {
        FrameDriver::new(
            GameState::new(seed),
            Settings::default(),
            AudioManager::default(),
            (1920, 1080),
        )
        .unpaced()
    }

    #[test]
    fn test_one_tick_per_frame() {
        let mut d = driver(1);
        d.input.tick.start = true;
        let snap = d.step().unwrap();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(d.state.time_ticks, 1);
        d.step();
        assert_eq!(d.state.time_ticks, 2);
        assert_eq!(d.frames(), 2);
    }

    #[test]
    fn test_one_shots_are_cleared() {
        let mut d = driver(2);
        d.input.tick.start = true;
        d.input.tick.axis = glam::IVec2::new(1, 0);
        d.step();
        assert!(!d.input.tick.start);
        assert_eq!(d.input.tick.axis, glam::IVec2::new(1, 0));
    }

    #[test]
    fn test_quit_stops_without_ticking() {
        let mut d = driver(3);
        d.input.tick.start = true;
        d.input.quit = true;
        assert!(d.step().is_none());
        assert_eq!(d.state.phase, GamePhase::Start);
        assert_eq!(d.state.time_ticks, 0);
    }

    #[test]
    fn test_events_drained_each_frame() {
        let mut d = driver(4);
        d.input.tick.start = true;
        d.step();
        assert!(d.state.events.is_empty());
    }

    #[test]
    fn test_fullscreen_toggle_and_resize() {
        let mut d = driver(5);
        d.input.toggle_fullscreen = true;
        d.step();
        assert!(d.viewport.fullscreen);
        assert_eq!(d.camera.width, 1920.0);
        assert!(d.settings.fullscreen);

        // Window resize is ignored while fullscreen
        d.input.resize = Some((640, 480));
        d.step();
        assert_eq!(d.viewport.width, 1920);

        d.input.toggle_fullscreen = true;
        d.step();
        assert!(!d.viewport.fullscreen);
        assert_eq!((d.viewport.width, d.viewport.height), (800, 600));

        d.input.resize = Some((1024, 768));
        d.step();
        assert_eq!(d.camera.width, 1024.0);
        assert_eq!(d.settings.window_width, 1024);
    }

    #[test]
    fn test_toggle_sound_updates_settings() {
        let mut d = driver(6);
        d.input.toggle_sound = true;
        d.step();
        assert!(!d.settings.sound_enabled);
        d.input.toggle_sound = true;
        d.step();
        assert!(d.settings.sound_enabled);
    }

    #[test]
    fn test_run_attract_mode_with_frame_limit() {
        let mut d = driver(7).with_frame_limit(120);
        let mut presented = 0;
        let frames = d.run(|input, _| input.tick.idle_mode = true, |_| presented += 1);
        assert_eq!(frames, 120);
        assert_eq!(presented, 120);
        assert_eq!(d.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut d = driver(8);
        let frames = d.run(
            |input, state| {
                input.tick.idle_mode = true;
                input.quit = state.time_ticks >= 10;
            },
            |_| {},
        );
        assert_eq!(frames, 10);
    }

    #[test]
    fn test_pacer_measures_fps() {
        let mut pacer = FramePacer::new(1000);
        for _ in 0..70 {
            pacer.wait();
        }
        assert!(pacer.fps() > 0);
    }
}
