//! Event-driven audio dispatch
//!
//! The simulation never plays sound itself. After each tick the frame driver
//! feeds the drained [`GameEvent`]s to [`AudioManager::handle`], which turns
//! them into [`SoundEffect`]s at the current volume and hands them to an
//! [`AudioSink`]. Sinks are procedural: every effect describes its own tone,
//! no sound files needed.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Object absorbed or power-up collected
    Grow,
    /// Bounced off something bigger
    Shrink,
    /// Size goal reached
    LevelComplete,
    /// Final level cleared
    GameWin,
}

/// A simple procedural beep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub duration: f32,
    /// Relative loudness before volume scaling
    pub gain: f32,
}

/// Background loop
pub const MUSIC_TONE: Tone = Tone {
    frequency: 200.0,
    duration: 2.0,
    gain: 0.2,
};

impl SoundEffect {
    pub fn tone(self) -> Tone {
        match self {
            SoundEffect::Grow => Tone {
                frequency: 800.0,
                duration: 0.3,
                gain: 0.5,
            },
            SoundEffect::Shrink => Tone {
                frequency: 300.0,
                duration: 0.3,
                gain: 0.5,
            },
            SoundEffect::LevelComplete => Tone {
                frequency: 600.0,
                duration: 1.0,
                gain: 0.5,
            },
            SoundEffect::GameWin => Tone {
                frequency: 600.0,
                duration: 1.5,
                gain: 0.6,
            },
        }
    }

    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Grew { .. } | GameEvent::PowerUpCollected { .. } => Some(SoundEffect::Grow),
            GameEvent::Shrank { .. } => Some(SoundEffect::Shrink),
            GameEvent::LevelComplete { .. } => Some(SoundEffect::LevelComplete),
            GameEvent::GameWon { .. } => Some(SoundEffect::GameWin),
            _ => None,
        }
    }
}

/// Output device for sound effects and the music loop
pub trait AudioSink {
    /// Play a one-shot effect. `volume` is already scaled (0.0 - 1.0).
    fn play(&mut self, effect: SoundEffect, volume: f32);

    /// Start, resume or pause the background loop
    fn set_music(&mut self, playing: bool, volume: f32);
}

/// Headless sink that only logs what would be heard
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        let tone = effect.tone();
        log::debug!(
            "sfx {:?}: {:.0} Hz for {:.1}s at {:.2}",
            effect,
            tone.frequency,
            tone.duration,
            volume * tone.gain
        );
    }

    fn set_music(&mut self, playing: bool, volume: f32) {
        log::debug!(
            "music {} at {:.2}",
            if playing { "playing" } else { "paused" },
            volume * MUSIC_TONE.gain
        );
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(LogSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings, sink: Box<dyn AudioSink>) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_music_volume(settings.music_volume);
        audio.muted = !settings.sound_enabled;
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Start the background loop unless muted
    pub fn start_music(&mut self) {
        if !self.muted {
            let vol = self.music_level();
            self.sink.set_music(true, vol);
        }
    }

    /// Flip sound on/off, pausing or resuming the music. Returns true when
    /// sound is now on.
    pub fn toggle_sound(&mut self) -> bool {
        self.muted = !self.muted;
        let vol = self.music_level();
        self.sink.set_music(!self.muted, vol);
        log::info!("Sound {}", if self.muted { "off" } else { "on" });
        !self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn music_level(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// React to one simulation event
    pub fn handle(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn handle_all(&mut self, events: &[GameEvent]) {
        for event in events {
            self.handle(event);
        }
    }
}
