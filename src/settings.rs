//! Game settings and preferences
//!
//! Persisted as JSON next to the binary, separately from balance tuning.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};
use crate::view::ViewportConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Sound on/off (toggled in game)
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Display ===
    /// Start in fullscreen
    pub fullscreen: bool,
    /// Windowed size
    pub window_width: u32,
    pub window_height: u32,

    // === Visual Effects ===
    /// Absorption particles
    pub particles: bool,
    /// Player trail
    pub trails: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            fullscreen: false,
            window_width: DEFAULT_SCREEN_WIDTH,
            window_height: DEFAULT_SCREEN_HEIGHT,

            particles: true,
            trails: true,
        }
    }
}

impl Settings {
    /// Windowed size, never zero
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width.max(1), self.window_height.max(1))
    }

    /// Initial viewport. `display` is the fullscreen size reported by the
    /// shell.
    pub fn viewport(&self, display: (u32, u32)) -> ViewportConfig {
        let (width, height) = self.window_size();
        let windowed = ViewportConfig::windowed(width, height);
        if self.fullscreen {
            windowed.toggled((width, height), display)
        } else {
            windowed
        }
    }

    /// Clamp volumes into range after loading hand-edited files
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }

    /// Load settings from disk, falling back to defaults on any problem
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
