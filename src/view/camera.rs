//! World-to-screen camera and display geometry

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};

/// Display geometry handed to the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::windowed(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT)
    }
}

impl ViewportConfig {
    pub fn windowed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fullscreen: false,
        }
    }

    /// Switch between the windowed size and the display size reported by the
    /// shell
    pub fn toggled(&self, windowed: (u32, u32), display: (u32, u32)) -> Self {
        if self.fullscreen {
            Self::windowed(windowed.0, windowed.1)
        } else {
            Self {
                width: display.0,
                height: display.1,
                fullscreen: true,
            }
        }
    }

    /// Window resize; ignored while fullscreen
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if self.fullscreen {
            *self
        } else {
            Self::windowed(width, height)
        }
    }
}

/// Top-left anchored camera following the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World position of the screen's top-left corner
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            width,
            height,
        }
    }

    pub fn from_viewport(viewport: &ViewportConfig) -> Self {
        Self::new(viewport.width as f32, viewport.height as f32)
    }

    pub fn resize(&mut self, viewport: &ViewportConfig) {
        self.width = viewport.width as f32;
        self.height = viewport.height as f32;
    }

    /// Center on `target`, keeping the view inside the world
    pub fn follow(&mut self, target: Vec2, world_size: f32) {
        let half = Vec2::new((self.width / 2.0).floor(), (self.height / 2.0).floor());
        let max = Vec2::new(world_size - self.width, world_size - self.height).max(Vec2::ZERO);
        self.offset = (target - half).clamp(Vec2::ZERO, max);
    }

    /// World to screen coordinates
    pub fn apply(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    /// True when a circle is on screen, with a buffer of twice its radius
    pub fn is_visible(&self, world: Vec2, radius: f32) -> bool {
        let screen = self.apply(world);
        let buffer = radius * 2.0;
        screen.x >= -buffer
            && screen.x <= self.width + buffer
            && screen.y >= -buffer
            && screen.y <= self.height + buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centers_on_target() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow(Vec2::new(1500.0, 1500.0), 3000.0);
        assert_eq!(camera.offset, Vec2::new(1100.0, 1200.0));
        assert_eq!(camera.apply(Vec2::new(1500.0, 1500.0)), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_follow_clamps_to_world() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.follow(Vec2::new(10.0, 2990.0), 3000.0);
        assert_eq!(camera.offset, Vec2::new(0.0, 2400.0));
    }

    #[test]
    fn test_visibility_buffer() {
        let camera = Camera::new(800.0, 600.0);
        assert!(camera.is_visible(Vec2::new(-15.0, 10.0), 10.0));
        assert!(!camera.is_visible(Vec2::new(-25.0, 10.0), 10.0));
    }

    #[test]
    fn test_viewport_toggle_round_trip() {
        let windowed = ViewportConfig::default();
        let full = windowed.toggled((800, 600), (1920, 1080));
        assert!(full.fullscreen);
        assert_eq!((full.width, full.height), (1920, 1080));
        assert_eq!(full.resized(640, 480), full);
        let back = full.toggled((800, 600), (1920, 1080));
        assert_eq!(back, windowed);
    }
}
