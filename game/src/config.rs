//! Window geometry, tick rate and the frame clock

use std::time::{Duration, Instant};

pub const DEFAULT_FPS: u32 = 30;
pub const WINDOW_WIDTH: f32 = 288.0;
pub const WINDOW_HEIGHT: f32 = 512.0;

/// Static game settings, read by every entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    /// Playable height; the floor's top edge sits here
    pub viewport_height: f32,
    pub fps: u32,
}

impl GameConfig {
    pub fn new(width: f32, height: f32, fps: u32) -> Self {
        Self {
            width,
            height,
            viewport_height: height * 0.79,
            fps: fps.max(1),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(WINDOW_WIDTH, WINDOW_HEIGHT, DEFAULT_FPS)
    }
}

/// Per-frame counters, advanced only by the loop driver
#[derive(Debug)]
pub struct Clock {
    frame_duration: Duration,
    frame: u64,
    last_tick: Instant,
}

impl Clock {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            frame_duration: config.frame_duration(),
            frame: 0,
            last_tick: Instant::now(),
        }
    }

    /// Frames completed since start-up
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Closes the current frame
    ///
    /// Returns how long the caller should sleep to hold the target tick rate.
    /// A frame that overran its budget returns zero and the next one starts
    /// from now, so the loop never tries to catch up.
    pub fn tick(&mut self) -> Duration {
        self.frame += 1;

        let elapsed = self.last_tick.elapsed();
        let wait = self.frame_duration.saturating_sub(elapsed);
        self.last_tick = Instant::now() + wait;
        wait
    }
}
