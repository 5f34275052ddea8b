//! The single-threaded loop driver
//!
//! Owns the active [`Session`], the consumer end of the input queue and the
//! outbound notifier. Each call to [`LoopDriver::run_frame`] is one frame;
//! the caller renders, yields to the window and then sleeps for whatever
//! [`LoopDriver::end_frame`] returns.

use crate::config::{Clock, GameConfig};
use crate::input::InputQueue;
use crate::notify::Notifier;
use crate::session::{FrameOutcome, Session};
use log::info;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

pub struct LoopDriver<N: Notifier> {
    config: GameConfig,
    input: InputQueue,
    notifier: N,
    session: Session,
    clock: Clock,
    seed: Option<u64>,
    sessions_played: u64,
}

impl<N: Notifier> LoopDriver<N> {
    /// Creates a driver with a fresh session on the splash screen.
    ///
    /// With a fixed `seed` every session's pipe layout is reproducible;
    /// session `n` uses `seed + n`.
    pub fn new(config: GameConfig, input: InputQueue, notifier: N, seed: Option<u64>) -> Self {
        let session = Session::new(&config, session_seed(seed, 0));
        let clock = Clock::new(&config);
        Self {
            config,
            input,
            notifier,
            session,
            clock,
            seed,
            sessions_played: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Sessions that ran through their game-over screen
    pub fn sessions_played(&self) -> u64 {
        self.sessions_played
    }

    /// Frames completed since start-up, across sessions
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Runs one frame of the active session
    pub fn run_frame(&mut self) -> LoopControl {
        match self.session.advance(&mut self.input, &mut self.notifier) {
            FrameOutcome::Continue => LoopControl::Continue,
            FrameOutcome::Quit => LoopControl::Quit,
            FrameOutcome::Finished => {
                self.sessions_played += 1;
                info!(
                    "Session {} finished with score {}, back to the splash screen",
                    self.sessions_played,
                    self.session.score()
                );
                self.session = Session::new(
                    &self.config,
                    session_seed(self.seed, self.sessions_played),
                );
                LoopControl::Continue
            }
        }
    }

    /// Closes the frame and returns the time left in its budget
    pub fn end_frame(&mut self) -> Duration {
        self.clock.tick()
    }
}

fn session_seed(base: Option<u64>, index: u64) -> u64 {
    match base {
        Some(seed) => seed.wrapping_add(index),
        None => rand::random(),
    }
}
