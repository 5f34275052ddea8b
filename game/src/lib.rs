//! # Flappy Bird Game Library
//!
//! This library holds the whole single-player game: entities and their
//! physics, the per-session state machine, the unified input queue and the
//! macroquad renderer. Remote controllers reach it only through the input
//! queue and the [`notify::Notifier`] seam; the WebSocket side lives in the
//! `bridge` crate.
//!
//! ## Architecture Overview
//!
//! ### Single Loop Driver
//! Exactly one task advances the game. Once per frame it drains every input
//! event queued since the previous frame, advances the active session and
//! hands the world to the renderer. Nothing else mutates game state.
//!
//! ### Unified Input
//! Keyboard, pointer and touch input are normalized into the same
//! [`shared::InputEvent`] values the bridge produces for remote `jump`
//! messages. Any number of flaps in one frame produce a single impulse.
//!
//! ### Notifications
//! The session reports score changes and the end of a run through a
//! [`notify::Notifier`]. In the binary that is the bridge's broadcaster; in
//! tests it is a plain `Vec` that records what was sent.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! Window geometry, target frame rate and the frame clock.
//!
//! ### Entities Module (`entities`)
//! Background, floor, pipes, player, score and the two overlays, each with
//! its own per-frame `tick`.
//!
//! ### Collision Module (`collision`)
//! Pure predicates: player against floor, player against pipes, and whether
//! the player has crossed a pipe pair.
//!
//! ### Session Module (`session`)
//! One play-through from the splash screen to the end of the game-over
//! screen.
//!
//! ### Driver Module (`driver`)
//! Runs frames, replaces finished sessions and paces the loop.
//!
//! ### Input Module (`input`)
//! The unified input channel and local input polling.
//!
//! ### Rendering Module (`rendering`)
//! Draws the world with macroquad shapes plus a small remote-peer indicator.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use game::config::GameConfig;
//! use game::driver::{LoopControl, LoopDriver};
//! use game::input::input_channel;
//!
//! let (events, queue) = input_channel();
//! let notes: Vec<shared::Notification> = Vec::new();
//! let mut driver = LoopDriver::new(GameConfig::default(), queue, notes, None);
//!
//! events.send(shared::InputEvent::Flap).unwrap();
//! while driver.run_frame() == LoopControl::Continue {
//!     std::thread::sleep(driver.end_frame());
//! }
//! ```

pub mod collision;
pub mod config;
pub mod driver;
pub mod entities;
pub mod input;
pub mod notify;
pub mod rendering;
pub mod session;
