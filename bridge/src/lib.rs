//! # Remote Control Bridge
//!
//! This library lets external clients steer the game and watch its score. It
//! accepts WebSocket connections, turns recognized control messages into the
//! same abstract input events the local keyboard and pointer produce, and fans
//! score and game-over notifications back out to every connected peer.
//!
//! ## Core Responsibilities
//!
//! ### Input Injection
//! Each connection's reader task parses incoming text frames as JSON. A frame
//! of the form `{"type":"jump"}` becomes one `InputEvent::Flap` on the game's
//! unified input channel. Anything else (malformed JSON, other `type` values,
//! binary noise) is dropped and the connection stays open.
//!
//! ### Peer Tracking
//! The live peer set is a single mutex-guarded [`connections::ConnectionSet`].
//! The accept task inserts, reader and writer tasks remove on disconnect or
//! send failure, and the broadcaster snapshots it.
//!
//! ### Notification Fan-out
//! [`network::Broadcaster`] serializes a notification once and offers it to
//! every peer's bounded outbound queue with a non-blocking attempt. The game
//! loop never waits on a peer; a peer whose queue is closed or full is
//! removed and the rest still receive the frame.
//!
//! ## Architecture Design
//!
//! ```text
//!   accept task ──spawn──> reader task ──InputEvent──> game loop (single consumer)
//!                     └──> writer task <──String──── Broadcaster (called by game loop)
//! ```
//!
//! The bridge never touches game state. Connections outlive game sessions: a
//! peer may stay attached across game over and the next splash screen.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use bridge::network::RemoteBridge;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (events_tx, mut events_rx) = mpsc::unbounded_channel();
//!
//!     let bridge = RemoteBridge::bind("127.0.0.1:8765", events_tx).await?;
//!     let broadcaster = bridge.broadcaster();
//!     bridge.spawn();
//!
//!     while let Some(event) = events_rx.recv().await {
//!         println!("remote input: {:?}", event);
//!         broadcaster.broadcast_score(1);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod connections;
pub mod network;

pub use network::{BridgeError, Broadcaster, RemoteBridge, DEFAULT_SEND_QUEUE};
