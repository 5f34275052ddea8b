//! Live set of remote controllers attached to the game
//!
//! This module tracks every peer currently connected to the bridge:
//! - Peer registration on accept and removal on disconnect or send failure
//! - Per-peer outbound queues fed by the broadcaster
//! - Snapshots for broadcasting without holding the lock during sends
//!
//! Peers are independent of game sessions: a controller stays attached across
//! game over and the next splash screen.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};

/// One connected remote controller
///
/// The peer's socket is owned by its connection tasks; the set only keeps
/// the handle used to queue outbound text frames for it.
#[derive(Debug)]
pub struct Peer {
    /// Unique peer identifier assigned by the set
    pub id: u32,
    /// Remote address, used for logging
    pub addr: SocketAddr,
    /// When the peer was accepted
    pub connected_at: Instant,
    /// Bounded queue drained by the peer's writer task
    pub sender: mpsc::Sender<String>,
    /// Fired once when the peer leaves the set, for whatever reason
    removed: Arc<Notify>,
}

impl Peer {
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
            removed: Arc::new(Notify::new()),
        }
    }

    /// How long the peer has been attached
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Registry of all live peers
///
/// The set is shared between the accept task (insert), each connection's
/// reader and writer tasks (remove) and the broadcaster (snapshot, remove).
/// Callers guard it with a single mutex and never hold that lock across an
/// await point or a send.
#[derive(Debug)]
pub struct ConnectionSet {
    peers: HashMap<u32, Peer>,
    next_peer_id: u32,
}

impl ConnectionSet {
    /// Creates an empty set. Peer IDs start from 1.
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            next_peer_id: 1,
        }
    }

    /// Registers a newly accepted peer and returns its ID
    pub fn add_peer(&mut self, addr: SocketAddr, sender: mpsc::Sender<String>) -> u32 {
        let peer_id = self.next_peer_id;
        self.next_peer_id += 1;

        info!("Peer {} connected from {}", peer_id, addr);
        self.peers.insert(peer_id, Peer::new(peer_id, addr, sender));

        peer_id
    }

    /// Removes a peer and signals its connection to shut down
    ///
    /// Returns true if the peer was present. Both the reader and the writer
    /// of a dying connection may race to remove it, so a second removal is
    /// a no-op.
    pub fn remove_peer(&mut self, peer_id: u32) -> bool {
        match self.peers.remove(&peer_id) {
            Some(peer) => {
                peer.removed.notify_one();
                info!(
                    "Peer {} ({}) disconnected after {:.1}s",
                    peer.id,
                    peer.addr,
                    peer.uptime().as_secs_f32()
                );
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, peer_id: u32) -> bool {
        self.peers.contains_key(&peer_id)
    }

    pub fn get(&self, peer_id: u32) -> Option<&Peer> {
        self.peers.get(&peer_id)
    }

    /// Signal that completes once the peer is removed
    ///
    /// A removal that happens before the caller starts waiting is not lost.
    pub fn removal_signal(&self, peer_id: u32) -> Option<Arc<Notify>> {
        self.peers.get(&peer_id).map(|peer| Arc::clone(&peer.removed))
    }

    /// Copies out the outbound handle of every live peer
    ///
    /// Broadcasts iterate the copy, so removals that happen while a
    /// broadcast is in flight never invalidate it.
    pub fn snapshot(&self) -> Vec<(u32, mpsc::Sender<String>)> {
        let mut peers: Vec<(u32, mpsc::Sender<String>)> = self
            .peers
            .values()
            .map(|peer| (peer.id, peer.sender.clone()))
            .collect();
        peers.sort_by_key(|(id, _)| *id);
        peers
    }

    pub fn peer_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.peers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}
