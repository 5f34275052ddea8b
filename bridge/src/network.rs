//! Bridge network layer: WebSocket listener, per-connection tasks and fan-out

use crate::connections::ConnectionSet;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use shared::{parse_control, InputEvent, Notification};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Default capacity of each peer's outbound queue
pub const DEFAULT_SEND_QUEUE: usize = 32;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accepts remote controllers and turns their jumps into input events
pub struct RemoteBridge {
    listener: TcpListener,
    peers: Arc<Mutex<ConnectionSet>>,
    events: mpsc::UnboundedSender<InputEvent>,
    send_queue: usize,
}

impl RemoteBridge {
    /// Binds the listener. Accepted peers feed `events`.
    pub async fn bind(
        addr: &str,
        events: mpsc::UnboundedSender<InputEvent>,
    ) -> Result<Self, BridgeError> {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "Remote control bridge listening on ws://{}",
            listener.local_addr()?
        );

        Ok(RemoteBridge {
            listener,
            peers: Arc::new(Mutex::new(ConnectionSet::new())),
            events,
            send_queue: DEFAULT_SEND_QUEUE,
        })
    }

    /// Sets how many outbound frames may wait for a slow peer before it is
    /// dropped.
    pub fn with_send_queue(mut self, send_queue: usize) -> Self {
        self.send_queue = send_queue.max(1);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BridgeError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle used by the game loop to fan out notifications
    pub fn broadcaster(&self) -> Broadcaster {
        Broadcaster::new(Arc::clone(&self.peers))
    }

    /// Accept loop. Runs until the task is dropped.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let peers = Arc::clone(&self.peers);
                    let events = self.events.clone();
                    let send_queue = self.send_queue;

                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, addr, peers, events, send_queue).await
                        {
                            debug!("Connection from {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// Spawns the accept loop on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Serves one peer from handshake to removal
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    peers: Arc<Mutex<ConnectionSet>>,
    events: mpsc::UnboundedSender<InputEvent>,
    send_queue: usize,
) -> Result<(), BridgeError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (sink, mut source) = ws_stream.split();

    let (tx, rx) = mpsc::channel::<String>(send_queue);
    let (peer_id, removed) = {
        let mut set = peers.lock();
        let peer_id = set.add_peer(addr, tx);
        (peer_id, set.removal_signal(peer_id).unwrap_or_default())
    };

    let writer = spawn_writer(peer_id, sink, rx, Arc::clone(&peers));

    // A peer dropped by a broadcast or by its writer stops steering at once.
    let result = tokio::select! {
        biased;
        _ = removed.notified() => {
            debug!("Peer {} was removed, closing its connection", peer_id);
            Ok(())
        }
        result = read_controls(peer_id, &mut source, &events) => result,
    };

    peers.lock().remove_peer(peer_id);
    writer.abort();
    result
}

/// Drains a peer's outbound queue into its socket
///
/// The queue closes once the peer has been removed from the set and the last
/// broadcast snapshot holding its sender is gone.
fn spawn_writer(
    peer_id: u32,
    mut sink: WsSink,
    mut rx: mpsc::Receiver<String>,
    peers: Arc<Mutex<ConnectionSet>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = sink.send(Message::text(text)).await {
                warn!("Send to peer {} failed: {}", peer_id, e);
                peers.lock().remove_peer(peer_id);
                return;
            }
        }
        if let Err(e) = sink.close().await {
            debug!("Closing peer {} failed: {}", peer_id, e);
        }
    })
}

/// Reads frames until the peer goes away
///
/// Recognized jumps become `InputEvent::Flap`; everything else is dropped.
async fn read_controls(
    peer_id: u32,
    source: &mut WsSource,
    events: &mpsc::UnboundedSender<InputEvent>,
) -> Result<(), BridgeError> {
    while let Some(message) = source.next().await {
        let message = message?;
        if message.is_close() {
            break;
        }
        if !(message.is_text() || message.is_binary()) {
            continue;
        }

        let text = match message.to_text() {
            Ok(text) => text,
            Err(_) => {
                debug!("Peer {} sent a non UTF-8 frame", peer_id);
                continue;
            }
        };

        match parse_control(text) {
            Some(control) => {
                if events.send(control.input_event()).is_err() {
                    debug!("Input queue closed, dropping peer {}", peer_id);
                    break;
                }
            }
            None => debug!("Ignoring message from peer {}: {}", peer_id, text),
        }
    }

    Ok(())
}

/// Best-effort fan-out of notifications to every live peer
///
/// Never blocks: each send is a single non-blocking attempt on the peer's
/// bounded queue. A closed or full queue is a send failure and removes the
/// peer; the remaining peers still receive the frame.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    peers: Arc<Mutex<ConnectionSet>>,
}

impl Broadcaster {
    pub fn new(peers: Arc<Mutex<ConnectionSet>>) -> Self {
        Self { peers }
    }

    /// Sends one notification to all peers. Returns how many accepted it.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let text = match notification.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode {:?}: {}", notification, e);
                return 0;
            }
        };

        let snapshot = self.peers.lock().snapshot();
        if snapshot.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        let mut failed = Vec::new();

        for (peer_id, sender) in snapshot {
            match sender.try_send(text.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Peer {} is not keeping up, dropping it", peer_id);
                    failed.push(peer_id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Peer {} already closed", peer_id);
                    failed.push(peer_id);
                }
            }
        }

        if !failed.is_empty() {
            let mut peers = self.peers.lock();
            for peer_id in failed {
                peers.remove_peer(peer_id);
            }
        }

        debug!("Broadcast {} to {} peers", text, delivered);
        delivered
    }

    pub fn broadcast_score(&self, value: u32) -> usize {
        self.broadcast(&Notification::Score { value })
    }

    pub fn broadcast_game_over(&self, score: u32) -> usize {
        self.broadcast(&Notification::GameOver { score })
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().len()
    }

    pub fn peer_ids(&self) -> Vec<u32> {
        self.peers.lock().peer_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Instant;
    use tokio::time::{sleep, timeout};
    use tokio_test::assert_ok;

    fn test_addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    fn shared_set() -> Arc<Mutex<ConnectionSet>> {
        Arc::new(Mutex::new(ConnectionSet::new()))
    }

    async fn wait_for_peers(broadcaster: &Broadcaster, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while broadcaster.peer_count() != count {
            assert!(
                Instant::now() < deadline,
                "expected {} peers, have {}",
                count,
                broadcaster.peer_count()
            );
            sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn test_broadcast_without_peers() {
        let broadcaster = Broadcaster::new(shared_set());
        assert_eq!(broadcaster.broadcast_score(1), 0);
    }

    #[test]
    fn test_failed_peer_does_not_block_others() {
        let peers = shared_set();
        let (tx_a, rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let a = peers.lock().add_peer(test_addr(6000), tx_a);
        let b = peers.lock().add_peer(test_addr(6001), tx_b);
        drop(rx_a);

        let broadcaster = Broadcaster::new(Arc::clone(&peers));
        assert_eq!(broadcaster.broadcast_score(3), 1);

        assert_eq!(rx_b.try_recv().unwrap(), r#"{"type":"score","value":3}"#);
        assert!(!peers.lock().contains(a));
        assert_eq!(broadcaster.peer_ids(), vec![b]);

        // A stays gone on the next broadcast.
        assert_eq!(broadcaster.broadcast_game_over(3), 1);
        assert_eq!(rx_b.try_recv().unwrap(), r#"{"type":"gameOver","score":3}"#);
    }

    #[test]
    fn test_stalled_peer_is_dropped() {
        let peers = shared_set();
        let (tx, mut rx) = mpsc::channel(1);
        let id = peers.lock().add_peer(test_addr(6000), tx);

        let broadcaster = Broadcaster::new(Arc::clone(&peers));
        assert_eq!(broadcaster.broadcast_score(1), 1);
        assert_eq!(broadcaster.broadcast_score(2), 0);
        assert!(!peers.lock().contains(id));

        // Frames queued before the drop are still there for the writer.
        assert_eq!(rx.try_recv().unwrap(), r#"{"type":"score","value":1}"#);
    }

    #[tokio::test]
    async fn test_jump_becomes_flap() {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let bridge = assert_ok!(RemoteBridge::bind("127.0.0.1:0", events_tx).await);
        let addr = bridge.local_addr().unwrap();
        let broadcaster = bridge.broadcaster();
        bridge.spawn();

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();
        wait_for_peers(&broadcaster, 1).await;

        ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
        ws.send(Message::text("not json")).await.unwrap();
        ws.send(Message::text(r#"{"type":"jump"}"#)).await.unwrap();

        let event = timeout(Duration::from_secs(2), events_rx.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(InputEvent::Flap));

        // Ignored frames neither produced events nor closed the connection.
        assert!(events_rx.try_recv().is_err());
        assert_eq!(broadcaster.peer_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_connected_peer() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let bridge = RemoteBridge::bind("127.0.0.1:0", events_tx).await.unwrap();
        let addr = bridge.local_addr().unwrap();
        let broadcaster = bridge.broadcaster();
        bridge.spawn();

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();
        wait_for_peers(&broadcaster, 1).await;

        assert_eq!(broadcaster.broadcast_game_over(5), 1);

        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(frame.to_text().unwrap(), r#"{"type":"gameOver","score":5}"#);
    }

    #[tokio::test]
    async fn test_disconnect_removes_peer() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let bridge = RemoteBridge::bind("127.0.0.1:0", events_tx)
            .await
            .unwrap()
            .with_send_queue(4);
        let addr = bridge.local_addr().unwrap();
        let broadcaster = bridge.broadcaster();
        bridge.spawn();

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();
        wait_for_peers(&broadcaster, 1).await;

        ws.close(None).await.unwrap();
        wait_for_peers(&broadcaster, 0).await;
    }

    #[tokio::test]
    async fn test_dropped_peer_can_no_longer_steer() {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let bridge = RemoteBridge::bind("127.0.0.1:0", events_tx)
            .await
            .unwrap()
            .with_send_queue(1);
        let addr = bridge.local_addr().unwrap();
        let broadcaster = bridge.broadcaster();
        bridge.spawn();

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
            .await
            .unwrap();
        wait_for_peers(&broadcaster, 1).await;

        // No await in between, so the writer cannot drain the first frame.
        assert_eq!(broadcaster.broadcast_score(1), 1);
        assert_eq!(broadcaster.broadcast_score(2), 0);
        assert_eq!(broadcaster.peer_count(), 0);

        // The jump may or may not make it onto the wire before the close.
        let _ = ws.send(Message::text(r#"{"type":"jump"}"#)).await;
        let event = timeout(Duration::from_millis(300), events_rx.recv()).await;
        assert!(!matches!(event, Ok(Some(_))), "removed peer injected {:?}", event);

        // The server side hangs up.
        let closed = timeout(Duration::from_secs(2), async {
            loop {
                match ws.next().await {
                    Some(Ok(message)) if !message.is_close() => continue,
                    _ => break,
                }
            }
        })
        .await;
        assert_ok!(closed);
    }
}

