use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{ControlMessage, Notification, DEFAULT_HOST, DEFAULT_PORT};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tokio_tungstenite::tungstenite::Message;

/// Remote controller for the game: sends jumps, prints the score
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bridge address to connect to
    #[arg(short = 's', long, default_value_t = format!("ws://{}:{}", DEFAULT_HOST, DEFAULT_PORT))]
    server: String,

    /// Send a jump every N milliseconds instead of one per line typed on stdin
    #[arg(short = 'a', long)]
    auto: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let (ws_stream, _) = tokio_tungstenite::connect_async(args.server.as_str()).await?;
    info!("Connected to {}", args.server);

    let (mut sink, mut source) = ws_stream.split();
    let jump = ControlMessage::Jump.to_json()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_millis(args.auto.unwrap_or(1000).max(1)));

    match args.auto {
        Some(ms) => println!("Jumping every {}ms, Ctrl+C to stop", ms),
        None => println!("Press Enter to jump, Ctrl+D to stop"),
    }

    loop {
        tokio::select! {
            frame = source.next() => {
                match frame {
                    Some(Ok(message)) if message.is_text() => {
                        let text = message.to_text()?;
                        match serde_json::from_str::<Notification>(text) {
                            Ok(Notification::Score { value }) => println!("Score: {}", value),
                            Ok(Notification::GameOver { score }) => {
                                println!("Game over! Final score: {}", score)
                            }
                            Err(_) => warn!("Unexpected message: {}", text),
                        }
                    }
                    Some(Ok(message)) if message.is_close() => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Connection error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            line = lines.next_line(), if args.auto.is_none() => {
                match line? {
                    Some(_) => sink.send(Message::text(jump.clone())).await?,
                    None => break,
                }
            }

            _ = ticker.tick(), if args.auto.is_some() => {
                sink.send(Message::text(jump.clone())).await?;
            }
        }
    }

    let _ = sink.close().await;
    info!("Disconnected");

    Ok(())
}
