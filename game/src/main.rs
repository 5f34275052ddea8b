use bridge::{Broadcaster, RemoteBridge, DEFAULT_SEND_QUEUE};
use clap::Parser;
use game::config::{GameConfig, DEFAULT_FPS, WINDOW_HEIGHT, WINDOW_WIDTH};
use game::driver::{LoopControl, LoopDriver};
use game::input::{input_channel, InputSender, LocalInput};
use game::rendering::{HudInfo, Renderer};
use log::info;
use macroquad::window::{next_frame, Conf};
use shared::{DEFAULT_HOST, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address the remote control bridge binds to
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port the remote control bridge listens on
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Target frames per second
    #[arg(short = 'f', long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Outbound frames a slow remote may fall behind before it is dropped
    #[arg(long, default_value_t = DEFAULT_SEND_QUEUE)]
    send_queue: usize,

    /// Fixed pipe layout seed, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = GameConfig::new(WINDOW_WIDTH, WINDOW_HEIGHT, args.fps);

    info!("Starting Flappy Bird at {} fps", config.fps);
    info!("Controls: Space/Up/click/tap to flap, Escape to quit");

    // The bridge runs on worker threads; the window owns this thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let (events, queue) = input_channel();

    let addr = format!("{}:{}", args.host, args.port);
    let bridge = runtime
        .block_on(RemoteBridge::bind(&addr, events.clone()))?
        .with_send_queue(args.send_queue);
    let broadcaster = bridge.broadcaster();
    runtime.spawn(bridge.run());

    let driver = LoopDriver::new(config, queue, broadcaster, args.seed);
    macroquad::Window::from_config(window_conf(&config), run_game(driver, events));

    Ok(())
}

fn window_conf(config: &GameConfig) -> Conf {
    Conf {
        window_title: "Flappy Bird".to_owned(),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

async fn run_game(mut driver: LoopDriver<Broadcaster>, events: InputSender) {
    let local = LocalInput::new(events);
    let mut renderer = Renderer::new(driver.config());

    loop {
        local.pump();

        if driver.run_frame() == LoopControl::Quit {
            info!("Quit requested after {} frames, exiting", driver.frame());
            std::process::exit(0);
        }

        let session = driver.session();
        let hud = HudInfo {
            remote_peers: driver.notifier().peer_count(),
        };
        renderer.render(session.world(), session.phase(), hud);

        next_frame().await;
        std::thread::sleep(driver.end_frame());
    }
}
