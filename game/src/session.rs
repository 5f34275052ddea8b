//! One play-through: splash, play, game over
//!
//! A [`Session`] owns every entity for a single run of the game and advances
//! it one frame at a time. Transitions:
//!
//! - `Splash --flap--> Play`: score reset, player switches to normal physics
//! - `Play --collision--> GameOver`: player crashes, pipes and floor stop,
//!   a game-over notification carries the final score
//! - `GameOver --flap once the player rests on the floor-->` end of session;
//!   the driver builds a fresh one that starts on the splash screen
//! - quit in any phase ends the process
//!
//! Within a play frame collision is checked before crossings, so a frame
//! that both hits and passes a pipe scores nothing.

use crate::collision;
use crate::config::GameConfig;
use crate::entities::{
    Background, Entity, Floor, Overlay, OverlayKind, Pipes, Player, PlayerMode, Score,
};
use crate::input::InputQueue;
use crate::notify::Notifier;
use log::{debug, info};
use shared::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Splash,
    Play,
    GameOver,
}

/// What the driver should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The player tapped through the game-over screen
    Finished,
    Quit,
}

/// Every entity of one session
#[derive(Debug)]
pub struct World {
    pub background: Background,
    pub floor: Floor,
    pub pipes: Pipes,
    pub player: Player,
    pub score: Score,
    pub welcome: Overlay,
    pub game_over: Overlay,
}

impl World {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            background: Background,
            floor: Floor::new(config),
            pipes: Pipes::new(config, seed),
            player: Player::new(config),
            score: Score::default(),
            welcome: Overlay::new(OverlayKind::Welcome),
            game_over: Overlay::new(OverlayKind::GameOver),
        }
    }

    /// Fixed tick order: background, floor, pipes, score, player
    fn tick_scene(&mut self) {
        self.background.tick();
        self.floor.tick();
        self.pipes.tick();
        self.score.tick();
        self.player.tick();
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    frame: u64,
    world: World,
    last_broadcast: u32,
    game_over_sent: bool,
}

impl Session {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self::with_world(World::new(config, seed))
    }

    /// Starts a session on the splash screen with a prepared world
    pub fn with_world(mut world: World) -> Self {
        world.player.set_mode(PlayerMode::Shm);
        Self {
            phase: Phase::Splash,
            frame: 0,
            world,
            last_broadcast: 0,
            game_over_sent: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Frames advanced in this session
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn score(&self) -> u32 {
        self.world.score.value()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Advances one frame, draining the input queue exactly once
    pub fn advance(&mut self, input: &mut InputQueue, notifier: &mut dyn Notifier) -> FrameOutcome {
        let outcome = match self.phase {
            Phase::Splash => self.splash_frame(input),
            Phase::Play => self.play_frame(input, notifier),
            Phase::GameOver => self.game_over_frame(input),
        };
        self.frame += 1;
        outcome
    }

    fn splash_frame(&mut self, input: &mut InputQueue) -> FrameOutcome {
        let events = input.drain();
        if events.quit {
            return FrameOutcome::Quit;
        }
        if events.flapped() {
            self.enter_play();
            return FrameOutcome::Continue;
        }

        let world = &mut self.world;
        world.background.tick();
        world.floor.tick();
        world.player.tick();
        world.welcome.tick();
        FrameOutcome::Continue
    }

    fn play_frame(&mut self, input: &mut InputQueue, notifier: &mut dyn Notifier) -> FrameOutcome {
        if collision::collided(&self.world.player, &self.world.pipes, &self.world.floor) {
            self.enter_game_over(notifier);
            return FrameOutcome::Continue;
        }

        let world = &mut self.world;
        for pair in world.pipes.pairs_mut() {
            if pair.is_crossed() || !collision::crossed(&world.player, pair) {
                continue;
            }
            pair.mark_crossed();
            world.score.add();

            let score = world.score.value();
            if score != self.last_broadcast {
                notifier.notify(Notification::Score { value: score });
                self.last_broadcast = score;
            }
        }

        let events = input.drain();
        if events.quit {
            return FrameOutcome::Quit;
        }
        if events.flapped() {
            if events.flaps > 1 {
                debug!("Coalesced {} flaps into one", events.flaps);
            }
            world.player.flap();
        }

        world.tick_scene();
        FrameOutcome::Continue
    }

    fn game_over_frame(&mut self, input: &mut InputQueue) -> FrameOutcome {
        let events = input.drain();
        if events.quit {
            return FrameOutcome::Quit;
        }
        if events.flapped() && self.world.player.at_rest_on(&self.world.floor) {
            return FrameOutcome::Finished;
        }

        self.world.tick_scene();
        self.world.game_over.tick();
        FrameOutcome::Continue
    }

    fn enter_play(&mut self) {
        info!("Session started");
        self.world.score.reset();
        self.world.player.set_mode(PlayerMode::Normal);
        self.last_broadcast = 0;
        self.phase = Phase::Play;
    }

    fn enter_game_over(&mut self, notifier: &mut dyn Notifier) {
        let score = self.world.score.value();
        info!("Game over with score {} after {} frames", score, self.frame);

        self.world.player.set_mode(PlayerMode::Crashed);
        self.world.pipes.stop();
        self.world.floor.stop();
        self.phase = Phase::GameOver;

        if !self.game_over_sent {
            notifier.notify(Notification::GameOver { score });
            self.game_over_sent = true;
        }
    }
}
