//! Simulation objects. Each advances exactly one frame per `tick()`.

use crate::collision::Rect;
use crate::config::GameConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PLAYER_WIDTH: f32 = 34.0;
pub const PLAYER_HEIGHT: f32 = 24.0;
pub const PIPE_WIDTH: f32 = 52.0;
pub const PIPE_HEIGHT: f32 = 320.0;
pub const PIPE_GAP: f32 = 120.0;
/// Horizontal pipe travel per frame
pub const PIPE_SPEED: f32 = 5.0;
pub const FLOOR_SPEED: f32 = 4.0;
/// Width of the floor texture beyond the window; the scroll wraps on it
pub const FLOOR_OVERHANG: f32 = 48.0;

pub trait Entity {
    fn tick(&mut self);
}

/// Static sky. Ticks only to keep the fixed tick order honest.
#[derive(Debug, Default)]
pub struct Background;

impl Entity for Background {
    fn tick(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct Floor {
    pub x: f32,
    /// Top edge of the floor, the line the player crashes into
    pub y: f32,
    vel_x: f32,
}

impl Floor {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: 0.0,
            y: config.viewport_height,
            vel_x: FLOOR_SPEED,
        }
    }

    pub fn stop(&mut self) {
        self.vel_x = 0.0;
    }

    pub fn is_moving(&self) -> bool {
        self.vel_x != 0.0
    }
}

impl Entity for Floor {
    fn tick(&mut self) {
        self.x = -((-self.x + self.vel_x) % FLOOR_OVERHANG);
    }
}

/// One gap the player has to fly through
#[derive(Debug, Clone)]
pub struct PipePair {
    pub x: f32,
    /// Top of the gap; the upper pipe ends here
    pub gap_y: f32,
    vel_x: f32,
    crossed: bool,
}

impl PipePair {
    pub fn new(x: f32, gap_y: f32) -> Self {
        Self {
            x,
            gap_y,
            vel_x: -PIPE_SPEED,
            crossed: false,
        }
    }

    pub fn upper(&self) -> Rect {
        Rect::new(self.x, self.gap_y - PIPE_HEIGHT, PIPE_WIDTH, PIPE_HEIGHT)
    }

    pub fn lower(&self) -> Rect {
        Rect::new(self.x, self.gap_y + PIPE_GAP, PIPE_WIDTH, PIPE_HEIGHT)
    }

    pub fn cx(&self) -> f32 {
        self.x + PIPE_WIDTH / 2.0
    }

    pub fn is_crossed(&self) -> bool {
        self.crossed
    }

    /// Flags the pair as passed. Returns false if it already was; the flag
    /// never goes back.
    pub fn mark_crossed(&mut self) -> bool {
        let first = !self.crossed;
        self.crossed = true;
        first
    }

    pub fn stop(&mut self) {
        self.vel_x = 0.0;
    }
}

impl Entity for PipePair {
    fn tick(&mut self) {
        self.x += self.vel_x;
    }
}

/// Ordered pipe pairs, oldest (leftmost) first
#[derive(Debug)]
pub struct Pipes {
    pairs: Vec<PipePair>,
    rng: StdRng,
    width: f32,
    viewport_height: f32,
    stopped: bool,
}

impl Pipes {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut pipes = Self {
            pairs: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            width: config.width,
            viewport_height: config.viewport_height,
            stopped: false,
        };
        pipes.spawn_initial();
        pipes
    }

    /// Builds a set from explicit pairs, bypassing random placement
    pub fn from_pairs(config: &GameConfig, pairs: Vec<PipePair>) -> Self {
        Self {
            pairs,
            rng: StdRng::seed_from_u64(0),
            width: config.width,
            viewport_height: config.viewport_height,
            stopped: false,
        }
    }

    fn spawn_initial(&mut self) {
        let first_x = self.width + PIPE_WIDTH * 3.0;
        let first = self.random_pair(first_x);
        let second = self.random_pair(first_x + PIPE_WIDTH * 3.5);
        self.pairs.push(first);
        self.pairs.push(second);
    }

    fn random_pair(&mut self, x: f32) -> PipePair {
        let span = ((self.viewport_height * 0.6 - PIPE_GAP) as i32).max(1);
        let offset = (self.viewport_height * 0.2) as i32;
        let gap_y = self.rng.gen_range(0..span) + offset;
        PipePair::new(x, gap_y as f32)
    }

    fn can_spawn(&self) -> bool {
        match self.pairs.last() {
            Some(last) => self.width - (last.x + PIPE_WIDTH) > PIPE_WIDTH * 2.5,
            None => true,
        }
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        for pair in &mut self.pairs {
            pair.stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn pairs(&self) -> &[PipePair] {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut [PipePair] {
        &mut self.pairs
    }
}

impl Entity for Pipes {
    fn tick(&mut self) {
        if !self.stopped && self.can_spawn() {
            let pair = self.random_pair(self.width + 10.0);
            self.pairs.push(pair);
        }
        self.pairs.retain(|pair| pair.x >= -PIPE_WIDTH);

        for pair in &mut self.pairs {
            pair.tick();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    /// Idle bobbing on the splash screen
    Shm,
    Normal,
    Crashed,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Tilt in degrees, positive is nose up
    pub rot: f32,
    vel_y: f32,
    max_vel_y: f32,
    min_vel_y: f32,
    acc_y: f32,
    vel_rot: f32,
    rot_min: f32,
    rot_max: f32,
    flap_acc: f32,
    flapped: bool,
    min_y: f32,
    max_y: f32,
    mode: PlayerMode,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let mut player = Self {
            x: (config.width * 0.2).floor(),
            y: ((config.height - PLAYER_HEIGHT) / 2.0).floor(),
            w: PLAYER_WIDTH,
            h: PLAYER_HEIGHT,
            rot: 0.0,
            vel_y: 0.0,
            max_vel_y: 0.0,
            min_vel_y: 0.0,
            acc_y: 0.0,
            vel_rot: 0.0,
            rot_min: -90.0,
            rot_max: 20.0,
            flap_acc: -9.0,
            flapped: false,
            min_y: -2.0 * PLAYER_HEIGHT,
            max_y: config.viewport_height - PLAYER_HEIGHT * 0.75,
            mode: PlayerMode::Shm,
        };
        player.set_mode(PlayerMode::Shm);
        player
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode
    }

    pub fn vel_y(&self) -> f32 {
        self.vel_y
    }

    pub fn set_mode(&mut self, mode: PlayerMode) {
        self.mode = mode;
        match mode {
            PlayerMode::Shm => {
                self.vel_y = 1.0;
                self.max_vel_y = 4.0;
                self.min_vel_y = -4.0;
                self.acc_y = 0.5;
                self.rot = 0.0;
                self.vel_rot = 0.0;
            }
            PlayerMode::Normal => {
                self.vel_y = -9.0;
                self.max_vel_y = 10.0;
                self.min_vel_y = -8.0;
                self.acc_y = 1.0;
                self.rot = 80.0;
                self.vel_rot = -3.0;
                self.flapped = false;
            }
            PlayerMode::Crashed => {
                self.acc_y = 2.0;
                self.vel_y = 7.0;
                self.max_vel_y = 15.0;
                self.vel_rot = -8.0;
            }
        }
    }

    /// Instant upward impulse. Sets the velocity rather than adding to it,
    /// so repeated flaps within one frame stack to a single impulse.
    pub fn flap(&mut self) {
        if self.y > self.min_y {
            self.vel_y = self.flap_acc;
            self.flapped = true;
            self.rot = 80.0;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn cx(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Whether the player's lower edge has settled on the floor line
    pub fn at_rest_on(&self, floor: &Floor) -> bool {
        self.y + self.h >= floor.y - 1.0
    }

    fn rotate(&mut self) {
        self.rot = (self.rot + self.vel_rot).clamp(self.rot_min, self.rot_max);
    }

    fn tick_shm(&mut self) {
        if self.vel_y >= self.max_vel_y || self.vel_y <= self.min_vel_y {
            self.acc_y = -self.acc_y;
        }
        self.vel_y += self.acc_y;
        self.y += self.vel_y;
    }

    fn tick_normal(&mut self) {
        if self.vel_y < self.max_vel_y && !self.flapped {
            self.vel_y += self.acc_y;
        }
        if self.flapped {
            self.flapped = false;
        }

        self.y = (self.y + self.vel_y).clamp(self.min_y, self.max_y);
        self.rotate();
    }

    fn tick_crashed(&mut self) {
        if self.min_y <= self.y && self.y <= self.max_y {
            self.y = (self.y + self.vel_y).clamp(self.min_y, self.max_y);
            if self.rot > -90.0 {
                self.rotate();
            }
        }

        if self.vel_y < self.max_vel_y {
            self.vel_y += self.acc_y;
        }
    }
}

impl Entity for Player {
    fn tick(&mut self) {
        match self.mode {
            PlayerMode::Shm => self.tick_shm(),
            PlayerMode::Normal => self.tick_normal(),
            PlayerMode::Crashed => self.tick_crashed(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Score {
    value: u32,
}

impl Score {
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn add(&mut self) {
        self.value += 1;
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

impl Entity for Score {
    fn tick(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Welcome,
    GameOver,
}

/// Full-screen message. Counts frames shown so the renderer can blink.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub kind: OverlayKind,
    frames: u32,
}

impl Overlay {
    pub fn new(kind: OverlayKind) -> Self {
        Self { kind, frames: 0 }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Entity for Overlay {
    fn tick(&mut self) {
        self.frames = self.frames.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_floor_scrolls_and_wraps() {
        let mut floor = Floor::new(&config());
        for _ in 0..12 {
            floor.tick();
            assert!(floor.x <= 0.0 && floor.x > -FLOOR_OVERHANG);
        }
        // 12 * 4 = 48 wraps back to the origin
        assert_approx_eq!(floor.x, 0.0, 0.001);
    }

    #[test]
    fn test_stopped_floor_stays_put() {
        let mut floor = Floor::new(&config());
        floor.tick();
        floor.stop();
        let x = floor.x;
        floor.tick();
        assert_eq!(floor.x, x);
        assert!(!floor.is_moving());
    }

    #[test]
    fn test_initial_pipes_are_offscreen() {
        let pipes = Pipes::new(&config(), 7);
        assert_eq!(pipes.pairs().len(), 2);
        for pair in pipes.pairs() {
            assert!(pair.x > config().width);
            assert!(!pair.is_crossed());
        }
    }

    #[test]
    fn test_gap_stays_in_band() {
        let cfg = config();
        let mut pipes = Pipes::new(&cfg, 42);
        for _ in 0..2000 {
            pipes.tick();
        }
        for pair in pipes.pairs() {
            assert!(pair.gap_y >= (cfg.viewport_height * 0.2).floor());
            assert!(pair.gap_y + PIPE_GAP <= cfg.viewport_height * 0.8 + 1.0);
        }
    }

    #[test]
    fn test_pipes_spawn_and_despawn() {
        let mut pipes = Pipes::new(&config(), 1);
        let mut spawned = 0;
        let mut last_x = pipes.pairs().last().map(|p| p.x).unwrap();
        for _ in 0..600 {
            pipes.tick();
            assert!(!pipes.pairs().is_empty());
            assert!(pipes.pairs().len() <= 2);
            for pair in pipes.pairs() {
                assert!(pair.x >= -PIPE_WIDTH - PIPE_SPEED);
            }

            let x = pipes.pairs().last().map(|p| p.x).unwrap();
            if x > last_x {
                spawned += 1;
            }
            last_x = x;
        }
        assert_eq!(spawned, 13);
    }

    #[test]
    fn test_stopped_pipes_neither_move_nor_spawn() {
        let mut pipes = Pipes::new(&config(), 3);
        for _ in 0..100 {
            pipes.tick();
        }
        pipes.stop();
        let before: Vec<f32> = pipes.pairs().iter().map(|p| p.x).collect();
        for _ in 0..100 {
            pipes.tick();
        }
        let after: Vec<f32> = pipes.pairs().iter().map(|p| p.x).collect();
        assert_eq!(before, after);
        assert!(pipes.is_stopped());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Pipes::new(&config(), 99);
        let b = Pipes::new(&config(), 99);
        let gaps_a: Vec<f32> = a.pairs().iter().map(|p| p.gap_y).collect();
        let gaps_b: Vec<f32> = b.pairs().iter().map(|p| p.gap_y).collect();
        assert_eq!(gaps_a, gaps_b);
    }

    #[test]
    fn test_crossed_flag_is_one_way() {
        let mut pair = PipePair::new(100.0, 150.0);
        assert!(pair.mark_crossed());
        assert!(!pair.mark_crossed());
        pair.tick();
        assert!(pair.is_crossed());
    }

    #[test]
    fn test_pair_geometry() {
        let pair = PipePair::new(10.0, 150.0);
        assert_eq!(pair.upper().bottom(), 150.0);
        assert_eq!(pair.lower().top(), 150.0 + PIPE_GAP);
        assert_eq!(pair.cx(), 10.0 + PIPE_WIDTH / 2.0);
    }

    #[test]
    fn test_player_starts_bobbing() {
        let cfg = config();
        let mut player = Player::new(&cfg);
        assert_eq!(player.mode(), PlayerMode::Shm);
        assert_eq!(player.x, 57.0);

        let start = player.y;
        for _ in 0..200 {
            player.tick();
            assert!((player.y - start).abs() < 40.0);
        }
    }

    #[test]
    fn test_flap_sets_velocity() {
        let mut player = Player::new(&config());
        player.set_mode(PlayerMode::Normal);
        for _ in 0..5 {
            player.tick();
        }
        player.flap();
        player.flap();
        assert_eq!(player.vel_y(), -9.0);

        let y = player.y;
        player.tick();
        assert_approx_eq!(player.y, y - 9.0, 0.001);
    }

    #[test]
    fn test_normal_player_falls_to_clamp() {
        let cfg = config();
        let mut player = Player::new(&cfg);
        player.set_mode(PlayerMode::Normal);
        for _ in 0..200 {
            player.tick();
        }
        assert_approx_eq!(player.y, cfg.viewport_height - PLAYER_HEIGHT * 0.75, 0.001);
        assert_eq!(player.vel_y(), 10.0);
    }

    #[test]
    fn test_crashed_player_comes_to_rest() {
        let cfg = config();
        let floor = Floor::new(&cfg);
        let mut player = Player::new(&cfg);
        player.set_mode(PlayerMode::Crashed);
        assert!(!player.at_rest_on(&floor));

        for _ in 0..100 {
            player.tick();
        }
        assert!(player.at_rest_on(&floor));
        assert!(player.rot >= -90.0);
    }

    #[test]
    fn test_score_add_and_reset() {
        let mut score = Score::default();
        score.add();
        score.add();
        assert_eq!(score.value(), 2);
        score.reset();
        assert_eq!(score.value(), 0);
    }

    #[test]
    fn test_overlay_counts_frames() {
        let mut overlay = Overlay::new(OverlayKind::GameOver);
        overlay.tick();
        overlay.tick();
        assert_eq!(overlay.frames(), 2);
    }
}
