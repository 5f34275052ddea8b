//! Pure collision and scoring predicates over entity state

use crate::entities::{Floor, PipePair, Pipes, Player, PIPE_SPEED};

/// Axis-aligned box, origin at the top-left, y grows downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Overlap test. Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.left()
            || other.right() <= self.left()
            || self.bottom() <= other.top()
            || other.bottom() <= self.top())
    }
}

pub fn hits_floor(player: &Player, floor: &Floor) -> bool {
    player.rect().bottom() >= floor.y
}

pub fn hits_pipe(player: &Player, pair: &PipePair) -> bool {
    let rect = player.rect();
    rect.intersects(&pair.upper()) || rect.intersects(&pair.lower())
}

/// True if the player touches the floor or any pipe
pub fn collided(player: &Player, pipes: &Pipes, floor: &Floor) -> bool {
    hits_floor(player, floor) || pipes.pairs().iter().any(|pair| hits_pipe(player, pair))
}

/// True in the one frame where the pair's centre passes the player's centre.
///
/// The window is one frame of pipe travel wide. The pair's crossed flag
/// keeps a pair from scoring twice inside it.
pub fn crossed(player: &Player, pair: &PipePair) -> bool {
    pair.cx() <= player.cx() && player.cx() < pair.cx() + PIPE_SPEED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entities::{PlayerMode, PIPE_GAP, PIPE_WIDTH};

    fn player_at(y: f32) -> Player {
        let mut player = Player::new(&GameConfig::default());
        player.set_mode(PlayerMode::Normal);
        player.y = y;
        player
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(20.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_floor_contact() {
        let config = GameConfig::default();
        let floor = Floor::new(&config);
        let player = player_at(floor.y - 30.0);
        assert!(!hits_floor(&player, &floor));

        let player = player_at(floor.y - player.h);
        assert!(hits_floor(&player, &floor));
    }

    #[test]
    fn test_pipe_contact() {
        let player = player_at(100.0);
        let x = player.x;

        // Player sits inside the gap
        let open = PipePair::new(x, 90.0);
        assert!(!hits_pipe(&player, &open));

        // Gap ends above the player's head
        let blocked = PipePair::new(x, 100.0 - PIPE_GAP - 1.0);
        assert!(hits_pipe(&player, &blocked));

        // Gap starts below the player's feet
        let low = PipePair::new(x, 130.0);
        assert!(hits_pipe(&player, &low));
    }

    #[test]
    fn test_pipe_out_of_reach() {
        let player = player_at(100.0);
        let far = PipePair::new(player.x + player.w, 300.0);
        assert!(!hits_pipe(&player, &far));
    }

    #[test]
    fn test_collided_checks_every_pair() {
        let config = GameConfig::default();
        let floor = Floor::new(&config);
        let player = player_at(100.0);
        let pipes = Pipes::from_pairs(
            &config,
            vec![
                PipePair::new(player.x + 200.0, 150.0),
                PipePair::new(player.x, 300.0),
            ],
        );
        assert!(collided(&player, &pipes, &floor));
    }

    #[test]
    fn test_crossing() {
        let player = player_at(100.0);
        let ahead = PipePair::new(player.x + 10.0, 100.0);
        assert!(!crossed(&player, &ahead));

        let level = PipePair::new(player.cx() - PIPE_WIDTH / 2.0, 100.0);
        assert!(crossed(&player, &level));

        let x = player.cx() - PIPE_WIDTH / 2.0 - PIPE_SPEED + 0.5;
        let just_past = PipePair::new(x, 100.0);
        assert!(crossed(&player, &just_past));

        // Left behind more than a frame ago
        let behind = PipePair::new(player.x - 200.0, 100.0);
        assert!(!crossed(&player, &behind));
    }
}
