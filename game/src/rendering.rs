use crate::config::GameConfig;
use crate::entities::{Floor, Overlay, OverlayKind, PipePair, Player, FLOOR_OVERHANG};
use crate::session::{Phase, World};
use macroquad::prelude::*;

const SKY: Color = Color::new(0.31, 0.75, 0.79, 1.0);
const PIPE_BODY: Color = Color::new(0.45, 0.75, 0.18, 1.0);
const PIPE_EDGE: Color = Color::new(0.33, 0.5, 0.14, 1.0);
const GROUND: Color = Color::new(0.87, 0.85, 0.58, 1.0);
const GRASS: Color = Color::new(0.45, 0.75, 0.18, 1.0);
const BIRD: Color = Color::new(0.98, 0.8, 0.2, 1.0);

/// Per-frame values that live outside the session
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub remote_peers: usize,
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(config: &GameConfig) -> Self {
        Renderer {
            width: config.width,
            height: config.height,
        }
    }

    /// Draws the scene in tick order, then whatever overlay the phase needs
    pub fn render(&mut self, world: &World, phase: Phase, hud: HudInfo) {
        clear_background(SKY);

        for pair in world.pipes.pairs() {
            self.draw_pipe_pair(pair);
        }
        self.draw_floor(&world.floor);
        self.draw_player(&world.player);

        match phase {
            Phase::Splash => self.draw_overlay(&world.welcome, world.score.value()),
            Phase::Play => self.draw_score(world.score.value()),
            Phase::GameOver => {
                self.draw_score(world.score.value());
                self.draw_overlay(&world.game_over, world.score.value());
            }
        }

        self.draw_hud(hud);
    }

    fn draw_pipe_pair(&mut self, pair: &PipePair) {
        for rect in [pair.upper(), pair.lower()] {
            draw_rectangle(rect.x, rect.y, rect.w, rect.h, PIPE_BODY);
            draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, PIPE_EDGE);
        }

        // Lips at the mouth of each pipe
        let upper = pair.upper();
        let lower = pair.lower();
        draw_rectangle(upper.x - 2.0, upper.bottom() - 12.0, upper.w + 4.0, 12.0, PIPE_EDGE);
        draw_rectangle(lower.x - 2.0, lower.top(), lower.w + 4.0, 12.0, PIPE_EDGE);
    }

    fn draw_floor(&mut self, floor: &Floor) {
        draw_rectangle(0.0, floor.y, self.width, self.height - floor.y, GROUND);
        draw_rectangle(0.0, floor.y, self.width, 10.0, GRASS);

        // Scrolling stripes so the floor visibly moves
        let mut x = floor.x;
        while x < self.width + FLOOR_OVERHANG {
            draw_line(x, floor.y + 10.0, x + 12.0, floor.y, 3.0, PIPE_EDGE);
            x += FLOOR_OVERHANG / 2.0;
        }
    }

    fn draw_player(&mut self, player: &Player) {
        let cx = player.x + player.w / 2.0;
        let cy = player.y + player.h / 2.0;

        // Positive tilt is nose up; macroquad rotates clockwise with y down
        draw_rectangle_ex(
            cx,
            cy,
            player.w,
            player.h,
            DrawRectangleParams {
                offset: vec2(0.5, 0.5),
                rotation: -player.rot.to_radians(),
                color: BIRD,
            },
        );

        let eye = vec2(player.w * 0.25, -player.h * 0.15);
        let (sin, cos) = (-player.rot.to_radians()).sin_cos();
        let eye_x = cx + eye.x * cos - eye.y * sin;
        let eye_y = cy + eye.x * sin + eye.y * cos;
        draw_circle(eye_x, eye_y, 3.0, WHITE);
        draw_circle(eye_x + cos, eye_y + sin, 1.5, BLACK);
    }

    fn draw_score(&mut self, score: u32) {
        let text = score.to_string();
        let size = 48.0;
        let dims = measure_text(&text, None, size as u16, 1.0);
        let x = (self.width - dims.width) / 2.0;
        let y = self.height * 0.1 + dims.height;

        draw_text(&text, x + 2.0, y + 2.0, size, BLACK);
        draw_text(&text, x, y, size, WHITE);
    }

    fn draw_overlay(&mut self, overlay: &Overlay, score: u32) {
        let (title, hint) = match overlay.kind {
            OverlayKind::Welcome => ("FLAPPY BIRD".to_string(), "tap or press space"),
            OverlayKind::GameOver => (format!("GAME OVER  {}", score), "tap to play again"),
        };

        self.draw_centered(&title, self.height * 0.3, 32.0, WHITE);

        // Blink the hint at roughly 2Hz
        if (overlay.frames() / 8) % 2 == 0 {
            self.draw_centered(hint, self.height * 0.3 + 40.0, 18.0, WHITE);
        }
    }

    fn draw_centered(&mut self, text: &str, y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        let x = (self.width - dims.width) / 2.0;
        draw_text(text, x + 1.0, y + 1.0, size, BLACK);
        draw_text(text, x, y, size, color);
    }

    fn draw_hud(&mut self, hud: HudInfo) {
        let y = self.height - 16.0;
        let connected = if hud.remote_peers > 0 { GREEN } else { RED };
        draw_rectangle(10.0, y, 8.0, 8.0, connected);

        for i in 0..hud.remote_peers.min(8) {
            draw_rectangle(
                24.0 + (i as f32) * 4.0,
                y + 5.0,
                3.0,
                3.0,
                Color::from_rgba(0, 170, 255, 255),
            );
        }

        let text = format!("{} remote", hud.remote_peers);
        draw_text(&text, 60.0, y + 8.0, 12.0, BLACK);
    }
}
