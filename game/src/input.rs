//! Unified input stream and the local input source
//!
//! Local keyboard/pointer/touch input and every remote controller produce
//! [`InputEvent`]s into one unbounded channel. The loop driver is the only
//! consumer and drains it once per frame; after that point it cannot tell
//! local input from remote input.

use macroquad::prelude::*;
use shared::InputEvent;
use tokio::sync::mpsc;

pub type InputSender = mpsc::UnboundedSender<InputEvent>;

/// Creates the unified input channel
pub fn input_channel() -> (InputSender, InputQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, InputQueue { rx })
}

/// Everything that arrived since the previous drain, coalesced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    /// Number of flap events drained. Any non-zero count is one impulse.
    pub flaps: usize,
    pub quit: bool,
}

impl FrameInput {
    pub fn flapped(&self) -> bool {
        self.flaps > 0
    }
}

/// Consumer end of the unified input channel
#[derive(Debug)]
pub struct InputQueue {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl InputQueue {
    /// Takes every pending event without waiting
    pub fn drain(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                InputEvent::Flap => input.flaps += 1,
                InputEvent::Quit => input.quit = true,
            }
        }
        input
    }
}

/// One frame's worth of raw platform input
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawInput {
    pub pointer_pressed: bool,
    pub space_pressed: bool,
    pub up_pressed: bool,
    pub touch_started: bool,
    pub escape_pressed: bool,
    pub close_requested: bool,
}

impl RawInput {
    /// Normalizes raw input into abstract events
    pub fn events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.close_requested || self.escape_pressed {
            events.push(InputEvent::Quit);
        }
        if self.pointer_pressed || self.space_pressed || self.up_pressed || self.touch_started {
            events.push(InputEvent::Flap);
        }
        events
    }
}

/// Polls the window once per frame and forwards normalized events
pub struct LocalInput {
    events: InputSender,
}

impl LocalInput {
    /// Intercepts the window close button so it arrives as a quit event
    pub fn new(events: InputSender) -> Self {
        prevent_quit();
        Self { events }
    }

    pub fn poll() -> RawInput {
        RawInput {
            pointer_pressed: is_mouse_button_pressed(MouseButton::Left),
            space_pressed: is_key_pressed(KeyCode::Space),
            up_pressed: is_key_pressed(KeyCode::Up),
            touch_started: touches()
                .iter()
                .any(|touch| matches!(touch.phase, TouchPhase::Started)),
            escape_pressed: is_key_pressed(KeyCode::Escape),
            close_requested: is_quit_requested(),
        }
    }

    pub fn pump(&self) {
        for event in Self::poll().events() {
            // The receiver lives as long as the loop driver calling us.
            let _ = self.events.send(event);
        }
    }
}
