//! Mouse input state tracking.
//!
//! The embedding engine owns a [`MouseState`], feeds it the events it polls
//! from SDL, and calls [`MouseState::end_frame`] once per frame so deltas
//! reset at the frame boundary. Queries never fail: button ordinals outside
//! the tracked range are ignored on update and read as released.

use glam::DVec2;
use sdl2::event::Event;
use sdl2::mouse::MouseButton;

/// Number of mouse buttons tracked. Events for higher ordinals are ignored.
pub const MOUSE_BUTTON_COUNT: usize = 3;

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    position: DVec2,
    previous: DVec2,
    scroll: DVec2,
    buttons: [bool; MOUSE_BUTTON_COUNT],
    dragging: bool,
}

impl MouseState {
    /// Creates a tracker with the cursor at the origin and no buttons held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one SDL event into the tracker. Non-mouse events are ignored.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion { x, y, .. } => self.on_motion(*x as f64, *y as f64),
            Event::MouseButtonDown { mouse_btn, .. } => {
                self.on_button_down(button_index(*mouse_btn));
            }
            Event::MouseButtonUp { mouse_btn, .. } => {
                self.on_button_up(button_index(*mouse_btn));
            }
            Event::MouseWheel { x, y, .. } => self.on_scroll(*x as f64, *y as f64),
            _ => {}
        }
    }

    /// Records a cursor position update.
    pub fn on_motion(&mut self, x: f64, y: f64) {
        self.previous = self.position;
        self.position = DVec2::new(x, y);
        self.dragging = self.buttons.iter().any(|&held| held);
    }

    /// Marks a button as held.
    pub fn on_button_down(&mut self, button: usize) {
        if let Some(held) = self.buttons.get_mut(button) {
            *held = true;
        }
    }

    /// Marks a button as released and ends any drag in progress.
    pub fn on_button_up(&mut self, button: usize) {
        if let Some(held) = self.buttons.get_mut(button) {
            *held = false;
            self.dragging = false;
        }
    }

    /// Records a scroll event. The delta replaces any earlier one from the
    /// same frame.
    pub fn on_scroll(&mut self, dx: f64, dy: f64) {
        self.scroll = DVec2::new(dx, dy);
    }

    /// Frame-boundary reset: zeroes the scroll delta and collapses the
    /// position delta until the next motion event.
    pub fn end_frame(&mut self) {
        self.scroll = DVec2::ZERO;
        self.previous = self.position;
    }

    pub fn x(&self) -> f32 {
        self.position.x as f32
    }

    pub fn y(&self) -> f32 {
        self.position.y as f32
    }

    /// Horizontal cursor movement since the last frame, as previous minus
    /// current.
    pub fn dx(&self) -> f32 {
        (self.previous.x - self.position.x) as f32
    }

    /// Vertical cursor movement since the last frame, as previous minus
    /// current.
    pub fn dy(&self) -> f32 {
        (self.previous.y - self.position.y) as f32
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll.x as f32
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll.y as f32
    }

    /// True while the cursor moves with any button held.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the given button ordinal is held. Out of range reads released.
    pub fn is_button_down(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }
}

/// Maps an SDL button to its tracked ordinal. Buttons beyond the tracked
/// range map past `MOUSE_BUTTON_COUNT` and fall under the ignore rule.
fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::X1 => 3,
        MouseButton::X2 => 4,
        MouseButton::Unknown => usize::MAX,
    }
}
