//! Normalization of raw platform input.
//!
//! The [`EventsManager`] drops input the engine must not see (editable
//! controls, browser-reserved keys, stray moves), turns secondary buttons
//! into context-menu requests, times long presses, and forwards the rest to
//! an [`EventConsumer`].

use std::time::{Duration, Instant};

use log::trace;

use super::input::{Key, KeyEvent, RawInput, RawKey, RawPointer};
use crate::geometry::Point;

/// How long the pointer must stay down for a long press.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(600);

/// Receiver of normalized input. Points are in client coordinates.
pub trait EventConsumer {
    fn on_pointer_down(&mut self, point: Point);
    fn on_pointer_move(&mut self, point: Point);
    fn on_pointer_up(&mut self, point: Point);
    fn on_double_click(&mut self, point: Point);
    fn on_context_menu(&mut self, point: Point);
    fn on_long_press(&mut self, point: Point);
    fn on_wheel(&mut self, delta: f64);
    fn on_key_down(&mut self, key: KeyEvent);
    fn on_key_up(&mut self, key: KeyEvent);

    /// Whether moving from `from` to `to` is far enough to cancel a pending
    /// long press.
    fn pointer_travelled(&self, from: Point, to: Point) -> bool {
        !to.within(from, 10)
    }
}

/// Filters and forwards raw input, tracking pointer-down and long press.
#[derive(Debug, Clone)]
pub struct EventsManager {
    pointer_down: bool,
    down_point: Point,
    last_point: Point,
    long_press: Duration,
    long_press_deadline: Option<Instant>,
}

impl Default for EventsManager {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS)
    }
}

impl EventsManager {
    pub fn new(long_press: Duration) -> Self {
        Self {
            pointer_down: false,
            down_point: Point::ZERO,
            last_point: Point::ZERO,
            long_press,
            long_press_deadline: None,
        }
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// The most recent pointer position seen.
    pub fn last_point(&self) -> Point {
        self.last_point
    }

    /// When the pending long press fires, if one is armed.
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.long_press_deadline
    }

    /// Keys the host keeps for itself: reload, fullscreen, dev tools.
    pub fn is_reserved_key(key: &KeyEvent) -> bool {
        matches!(key.code, Key::F(5) | Key::F(11) | Key::F(12))
    }

    /// Normalize `input` and forward it. Returns whether the consumer saw it.
    pub fn handle(&mut self, input: RawInput, now: Instant, consumer: &mut dyn EventConsumer) -> bool {
        match input {
            RawInput::PointerDown(p) => self.pointer_down(p, now, consumer),
            RawInput::PointerMove(p) => self.pointer_move(p, consumer),
            RawInput::PointerUp(p) => self.pointer_up(p, consumer),
            RawInput::DoubleClick(p) => {
                if p.editable_target || p.is_context_button() {
                    return false;
                }
                self.last_point = p.point;
                consumer.on_double_click(p.point);
                true
            }
            RawInput::ContextMenu(p) => {
                if p.editable_target {
                    return false;
                }
                self.last_point = p.point;
                self.long_press_deadline = None;
                consumer.on_context_menu(p.point);
                true
            }
            RawInput::Wheel { delta, editable_target } => {
                if editable_target || delta == 0.0 {
                    return false;
                }
                consumer.on_wheel(delta);
                true
            }
            RawInput::KeyDown(key) => self.key(key, consumer, true),
            RawInput::KeyUp(key) => self.key(key, consumer, false),
            RawInput::Resize { .. } => false,
        }
    }

    /// Fire the long press if its deadline has passed. Returns whether it
    /// fired.
    pub fn poll_long_press(&mut self, now: Instant, consumer: &mut dyn EventConsumer) -> bool {
        match self.long_press_deadline {
            Some(deadline) if deadline <= now && self.pointer_down => {
                self.long_press_deadline = None;
                trace!("long press at {:?}", self.last_point);
                consumer.on_long_press(self.last_point);
                true
            }
            _ => false,
        }
    }

    fn pointer_down(&mut self, p: RawPointer, now: Instant, consumer: &mut dyn EventConsumer) -> bool {
        if p.editable_target || p.is_context_button() {
            return false;
        }
        self.pointer_down = true;
        self.down_point = p.point;
        self.last_point = p.point;
        self.long_press_deadline = Some(now + self.long_press);
        consumer.on_pointer_down(p.point);
        true
    }

    fn pointer_move(&mut self, p: RawPointer, consumer: &mut dyn EventConsumer) -> bool {
        if p.editable_target || !self.pointer_down {
            return false;
        }
        self.last_point = p.point;
        if self.long_press_deadline.is_some() && consumer.pointer_travelled(self.down_point, p.point) {
            trace!("long press cancelled by move");
            self.long_press_deadline = None;
        }
        consumer.on_pointer_move(p.point);
        true
    }

    /// A secondary-button release opens the context menu instead and leaves
    /// the pointer considered down.
    fn pointer_up(&mut self, p: RawPointer, consumer: &mut dyn EventConsumer) -> bool {
        if p.editable_target || !self.pointer_down {
            return false;
        }
        self.last_point = p.point;
        self.long_press_deadline = None;
        if p.is_context_button() {
            consumer.on_context_menu(p.point);
        } else {
            consumer.on_pointer_up(p.point);
            self.pointer_down = false;
        }
        true
    }

    fn key(&mut self, key: RawKey, consumer: &mut dyn EventConsumer, down: bool) -> bool {
        if key.editable_target || Self::is_reserved_key(&key.event) {
            return false;
        }
        if down {
            consumer.on_key_down(key.event);
        } else {
            consumer.on_key_up(key.event);
        }
        true
    }
}

// ===========================================================================
// Tests
// ===========================================================================
