//! Input event types and the crossterm adapter.
//!
//! [`RawInput`] is what a platform delivers: client coordinates, the raw
//! button code and whether the event came from an editable control. The
//! [`EventsManager`](super::EventsManager) normalizes it before anything in
//! the widget tree sees it. Crossterm events convert via [`from_crossterm`].

use std::ops::{BitAnd, BitOr};

use crate::geometry::Point;

/// Wheel delta reported for one terminal scroll notch.
pub const WHEEL_STEP: f64 = 10.0;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keyboard event with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers held.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }
}

// ---------------------------------------------------------------------------
// Raw platform input
// ---------------------------------------------------------------------------

/// Button codes as platforms number them.
pub mod button {
    pub const PRIMARY: u16 = 0;
    pub const MIDDLE: u16 = 1;
    pub const SECONDARY: u16 = 2;
    pub const BACK: u16 = 3;
    pub const FORWARD: u16 = 4;
}

/// A pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPointer {
    pub point: Point,
    pub button: u16,
    /// The event originated in an editable control rather than the canvas.
    pub editable_target: bool,
}

impl RawPointer {
    /// A primary-button event on the canvas.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            point: Point::new(x, y),
            button: button::PRIMARY,
            editable_target: false,
        }
    }

    pub fn with_button(mut self, button: u16) -> Self {
        self.button = button;
        self
    }

    pub fn from_editable(mut self) -> Self {
        self.editable_target = true;
        self
    }

    /// Buttons above the secondary one, except forward, act as a context
    /// menu trigger.
    pub fn is_context_button(&self) -> bool {
        self.button > button::SECONDARY && self.button != button::FORWARD
    }
}

/// A key event plus its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKey {
    pub event: KeyEvent,
    pub editable_target: bool,
}

impl RawKey {
    pub fn new(event: KeyEvent) -> Self {
        Self {
            event,
            editable_target: false,
        }
    }
}

/// Input as delivered by the platform, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    PointerDown(RawPointer),
    PointerMove(RawPointer),
    PointerUp(RawPointer),
    DoubleClick(RawPointer),
    ContextMenu(RawPointer),
    Wheel { delta: f64, editable_target: bool },
    KeyDown(RawKey),
    KeyUp(RawKey),
    Resize { width: i32, height: i32 },
}

impl RawInput {
    pub fn key_down(code: Key) -> Self {
        RawInput::KeyDown(RawKey::new(KeyEvent::plain(code)))
    }

    pub fn key_up(code: Key) -> Self {
        RawInput::KeyUp(RawKey::new(KeyEvent::plain(code)))
    }

    pub fn wheel(delta: f64) -> Self {
        RawInput::Wheel {
            delta,
            editable_target: false,
        }
    }
}

// ---------------------------------------------------------------------------
// From<crossterm> conversions
// ---------------------------------------------------------------------------

fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;

    Some(match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    })
}

fn convert_button(b: crossterm::event::MouseButton) -> u16 {
    match b {
        crossterm::event::MouseButton::Left => button::PRIMARY,
        crossterm::event::MouseButton::Middle => button::MIDDLE,
        crossterm::event::MouseButton::Right => button::SECONDARY,
    }
}

/// Convert a crossterm event into raw input.
///
/// A terminal has no separate context-menu event, so releasing the right
/// button reports one; pressing it reports nothing. Cells map one-to-one to
/// client coordinates. Returns `None` for events with no counterpart.
pub fn from_crossterm(event: crossterm::event::Event) -> Option<RawInput> {
    use crossterm::event::{Event, KeyEventKind, MouseButton, MouseEventKind};

    match event {
        Event::Key(ke) => {
            let key = KeyEvent::new(convert_key(ke.code)?, convert_modifiers(ke.modifiers));
            Some(match ke.kind {
                KeyEventKind::Release => RawInput::KeyUp(RawKey::new(key)),
                KeyEventKind::Press | KeyEventKind::Repeat => RawInput::KeyDown(RawKey::new(key)),
            })
        }
        Event::Mouse(me) => {
            let at = RawPointer::at(i32::from(me.column), i32::from(me.row));
            match me.kind {
                MouseEventKind::Down(MouseButton::Right) => None,
                MouseEventKind::Up(MouseButton::Right) => Some(RawInput::ContextMenu(at)),
                MouseEventKind::Down(b) => Some(RawInput::PointerDown(at.with_button(convert_button(b)))),
                MouseEventKind::Up(b) => Some(RawInput::PointerUp(at.with_button(convert_button(b)))),
                MouseEventKind::Drag(b) => Some(RawInput::PointerMove(at.with_button(convert_button(b)))),
                MouseEventKind::Moved => Some(RawInput::PointerMove(at)),
                MouseEventKind::ScrollUp => Some(RawInput::wheel(-WHEEL_STEP)),
                MouseEventKind::ScrollDown => Some(RawInput::wheel(WHEEL_STEP)),
                _ => None,
            }
        }
        Event::Resize(width, height) => Some(RawInput::Resize {
            width: i32::from(width),
            height: i32::from(height),
        }),
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        Event, KeyCode, KeyEventKind, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    };

    fn ct_key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(crossterm::event::KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn ct_mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::SHIFT));
        assert_eq!(mods & Modifiers::CTRL, Modifiers::CTRL);
    }

    #[test]
    fn plain_key_has_no_modifiers() {
        let ke = KeyEvent::plain(Key::Char('a'));
        assert!(ke.modifiers.is_empty());
    }

    // ── Buttons ──────────────────────────────────────────────────────

    #[test]
    fn context_button_codes() {
        let with = |b| RawPointer::at(0, 0).with_button(b).is_context_button();
        assert!(!with(button::PRIMARY));
        assert!(!with(button::MIDDLE));
        assert!(!with(button::SECONDARY));
        assert!(with(button::BACK));
        assert!(!with(button::FORWARD));
        assert!(with(5));
    }

    // ── Crossterm keys ───────────────────────────────────────────────

    #[test]
    fn key_press_and_release() {
        let down = from_crossterm(ct_key(KeyCode::Char('x'), KeyModifiers::CONTROL, KeyEventKind::Press));
        assert_eq!(
            down,
            Some(RawInput::KeyDown(RawKey::new(KeyEvent::new(Key::Char('x'), Modifiers::CTRL))))
        );
        let up = from_crossterm(ct_key(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release));
        assert_eq!(up, Some(RawInput::key_up(Key::Enter)));
    }

    #[test]
    fn key_navigation_codes() {
        for (ct_code, expected) in [
            (KeyCode::Home, Key::Home),
            (KeyCode::End, Key::End),
            (KeyCode::PageUp, Key::PageUp),
            (KeyCode::PageDown, Key::PageDown),
            (KeyCode::Up, Key::Up),
            (KeyCode::Down, Key::Down),
            (KeyCode::F(5), Key::F(5)),
        ] {
            let raw = from_crossterm(ct_key(ct_code, KeyModifiers::NONE, KeyEventKind::Press));
            assert_eq!(raw, Some(RawInput::key_down(expected)));
        }
    }

    #[test]
    fn unsupported_key_is_dropped() {
        let raw = from_crossterm(ct_key(KeyCode::CapsLock, KeyModifiers::NONE, KeyEventKind::Press));
        assert_eq!(raw, None);
    }

    // ── Crossterm mouse ──────────────────────────────────────────────

    #[test]
    fn left_button_maps_to_pointer_events() {
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::Down(MouseButton::Left), 3, 4)),
            Some(RawInput::PointerDown(RawPointer::at(3, 4)))
        );
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::Drag(MouseButton::Left), 5, 4)),
            Some(RawInput::PointerMove(RawPointer::at(5, 4)))
        );
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::Up(MouseButton::Left), 5, 4)),
            Some(RawInput::PointerUp(RawPointer::at(5, 4)))
        );
    }

    #[test]
    fn right_release_is_context_menu() {
        assert_eq!(from_crossterm(ct_mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)), None);
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::Up(MouseButton::Right), 1, 1)),
            Some(RawInput::ContextMenu(RawPointer::at(1, 1)))
        );
    }

    #[test]
    fn scroll_maps_to_wheel_steps() {
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(RawInput::wheel(WHEEL_STEP))
        );
        assert_eq!(
            from_crossterm(ct_mouse(MouseEventKind::ScrollUp, 0, 0)),
            Some(RawInput::wheel(-WHEEL_STEP))
        );
    }

    #[test]
    fn resize_and_focus() {
        assert_eq!(
            from_crossterm(Event::Resize(120, 40)),
            Some(RawInput::Resize { width: 120, height: 40 })
        );
        assert_eq!(from_crossterm(Event::FocusGained), None);
    }
}
