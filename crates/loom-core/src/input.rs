use bitflags::bitflags;
use web_time::Instant;

use crate::Vec2;
use crate::tag::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

bitflags! {
    /// Pressed pointer buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const PRIMARY = 1 << 0; // Left mouse, touch
        const SECONDARY = 1 << 1;
        const TERTIARY = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
    Cancel,
    Scroll,
}

bitflags! {
    /// Pointer event kinds a handler declares interest in.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PointerTypes: u8 {
        const DOWN = 1 << 0;
        const UP = 1 << 1;
        const MOVE = 1 << 2;
        const SCROLL = 1 << 3;
    }
}

impl PointerEventKind {
    /// The interest flag that must be declared to receive this kind.
    /// `Cancel` is always delivered.
    pub fn types(self) -> PointerTypes {
        match self {
            PointerEventKind::Down => PointerTypes::DOWN,
            PointerEventKind::Up => PointerTypes::UP,
            PointerEventKind::Move => PointerTypes::MOVE,
            PointerEventKind::Scroll => PointerTypes::SCROLL,
            PointerEventKind::Cancel => PointerTypes::empty(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerKind,
    pub event: PointerEventKind,
    /// Device position, or handler-local position once delivered.
    pub position: Vec2,
    pub scroll: Vec2,
    pub buttons: Buttons,
    pub modifiers: Modifiers,
    pub time: Instant,
    /// Whether `position` lies inside the receiving handler's area. Set by
    /// the router on delivery.
    pub hit: bool,
}

impl PointerEvent {
    pub fn new(event: PointerEventKind, position: Vec2, time: Instant) -> Self {
        Self {
            id: PointerId::default(),
            kind: PointerKind::Mouse,
            event,
            position,
            scroll: Vec2::ZERO,
            buttons: if event == PointerEventKind::Down {
                Buttons::PRIMARY
            } else {
                Buttons::empty()
            },
            modifiers: Modifiers::empty(),
            time,
            hit: false,
        }
    }

    pub fn scroll(position: Vec2, delta: Vec2, time: Instant) -> Self {
        Self {
            scroll: delta,
            ..Self::new(PointerEventKind::Scroll, position, time)
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 1 << 0;
        const SHIFT = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3; // Cmd on Mac, Win key on Windows
    }
}

impl Modifiers {
    /// The platform's shortcut modifier.
    pub fn command() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::SUPER
        } else {
            Modifiers::CTRL
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    F(u8), // F1-F12
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Press,
    Release,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub state: KeyState,
    pub is_repeat: bool,
    pub time: Instant,
}

impl KeyEvent {
    pub fn press(key: Key, time: Instant) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            state: KeyState::Press,
            is_repeat: false,
            time,
        }
    }
}

/// Committed text from the keyboard or input method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditEvent {
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusEvent {
    pub focus: bool,
}

/// Raw input fed to the router by the platform.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Edit(EditEvent),
}

/// Input as delivered to a handler.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Edit(EditEvent),
    Focus(FocusEvent),
}

/// Source of routed events, drained per handler.
pub trait Queue {
    /// Returns and clears the events queued for `tag`, in arrival order.
    fn events(&mut self, tag: Tag) -> Vec<Event>;
}

/// A queue that never has events. Useful for measuring.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoQueue;

impl Queue for NoQueue {
    fn events(&mut self, _tag: Tag) -> Vec<Event> {
        Vec::new()
    }
}
