//! Host input signals and the turn queue.
//!
//! The host editing surface reports three kinds of signals to the engine:
//!
//! * `Signal::KeyDown` – a low-level key press observed *before* the surface
//!   applies it. Used to detect word/paragraph/tab terminators early.
//! * `Signal::BeforeInput` – the surface's pre-mutation intent. Intercepting it
//!   lets the engine include the terminator in the replacement without a
//!   second pass.
//! * `Signal::Input` – post-mutation notice. Fallback trigger point and the
//!   carrier of IME composition state.
//!
//! None of these types reference document nodes; the engine resolves the
//! active surface from the document's focus and selection state.
//!
//! `TurnQueue` is the only scheduling primitive: tasks deferred during the
//! current synchronous turn run when the host reports the next tick.

use std::fmt;

mod turn;

pub use turn::TurnQueue;

/// Input signal delivered by the host for the currently active surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    KeyDown(KeyEvent),
    BeforeInput(BeforeInput),
    Input(InputNotice),
}

impl Signal {
    /// True when the signal was raised while an IME composition is in progress.
    pub fn is_composing(&self) -> bool {
        match self {
            Signal::KeyDown(k) => k.composing,
            Signal::BeforeInput(b) => b.composing,
            Signal::Input(i) => i.composing,
        }
    }

    /// Short discriminant used in log fields (never carries payload text).
    pub fn label(&self) -> &'static str {
        match self {
            Signal::KeyDown(_) => "key_down",
            Signal::BeforeInput(_) => "before_input",
            Signal::Input(_) => "input",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
    /// Key pressed while an IME composition session is open.
    pub composing: bool,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
            composing: false,
        }
    }

    pub fn with_mods(code: KeyCode, mods: KeyModifiers) -> Self {
        Self {
            code,
            mods,
            composing: false,
        }
    }

    /// True when a command-style modifier is held (shift alone does not count).
    pub fn has_command_modifier(&self) -> bool {
        self.mods
            .intersects(KeyModifiers::CTRL | KeyModifiers::ALT | KeyModifiers::META)
    }
}

/// KeyCode enumerates normalized logical keys the binding layer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Esc,
    Left,
    Right,
    Up,
    Down,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
        const META  = 0b0000_1000;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

/// Pre-mutation intent reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeforeInput {
    pub kind: InputKind,
    /// Text about to be inserted, if the intent inserts text.
    pub data: Option<String>,
    pub composing: bool,
}

impl BeforeInput {
    pub fn insert_text(data: impl Into<String>) -> Self {
        Self {
            kind: InputKind::InsertText,
            data: Some(data.into()),
            composing: false,
        }
    }

    pub fn of_kind(kind: InputKind) -> Self {
        Self {
            kind,
            data: None,
            composing: false,
        }
    }
}

/// Classification of a pending or completed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputKind {
    InsertText,
    InsertLineBreak,
    InsertParagraph,
    InsertFromPaste,
    InsertCompositionText,
    InsertReplacementText,
    DeleteContentBackward,
    DeleteContentForward,
    HistoryUndo,
    HistoryRedo,
    #[default]
    Other,
}

/// Post-mutation notice. `synthetic` marks notices the engine raised itself.
///
/// `kind` and `data` describe the mutation that already happened, so only a
/// notice for freshly inserted whitespace can complete a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputNotice {
    pub kind: InputKind,
    /// Text that was inserted, for insertion kinds that carry it.
    pub data: Option<String>,
    pub composing: bool,
    pub synthetic: bool,
}

impl InputNotice {
    pub fn inserted(data: impl Into<String>) -> Self {
        Self {
            kind: InputKind::InsertText,
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn of_kind(kind: InputKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Notice for a change the engine made itself.
    pub fn synthetic() -> Self {
        Self {
            synthetic: true,
            ..Self::default()
        }
    }
}
