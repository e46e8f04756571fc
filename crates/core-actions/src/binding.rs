//! Signal → expansion request translation.
//!
//! Decides whether a host signal should attempt an expansion, which terminator
//! follows the content, and whether the host's default handling of the signal
//! must be cancelled.

use core_config::TerminatorConfig;
use core_events::{InputKind, KeyCode, Signal};
use core_model::SurfaceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The terminator has not been applied yet; the token ends the text.
    Immediate,
    /// The host already inserted the terminator after the token.
    AfterTerminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionRequest {
    pub mode: MatchMode,
    /// Appended after the content. In `AfterTerminator` mode this is the
    /// whitespace the host reported inserting; the match must end with it.
    pub terminator: &'static str,
    pub prevent_default: bool,
}

impl ExpansionRequest {
    fn immediate(terminator: &'static str, prevent_default: bool) -> Option<Self> {
        Some(Self {
            mode: MatchMode::Immediate,
            terminator,
            prevent_default,
        })
    }

    /// Whether `typed`, the whitespace found after a trigger, is the one the
    /// host reported inserting.
    pub fn accepts_typed(&self, typed: char) -> bool {
        self.mode == MatchMode::AfterTerminator && self.terminator.starts_with(typed)
    }

    fn after(terminator: &'static str) -> Option<Self> {
        Some(Self {
            mode: MatchMode::AfterTerminator,
            terminator,
            prevent_default: false,
        })
    }
}

pub fn translate(
    signal: &Signal,
    kind: SurfaceKind,
    policy: &TerminatorConfig,
) -> Option<ExpansionRequest> {
    if signal.is_composing() {
        return None;
    }
    match signal {
        Signal::KeyDown(key) => {
            if key.has_command_modifier() {
                return None;
            }
            match key.code {
                KeyCode::Char(' ') if policy.space => ExpansionRequest::immediate(" ", true),
                KeyCode::Enter if policy.enter => {
                    if kind.accepts_newlines() {
                        ExpansionRequest::immediate("\n", true)
                    } else {
                        // Single-line field: expand, then let the form submit.
                        ExpansionRequest::immediate("", false)
                    }
                }
                KeyCode::Tab if policy.tab => ExpansionRequest::immediate("", true),
                _ => None,
            }
        }
        Signal::BeforeInput(intent) => match intent.kind {
            InputKind::InsertText if policy.space && intent.data.as_deref() == Some(" ") => {
                ExpansionRequest::immediate(" ", true)
            }
            InputKind::InsertLineBreak | InputKind::InsertParagraph
                if policy.enter && kind.accepts_newlines() =>
            {
                ExpansionRequest::immediate("\n", true)
            }
            _ => None,
        },
        Signal::Input(notice) if notice.synthetic => None,
        // Deletions, undo and redo can leave a trigger before whitespace the
        // user never typed; only a fresh terminator insertion counts.
        Signal::Input(notice) => match notice.kind {
            InputKind::InsertText => match notice.data.as_deref() {
                Some(" ") if policy.space => ExpansionRequest::after(" "),
                Some("\t") if policy.tab => ExpansionRequest::after("\t"),
                _ => None,
            },
            InputKind::InsertLineBreak | InputKind::InsertParagraph
                if policy.enter && kind.accepts_newlines() =>
            {
                ExpansionRequest::after("\n")
            }
            _ => None,
        },
    }
}
