#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{Engine, Outcome};
use core_config::Config;
use core_events::{InputKind, InputNotice, KeyCode, KeyEvent, Signal};
use core_model::{
    Boundary, Document, Editable, InputType, InsertTextPrimitive, NativeInsertText,
    NodeId, RichSurface, Surface, TextControl,
};
use core_registry::ExpansionRecord;

pub const SIGNATURE: &str = "Best regards,\nJane";

pub fn engine(prefix: char, records: &[ExpansionRecord]) -> Engine {
    let mut engine = Engine::new(&Config::with_prefix(prefix)).expect("engine builds");
    engine.load_records(records);
    engine
}

pub fn sig_engine() -> Engine {
    engine('/', &[ExpansionRecord::new("/sig", SIGNATURE)])
}

pub fn key(code: KeyCode) -> Signal {
    Signal::KeyDown(KeyEvent::new(code))
}

pub fn space() -> Signal {
    key(KeyCode::Char(' '))
}

/// Post-input notice for a character the host just inserted.
pub fn typed(ch: char) -> Signal {
    Signal::Input(InputNotice::inserted(ch))
}

pub fn input_notice() -> Signal {
    typed(' ')
}

pub fn edit_notice(kind: InputKind) -> Signal {
    Signal::Input(InputNotice::of_kind(kind))
}

/// Re-dispatch pending document notifications as input signals, the way a
/// host event loop delivers them later in the same turn. Edits made on the
/// engine's behalf arrive as replacement-text notices.
pub fn pump(engine: &mut Engine, doc: &mut Document) -> Vec<Outcome> {
    doc.take_events()
        .into_iter()
        .map(|event| {
            let notice = if event.is_synthetic() {
                InputNotice::synthetic()
            } else {
                InputNotice::of_kind(InputKind::InsertReplacementText)
            };
            engine.handle(doc, &Signal::Input(notice))
        })
        .collect()
}

/// One host turn: the signal, its echoes, then the scheduler tick.
pub fn turn(engine: &mut Engine, doc: &mut Document, signal: &Signal) -> (Outcome, Vec<Outcome>) {
    let outcome = engine.handle(doc, signal);
    let echoes = pump(engine, doc);
    engine.end_turn();
    (outcome, echoes)
}

fn focused_control(control: TextControl) -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let node = doc.create_control(control);
    doc.append_child(root, node);
    doc.focus(Some(node));
    (doc, node)
}

pub fn textarea(value: &str) -> (Document, NodeId) {
    focused_control(TextControl::multi_line(value))
}

pub fn text_input(input_type: InputType, value: &str) -> (Document, NodeId) {
    focused_control(TextControl::single_line(input_type, value))
}

pub fn value(doc: &Document, node: NodeId) -> String {
    doc.control(node).expect("control node").value()
}

pub fn caret(doc: &Document, node: NodeId) -> usize {
    let (start, end) = doc.control(node).expect("control node").selection();
    assert_eq!(start, end, "selection must be collapsed");
    start
}

/// Type into a plain control like a user: key press first, then the edit
/// and its native notification unless the engine cancelled the key.
pub fn type_plain(engine: &mut Engine, doc: &mut Document, node: NodeId, text: &str) {
    for ch in text.chars() {
        let outcome = engine.handle(doc, &key(KeyCode::Char(ch)));
        if !outcome.prevent_default() {
            doc.control_mut(node)
                .expect("control node")
                .replace_selection(ch.encode_utf8(&mut [0; 4]));
            engine.handle(doc, &typed(ch));
        }
        pump(engine, doc);
        engine.end_turn();
    }
}

/// Empty rich editor with focus and a caret inside it.
pub fn rich_editor() -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let editor = doc.create_element("div", Editable::True);
    doc.append_child(root, editor);
    doc.focus(Some(editor));
    doc.collapse_to(Boundary::new(editor, 0));
    (doc, editor)
}

/// Type into a rich editor through the host's native insert path.
pub fn type_rich(engine: &mut Engine, doc: &mut Document, editor: NodeId, text: &str) {
    let mut native = NativeInsertText::new();
    for ch in text.chars() {
        let outcome = engine.handle(doc, &key(KeyCode::Char(ch)));
        if !outcome.prevent_default() {
            let at = doc.selection().expect("caret").start;
            let caret = native
                .insert_text(doc, editor, at, ch.encode_utf8(&mut [0; 4]))
                .expect("native insert");
            doc.collapse_to(caret);
            // The native notification is re-sent with the inserted text.
            doc.take_events();
            engine.handle(doc, &typed(ch));
        }
        pump(engine, doc);
        engine.end_turn();
    }
}

pub fn rich_text(doc: &Document, editor: NodeId) -> String {
    doc.text_content(editor)
}

/// Linear text before the caret and the caret offset of a rich editor.
pub fn rich_caret(doc: &mut Document, editor: NodeId) -> (String, Option<usize>) {
    let surface = RichSurface::new(doc, editor, None);
    (surface.text_before_cursor(), surface.cursor())
}
