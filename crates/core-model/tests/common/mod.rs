#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_model::{Boundary, Document, Editable, NodeId, TextControl};

/// Piece of rich content: plain text, a break, or text wrapped in an inline element.
#[derive(Debug, Clone, Copy)]
pub enum Piece<'a> {
    Text(&'a str),
    Break,
    Styled(&'a str, &'a str),
}

pub struct RichFixture {
    pub doc: Document,
    pub editor: NodeId,
    /// Text leaves in document order (styled leaves included).
    pub texts: Vec<NodeId>,
}

impl RichFixture {
    pub fn caret_at_end(&mut self) {
        let end = self.doc.children(self.editor).len();
        self.doc.collapse_to(Boundary::new(self.editor, end));
        self.doc.focus(Some(self.editor));
    }

    pub fn text(&self) -> String {
        self.doc.text_content(self.editor)
    }
}

pub fn rich(pieces: &[Piece<'_>]) -> RichFixture {
    let mut doc = Document::new();
    let root = doc.root();
    let editor = doc.create_element("div", Editable::True);
    doc.append_child(root, editor);
    let mut texts = Vec::new();
    for piece in pieces {
        match *piece {
            Piece::Text(s) => {
                let t = doc.create_text(s);
                doc.append_child(editor, t);
                texts.push(t);
            }
            Piece::Break => {
                let br = doc.create_break();
                doc.append_child(editor, br);
            }
            Piece::Styled(tag, s) => {
                let el = doc.create_element(tag, Editable::Inherit);
                doc.append_child(editor, el);
                let t = doc.create_text(s);
                doc.append_child(el, t);
                texts.push(t);
            }
        }
    }
    RichFixture { doc, editor, texts }
}

pub fn textarea(value: &str) -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let node = doc.create_control(TextControl::multi_line(value));
    doc.append_child(root, node);
    doc.focus(Some(node));
    (doc, node)
}
