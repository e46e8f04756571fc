//! Arena-backed document tree.
//!
//! Nodes are addressed by `NodeId` and never freed; detaching a node only
//! unlinks it from its parent. Offsets inside text nodes count chars, offsets
//! inside elements count children.

use core_text::{Buffer, char_len, char_to_byte};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Explicit `contenteditable` flag on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Editable {
    #[default]
    Inherit,
    True,
    False,
}

/// Declared kind of a single-line input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    Unspecified,
    Text,
    Search,
    Url,
    Email,
    Tel,
    Other(String),
}

impl InputType {
    /// Parse the `type` attribute the way hosts report it (case-insensitive).
    pub fn parse(attr: Option<&str>) -> Self {
        let Some(raw) = attr.map(str::trim).filter(|s| !s.is_empty()) else {
            return InputType::Unspecified;
        };
        match raw.to_ascii_lowercase().as_str() {
            "text" => InputType::Text,
            "search" => InputType::Search,
            "url" => InputType::Url,
            "email" => InputType::Email,
            "tel" => InputType::Tel,
            other => InputType::Other(other.to_string()),
        }
    }

    /// Free-text kinds that accept expansion.
    pub fn accepts_free_text(&self) -> bool {
        !matches!(self, InputType::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    SingleLine(InputType),
    MultiLine,
}

/// Form control owning a flat value and a char-offset selection.
#[derive(Debug, Clone)]
pub struct TextControl {
    pub kind: ControlKind,
    pub read_only: bool,
    pub disabled: bool,
    buffer: Buffer,
    selection_start: usize,
    selection_end: usize,
}

impl TextControl {
    /// Single-line control with the caret at the end of `value`.
    pub fn single_line(input_type: InputType, value: &str) -> Self {
        Self::build(ControlKind::SingleLine(input_type), value)
    }

    /// Multi-line control with the caret at the end of `value`.
    pub fn multi_line(value: &str) -> Self {
        Self::build(ControlKind::MultiLine, value)
    }

    fn build(kind: ControlKind, value: &str) -> Self {
        let buffer = Buffer::from_text(value);
        let end = buffer.len_chars();
        Self {
            kind,
            read_only: false,
            disabled: false,
            buffer,
            selection_start: end,
            selection_end: end,
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self.kind, ControlKind::MultiLine)
    }

    pub fn value(&self) -> String {
        self.buffer.contents()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.buffer.slice_chars(start, end)
    }

    /// `(selection_start, selection_end)` with `start <= end`.
    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Set the selection, clamping to the value and ordering the ends.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.buffer.len_chars();
        let (a, b) = (start.min(len), end.min(len));
        self.selection_start = a.min(b);
        self.selection_end = a.max(b);
    }

    /// Host-side typing: replace the selection with `text`.
    pub fn replace_selection(&mut self, text: &str) -> usize {
        let (start, end) = self.selection();
        self.splice(start, end, text)
    }

    /// Replace `[start, end)` and collapse the caret after the inserted text.
    pub(crate) fn splice(&mut self, start: usize, end: usize, text: &str) -> usize {
        let caret = self.buffer.splice(start, end, text);
        self.selection_start = caret;
        self.selection_end = caret;
        caret
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element { tag: String, editable: Editable },
    Text(String),
    Break,
    Control(TextControl),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Position inside the tree: a char offset in a text node, a child index in
/// an element, and 0 or 1 (before or after) for a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Boundary,
    pub end: Boundary,
}

impl Selection {
    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Notifications the document raises for the host to re-dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEvent {
    /// Native input notification fired by a control or the host insert path.
    Input { target: NodeId },
    /// Synthetic content-changed notification raised after a fallback edit.
    ContentChanged { target: NodeId },
}

impl DocEvent {
    pub fn target(&self) -> NodeId {
        match self {
            DocEvent::Input { target } | DocEvent::ContentChanged { target } => *target,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, DocEvent::ContentChanged { .. })
    }
}

/// Walk result: a leaf and how many of its linear chars precede the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafSpan {
    pub leaf: NodeId,
    pub taken: usize,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    focused: Option<NodeId>,
    selection: Option<Selection>,
    events: Vec<DocEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element {
                tag: "body".to_string(),
                editable: Editable::Inherit,
            },
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            focused: None,
            selection: None,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn create_element(&mut self, tag: &str, editable: Editable) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_string(),
            editable,
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn create_break(&mut self) -> NodeId {
        self.alloc(NodeKind::Break)
    }

    pub fn create_control(&mut self, control: TextControl) -> NodeId {
        self.alloc(NodeKind::Control(control))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` at `index` under `parent`, detaching it first if needed.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: String) {
        if let NodeKind::Text(s) = &mut self.nodes[node.0].kind {
            *s = text;
        }
    }

    pub fn control(&self, node: NodeId) -> Option<&TextControl> {
        match &self.nodes[node.0].kind {
            NodeKind::Control(c) => Some(c),
            _ => None,
        }
    }

    pub fn control_mut(&mut self, node: NodeId) -> Option<&mut TextControl> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Control(c) => Some(c),
            _ => None,
        }
    }

    /// Inclusive ancestry test.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    pub fn focus(&mut self, node: Option<NodeId>) {
        self.focused = node;
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn collapse_to(&mut self, at: Boundary) {
        self.selection = Some(Selection::collapsed(at));
    }

    /// Text and break leaves under `root` in document order. Controls are
    /// opaque and contribute nothing.
    pub fn leaves(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(root, &mut out);
        out
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(_) | NodeKind::Break => out.push(node),
            NodeKind::Control(_) => {}
            NodeKind::Element { .. } => {
                for &child in &self.nodes[node.0].children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Linear length of a leaf: chars for text, 1 for a break.
    pub fn leaf_len(&self, leaf: NodeId) -> usize {
        match &self.nodes[leaf.0].kind {
            NodeKind::Text(s) => char_len(s),
            NodeKind::Break => 1,
            _ => 0,
        }
    }

    /// Linearized text under `root`; a break reads as `\n`.
    pub fn text_content(&self, root: NodeId) -> String {
        let mut out = String::new();
        for leaf in self.leaves(root) {
            self.push_linear(leaf, usize::MAX, &mut out);
        }
        out
    }

    pub(crate) fn push_linear(&self, leaf: NodeId, taken: usize, out: &mut String) {
        match &self.nodes[leaf.0].kind {
            NodeKind::Text(s) => {
                let end = char_to_byte(s, taken);
                out.push_str(&s[..end]);
            }
            NodeKind::Break if taken > 0 => out.push('\n'),
            _ => {}
        }
    }

    /// Leaves preceding `to` inside `root`, in document order, each with the
    /// number of its linear chars that lie before the boundary. `None` when
    /// the boundary is not inside `root`.
    pub fn walk_to(&self, root: NodeId, to: Boundary) -> Option<Vec<LeafSpan>> {
        if !self.contains(root, to.node) {
            return None;
        }
        let mut out = Vec::new();
        self.walk(root, to, &mut out);
        Some(out)
    }

    fn walk(&self, node: NodeId, to: Boundary, out: &mut Vec<LeafSpan>) -> bool {
        let reached = node == to.node;
        match &self.nodes[node.0].kind {
            NodeKind::Text(s) => {
                let len = char_len(s);
                let taken = if reached { to.offset.min(len) } else { len };
                out.push(LeafSpan { leaf: node, taken });
                reached
            }
            NodeKind::Break => {
                if !reached || to.offset > 0 {
                    out.push(LeafSpan {
                        leaf: node,
                        taken: 1,
                    });
                }
                reached
            }
            NodeKind::Control(_) => reached,
            NodeKind::Element { .. } => {
                let children = &self.nodes[node.0].children;
                let limit = if reached {
                    to.offset.min(children.len())
                } else {
                    children.len()
                };
                for &child in &children[..limit] {
                    if self.walk(child, to, out) {
                        return true;
                    }
                }
                reached
            }
        }
    }

    /// Turn a boundary into an `(element, child index)` insertion point,
    /// splitting a text node when the boundary falls inside it.
    pub fn split_at(&mut self, at: Boundary) -> Option<(NodeId, usize)> {
        match &self.nodes[at.node.0].kind {
            NodeKind::Element { .. } => {
                let index = at.offset.min(self.children(at.node).len());
                Some((at.node, index))
            }
            NodeKind::Text(s) => {
                let parent = self.parent(at.node)?;
                let index = self.index_in_parent(at.node)?;
                let len = char_len(s);
                if at.offset == 0 {
                    return Some((parent, index));
                }
                if at.offset >= len {
                    return Some((parent, index + 1));
                }
                let split = char_to_byte(s, at.offset);
                let (head, tail) = (s[..split].to_string(), s[split..].to_string());
                self.set_text(at.node, head);
                let rest = self.create_text(&tail);
                self.insert_child(parent, index + 1, rest);
                Some((parent, index + 1))
            }
            NodeKind::Break | NodeKind::Control(_) => {
                let parent = self.parent(at.node)?;
                let index = self.index_in_parent(at.node)?;
                Some((parent, index + usize::from(at.offset > 0)))
            }
        }
    }

    pub fn push_event(&mut self, event: DocEvent) {
        self.events.push(event);
    }

    /// Drain pending notifications in the order they were raised.
    pub fn take_events(&mut self) -> Vec<DocEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(doc: &mut Document, parts: &[&str]) -> (NodeId, Vec<NodeId>) {
        let host = doc.create_element("div", Editable::True);
        let root = doc.root();
        doc.append_child(root, host);
        let mut ids = Vec::new();
        for part in parts {
            let id = if *part == "\n" {
                doc.create_break()
            } else {
                doc.create_text(part)
            };
            doc.append_child(host, id);
            ids.push(id);
        }
        (host, ids)
    }

    #[test]
    fn input_type_parse_is_case_insensitive() {
        assert_eq!(InputType::parse(None), InputType::Unspecified);
        assert_eq!(InputType::parse(Some("  ")), InputType::Unspecified);
        assert_eq!(InputType::parse(Some("EMAIL")), InputType::Email);
        assert_eq!(
            InputType::parse(Some("password")),
            InputType::Other("password".into())
        );
        assert!(!InputType::parse(Some("number")).accepts_free_text());
        assert!(InputType::parse(Some("search")).accepts_free_text());
    }

    #[test]
    fn control_selection_is_clamped_and_ordered() {
        let mut c = TextControl::single_line(InputType::Text, "hello");
        assert_eq!(c.selection(), (5, 5));
        c.set_selection(9, 2);
        assert_eq!(c.selection(), (2, 5));
        assert_eq!(c.replace_selection("y"), 3);
        assert_eq!(c.value(), "hey");
    }

    #[test]
    fn text_content_linearizes_breaks() {
        let mut doc = Document::new();
        let (host, _) = paragraph(&mut doc, &["ab", "\n", "cd"]);
        assert_eq!(doc.text_content(host), "ab\ncd");
        assert_eq!(doc.leaves(host).len(), 3);
    }

    #[test]
    fn walk_to_stops_mid_text() {
        let mut doc = Document::new();
        let (host, ids) = paragraph(&mut doc, &["ab", "\n", "cdef"]);
        let spans = doc.walk_to(host, Boundary::new(ids[2], 2)).unwrap();
        assert_eq!(
            spans,
            vec![
                LeafSpan { leaf: ids[0], taken: 2 },
                LeafSpan { leaf: ids[1], taken: 1 },
                LeafSpan { leaf: ids[2], taken: 2 },
            ]
        );
    }

    #[test]
    fn walk_to_element_boundary_counts_children() {
        let mut doc = Document::new();
        let (host, ids) = paragraph(&mut doc, &["ab", "\n", "cd"]);
        let spans = doc.walk_to(host, Boundary::new(host, 2)).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].leaf, ids[1]);
        assert!(doc.walk_to(ids[0], Boundary::new(host, 0)).is_none());
    }

    #[test]
    fn split_at_divides_text_nodes() {
        let mut doc = Document::new();
        let (host, ids) = paragraph(&mut doc, &["héllo"]);
        let point = doc.split_at(Boundary::new(ids[0], 2)).unwrap();
        assert_eq!(point, (host, 1));
        assert_eq!(doc.text(ids[0]), Some("hé"));
        let tail = doc.children(host)[1];
        assert_eq!(doc.text(tail), Some("llo"));
        assert_eq!(doc.split_at(Boundary::new(ids[0], 0)), Some((host, 0)));
    }

    #[test]
    fn insert_child_moves_attached_nodes() {
        let mut doc = Document::new();
        let (host, ids) = paragraph(&mut doc, &["a", "b"]);
        doc.insert_child(host, 0, ids[1]);
        assert_eq!(doc.text_content(host), "ba");
        doc.detach(ids[0]);
        assert_eq!(doc.text_content(host), "b");
        assert!(!doc.contains(host, ids[0]));
    }

    #[test]
    fn events_drain_in_order() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.push_event(DocEvent::Input { target: root });
        doc.push_event(DocEvent::ContentChanged { target: root });
        let events = doc.take_events();
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_synthetic());
        assert!(events[1].is_synthetic());
        assert!(doc.take_events().is_empty());
    }
}
