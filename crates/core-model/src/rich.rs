//! Rich (tree-structured) editable regions.
//!
//! Deletion runs over the flat, indexable leaf sequence of the region rather
//! than chasing sibling and parent links, so the algorithm in
//! [`delete_backward`] is testable on synthetic sequences. Insertion prefers a
//! host [`InsertTextPrimitive`] and falls back to building text and break
//! leaves directly.

use core_text::{char_len, char_to_byte, normalize_line_breaks};

use crate::{Boundary, DocEvent, Document, NodeId, NodeKind, Surface, SurfaceError, SurfaceKind};

/// Host-provided "insert text at the caret" command.
///
/// Hosts that integrate with a native undo history install one of these; the
/// surface then routes insertion through it. Returning `None` declines and
/// the surface falls back to manual fragment insertion.
pub trait InsertTextPrimitive {
    fn name(&self) -> &'static str;

    /// Insert `text` at the collapsed boundary `at` inside `root` and return
    /// the caret right after the inserted text.
    fn insert_text(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        at: Boundary,
        text: &str,
    ) -> Option<Boundary>;
}

/// One entry in [`NativeInsertText`]'s history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeEdit {
    pub root: NodeId,
    pub chars: usize,
}

/// Reference insert command modelling a browser-style `insertText`: text is
/// merged into the adjacent text leaf, every call raises a native input
/// notification and lands in an undo history.
#[derive(Debug, Default)]
pub struct NativeInsertText {
    history: Vec<NativeEdit>,
}

impl NativeInsertText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[NativeEdit] {
        &self.history
    }
}

impl InsertTextPrimitive for NativeInsertText {
    fn name(&self) -> &'static str {
        "native_insert_text"
    }

    fn insert_text(
        &mut self,
        doc: &mut Document,
        root: NodeId,
        at: Boundary,
        text: &str,
    ) -> Option<Boundary> {
        let caret = if text.contains('\n') {
            insert_fragment(doc, at, text)?
        } else {
            merge_text(doc, at, text)?
        };
        doc.push_event(DocEvent::Input { target: root });
        self.history.push(NativeEdit {
            root,
            chars: char_len(text),
        });
        Some(caret)
    }
}

fn merge_text(doc: &mut Document, at: Boundary, text: &str) -> Option<Boundary> {
    let added = char_len(text);
    if let Some(current) = doc.text(at.node) {
        let offset = at.offset.min(char_len(current));
        let split = char_to_byte(current, offset);
        let merged = format!("{}{}{}", &current[..split], text, &current[split..]);
        doc.set_text(at.node, merged);
        return Some(Boundary::new(at.node, offset + added));
    }
    let (parent, index) = doc.split_at(at)?;
    let previous = index
        .checked_sub(1)
        .and_then(|i| doc.children(parent).get(i).copied())
        .and_then(|prev| doc.text(prev).map(|s| (prev, s.to_string())));
    if let Some((prev, existing)) = previous {
        let offset = char_len(&existing) + added;
        doc.set_text(prev, existing + text);
        return Some(Boundary::new(prev, offset));
    }
    let leaf = doc.create_text(text);
    doc.insert_child(parent, index, leaf);
    Some(Boundary::new(leaf, added))
}

/// Build text leaves split on `\n` with break leaves between them and insert
/// them at `at`. Returns the caret after the last inserted unit, or `at`
/// unchanged when nothing was inserted.
pub fn insert_fragment(doc: &mut Document, at: Boundary, text: &str) -> Option<Boundary> {
    let mut units = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            units.push(doc.create_break());
        }
        if !line.is_empty() {
            units.push(doc.create_text(line));
        }
    }
    if units.is_empty() {
        return Some(at);
    }
    let (parent, mut index) = doc.split_at(at)?;
    for unit in units {
        doc.insert_child(parent, index, unit);
        index += 1;
    }
    Some(Boundary::new(parent, index))
}

/// Linear content of one leaf in a [`LeafSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Break,
}

impl Segment {
    pub fn len(&self) -> usize {
        match self {
            Segment::Text(s) => char_len(s),
            Segment::Break => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Indexable leaf sequence with per-leaf edit tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSequence {
    segments: Vec<Segment>,
    touched: Vec<bool>,
}

impl LeafSequence {
    pub fn new(segments: Vec<Segment>) -> Self {
        let touched = vec![false; segments.len()];
        Self { segments, touched }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether leaf `index` was spliced and ended up empty.
    pub fn emptied(&self, index: usize) -> bool {
        self.touched[index] && self.segments[index].is_empty()
    }

    pub fn linear(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.as_str(),
                Segment::Break => "\n",
            })
            .collect()
    }

    fn remove_tail(&mut self, index: usize, end: usize, count: usize) {
        self.touched[index] = true;
        match &mut self.segments[index] {
            Segment::Text(s) => {
                let from = char_to_byte(s, end - count);
                let to = char_to_byte(s, end);
                s.replace_range(from..to, "");
            }
            Segment::Break => {
                self.segments[index] = Segment::Text(String::new());
            }
        }
    }
}

/// Cursor inside a [`LeafSequence`]: leaf index plus chars before it in that leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafCursor {
    pub index: usize,
    pub offset: usize,
}

/// Deletion ran out of text before removing everything requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub deleted: usize,
}

/// Remove `count` chars ending at `cursor`, walking backward across leaves.
///
/// Returns where the deletion collapsed. Leaves already spliced stay spliced
/// when the sequence runs out early.
pub fn delete_backward(
    seq: &mut LeafSequence,
    cursor: LeafCursor,
    count: usize,
) -> Result<LeafCursor, Shortfall> {
    let mut remaining = count;
    let LeafCursor {
        mut index,
        mut offset,
    } = cursor;
    if remaining == 0 {
        return Ok(cursor);
    }
    if index >= seq.segments.len() {
        return Err(Shortfall { deleted: 0 });
    }
    offset = offset.min(seq.segments[index].len());
    loop {
        let take = remaining.min(offset);
        if take > 0 {
            seq.remove_tail(index, offset, take);
            remaining -= take;
            offset -= take;
        }
        if remaining == 0 {
            return Ok(LeafCursor { index, offset });
        }
        if index == 0 {
            return Err(Shortfall {
                deleted: count - remaining,
            });
        }
        index -= 1;
        offset = seq.segments[index].len();
    }
}

/// Rich surface rooted at the nearest rich-editable ancestor.
pub struct RichSurface<'a> {
    doc: &'a mut Document,
    root: NodeId,
    primitive: Option<&'a mut dyn InsertTextPrimitive>,
}

impl<'a> RichSurface<'a> {
    pub fn new(
        doc: &'a mut Document,
        root: NodeId,
        primitive: Option<&'a mut dyn InsertTextPrimitive>,
    ) -> Self {
        Self {
            doc,
            root,
            primitive,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn start_boundary(&self) -> Result<Boundary, SurfaceError> {
        let selection = self.doc.selection().ok_or(SurfaceError::NoSelection)?;
        if !self.doc.contains(self.root, selection.start.node) {
            return Err(SurfaceError::Detached);
        }
        Ok(selection.start)
    }

    /// Leaves of the region plus the cursor position among them.
    fn locate(&self, at: Boundary) -> Result<(Vec<NodeId>, Option<LeafCursor>), SurfaceError> {
        let spans = self
            .doc
            .walk_to(self.root, at)
            .ok_or(SurfaceError::Detached)?;
        let leaves = self.doc.leaves(self.root);
        let cursor = spans.last().map(|span| LeafCursor {
            index: spans.len() - 1,
            offset: span.taken,
        });
        debug_assert!(spans.iter().zip(&leaves).all(|(s, l)| s.leaf == *l));
        Ok((leaves, cursor))
    }

    fn sequence(&self, leaves: &[NodeId]) -> LeafSequence {
        LeafSequence::new(
            leaves
                .iter()
                .map(|&leaf| match self.doc.kind(leaf) {
                    NodeKind::Text(s) => Segment::Text(s.clone()),
                    _ => Segment::Break,
                })
                .collect(),
        )
    }

    /// Write spliced segments back to the tree and resolve the collapse point.
    fn apply(
        &mut self,
        leaves: &[NodeId],
        seq: &LeafSequence,
        upto: usize,
        at: LeafCursor,
    ) -> Option<Boundary> {
        let anchor = leaves[at.index];
        let anchor_is_break = matches!(self.doc.kind(anchor), NodeKind::Break);
        let collapse = if seq.emptied(at.index) || anchor_is_break {
            let parent = self.doc.parent(anchor)?;
            let index = self.doc.index_in_parent(anchor)?;
            let after = usize::from(!seq.emptied(at.index) && at.offset > 0);
            Boundary::new(parent, index + after)
        } else {
            Boundary::new(anchor, at.offset)
        };
        for i in at.index..=upto {
            if !seq.touched[i] {
                continue;
            }
            if seq.emptied(i) {
                self.doc.detach(leaves[i]);
            } else if let Segment::Text(s) = &seq.segments()[i] {
                self.doc.set_text(leaves[i], s.clone());
            }
        }
        Some(collapse)
    }

    fn insert_unit_path(&mut self, at: Boundary, text: &str) -> Result<Boundary, SurfaceError> {
        if let Some(primitive) = self.primitive.as_mut() {
            let name = primitive.name();
            match primitive.insert_text(self.doc, self.root, at, text) {
                Some(caret) => {
                    tracing::trace!(target: "model.rich", primitive = name, chars = char_len(text), "primitive_insert");
                    return Ok(caret);
                }
                None => {
                    tracing::debug!(target: "model.rich", primitive = name, "primitive_declined_fallback");
                }
            }
        }
        let caret = insert_fragment(self.doc, at, text).ok_or(SurfaceError::Detached)?;
        tracing::trace!(target: "model.rich", chars = char_len(text), "fragment_insert");
        Ok(caret)
    }
}

impl Surface for RichSurface<'_> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Rich
    }

    fn text_before_cursor(&self) -> String {
        let Ok(at) = self.start_boundary() else {
            return String::new();
        };
        let mut out = String::new();
        for span in self.doc.walk_to(self.root, at).unwrap_or_default() {
            self.doc.push_linear(span.leaf, span.taken, &mut out);
        }
        out
    }

    fn cursor(&self) -> Option<usize> {
        let at = self.start_boundary().ok()?;
        let spans = self.doc.walk_to(self.root, at)?;
        Some(spans.iter().map(|s| s.taken).sum())
    }

    fn delete_before_cursor(&mut self, count: usize) -> Result<(), SurfaceError> {
        let at = self.start_boundary()?;
        if count == 0 {
            self.doc.collapse_to(at);
            return Ok(());
        }
        let (leaves, cursor) = self.locate(at)?;
        let Some(cursor) = cursor else {
            return Err(SurfaceError::Stale);
        };
        let mut seq = self.sequence(&leaves);
        match delete_backward(&mut seq, cursor, count) {
            Ok(point) => {
                let collapse = self
                    .apply(&leaves, &seq, cursor.index, point)
                    .ok_or(SurfaceError::Detached)?;
                self.doc.collapse_to(collapse);
                tracing::trace!(
                    target: "model.rich",
                    deleted = count,
                    leaves_spanned = cursor.index - point.index + 1,
                    "backward_delete"
                );
                Ok(())
            }
            Err(short) => {
                let first = LeafCursor { index: 0, offset: 0 };
                if let Some(collapse) = self.apply(&leaves, &seq, cursor.index, first) {
                    self.doc.collapse_to(collapse);
                }
                tracing::debug!(
                    target: "model.rich",
                    requested = count,
                    deleted = short.deleted,
                    "backward_delete_ran_out"
                );
                Err(SurfaceError::Stale)
            }
        }
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<(), SurfaceError> {
        let at = self.start_boundary()?;
        let text = normalize_line_breaks(text);
        let caret = if text.is_empty() {
            at
        } else {
            self.insert_unit_path(at, &text)?
        };
        self.doc.collapse_to(caret);
        Ok(())
    }

    fn set_cursor(&mut self, offset: usize) -> Result<(), SurfaceError> {
        let mut acc = 0;
        for leaf in self.doc.leaves(self.root) {
            let len = self.doc.leaf_len(leaf);
            let is_break = matches!(self.doc.kind(leaf), NodeKind::Break);
            if !is_break && offset <= acc + len {
                self.doc.collapse_to(Boundary::new(leaf, offset - acc));
                return Ok(());
            }
            if is_break && offset == acc {
                let parent = self.doc.parent(leaf).ok_or(SurfaceError::Detached)?;
                let index = self
                    .doc
                    .index_in_parent(leaf)
                    .ok_or(SurfaceError::Detached)?;
                self.doc.collapse_to(Boundary::new(parent, index));
                return Ok(());
            }
            acc += len;
        }
        if offset == acc {
            let end = self.doc.children(self.root).len();
            self.doc.collapse_to(Boundary::new(self.root, end));
            return Ok(());
        }
        Err(SurfaceError::Stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Editable, Selection};
    use pretty_assertions::assert_eq;

    fn seq(parts: &[&str]) -> LeafSequence {
        LeafSequence::new(
            parts
                .iter()
                .map(|p| {
                    if *p == "\n" {
                        Segment::Break
                    } else {
                        Segment::Text((*p).to_string())
                    }
                })
                .collect(),
        )
    }

    fn rich_doc(parts: &[&str]) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let host = doc.create_element("div", Editable::True);
        let root = doc.root();
        doc.append_child(root, host);
        let ids = parts
            .iter()
            .map(|p| {
                let id = if *p == "\n" {
                    doc.create_break()
                } else {
                    doc.create_text(p)
                };
                doc.append_child(host, id);
                id
            })
            .collect();
        (doc, host, ids)
    }

    #[test]
    fn delete_backward_within_one_leaf() {
        let mut s = seq(&["Thanks /sig"]);
        let at = delete_backward(&mut s, LeafCursor { index: 0, offset: 11 }, 4).unwrap();
        assert_eq!(at, LeafCursor { index: 0, offset: 7 });
        assert_eq!(s.linear(), "Thanks ");
        assert!(!s.emptied(0));
    }

    #[test]
    fn delete_backward_crosses_segments_and_empties_them() {
        let mut s = seq(&["hi ", "/s", "i", "g"]);
        let at = delete_backward(&mut s, LeafCursor { index: 3, offset: 1 }, 4).unwrap();
        assert_eq!(at, LeafCursor { index: 1, offset: 0 });
        assert_eq!(s.linear(), "hi ");
        assert!(s.emptied(1) && s.emptied(2) && s.emptied(3));
        assert!(!s.emptied(0));
    }

    #[test]
    fn delete_backward_keeps_text_after_cursor() {
        let mut s = seq(&["a/x", "yz tail"]);
        let at = delete_backward(&mut s, LeafCursor { index: 1, offset: 2 }, 4).unwrap();
        assert_eq!(at, LeafCursor { index: 0, offset: 1 });
        assert_eq!(s.linear(), "a tail");
        assert!(!s.emptied(1));
    }

    #[test]
    fn delete_backward_removes_breaks_as_one_char() {
        let mut s = seq(&["ab", "\n", "c"]);
        delete_backward(&mut s, LeafCursor { index: 2, offset: 1 }, 2).unwrap();
        assert_eq!(s.linear(), "ab");
        assert!(s.emptied(1));
    }

    #[test]
    fn delete_backward_reports_shortfall_after_partial_splice() {
        let mut s = seq(&["ab"]);
        let err = delete_backward(&mut s, LeafCursor { index: 0, offset: 2 }, 5).unwrap_err();
        assert_eq!(err, Shortfall { deleted: 2 });
        assert_eq!(s.linear(), "");
    }

    #[test]
    fn delete_backward_counts_chars_not_bytes() {
        let mut s = seq(&["café/é"]);
        delete_backward(&mut s, LeafCursor { index: 0, offset: 6 }, 2).unwrap();
        assert_eq!(s.linear(), "café");
    }

    #[test]
    fn surface_extracts_text_before_cursor() {
        let (mut doc, host, ids) = rich_doc(&["ab", "\n", "c/si"]);
        doc.collapse_to(Boundary::new(ids[2], 3));
        let surface = RichSurface::new(&mut doc, host, None);
        assert_eq!(surface.text_before_cursor(), "ab\nc/s");
        assert_eq!(surface.cursor(), Some(6));
    }

    #[test]
    fn surface_extraction_fails_soft_outside_root() {
        let (mut doc, host, _) = rich_doc(&["ab"]);
        let root = doc.root();
        doc.collapse_to(Boundary::new(root, 0));
        let surface = RichSurface::new(&mut doc, host, None);
        assert_eq!(surface.text_before_cursor(), "");
        assert_eq!(surface.cursor(), None);
    }

    #[test]
    fn surface_delete_removes_split_token_and_collapses() {
        let (mut doc, host, ids) = rich_doc(&["hi ", "/s", "ig"]);
        doc.collapse_to(Boundary::new(ids[2], 2));
        let mut surface = RichSurface::new(&mut doc, host, None);
        surface.delete_before_cursor(4).unwrap();
        assert_eq!(surface.cursor(), Some(3));
        assert_eq!(doc.text_content(host), "hi ");
        assert_eq!(doc.children(host), &[ids[0]]);
        assert_eq!(doc.selection(), Some(Selection::collapsed(Boundary::new(host, 1))));
    }

    #[test]
    fn surface_fallback_insert_builds_breaks() {
        let (mut doc, host, ids) = rich_doc(&["Hi /x", " tail"]);
        doc.collapse_to(Boundary::new(ids[0], 5));
        let mut surface = RichSurface::new(&mut doc, host, None);
        surface.replace_before_cursor(2, "A\nB").unwrap();
        assert_eq!(surface.text_before_cursor(), "Hi A\nB");
        assert_eq!(doc.text_content(host), "Hi A\nB tail");
        let breaks = doc
            .leaves(host)
            .into_iter()
            .filter(|&l| matches!(doc.kind(l), NodeKind::Break))
            .count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn surface_routes_through_primitive() {
        let (mut doc, host, ids) = rich_doc(&["x /a"]);
        doc.collapse_to(Boundary::new(ids[0], 4));
        let mut native = NativeInsertText::new();
        let mut surface = RichSurface::new(&mut doc, host, Some(&mut native));
        surface.replace_before_cursor(2, "alpha").unwrap();
        assert_eq!(surface.text_before_cursor(), "x alpha");
        assert_eq!(native.history(), &[NativeEdit { root: host, chars: 5 }]);
        assert_eq!(doc.take_events(), vec![DocEvent::Input { target: host }]);
        assert_eq!(doc.leaves(host).len(), 1, "merged into the existing leaf");
    }

    #[test]
    fn empty_insert_keeps_deletion_point() {
        let (mut doc, host, ids) = rich_doc(&["ab"]);
        doc.collapse_to(Boundary::new(ids[0], 1));
        let mut surface = RichSurface::new(&mut doc, host, None);
        surface.insert_at_cursor("").unwrap();
        assert_eq!(doc.selection(), Some(Selection::collapsed(Boundary::new(ids[0], 1))));
    }

    #[test]
    fn set_cursor_maps_linear_offsets() {
        let (mut doc, host, ids) = rich_doc(&["ab", "\n", "cd"]);
        let mut surface = RichSurface::new(&mut doc, host, None);
        surface.set_cursor(1).unwrap();
        assert_eq!(surface.cursor(), Some(1));
        surface.set_cursor(3).unwrap();
        assert_eq!(surface.text_before_cursor(), "ab\n");
        surface.set_cursor(5).unwrap();
        assert_eq!(surface.cursor(), Some(5));
        assert!(surface.set_cursor(9).is_err());
        assert_eq!(doc.selection().unwrap().start, Boundary::new(ids[2], 2));
    }
}
