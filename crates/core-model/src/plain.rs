use core_text::{flatten_line_breaks, normalize_line_breaks};

use crate::{DocEvent, Document, NodeId, Surface, SurfaceError, SurfaceKind, TextControl};

/// Flat-buffer surface over a text control.
///
/// Every mutation is a single splice of the control's buffer followed by the
/// native input notification the control raises for it.
pub struct PlainSurface<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> PlainSurface<'a> {
    pub fn new(doc: &'a mut Document, node: NodeId) -> Result<Self, SurfaceError> {
        if doc.control(node).is_none() {
            return Err(SurfaceError::NotEditable(node));
        }
        Ok(Self { doc, node })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    fn control(&self) -> Result<&TextControl, SurfaceError> {
        self.doc
            .control(self.node)
            .ok_or(SurfaceError::NotEditable(self.node))
    }

    fn writable(&mut self) -> Result<&mut TextControl, SurfaceError> {
        let node = self.node;
        let control = self
            .doc
            .control_mut(node)
            .ok_or(SurfaceError::NotEditable(node))?;
        if control.read_only || control.disabled {
            return Err(SurfaceError::ReadOnly);
        }
        Ok(control)
    }

    /// Replace `count` chars before the selection start, plus the selection
    /// itself, with `text` in one splice.
    fn splice_before(&mut self, count: usize, text: &str) -> Result<(), SurfaceError> {
        let control = self.writable()?;
        let text = if control.is_multiline() {
            normalize_line_breaks(text)
        } else {
            flatten_line_breaks(text, ' ')
        };
        let (start, end) = control.selection();
        let Some(from) = start.checked_sub(count) else {
            tracing::debug!(target: "model.plain", requested = count, available = start, "splice_start_negative");
            return Err(SurfaceError::Stale);
        };
        let caret = control.splice(from, end, &text);
        tracing::trace!(target: "model.plain", removed = end - from, caret, "splice");
        let target = self.node;
        self.doc.push_event(DocEvent::Input { target });
        Ok(())
    }
}

impl Surface for PlainSurface<'_> {
    fn kind(&self) -> SurfaceKind {
        let multiline = self.control().is_ok_and(TextControl::is_multiline);
        SurfaceKind::Plain { multiline }
    }

    fn text_before_cursor(&self) -> String {
        self.control()
            .map(|c| c.slice(0, c.selection().0))
            .unwrap_or_default()
    }

    fn cursor(&self) -> Option<usize> {
        self.control().ok().map(|c| c.selection().0)
    }

    fn delete_before_cursor(&mut self, count: usize) -> Result<(), SurfaceError> {
        self.splice_before(count, "")
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.splice_before(0, text)
    }

    fn set_cursor(&mut self, offset: usize) -> Result<(), SurfaceError> {
        let control = self.writable()?;
        if offset > control.len_chars() {
            return Err(SurfaceError::Stale);
        }
        control.set_selection(offset, offset);
        Ok(())
    }

    fn replace_before_cursor(&mut self, count: usize, text: &str) -> Result<(), SurfaceError> {
        self.splice_before(count, text)
    }
}
