//! Resolves the active editable surface from focus or selection.

use crate::{
    ControlKind, Document, Editable, InsertTextPrimitive, NodeId, NodeKind, PlainSurface,
    RichSurface, Surface, TextControl,
};

/// Which surface a signal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTarget {
    Plain(NodeId),
    /// Rooted at the nearest rich-editable ancestor, not the literal target.
    Rich { root: NodeId },
}

impl SurfaceTarget {
    pub fn node(&self) -> NodeId {
        match self {
            SurfaceTarget::Plain(node) => *node,
            SurfaceTarget::Rich { root } => *root,
        }
    }

    /// Open the surface for editing. A Plain target whose node is no longer a
    /// control yields `None`.
    pub fn open<'a>(
        self,
        doc: &'a mut Document,
        primitive: Option<&'a mut dyn InsertTextPrimitive>,
    ) -> Option<Box<dyn Surface + 'a>> {
        match self {
            SurfaceTarget::Plain(node) => PlainSurface::new(doc, node)
                .ok()
                .map(|s| Box::new(s) as Box<dyn Surface + 'a>),
            SurfaceTarget::Rich { root } => Some(Box::new(RichSurface::new(doc, root, primitive))),
        }
    }
}

/// Classify the document's active surface.
///
/// A focused element decides on its own. With no focus, or focus parked on
/// the document root, the selection anchor is resolved to its enclosing
/// rich-editable region instead.
pub fn classify(doc: &Document) -> Option<SurfaceTarget> {
    match doc.focused().filter(|&f| f != doc.root()) {
        Some(focused) => classify_node(doc, focused),
        None => {
            let anchor = doc.selection()?.start.node;
            rich_root(doc, anchor).map(|root| SurfaceTarget::Rich { root })
        }
    }
}

/// Classify a single node: an eligible text control is Plain, anything inside
/// a rich-editable region is Rich.
pub fn classify_node(doc: &Document, node: NodeId) -> Option<SurfaceTarget> {
    if let NodeKind::Control(control) = doc.kind(node) {
        return plain_eligible(control).then_some(SurfaceTarget::Plain(node));
    }
    rich_root(doc, node).map(|root| SurfaceTarget::Rich { root })
}

fn plain_eligible(control: &TextControl) -> bool {
    if control.read_only || control.disabled {
        return false;
    }
    match &control.kind {
        ControlKind::MultiLine => true,
        ControlKind::SingleLine(input_type) => input_type.accepts_free_text(),
    }
}

/// Nearest explicit editable flag at or above `node` decides: `True` roots a
/// rich region there, `False` makes everything below it non-editable.
pub fn rich_root(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if let NodeKind::Element { editable, .. } = doc.kind(n) {
            match editable {
                Editable::True => return Some(n),
                Editable::False => return None,
                Editable::Inherit => {}
            }
        }
        cur = doc.parent(n);
    }
    None
}
