use crate::NodeId;

/// What kind of editable region a surface wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Plain { multiline: bool },
    Rich,
}

impl SurfaceKind {
    /// Whether a newline can live in this surface's content.
    pub fn accepts_newlines(&self) -> bool {
        !matches!(self, SurfaceKind::Plain { multiline: false })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SurfaceKind::Plain { multiline: false } => "plain_single",
            SurfaceKind::Plain { multiline: true } => "plain_multi",
            SurfaceKind::Rich => "rich",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface has no selection")]
    NoSelection,
    #[error("selection is outside the surface")]
    Detached,
    #[error("cursor no longer matches the expected text")]
    Stale,
    #[error("surface is read-only or disabled")]
    ReadOnly,
    #[error("node {0:?} is not an editable surface")]
    NotEditable(NodeId),
}

/// Uniform cursor-relative editing over one editable region.
///
/// Offsets are char counts into the region's linearized text. The cursor is
/// the start of the current selection; a non-collapsed selection is left for
/// each surface to resolve.
pub trait Surface {
    fn kind(&self) -> SurfaceKind;

    /// Linearized text from the start of the region up to the cursor. Empty
    /// when there is no usable cursor.
    fn text_before_cursor(&self) -> String;

    /// Cursor offset, or `None` when there is no usable cursor.
    fn cursor(&self) -> Option<usize>;

    /// Remove `count` chars immediately before the cursor.
    fn delete_before_cursor(&mut self, count: usize) -> Result<(), SurfaceError>;

    /// Insert `text` at the cursor and leave the cursor right after it.
    fn insert_at_cursor(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Move the cursor to a linear offset, collapsing the selection.
    fn set_cursor(&mut self, offset: usize) -> Result<(), SurfaceError>;

    /// Delete `count` chars before the cursor, then insert `text` there.
    fn replace_before_cursor(&mut self, count: usize, text: &str) -> Result<(), SurfaceError> {
        self.delete_before_cursor(count)?;
        self.insert_at_cursor(text)
    }
}
