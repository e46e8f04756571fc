//! Replacement executor: one logical delete + insert + cursor move.

use core_model::{Surface, SurfaceError};
use core_text::char_len;

use crate::TriggerHit;

/// What a completed replacement did, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub deleted: usize,
    pub inserted: usize,
    /// Collapsed cursor after the insertion.
    pub cursor: Option<usize>,
}

/// Remove `hit.delete_len` chars ending at the cursor and insert
/// `content + terminator` in their place.
///
/// A cursor that sits too close to the start of the surface means the match
/// is stale; nothing is touched in that case.
pub fn replace(
    surface: &mut dyn Surface,
    hit: &TriggerHit,
    content: &str,
    terminator: &str,
) -> Result<Replacement, SurfaceError> {
    let cursor = surface.cursor().ok_or(SurfaceError::NoSelection)?;
    if cursor < hit.delete_len {
        return Err(SurfaceError::Stale);
    }
    let text = format!("{content}{terminator}");
    surface.replace_before_cursor(hit.delete_len, &text)?;
    let replacement = Replacement {
        deleted: hit.delete_len,
        inserted: char_len(&text),
        cursor: surface.cursor(),
    };
    tracing::debug!(
        target: "engine.expand",
        surface = surface.kind().label(),
        deleted = replacement.deleted,
        inserted = replacement.inserted,
        "replaced"
    );
    Ok(replacement)
}
