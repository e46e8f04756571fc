//! Editable document model.
//!
//! A `Document` is an arena of elements, text leaves, break markers and text
//! controls with one live selection. On top of it sit the surface classifier
//! and the `Surface` capability trait, implemented once for flat-buffer
//! controls (`PlainSurface`) and once for tree-structured regions
//! (`RichSurface`). Upper layers only ever talk to `dyn Surface`.

pub mod classifier;
mod document;
mod plain;
pub mod rich;
mod surface;

pub use classifier::{SurfaceTarget, classify, classify_node, rich_root};
pub use document::{
    Boundary, ControlKind, DocEvent, Document, Editable, InputType, LeafSpan, NodeId, NodeKind,
    Selection, TextControl,
};
pub use plain::PlainSurface;
pub use rich::{InsertTextPrimitive, NativeInsertText, RichSurface};
pub use surface::{Surface, SurfaceError, SurfaceKind};
