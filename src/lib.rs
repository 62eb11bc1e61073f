//! Show or dim parts of a node/edge canvas.
//!
//! A filter picks a set of nodes (the selection's closure, a color, a tag),
//! pulls in the groups that enclose them, keeps only edges whose endpoints
//! both survive, and hides or fades everything else.

pub mod canvas;
pub mod filter;
pub mod metadata;
pub mod picker;
pub mod settings;
pub mod theme;

pub use canvas::{CanvasData, Edge, LiveCanvas, Node, NodeKind, Region, Selection};
pub use filter::{
    CanvasFilter, CanvasHost, CommandOutcome, DisplayMode, FilterCommand, FilterError,
    MetadataSource, PendingTagChoice,
};
