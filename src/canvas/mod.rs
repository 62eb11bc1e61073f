//! Canvas data model, geometry, and graph queries.

pub mod geometry;
pub mod live;
pub mod query;
pub mod types;

pub use geometry::{encloses, Region};
pub use live::LiveCanvas;
pub use query::{edges_both_ends_in, groups_for, with_enclosing_groups};
pub use types::{CanvasData, CanvasSnapshot, Edge, Node, NodeKind, Selection};
