//! Visibility filtering: reachability, presentation, session state, and the
//! command dispatcher.

pub mod commands;
pub mod error;
pub mod reach;
pub mod session;
pub mod tags;
pub mod visibility;

pub use commands::{CanvasFilter, CanvasHost, CommandOutcome, FilterCommand, PendingTagChoice};
pub use error::{FilterError, Result};
pub use reach::{reachable, Closure, Direction};
pub use session::FilterSession;
pub use tags::{MetadataSource, NoMetadata, TagMatch};
pub use visibility::{DisplayMode, ElementState, PresentationSurface, FADED_OPACITY};
