use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Command invoked while the active view is not a canvas.
    #[error("Canvas filters are only available in a canvas view")]
    NotCanvasView,

    /// A selection-dependent command ran with nothing selected.
    #[error("Select at least one node")]
    EmptySelection,

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid canvas JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
