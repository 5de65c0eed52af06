//! Error types for cast editing.

use thiserror::Error;

/// Result type alias for cast operations.
pub type CastResult<T> = Result<T, CastError>;

/// Errors that can occur while loading, editing or storing casts.
#[derive(Error, Debug)]
pub enum CastError {
    /// Automerge error during document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// Autosurgeon reconcile error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] autosurgeon::ReconcileError),

    /// Cast not found in the cast library.
    #[error("Cast not found: {0}")]
    CastNotFound(String),

    /// Segment not known to the segment lookup.
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// Position index outside of the grid.
    #[error("Position index {index} out of range for {length} positions")]
    PositionOutOfRange { index: usize, length: usize },

    /// An operation needed a selected segment.
    #[error("No segment selected")]
    NoSegmentSelected,

    /// An operation needed a selected cast with a built grid.
    #[error("No cast selected")]
    NoCastSelected,

    /// Sub-cast count would leave the valid range.
    #[error("Invalid cast count: {0}")]
    InvalidCastCount(i64),

    /// Editor configuration could not be read.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CastError {
    /// Creates a CastNotFound error.
    pub fn cast_not_found(uuid: impl Into<String>) -> Self {
        Self::CastNotFound(uuid.into())
    }

    /// Creates a SegmentNotFound error.
    pub fn segment_not_found(uuid: impl Into<String>) -> Self {
        Self::SegmentNotFound(uuid.into())
    }

    /// Creates a PositionOutOfRange error.
    pub fn position_out_of_range(index: usize, length: usize) -> Self {
        Self::PositionOutOfRange { index, length }
    }

    /// Creates a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a Serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for CastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
