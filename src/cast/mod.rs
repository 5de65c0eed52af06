//! Cast editing module.
//!
//! Normalized cast model, the grid view-model, the drag-and-drop board, the
//! host editor and the Automerge-backed cast library.

pub mod model;
pub mod grid;
pub mod store;
pub mod board;
pub mod route;
pub mod editor;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use model::{Cast, CastGroup, CastLibrary, CastMember, Dancer, FilledPosition, Position, Segment};
pub use grid::{BuildOptions, CastGrid, GridDancer, GridPosition, GridRow};
pub use store::CastStore;
pub use board::{CastBoard, Container, DropEvent, DropOutcome, ReloadOutcome, SelectOptions};
pub use route::CastRoute;
pub use editor::CastEditor;

#[cfg(feature = "wasm")]
pub use wasm::JsCastEditor;
