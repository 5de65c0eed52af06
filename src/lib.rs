//! Castboard - cast editing for dance roster management.
//!
//! A cast assigns dancers to the positions of a segment, with several
//! alternate sub-casts per position. This crate keeps casts in their
//! normalized form and gives the UI a dense grid to edit:
//!
//! - **Grid view-model**: every position × row × sub-cast slot, rebuilt from
//!   the normalized cast and serialized back after each edit
//! - **Drag-and-drop board**: pool-to-grid, grid-to-grid and grid-to-pool
//!   drops, with a guard so a reload cannot clobber a drop in flight
//! - **Cast library**: an Automerge document that can be saved, loaded and merged
//!
//! # Example
//!
//! ```rust
//! use castboard::{
//!     BuildOptions, Cast, CastGrid, CastGroup, CastMember, Dancer, DancerRoster,
//!     FilledPosition, Position, Segment,
//! };
//!
//! let segment = Segment::new("seg-1", "Waltz of the Flowers")
//!     .with_position(Position::new("pos-dewdrop", 0, 1))
//!     .with_position(Position::new("pos-flowers", 1, 4));
//! let dancers = DancerRoster::new(vec![Dancer::new("d1", "Ana", "Pavlova")]);
//!
//! let cast = Cast::new("c1", "Opening night", "seg-1")
//!     .with_cast_count(2)
//!     .with_filled_position(
//!         FilledPosition::new("pos-flowers")
//!             .with_group(CastGroup::new(1).with_member(CastMember::new("d1", 5))),
//!     );
//!
//! let grid = CastGrid::build(&cast, &segment, &dancers, BuildOptions::default());
//! assert_eq!(grid.row_count(1), Some(6));
//! assert_eq!(grid.headers(), &["1st Cast", "2nd Cast"]);
//!
//! // Serializing without edits gives back the same placements.
//! assert!(grid.to_cast(&cast).is_equivalent(&cast));
//! ```

pub mod config;
pub mod directory;
pub mod error;

// Cast module
pub mod cast;

// Re-exports for convenience
pub use config::EditorConfig;
pub use directory::{DancerLookup, DancerRoster, SegmentCatalog, SegmentLookup};
pub use error::{CastError, CastResult};
pub use cast::{
    BuildOptions, Cast, CastBoard, CastEditor, CastGrid, CastGroup, CastLibrary, CastMember,
    CastRoute, CastStore, Container, Dancer, DropEvent, DropOutcome, FilledPosition, GridDancer,
    Position, ReloadOutcome, Segment, SelectOptions,
};

#[cfg(feature = "wasm")]
pub use cast::JsCastEditor;
