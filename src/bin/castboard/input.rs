//! Input snapshot of a company roster as exported by the API.
//!
//! Segments and dancers feed the lookups; casts are imported into the cast
//! library before the editor loads them.

use serde::Deserialize;

use castboard::{Cast, Dancer, Segment};

/// Root of the roster JSON file.
#[derive(Debug, Default, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub segments: Vec<Segment>,

    #[serde(default, alias = "users")]
    pub dancers: Vec<Dancer>,

    #[serde(default)]
    pub casts: Vec<Cast>,
}
