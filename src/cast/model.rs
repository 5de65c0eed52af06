//! Data models for casts and the external records they refer to.
//!
//! The normalized cast structs derive autosurgeon traits so the cast library
//! can live in an Automerge document. Segments, positions and dancers come
//! from collaborator services and only need serde.

use autosurgeon::{Hydrate, Reconcile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// LIBRARY ROOT
// =============================================================================

/// Root document structure of the cast library.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct CastLibrary {
    /// Cast UUIDs in the order they were first stored.
    pub cast_order: Vec<String>,

    /// Map of UUID -> Cast.
    pub casts: HashMap<String, Cast>,
}

impl CastLibrary {
    /// Creates a new empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of casts.
    pub fn len(&self) -> usize {
        self.casts.len()
    }

    /// Returns true if there are no casts.
    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }

    /// Casts in storage order. Order entries without a cast are skipped.
    pub fn ordered(&self) -> Vec<Cast> {
        self.cast_order
            .iter()
            .filter_map(|uuid| self.casts.get(uuid).cloned())
            .collect()
    }
}

// =============================================================================
// CAST
// =============================================================================

/// Assignment of dancers to the positions of one segment.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct Cast {
    pub uuid: String,
    pub name: String,

    /// UUID of the owning segment.
    pub segment: String,

    /// Number of sub-casts. Zero means "not set yet".
    #[serde(rename = "castCount", default)]
    pub cast_count: u32,

    #[serde(default)]
    pub filled_positions: Vec<FilledPosition>,
}

impl Cast {
    /// Creates an empty cast for a segment.
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            segment: segment.into(),
            cast_count: 0,
            filled_positions: Vec::new(),
        }
    }

    /// Creates the cast a user gets when adding one: every position of the
    /// segment with a single empty group.
    pub fn empty_for_segment(
        uuid: impl Into<String>,
        name: impl Into<String>,
        segment: &Segment,
        cast_count: u32,
    ) -> Self {
        let mut cast = Self::new(uuid, name, segment.uuid.clone()).with_cast_count(cast_count);
        cast.filled_positions = segment
            .positions
            .iter()
            .map(|pos| FilledPosition::new(pos.uuid.clone()).with_group(CastGroup::new(0)))
            .collect();
        cast
    }

    /// Builder: Set sub-cast count.
    pub fn with_cast_count(mut self, cast_count: u32) -> Self {
        self.cast_count = cast_count;
        self
    }

    /// Builder: Add a filled position.
    pub fn with_filled_position(mut self, filled: FilledPosition) -> Self {
        self.filled_positions.push(filled);
        self
    }

    /// Finds the filled position for a position UUID.
    pub fn filled_position(&self, position_uuid: &str) -> Option<&FilledPosition> {
        self.filled_positions
            .iter()
            .find(|fp| fp.position_uuid == position_uuid)
    }

    /// Total number of assigned members across all positions and groups.
    pub fn member_count(&self) -> usize {
        self.filled_positions
            .iter()
            .flat_map(|fp| fp.groups.iter())
            .map(|g| g.members.len())
            .sum()
    }

    /// Every dancer placement as a flat, ordered set.
    pub fn assignments(&self) -> BTreeSet<Assignment> {
        let mut out = BTreeSet::new();
        for filled in &self.filled_positions {
            for group in &filled.groups {
                for member in &group.members {
                    out.insert(Assignment {
                        position_uuid: filled.position_uuid.clone(),
                        group_index: group.group_index,
                        position_number: member.position_number,
                        dancer_uuid: member.uuid.clone(),
                    });
                }
            }
        }
        out
    }

    /// Equality that ignores empty groups, group/position ordering and
    /// absence flags.
    pub fn is_equivalent(&self, other: &Cast) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.segment == other.segment
            && self.assignments() == other.assignments()
    }
}

/// One dancer placement inside a cast.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Assignment {
    pub position_uuid: String,
    pub group_index: u32,
    pub position_number: u32,
    pub dancer_uuid: String,
}

// =============================================================================
// FILLED POSITION / GROUP / MEMBER
// =============================================================================

/// The sub-casts assigned to one position.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct FilledPosition {
    pub position_uuid: String,

    #[serde(default)]
    pub groups: Vec<CastGroup>,

    #[serde(rename = "hasAbsence", default)]
    pub has_absence: bool,
}

impl FilledPosition {
    pub fn new(position_uuid: impl Into<String>) -> Self {
        Self {
            position_uuid: position_uuid.into(),
            groups: Vec::new(),
            has_absence: false,
        }
    }

    /// Builder: Add a group.
    pub fn with_group(mut self, group: CastGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Highest row index used by any member, if there are members.
    pub fn highest_row(&self) -> Option<u32> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter())
            .map(|m| m.position_number)
            .max()
    }
}

/// One sub-cast of a position.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct CastGroup {
    /// Sub-cast number, 0 is the first cast.
    pub group_index: u32,

    #[serde(default)]
    pub members: Vec<CastMember>,
}

impl CastGroup {
    pub fn new(group_index: u32) -> Self {
        Self {
            group_index,
            members: Vec::new(),
        }
    }

    /// Builder: Add a member.
    pub fn with_member(mut self, member: CastMember) -> Self {
        self.members.push(member);
        self
    }
}

/// A dancer placed at a row of a sub-cast.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    /// Dancer UUID.
    pub uuid: String,

    /// Row index within the position.
    pub position_number: u32,

    #[serde(rename = "hasAbsence", default)]
    pub has_absence: bool,
}

impl CastMember {
    pub fn new(uuid: impl Into<String>, position_number: u32) -> Self {
        Self {
            uuid: uuid.into(),
            position_number,
            has_absence: false,
        }
    }

    /// Builder: Set absence flag.
    pub fn with_absence(mut self, has_absence: bool) -> Self {
        self.has_absence = has_absence;
        self
    }
}

// =============================================================================
// EXTERNAL RECORDS
// =============================================================================

/// A role within a segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub uuid: String,

    #[serde(default)]
    pub name: String,

    /// Display order within the segment.
    #[serde(default)]
    pub order: i32,

    /// Minimum number of dancer rows.
    #[serde(default)]
    pub size: u32,
}

impl Position {
    pub fn new(uuid: impl Into<String>, order: i32, size: u32) -> Self {
        Self {
            uuid: uuid.into(),
            name: String::new(),
            order,
            size,
        }
    }

    /// Builder: Set display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A choreographic piece or section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub uuid: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub positions: Vec<Position>,
}

impl Segment {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            positions: Vec::new(),
        }
    }

    /// Builder: Add a position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }
}

/// A member of the company that can be cast.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dancer {
    pub uuid: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,
}

impl Dancer {
    pub fn new(
        uuid: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", or the UUID when both names are blank.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.uuid.clone()
        } else {
            name.to_string()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
