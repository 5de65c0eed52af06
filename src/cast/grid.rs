//! Dense grid view of a cast.
//!
//! A [`Cast`] stores only the placements that exist. The editor works on a
//! grid instead: every position of the segment, each with a list of rows,
//! each row holding one optional dancer per sub-cast column. The grid is
//! rebuilt from the normalized cast when a cast is loaded and serialized back
//! after every edit.

use serde::Serialize;
use tracing::{debug, warn};

use crate::directory::DancerLookup;
use crate::error::{CastError, CastResult};
use super::model::{Cast, CastGroup, CastMember, Dancer, FilledPosition, Position, Segment};

/// Sub-cast count used when neither the cast nor the config provides one.
pub const DEFAULT_CAST_COUNT: u32 = 3;

/// A dancer occupying a grid slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridDancer {
    pub uuid: String,

    /// Resolved dancer record, `None` when the lookup did not know the UUID.
    pub dancer: Option<Dancer>,

    pub has_absence: bool,
}

impl GridDancer {
    /// Wraps a known dancer.
    pub fn from_dancer(dancer: Dancer) -> Self {
        Self {
            uuid: dancer.uuid.clone(),
            dancer: Some(dancer),
            has_absence: false,
        }
    }
}

/// One row of a position: a slot per sub-cast.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridRow {
    pub slots: Vec<Option<GridDancer>>,
}

impl GridRow {
    fn empty(width: usize) -> Self {
        Self {
            slots: vec![None; width],
        }
    }
}

/// A position and its rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridPosition {
    pub position: Position,
    pub rows: Vec<GridRow>,
}

/// Inputs to [`CastGrid::build`] that do not come from the cast itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Used when the cast has no sub-cast count yet.
    pub default_cast_count: u32,

    /// Carry member absence flags into the grid (casting for a performance).
    pub performance_mode: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            default_cast_count: DEFAULT_CAST_COUNT,
            performance_mode: false,
        }
    }
}

/// The editable grid: positions × rows × sub-casts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CastGrid {
    positions: Vec<GridPosition>,
    cast_count: u32,
    headers: Vec<String>,
}

impl CastGrid {
    // =========================================================================
    // BUILD / SERIALIZE
    // =========================================================================

    /// Expands a cast into a grid over the segment's positions.
    ///
    /// Positions are ordered by their display order. Each position gets
    /// `max(position.size, highest row + 1)` rows of `cast_count` slots.
    pub fn build(
        cast: &Cast,
        segment: &Segment,
        dancers: &dyn DancerLookup,
        options: BuildOptions,
    ) -> Self {
        let cast_count = if cast.cast_count == 0 {
            options.default_cast_count.max(1)
        } else {
            cast.cast_count
        };
        let width = cast_count as usize;

        let positions = ordered_positions(segment)
            .into_iter()
            .map(|position| {
                let filled = cast.filled_position(&position.uuid);
                let used_rows = filled
                    .and_then(FilledPosition::highest_row)
                    .map_or(0, |row| row as usize + 1);
                let row_count = (position.size as usize).max(used_rows);
                let mut rows = vec![GridRow::empty(width); row_count];

                if let Some(filled) = filled {
                    for group in &filled.groups {
                        let column = group.group_index as usize;
                        if column >= width {
                            warn!(
                                cast = %cast.uuid,
                                position = %position.uuid,
                                group_index = group.group_index,
                                cast_count,
                                "skipping group beyond sub-cast count"
                            );
                            continue;
                        }
                        for member in &group.members {
                            let dancer = dancers.dancer(&member.uuid).cloned();
                            if dancer.is_none() {
                                warn!(dancer = %member.uuid, "unknown dancer in cast");
                            }
                            rows[member.position_number as usize].slots[column] =
                                Some(GridDancer {
                                    uuid: member.uuid.clone(),
                                    dancer,
                                    has_absence: options.performance_mode && member.has_absence,
                                });
                        }
                    }
                }

                GridPosition {
                    position: position.clone(),
                    rows,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            cast = %cast.uuid,
            positions = positions.len(),
            cast_count,
            "built cast grid"
        );

        Self {
            positions,
            cast_count,
            headers: subcast_headers(cast_count),
        }
    }

    /// Serializes the grid back into a normalized cast.
    ///
    /// Identity fields are taken from `base`. Every position gets one group
    /// per sub-cast; empty slots are omitted.
    pub fn to_cast(&self, base: &Cast) -> Cast {
        let filled_positions = self
            .positions
            .iter()
            .map(|grid_pos| {
                let groups = (0..self.cast_count)
                    .map(|group_index| {
                        let column = group_index as usize;
                        let members = grid_pos
                            .rows
                            .iter()
                            .enumerate()
                            .filter_map(|(row_index, row)| {
                                row.slots
                                    .get(column)
                                    .and_then(Option::as_ref)
                                    .map(|d| CastMember::new(d.uuid.clone(), row_index as u32))
                            })
                            .collect();
                        CastGroup {
                            group_index,
                            members,
                        }
                    })
                    .collect();
                FilledPosition {
                    position_uuid: grid_pos.position.uuid.clone(),
                    groups,
                    has_absence: false,
                }
            })
            .collect();

        Cast {
            uuid: base.uuid.clone(),
            name: base.name.clone(),
            segment: base.segment.clone(),
            cast_count: self.cast_count,
            filled_positions,
        }
    }

    /// Drops filled positions that are not part of the segment and orders
    /// the rest by position display order.
    pub fn normalize_cast(cast: &Cast, segment: &Segment) -> Cast {
        let order_of = |uuid: &str| {
            segment
                .positions
                .iter()
                .find(|p| p.uuid == uuid)
                .map(|p| p.order)
        };
        let mut normalized = cast.clone();
        normalized
            .filled_positions
            .retain(|fp| order_of(&fp.position_uuid).is_some());
        normalized
            .filled_positions
            .sort_by_key(|fp| order_of(&fp.position_uuid));
        normalized
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn positions(&self) -> &[GridPosition] {
        &self.positions
    }

    pub fn cast_count(&self) -> u32 {
        self.cast_count
    }

    /// Column headers: "1st Cast", "2nd Cast", ...
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows of a position.
    pub fn row_count(&self, position: usize) -> Option<usize> {
        self.positions.get(position).map(|p| p.rows.len())
    }

    /// The dancer at a slot, if the slot exists and is filled.
    pub fn slot(&self, position: usize, row: usize, column: usize) -> Option<&GridDancer> {
        self.positions
            .get(position)?
            .rows
            .get(row)?
            .slots
            .get(column)?
            .as_ref()
    }

    /// True if the coordinates address an existing slot.
    pub fn contains(&self, position: usize, row: usize, column: usize) -> bool {
        column < self.cast_count as usize
            && self
                .positions
                .get(position)
                .map_or(false, |p| row < p.rows.len())
    }

    // =========================================================================
    // SLOT MUTATION
    // =========================================================================

    fn cell_mut(
        &mut self,
        position: usize,
        row: usize,
        column: usize,
    ) -> Option<&mut Option<GridDancer>> {
        self.positions
            .get_mut(position)?
            .rows
            .get_mut(row)?
            .slots
            .get_mut(column)
    }

    /// Puts a dancer in a slot, returning whoever was there.
    /// Returns `None` without changes when the slot does not exist.
    pub fn place(
        &mut self,
        position: usize,
        row: usize,
        column: usize,
        dancer: GridDancer,
    ) -> Option<Option<GridDancer>> {
        self.cell_mut(position, row, column)
            .map(|cell| cell.replace(dancer))
    }

    /// Empties a slot, returning its dancer.
    pub fn take(&mut self, position: usize, row: usize, column: usize) -> Option<GridDancer> {
        self.cell_mut(position, row, column).and_then(Option::take)
    }

    // =========================================================================
    // ROW / COLUMN ADJUSTMENT
    // =========================================================================

    /// Changes the number of sub-cast columns. Slots below the new count are
    /// kept, the rest are dropped; new columns start empty.
    pub fn set_cast_count(&mut self, cast_count: u32) -> CastResult<()> {
        if cast_count == 0 {
            return Err(CastError::InvalidCastCount(0));
        }
        let width = cast_count as usize;
        for grid_pos in &mut self.positions {
            for row in &mut grid_pos.rows {
                row.slots.resize(width, None);
            }
        }
        self.cast_count = cast_count;
        self.headers = subcast_headers(cast_count);
        Ok(())
    }

    pub fn increment_cast_count(&mut self) -> CastResult<()> {
        self.set_cast_count(self.cast_count + 1)
    }

    pub fn decrement_cast_count(&mut self) -> CastResult<()> {
        if self.cast_count <= 1 {
            return Err(CastError::InvalidCastCount(self.cast_count as i64 - 1));
        }
        self.set_cast_count(self.cast_count - 1)
    }

    /// Appends an empty row to a position.
    pub fn add_row(&mut self, position: usize) -> CastResult<()> {
        let width = self.cast_count as usize;
        let length = self.positions.len();
        let grid_pos = self
            .positions
            .get_mut(position)
            .ok_or_else(|| CastError::position_out_of_range(position, length))?;
        grid_pos.rows.push(GridRow::empty(width));
        Ok(())
    }

    /// Removes the last row of a position, dancers in it included.
    /// Returns false if the position had no rows.
    pub fn remove_row(&mut self, position: usize) -> CastResult<bool> {
        let length = self.positions.len();
        let grid_pos = self
            .positions
            .get_mut(position)
            .ok_or_else(|| CastError::position_out_of_range(position, length))?;
        Ok(grid_pos.rows.pop().is_some())
    }
}

/// Segment positions sorted by display order. Ties keep segment order.
fn ordered_positions(segment: &Segment) -> Vec<&Position> {
    let mut positions: Vec<&Position> = segment.positions.iter().collect();
    positions.sort_by_key(|p| p.order);
    positions
}

/// Builds the sub-cast column headers for a count.
pub fn subcast_headers(cast_count: u32) -> Vec<String> {
    (1..=cast_count)
        .map(|n| format!("{}{} Cast", n, ordinal_suffix(n)))
        .collect()
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

// =============================================================================
// TESTS
// =============================================================================
