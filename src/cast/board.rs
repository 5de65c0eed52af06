//! Drag-and-drop cast board.
//!
//! `CastBoard` holds the cast being edited as a [`CastGrid`] and applies drop
//! gestures to it. It rebuilds the grid when the selected cast or the cast
//! library changes, and re-serializes the grid into a [`Cast`] after every
//! edit so listeners always see the current normalized cast.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::directory::{DancerLookup, SegmentLookup};
use crate::error::{CastError, CastResult};
use super::grid::{BuildOptions, CastGrid, GridDancer, DEFAULT_CAST_COUNT};
use super::model::{Cast, Dancer};
use super::store::CastStore;

/// Where a drag started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Container {
    /// The list of dancers available for casting.
    Pool,
    /// A row of a position in the grid. The sub-cast column is the event index.
    Cell { position: usize, row: usize },
}

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEvent {
    pub from: Container,
    pub from_index: usize,
    pub to: Container,
    pub to_index: usize,

    /// False when the drag ended outside any drop target.
    #[serde(default = "default_true")]
    pub pointer_over_container: bool,

    /// The dragged dancer, required when the drag starts in the pool.
    #[serde(default)]
    pub item: Option<Dancer>,
}

fn default_true() -> bool {
    true
}

/// What a drop did to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropOutcome {
    Ignored,
    Removed,
    Placed,
    Moved,
}

/// What a reload did to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReloadOutcome {
    /// Still waiting for a selection, the casts or the cast's segment.
    Waiting,
    /// The grid was rebuilt from the stored cast.
    Rebuilt,
    /// A drop was in flight; the current grid was kept.
    Suppressed,
    /// The selected cast is gone; the selection was dropped.
    Missing,
    /// The cast was already selected and built; nothing changed.
    Unchanged,
}

/// Options for [`CastBoard::select_cast`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    pub save_delete_enabled: bool,

    /// Performance date in milliseconds since the epoch, if casting for one.
    pub performance_date: Option<i64>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            save_delete_enabled: true,
            performance_date: None,
        }
    }
}

type ChangeListener = Box<dyn FnMut(&Cast)>;

/// The drag-and-drop editor for one cast.
pub struct CastBoard {
    selected_cast_uuid: Option<String>,
    cast: Option<Cast>,
    grid: Option<CastGrid>,

    default_cast_count: u32,
    check_unavailabilities: bool,
    performance_date: Option<i64>,

    casts_loaded: bool,
    select_cast_called: bool,
    cast_selected: bool,

    buttons_enabled: bool,
    can_save: bool,
    can_delete: bool,
    bolded_cast: Option<u32>,

    /// Set while a drop's changes have not been seen by a reload yet.
    drop_handling: bool,

    listeners: Vec<ChangeListener>,
}

impl CastBoard {
    pub fn new(default_cast_count: u32, check_unavailabilities: bool) -> Self {
        Self {
            selected_cast_uuid: None,
            cast: None,
            grid: None,
            default_cast_count: default_cast_count.max(1),
            check_unavailabilities,
            performance_date: None,
            casts_loaded: false,
            select_cast_called: false,
            cast_selected: false,
            buttons_enabled: true,
            can_save: false,
            can_delete: false,
            bolded_cast: None,
            drop_handling: false,
            listeners: Vec::new(),
        }
    }

    /// Registers a callback invoked with the re-serialized cast after every
    /// edit.
    pub fn on_cast_change(&mut self, listener: impl FnMut(&Cast) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn selected_cast_uuid(&self) -> Option<&str> {
        self.selected_cast_uuid.as_deref()
    }

    /// The working copy of the selected cast.
    pub fn cast(&self) -> Option<&Cast> {
        self.cast.as_ref()
    }

    pub fn grid(&self) -> Option<&CastGrid> {
        self.grid.as_ref()
    }

    pub fn is_cast_selected(&self) -> bool {
        self.cast_selected
    }

    pub fn buttons_enabled(&self) -> bool {
        self.buttons_enabled
    }

    pub fn can_save_cast(&self) -> bool {
        self.can_save
    }

    /// True once the working cast exists in the library.
    pub fn can_delete_cast(&self) -> bool {
        self.can_delete
    }

    pub fn set_can_delete(&mut self, can_delete: bool) {
        self.can_delete = can_delete;
    }

    pub fn bolded_cast(&self) -> Option<u32> {
        self.bolded_cast
    }

    /// Highlights one sub-cast column.
    pub fn set_bolded_cast(&mut self, num: Option<u32>) {
        self.bolded_cast = num;
    }

    /// Performance the cast is being checked against, if any.
    pub fn performance_date(&self) -> Option<i64> {
        self.performance_date
    }

    pub fn is_drop_handling(&self) -> bool {
        self.drop_handling
    }

    /// Marks the working cast as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.can_save = true;
    }

    fn all_loaded(&self) -> bool {
        self.casts_loaded && self.select_cast_called
    }

    // =========================================================================
    // SELECTION AND LOADING
    // =========================================================================

    /// Selects the cast to edit. The grid is built once the casts have been
    /// loaded as well.
    pub fn select_cast(
        &mut self,
        uuid: Option<&str>,
        options: SelectOptions,
        casts: &mut CastStore,
        segments: &dyn SegmentLookup,
        dancers: &dyn DancerLookup,
    ) -> CastResult<ReloadOutcome> {
        self.select_cast_called = true;
        let performance_date = options
            .performance_date
            .filter(|d| *d > 0 && self.check_unavailabilities);
        let mode_changed = performance_date != self.performance_date;
        self.performance_date = performance_date;
        let Some(uuid) = uuid else {
            return Ok(ReloadOutcome::Waiting);
        };

        self.buttons_enabled = options.save_delete_enabled;
        let same_cast = self.selected_cast_uuid.as_deref() == Some(uuid);
        if same_cast && self.cast_selected && self.grid.is_some() && !mode_changed {
            return Ok(ReloadOutcome::Unchanged);
        }
        if !same_cast {
            self.drop_handling = false;
        }
        self.cast_selected = true;
        self.selected_cast_uuid = Some(uuid.to_string());
        self.reload(casts, segments, dancers)
    }

    /// Called when the cast library finished (re)loading.
    pub fn on_casts_loaded(
        &mut self,
        casts: &mut CastStore,
        segments: &dyn SegmentLookup,
        dancers: &dyn DancerLookup,
    ) -> CastResult<ReloadOutcome> {
        self.casts_loaded = true;
        self.reload(casts, segments, dancers)
    }

    /// Rebuilds the grid from the stored cast once everything is loaded.
    /// Suppressed while a drop is being handled.
    pub fn reload(
        &mut self,
        casts: &mut CastStore,
        segments: &dyn SegmentLookup,
        dancers: &dyn DancerLookup,
    ) -> CastResult<ReloadOutcome> {
        if self.all_loaded() {
            self.setup_data(casts, segments, dancers)
        } else {
            Ok(ReloadOutcome::Waiting)
        }
    }

    fn setup_data(
        &mut self,
        casts: &mut CastStore,
        segments: &dyn SegmentLookup,
        dancers: &dyn DancerLookup,
    ) -> CastResult<ReloadOutcome> {
        if !self.cast_selected {
            return Ok(ReloadOutcome::Waiting);
        }
        if self.drop_handling {
            self.drop_handling = false;
            debug!(
                cast = ?self.selected_cast_uuid,
                "reload during drop handling suppressed"
            );
            return Ok(ReloadOutcome::Suppressed);
        }

        let uuid = self
            .selected_cast_uuid
            .clone()
            .ok_or(CastError::NoCastSelected)?;
        let Some(stored) = casts.get_cast(&uuid)? else {
            warn!(cast = %uuid, "selected cast no longer exists");
            self.cast_selected = false;
            self.cast = None;
            self.grid = None;
            self.can_delete = false;
            return Ok(ReloadOutcome::Missing);
        };

        let Some(segment) = segments.segment(&stored.segment) else {
            warn!(cast = %uuid, segment = %stored.segment, "segment not loaded yet");
            return Ok(ReloadOutcome::Waiting);
        };
        let options = BuildOptions {
            default_cast_count: self.default_cast_count,
            performance_mode: self.performance_date.is_some(),
        };
        let grid = CastGrid::build(&stored, segment, dancers, options);
        let mut cast = CastGrid::normalize_cast(&stored, segment);
        cast.cast_count = grid.cast_count();

        debug!(cast = %uuid, cast_count = grid.cast_count(), "cast board rebuilt");
        self.cast = Some(cast);
        self.grid = Some(grid);
        self.can_delete = true;
        Ok(ReloadOutcome::Rebuilt)
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Applies a drop gesture to the grid.
    pub fn drop(&mut self, event: &DropEvent) -> CastResult<DropOutcome> {
        if event.from == Container::Pool && event.to == Container::Pool {
            return Ok(DropOutcome::Ignored);
        }
        if self.grid.is_none() {
            return Err(CastError::NoCastSelected);
        }

        self.drop_handling = true;
        self.can_save = true;

        let outcome = self.apply_drop(event);
        debug!(?outcome, from = ?event.from, to = ?event.to, "drop handled");
        if outcome != DropOutcome::Ignored {
            self.emit_change();
        }
        Ok(outcome)
    }

    fn apply_drop(&mut self, event: &DropEvent) -> DropOutcome {
        let Some(grid) = self.grid.as_mut() else {
            return DropOutcome::Ignored;
        };

        if !event.pointer_over_container || event.to == Container::Pool {
            // Dropped outside the grid: unassign if it came from the grid.
            return match event.from {
                Container::Cell { position, row } => {
                    match grid.take(position, row, event.from_index) {
                        Some(_) => DropOutcome::Removed,
                        None => DropOutcome::Ignored,
                    }
                }
                Container::Pool => DropOutcome::Ignored,
            };
        }

        match (event.from, event.to) {
            (Container::Pool, Container::Cell { position, row }) => {
                let Some(dancer) = event.item.clone() else {
                    warn!("drop from pool without a dancer");
                    return DropOutcome::Ignored;
                };
                if !grid.contains(position, row, event.to_index) {
                    return DropOutcome::Ignored;
                }
                grid.place(position, row, event.to_index, GridDancer::from_dancer(dancer));
                DropOutcome::Placed
            }
            (
                Container::Cell {
                    position: from_pos,
                    row: from_row,
                },
                Container::Cell {
                    position: to_pos,
                    row: to_row,
                },
            ) => {
                let same_slot =
                    from_pos == to_pos && from_row == to_row && event.from_index == event.to_index;
                if same_slot
                    || !grid.contains(to_pos, to_row, event.to_index)
                    || grid.slot(from_pos, from_row, event.from_index).is_none()
                {
                    return DropOutcome::Ignored;
                }
                match grid.take(from_pos, from_row, event.from_index) {
                    Some(dancer) => {
                        grid.place(to_pos, to_row, event.to_index, dancer);
                        DropOutcome::Moved
                    }
                    None => DropOutcome::Ignored,
                }
            }
            _ => DropOutcome::Ignored,
        }
    }

    /// Renames the working cast.
    pub fn set_title(&mut self, name: impl Into<String>) -> CastResult<()> {
        let cast = self.cast.as_mut().ok_or(CastError::NoCastSelected)?;
        cast.name = name.into();
        self.can_save = true;
        self.emit_change();
        Ok(())
    }

    pub fn increment_cast_count(&mut self) -> CastResult<()> {
        self.grid_mut()?.increment_cast_count()?;
        self.after_adjust();
        Ok(())
    }

    pub fn decrement_cast_count(&mut self) -> CastResult<()> {
        self.grid_mut()?.decrement_cast_count()?;
        self.after_adjust();
        Ok(())
    }

    pub fn increment_dancer_count(&mut self, position: usize) -> CastResult<()> {
        self.grid_mut()?.add_row(position)?;
        self.after_adjust();
        Ok(())
    }

    pub fn decrement_dancer_count(&mut self, position: usize) -> CastResult<()> {
        self.grid_mut()?.remove_row(position)?;
        self.after_adjust();
        Ok(())
    }

    fn grid_mut(&mut self) -> CastResult<&mut CastGrid> {
        self.grid.as_mut().ok_or(CastError::NoCastSelected)
    }

    fn after_adjust(&mut self) {
        self.can_save = true;
        self.sync_cast();
    }

    /// Re-serializes the grid into the working cast.
    fn sync_cast(&mut self) {
        if let (Some(grid), Some(cast)) = (self.grid.as_ref(), self.cast.as_mut()) {
            *cast = grid.to_cast(cast);
        }
    }

    fn emit_change(&mut self) {
        self.sync_cast();
        if let Some(cast) = self.cast.as_ref() {
            for listener in &mut self.listeners {
                listener(cast);
            }
        }
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Stores the grid's cast and adopts the stored UUID.
    pub fn save_cast(&mut self, casts: &mut CastStore) -> CastResult<String> {
        self.sync_cast();
        let cast = self.cast.clone().ok_or(CastError::NoCastSelected)?;
        let uuid = casts.set_cast(cast, false)?;
        let saved = casts.last_saved_cast_id().unwrap_or(uuid.as_str()).to_string();
        if let Some(cast) = self.cast.as_mut() {
            cast.uuid = saved.clone();
        }
        self.selected_cast_uuid = Some(saved.clone());
        self.can_save = false;
        self.can_delete = true;
        self.drop_handling = false;
        info!(cast = %saved, "cast board saved");
        Ok(saved)
    }

    /// Deletes the working cast and resets the board. Returns false without
    /// touching the library when the cast cannot be deleted.
    pub fn delete_cast(&mut self, casts: &mut CastStore) -> CastResult<bool> {
        if self.selected_cast_uuid.is_none() {
            return Err(CastError::NoCastSelected);
        }
        if !self.can_delete {
            warn!(cast = ?self.selected_cast_uuid, "cast is not deletable");
            return Ok(false);
        }
        let uuid = self
            .selected_cast_uuid
            .take()
            .ok_or(CastError::NoCastSelected)?;
        self.casts_loaded = false;
        self.cast_selected = false;
        self.cast = None;
        self.grid = None;
        self.can_delete = false;
        self.drop_handling = false;
        casts.delete_cast(&uuid)
    }
}

impl Default for CastBoard {
    fn default() -> Self {
        Self::new(DEFAULT_CAST_COUNT, false)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::model::{CastGroup, CastMember, FilledPosition, Position, Segment};
    use crate::directory::{DancerRoster, SegmentCatalog};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        store: CastStore,
        segments: SegmentCatalog,
        dancers: DancerRoster,
        board: CastBoard,
    }

    impl Fixture {
        fn new() -> Self {
            let segments = SegmentCatalog::new(vec![Segment::new("seg-1", "Giselle")
                .with_position(Position::new("pos-lead", 0, 1))
                .with_position(Position::new("pos-wilis", 1, 3))]);
            let dancers = DancerRoster::new(vec![
                Dancer::new("d1", "Ana", "Pavlova"),
                Dancer::new("d2", "Rudolf", "Nureyev"),
                Dancer::new("d3", "Maya", "Plisetskaya"),
            ]);
            let mut store = CastStore::new().unwrap();
            store
                .set_cast(
                    Cast::new("c1", "Spring", "seg-1")
                        .with_cast_count(2)
                        .with_filled_position(
                            FilledPosition::new("pos-lead").with_group(
                                CastGroup::new(0).with_member(CastMember::new("d1", 0)),
                            ),
                        ),
                    false,
                )
                .unwrap();
            Self {
                store,
                segments,
                dancers,
                board: CastBoard::default(),
            }
        }

        fn select(&mut self, uuid: &str) -> ReloadOutcome {
            self.board
                .select_cast(
                    Some(uuid),
                    SelectOptions::default(),
                    &mut self.store,
                    &self.segments,
                    &self.dancers,
                )
                .unwrap()
        }

        fn reload(&mut self) -> ReloadOutcome {
            self.board
                .on_casts_loaded(&mut self.store, &self.segments, &self.dancers)
                .unwrap()
        }

        fn ready() -> Self {
            let mut fx = Self::new();
            assert_eq!(fx.select("c1"), ReloadOutcome::Waiting);
            assert_eq!(fx.reload(), ReloadOutcome::Rebuilt);
            fx
        }
    }

    fn pool_to(position: usize, row: usize, column: usize, dancer: Dancer) -> DropEvent {
        DropEvent {
            from: Container::Pool,
            from_index: 0,
            to: Container::Cell { position, row },
            to_index: column,
            pointer_over_container: true,
            item: Some(dancer),
        }
    }

    fn cell_to_cell(from: (usize, usize, usize), to: (usize, usize, usize)) -> DropEvent {
        DropEvent {
            from: Container::Cell {
                position: from.0,
                row: from.1,
            },
            from_index: from.2,
            to: Container::Cell {
                position: to.0,
                row: to.1,
            },
            to_index: to.2,
            pointer_over_container: true,
            item: None,
        }
    }

    #[test]
    fn test_grid_built_after_select_and_load() {
        let fx = Fixture::ready();
        let grid = fx.board.grid().unwrap();
        assert_eq!(grid.cast_count(), 2);
        assert_eq!(grid.slot(0, 0, 0).unwrap().uuid, "d1");
        assert!(fx.board.is_cast_selected());
        assert!(!fx.board.can_save_cast());
    }

    #[test]
    fn test_load_before_select_waits() {
        let mut fx = Fixture::new();
        assert_eq!(fx.reload(), ReloadOutcome::Waiting);
        assert_eq!(fx.select("c1"), ReloadOutcome::Rebuilt);
    }

    #[test]
    fn test_pool_to_pool_is_noop() {
        let mut fx = Fixture::ready();
        let event = DropEvent {
            from: Container::Pool,
            from_index: 0,
            to: Container::Pool,
            to_index: 1,
            pointer_over_container: true,
            item: Some(Dancer::new("d2", "", "")),
        };
        assert_eq!(fx.board.drop(&event).unwrap(), DropOutcome::Ignored);
        assert!(!fx.board.can_save_cast());
        assert!(!fx.board.is_drop_handling());
    }

    #[test]
    fn test_pool_to_empty_cell_places_dancer() {
        let mut fx = Fixture::ready();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        fx.board.on_cast_change(move |cast| sink.borrow_mut().push(cast.clone()));

        let d2 = fx.dancers.dancer("d2").cloned().unwrap();
        let outcome = fx.board.drop(&pool_to(1, 2, 1, d2)).unwrap();

        assert_eq!(outcome, DropOutcome::Placed);
        assert_eq!(fx.board.grid().unwrap().slot(1, 2, 1).unwrap().uuid, "d2");
        assert!(fx.board.can_save_cast());
        assert_eq!(fx.dancers.len(), 3);

        let emitted = changes.borrow();
        assert_eq!(emitted.len(), 1);
        let wilis = emitted[0].filled_position("pos-wilis").unwrap();
        assert_eq!(wilis.groups[1].members, vec![CastMember::new("d2", 2)]);
    }

    #[test]
    fn test_pool_drop_out_of_bounds_is_ignored() {
        let mut fx = Fixture::ready();
        let d2 = Dancer::new("d2", "Rudolf", "Nureyev");
        assert_eq!(
            fx.board.drop(&pool_to(1, 0, 2, d2.clone())).unwrap(),
            DropOutcome::Ignored
        );
        assert_eq!(
            fx.board.drop(&pool_to(1, 9, 0, d2)).unwrap(),
            DropOutcome::Ignored
        );
    }

    #[test]
    fn test_cell_to_cell_moves_dancer() {
        let mut fx = Fixture::ready();
        let outcome = fx.board.drop(&cell_to_cell((0, 0, 0), (1, 1, 1))).unwrap();
        assert_eq!(outcome, DropOutcome::Moved);
        let grid = fx.board.grid().unwrap();
        assert!(grid.slot(0, 0, 0).is_none());
        assert_eq!(grid.slot(1, 1, 1).unwrap().uuid, "d1");

        let cast = fx.board.cast().unwrap();
        assert!(cast.filled_position("pos-lead").unwrap().groups[0].members.is_empty());
    }

    #[test]
    fn test_cell_onto_itself_keeps_dancer() {
        let mut fx = Fixture::ready();
        let outcome = fx.board.drop(&cell_to_cell((0, 0, 0), (0, 0, 0))).unwrap();
        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(fx.board.grid().unwrap().slot(0, 0, 0).unwrap().uuid, "d1");
    }

    #[test]
    fn test_drop_outside_grid_removes_dancer() {
        let mut fx = Fixture::ready();
        let mut event = cell_to_cell((0, 0, 0), (1, 0, 0));
        event.pointer_over_container = false;
        assert_eq!(fx.board.drop(&event).unwrap(), DropOutcome::Removed);
        assert!(fx.board.grid().unwrap().slot(0, 0, 0).is_none());
        assert_eq!(fx.board.cast().unwrap().member_count(), 0);
    }

    #[test]
    fn test_drop_onto_pool_removes_dancer() {
        let mut fx = Fixture::ready();
        let event = DropEvent {
            from: Container::Cell { position: 0, row: 0 },
            from_index: 0,
            to: Container::Pool,
            to_index: 0,
            pointer_over_container: true,
            item: None,
        };
        assert_eq!(fx.board.drop(&event).unwrap(), DropOutcome::Removed);
    }

    #[test]
    fn test_reload_during_drop_is_suppressed() {
        let mut fx = Fixture::ready();
        fx.board.drop(&cell_to_cell((0, 0, 0), (1, 0, 0))).unwrap();
        assert!(fx.board.is_drop_handling());

        assert_eq!(fx.reload(), ReloadOutcome::Suppressed);
        assert_eq!(fx.board.grid().unwrap().slot(1, 0, 0).unwrap().uuid, "d1");
        assert!(!fx.board.is_drop_handling());

        // The next reload goes back to the stored cast.
        assert_eq!(fx.reload(), ReloadOutcome::Rebuilt);
        assert_eq!(fx.board.grid().unwrap().slot(0, 0, 0).unwrap().uuid, "d1");
    }

    #[test]
    fn test_reselecting_same_cast_keeps_edits() {
        let mut fx = Fixture::ready();
        fx.board.drop(&cell_to_cell((0, 0, 0), (0, 0, 1))).unwrap();
        assert_eq!(fx.select("c1"), ReloadOutcome::Unchanged);
        assert_eq!(fx.board.grid().unwrap().slot(0, 0, 1).unwrap().uuid, "d1");
    }

    #[test]
    fn test_deleted_cast_drops_selection_on_reload() {
        let mut fx = Fixture::ready();
        fx.store.delete_cast("c1").unwrap();
        assert_eq!(fx.reload(), ReloadOutcome::Missing);
        assert!(!fx.board.is_cast_selected());
        assert!(fx.board.grid().is_none());
    }

    #[test]
    fn test_cast_count_adjustment_updates_cast() {
        let mut fx = Fixture::ready();
        fx.board.decrement_cast_count().unwrap();
        assert_eq!(fx.board.cast().unwrap().cast_count, 1);
        assert_eq!(fx.board.grid().unwrap().headers(), &["1st Cast"]);
        fx.board.increment_cast_count().unwrap();
        assert_eq!(fx.board.cast().unwrap().cast_count, 2);
        assert!(fx.board.can_save_cast());
    }

    #[test]
    fn test_dancer_count_adjustment() {
        let mut fx = Fixture::ready();
        fx.board.increment_dancer_count(1).unwrap();
        assert_eq!(fx.board.grid().unwrap().row_count(1), Some(4));
        fx.board.decrement_dancer_count(1).unwrap();
        fx.board.decrement_dancer_count(1).unwrap();
        assert_eq!(fx.board.grid().unwrap().row_count(1), Some(2));
        assert!(fx.board.increment_dancer_count(5).is_err());
    }

    #[test]
    fn test_set_title_and_save() {
        let mut fx = Fixture::ready();
        fx.board.set_title("Autumn").unwrap();
        assert!(fx.board.can_save_cast());

        let d3 = Dancer::new("d3", "Maya", "Plisetskaya");
        fx.board.drop(&pool_to(1, 0, 0, d3)).unwrap();
        let uuid = fx.board.save_cast(&mut fx.store).unwrap();

        assert_eq!(uuid, "c1");
        assert!(!fx.board.can_save_cast());
        let stored = fx.store.get_cast("c1").unwrap().unwrap();
        assert_eq!(stored.name, "Autumn");
        assert_eq!(stored.member_count(), 2);
    }

    #[test]
    fn test_delete_cast_resets_board() {
        let mut fx = Fixture::ready();
        assert!(fx.board.can_delete_cast());
        assert!(fx.board.delete_cast(&mut fx.store).unwrap());
        assert!(fx.board.selected_cast_uuid().is_none());
        assert!(!fx.board.can_delete_cast());
        assert!(!fx.store.has_cast("c1").unwrap());
        assert!(matches!(
            fx.board.delete_cast(&mut fx.store),
            Err(CastError::NoCastSelected)
        ));
    }

    #[test]
    fn test_unbuilt_cast_is_not_deletable() {
        let mut fx = Fixture::new();
        assert_eq!(fx.select("c1"), ReloadOutcome::Waiting);
        assert!(!fx.board.can_delete_cast());
        assert!(!fx.board.delete_cast(&mut fx.store).unwrap());
        assert!(fx.store.has_cast("c1").unwrap());
        assert_eq!(fx.board.selected_cast_uuid(), Some("c1"));
    }

    #[test]
    fn test_saved_cast_is_deletable() {
        let mut fx = Fixture::ready();
        fx.board.set_can_delete(false);
        fx.board.save_cast(&mut fx.store).unwrap();
        assert!(fx.board.can_delete_cast());
    }

    #[test]
    fn test_drop_without_grid_errors() {
        let mut board = CastBoard::default();
        let result = board.drop(&pool_to(0, 0, 0, Dancer::new("d1", "", "")));
        assert!(matches!(result, Err(CastError::NoCastSelected)));
    }

    #[test]
    fn test_performance_date_requires_unavailability_checks() {
        let mut fx = Fixture::new();
        fx.board = CastBoard::new(3, true);
        let options = SelectOptions {
            performance_date: Some(1_700_000_000_000),
            ..SelectOptions::default()
        };
        fx.board
            .select_cast(Some("c1"), options, &mut fx.store, &fx.segments, &fx.dancers)
            .unwrap();
        fx.reload();
        assert_eq!(fx.board.performance_date(), Some(1_700_000_000_000));
        assert!(fx.board.grid().is_some());

        let mut plain = CastBoard::new(3, false);
        plain
            .select_cast(Some("c1"), options, &mut fx.store, &fx.segments, &fx.dancers)
            .unwrap();
        assert_eq!(plain.performance_date(), None);
    }

    #[test]
    fn test_changing_performance_date_rebuilds_grid() {
        let mut fx = Fixture::new();
        fx.store
            .set_cast(
                Cast::new("c2", "Gala", "seg-1").with_cast_count(1).with_filled_position(
                    FilledPosition::new("pos-lead").with_group(
                        CastGroup::new(0).with_member(CastMember::new("d2", 0).with_absence(true)),
                    ),
                ),
                false,
            )
            .unwrap();
        fx.board = CastBoard::new(3, true);
        assert_eq!(fx.select("c2"), ReloadOutcome::Waiting);
        assert_eq!(fx.reload(), ReloadOutcome::Rebuilt);
        assert!(!fx.board.grid().unwrap().slot(0, 0, 0).unwrap().has_absence);

        let options = SelectOptions {
            performance_date: Some(1_700_000_000_000),
            ..SelectOptions::default()
        };
        let outcome = fx
            .board
            .select_cast(Some("c2"), options, &mut fx.store, &fx.segments, &fx.dancers)
            .unwrap();
        assert_eq!(outcome, ReloadOutcome::Rebuilt);
        assert!(fx.board.grid().unwrap().slot(0, 0, 0).unwrap().has_absence);

        // Same options again leave the grid alone; clearing the date rebuilds.
        let outcome = fx
            .board
            .select_cast(Some("c2"), options, &mut fx.store, &fx.segments, &fx.dancers)
            .unwrap();
        assert_eq!(outcome, ReloadOutcome::Unchanged);
        assert_eq!(fx.select("c2"), ReloadOutcome::Rebuilt);
        assert_eq!(fx.board.performance_date(), None);
        assert!(!fx.board.grid().unwrap().slot(0, 0, 0).unwrap().has_absence);
    }
}
