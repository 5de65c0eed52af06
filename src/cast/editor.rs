//! Host editor for casts.
//!
//! `CastEditor` decides which segment and which cast are active, feeds the
//! [`CastBoard`] when segments, dancers or casts (re)load, and keeps the URL
//! pointing at the selected cast.

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::directory::{DancerRoster, SegmentCatalog, SegmentLookup};
use crate::error::{CastError, CastResult};
use super::board::{CastBoard, ReloadOutcome, SelectOptions};
use super::model::{Cast, Dancer, Segment};
use super::route::CastRoute;
use super::store::CastStore;

/// Segment/cast selection and load coordination around a [`CastBoard`].
pub struct CastEditor {
    config: EditorConfig,
    store: CastStore,
    segments: SegmentCatalog,
    dancers: DancerRoster,
    board: CastBoard,
    route: CastRoute,
    /// Passed to the board on every cast selection.
    select_options: SelectOptions,

    /// Cast named by the URL, or the one last written to it.
    url_uuid: Option<String>,
    all_casts: Vec<Cast>,
    filtered_casts: Vec<Cast>,
    selected_segment: Option<String>,
    selected_cast: Option<Cast>,
    last_selected_cast_index: Option<usize>,
}

impl CastEditor {
    /// Creates an editor over a cast library. `initial_path` is the URL path
    /// the editor was opened with, e.g. `/cast/<uuid>`.
    pub fn new(config: EditorConfig, store: CastStore, initial_path: Option<&str>) -> Self {
        let url_uuid = initial_path.and_then(|path| CastRoute::parse(&config.route_base, path));
        let board = CastBoard::new(config.default_cast_count, config.check_unavailabilities);
        let route = CastRoute::new(config.route_base.clone());
        Self {
            config,
            store,
            segments: SegmentCatalog::default(),
            dancers: DancerRoster::default(),
            board,
            route,
            select_options: SelectOptions::default(),
            url_uuid,
            all_casts: Vec::new(),
            filtered_casts: Vec::new(),
            selected_segment: None,
            selected_cast: None,
            last_selected_cast_index: None,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn board(&self) -> &CastBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut CastBoard {
        &mut self.board
    }

    pub fn store_mut(&mut self) -> &mut CastStore {
        &mut self.store
    }

    pub fn segments(&self) -> &SegmentCatalog {
        &self.segments
    }

    pub fn dancers(&self) -> &DancerRoster {
        &self.dancers
    }

    pub fn selected_segment(&self) -> Option<&str> {
        self.selected_segment.as_deref()
    }

    pub fn selected_cast(&self) -> Option<&Cast> {
        self.selected_cast.as_ref()
    }

    /// Casts of the selected segment.
    pub fn filtered_casts(&self) -> &[Cast] {
        &self.filtered_casts
    }

    pub fn all_casts(&self) -> &[Cast] {
        &self.all_casts
    }

    /// The path to show in the address bar.
    pub fn url(&self) -> String {
        self.route.path()
    }

    pub fn can_add_cast(&self) -> bool {
        self.selected_segment.is_some()
    }

    pub fn select_options(&self) -> SelectOptions {
        self.select_options
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Replaces the segments. Selects the first one if none is selected.
    pub fn load_segments(&mut self, segments: Vec<Segment>) -> CastResult<()> {
        self.segments.replace(segments);
        if self.selected_segment.is_none() {
            if let Some(first) = self.segments.first().map(|s| s.uuid.clone()) {
                self.select_segment(&first)?;
            }
        }
        self.check_for_url_compliance()?;
        self.refresh_board()
    }

    /// Replaces the dancers.
    pub fn load_dancers(&mut self, dancers: Vec<Dancer>) -> CastResult<()> {
        self.dancers.replace(dancers);
        self.refresh_board()
    }

    /// Re-reads the cast library and settles the selection.
    pub fn load_casts(&mut self) -> CastResult<ReloadOutcome> {
        let outcome = self
            .board
            .on_casts_loaded(&mut self.store, &self.segments, &self.dancers)?;

        if let Some(url_uuid) = self.url_uuid.clone() {
            if self.store.has_cast(&url_uuid)? {
                self.select_in_board(&url_uuid)?;
                self.set_cast_url();
            }
        }

        self.refresh_casts()?;
        if self.all_casts.is_empty() {
            self.selected_cast = None;
            return Ok(outcome);
        }

        if !self.board.is_cast_selected() {
            let pick = if self.filtered_casts.is_empty() {
                self.all_casts[0].uuid.clone()
            } else {
                let index = self
                    .last_selected_cast_index
                    .map_or(0, |i| i.saturating_sub(1))
                    .min(self.filtered_casts.len() - 1);
                self.filtered_casts[index].uuid.clone()
            };
            self.set_current_cast(&pick)?;
        } else if let Some(uuid) = self.board.selected_cast_uuid().map(str::to_string) {
            self.url_uuid = Some(uuid.clone());
            if self.store.has_cast(&uuid)? {
                self.set_current_cast(&uuid)?;
            }
        }

        self.check_for_url_compliance()?;
        Ok(outcome)
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// User picked a segment.
    pub fn select_segment(&mut self, uuid: &str) -> CastResult<()> {
        self.set_segment(uuid)?;
        self.set_cast_url();
        Ok(())
    }

    /// Makes a cast current: selects it in the board and in the URL.
    pub fn set_current_cast(&mut self, uuid: &str) -> CastResult<()> {
        let cast = self.store.cast_from_uuid(uuid)?;
        self.last_selected_cast_index = self.filtered_casts.iter().position(|c| c.uuid == uuid);
        self.selected_cast = Some(cast);
        self.select_in_board(uuid)?;
        self.url_uuid = Some(uuid.to_string());
        self.set_cast_url();
        Ok(())
    }

    /// Changes how casts are selected into the board and reapplies it to the
    /// current cast. A new performance date rebuilds the grid with absences.
    pub fn set_select_options(&mut self, options: SelectOptions) -> CastResult<ReloadOutcome> {
        self.select_options = options;
        match self.board.selected_cast_uuid().map(str::to_string) {
            Some(uuid) => self.select_in_board(&uuid),
            None => Ok(ReloadOutcome::Waiting),
        }
    }

    /// Casts against a performance, or stops doing so with `None`.
    pub fn set_performance_date(&mut self, date: Option<i64>) -> CastResult<ReloadOutcome> {
        self.set_select_options(SelectOptions {
            performance_date: date,
            ..self.select_options
        })
    }

    fn set_segment(&mut self, uuid: &str) -> CastResult<()> {
        if self.segments.segment(uuid).is_none() {
            return Err(CastError::segment_not_found(uuid));
        }
        if self.selected_segment.as_deref() == Some(uuid) {
            return Ok(());
        }
        let auto_select_first = self.selected_segment.is_some();
        self.selected_segment = Some(uuid.to_string());
        debug!(segment = %uuid, "segment selected");
        self.update_filtered_casts();
        if auto_select_first {
            if let Some(first) = self.filtered_casts.first().map(|c| c.uuid.clone()) {
                self.set_current_cast(&first)?;
            }
        }
        Ok(())
    }

    /// Keeps segment, cast and URL consistent: the URL cast's segment wins,
    /// and a URL cast outside the selected segment is replaced by the
    /// segment's first cast.
    fn check_for_url_compliance(&mut self) -> CastResult<()> {
        if self.selected_segment.is_some() {
            self.update_filtered_casts();
        }
        if self.url_uuid.is_some() {
            let Some(selected) = self.selected_cast.as_ref() else {
                return Ok(());
            };
            let segment = selected.segment.clone();
            if self.segments.segment(&segment).is_some() {
                self.set_segment(&segment)?;
            }
        }
        if self.selected_segment.is_some() {
            let url_in_segment = self
                .filtered_casts
                .iter()
                .any(|c| Some(c.uuid.as_str()) == self.url_uuid.as_deref());
            if !url_in_segment {
                if let Some(first) = self.filtered_casts.first().map(|c| c.uuid.clone()) {
                    self.set_current_cast(&first)?;
                }
            }
        }
        Ok(())
    }

    fn update_filtered_casts(&mut self) {
        if let Some(segment) = self.selected_segment.as_deref() {
            self.filtered_casts = self
                .all_casts
                .iter()
                .filter(|c| c.segment == segment)
                .cloned()
                .collect();
        }
    }

    fn refresh_casts(&mut self) -> CastResult<()> {
        self.all_casts = self.store.all_casts()?;
        self.update_filtered_casts();
        Ok(())
    }

    fn select_in_board(&mut self, uuid: &str) -> CastResult<ReloadOutcome> {
        self.board.select_cast(
            Some(uuid),
            self.select_options,
            &mut self.store,
            &self.segments,
            &self.dancers,
        )
    }

    /// Rebuilds the board for the current selection after lookups changed.
    fn refresh_board(&mut self) -> CastResult<()> {
        self.board
            .reload(&mut self.store, &self.segments, &self.dancers)?;
        Ok(())
    }

    fn set_cast_url(&mut self) {
        if let Some(uuid) = self.url_uuid.as_deref() {
            self.route.replace_cast(uuid);
        }
    }

    // =========================================================================
    // CAST LIFECYCLE
    // =========================================================================

    /// Creates an empty cast for the selected segment and makes it current.
    pub fn add_cast(&mut self) -> CastResult<String> {
        let segment_uuid = self
            .selected_segment
            .clone()
            .ok_or(CastError::NoSegmentSelected)?;
        let segment = self
            .segments
            .segment(&segment_uuid)
            .ok_or_else(|| CastError::segment_not_found(&segment_uuid))?;
        let cast = Cast::empty_for_segment(
            Uuid::new_v4().to_string(),
            self.config.new_cast_name.clone(),
            segment,
            self.config.default_cast_count,
        );

        let uuid = self.store.set_cast(cast, true)?;
        self.refresh_casts()?;
        self.set_current_cast(&uuid)?;
        self.board
            .on_casts_loaded(&mut self.store, &self.segments, &self.dancers)?;
        self.board.mark_dirty();
        info!(cast = %uuid, segment = %segment_uuid, "cast added");
        Ok(uuid)
    }

    /// Saves the board's cast and keeps it selected.
    pub fn save_cast(&mut self) -> CastResult<String> {
        let uuid = self.board.save_cast(&mut self.store)?;
        self.refresh_casts()?;
        self.selected_cast = self.store.get_cast(&uuid)?;
        self.url_uuid = Some(uuid.clone());
        self.set_cast_url();
        Ok(uuid)
    }

    /// Deletes the board's cast and selects a neighbour.
    pub fn delete_cast(&mut self) -> CastResult<bool> {
        let deleted = self.board.delete_cast(&mut self.store)?;
        self.selected_cast = None;
        self.load_casts()?;
        Ok(deleted)
    }
}

// =============================================================================
// TESTS
// =============================================================================
