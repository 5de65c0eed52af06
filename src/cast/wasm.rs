//! WASM bindings for the cast editor.
//!
//! This module wraps [`CastEditor`] in a JavaScript-friendly type so a
//! browser front end can drive segment/cast selection and drag-and-drop.

use automerge::ChangeHash;
use js_sys::{Array, Function, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::error::CastError;
use super::board::{DropEvent, SelectOptions};
use super::editor::CastEditor;
use super::model::{Dancer, Segment};
use super::store::CastStore;

/// Serialize a value to JsValue with HashMaps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<CastError> for JsValue {
    fn from(err: CastError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: CastError| JsValue::from(e))
    };
}

fn config_from_js(config: JsValue) -> Result<EditorConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        Ok(EditorConfig::default())
    } else {
        Ok(from_value(config)?)
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around CastEditor.
#[wasm_bindgen]
pub struct JsCastEditor {
    inner: CastEditor,
}

#[wasm_bindgen]
impl JsCastEditor {
    /// Creates an editor over an empty cast library.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const editor = new JsCastEditor({ default_cast_count: 2 }, location.pathname);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, initial_path: Option<String>) -> Result<JsCastEditor, JsValue> {
        let config = config_from_js(config)?;
        let store = js_result!(CastStore::new())?;
        Ok(JsCastEditor {
            inner: CastEditor::new(config, store, initial_path.as_deref()),
        })
    }

    /// Creates an editor over a saved cast library (Uint8Array).
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const editor = JsCastEditor.fromBytes(bytes, null, location.pathname);
    /// editor.loadCasts();
    /// ```
    #[wasm_bindgen(js_name = fromBytes)]
    pub fn from_bytes(
        bytes: &[u8],
        config: JsValue,
        initial_path: Option<String>,
    ) -> Result<JsCastEditor, JsValue> {
        let config = config_from_js(config)?;
        let store = js_result!(CastStore::from_bytes(bytes))?;
        Ok(JsCastEditor {
            inner: CastEditor::new(config, store, initial_path.as_deref()),
        })
    }

    /// Saves the cast library to binary bytes (returns Uint8Array).
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&mut self) -> Uint8Array {
        let bytes = self.inner.store_mut().save();
        Uint8Array::from(&bytes[..])
    }

    /// Current address bar path, e.g. `cast/<uuid>`.
    #[wasm_bindgen(js_name = getUrl)]
    pub fn get_url(&self) -> String {
        self.inner.url()
    }
}

// =============================================================================
// LOADING AND SELECTION
// =============================================================================

#[wasm_bindgen]
impl JsCastEditor {
    /// Loads segments (array of `{ uuid, name, positions: [{ uuid, name, order, size }] }`).
    #[wasm_bindgen(js_name = loadSegments)]
    pub fn load_segments(&mut self, segments: JsValue) -> Result<(), JsValue> {
        let segments: Vec<Segment> = from_value(segments)?;
        js_result!(self.inner.load_segments(segments))
    }

    /// Loads dancers (array of `{ uuid, first_name, last_name }`).
    #[wasm_bindgen(js_name = loadDancers)]
    pub fn load_dancers(&mut self, dancers: JsValue) -> Result<(), JsValue> {
        let dancers: Vec<Dancer> = from_value(dancers)?;
        js_result!(self.inner.load_dancers(dancers))
    }

    /// Re-reads the cast library. Returns the board reload outcome
    /// ("Waiting", "Rebuilt", "Suppressed", "Missing" or "Unchanged").
    #[wasm_bindgen(js_name = loadCasts)]
    pub fn load_casts(&mut self) -> Result<JsValue, JsValue> {
        let outcome = js_result!(self.inner.load_casts())?;
        Ok(to_js_value(&outcome)?)
    }

    #[wasm_bindgen(js_name = selectSegment)]
    pub fn select_segment(&mut self, uuid: &str) -> Result<(), JsValue> {
        js_result!(self.inner.select_segment(uuid))
    }

    #[wasm_bindgen(js_name = setCurrentCast)]
    pub fn set_current_cast(&mut self, uuid: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_current_cast(uuid))
    }

    /// Sets `{ save_delete_enabled, performance_date }` for cast selection
    /// and reapplies them to the current cast. Returns the reload outcome.
    #[wasm_bindgen(js_name = setSelectOptions)]
    pub fn set_select_options(&mut self, options: JsValue) -> Result<JsValue, JsValue> {
        let options: SelectOptions = from_value(options)?;
        let outcome = js_result!(self.inner.set_select_options(options))?;
        Ok(to_js_value(&outcome)?)
    }

    /// Casts against a performance (milliseconds since the epoch), or stops
    /// doing so with null.
    #[wasm_bindgen(js_name = setPerformanceDate)]
    pub fn set_performance_date(&mut self, date: Option<f64>) -> Result<JsValue, JsValue> {
        let outcome = js_result!(self.inner.set_performance_date(date.map(|d| d as i64)))?;
        Ok(to_js_value(&outcome)?)
    }

    /// Casts of the selected segment.
    #[wasm_bindgen(js_name = getFilteredCasts)]
    pub fn get_filtered_casts(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.filtered_casts())?)
    }

    #[wasm_bindgen(js_name = selectedSegment)]
    pub fn selected_segment(&self) -> Option<String> {
        self.inner.selected_segment().map(str::to_string)
    }
}

// =============================================================================
// BOARD METHODS
// =============================================================================

#[wasm_bindgen]
impl JsCastEditor {
    /// Gets the grid being edited, or null.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const grid = editor.getGrid();
    /// grid.headers;                         // ['1st Cast', '2nd Cast']
    /// grid.positions[0].rows[0].slots[1];   // { uuid, dancer, has_absence } or null
    /// ```
    #[wasm_bindgen(js_name = getGrid)]
    pub fn get_grid(&self) -> Result<JsValue, JsValue> {
        match self.inner.board().grid() {
            Some(grid) => Ok(to_js_value(grid)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Gets the working cast, or null.
    #[wasm_bindgen(js_name = getCast)]
    pub fn get_cast(&self) -> Result<JsValue, JsValue> {
        match self.inner.board().cast() {
            Some(cast) => Ok(to_js_value(cast)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Applies a drop gesture. Returns "Ignored", "Removed", "Placed" or "Moved".
    ///
    /// # Example (JavaScript)
    /// ```js
    /// editor.drop({
    ///   from: { kind: 'pool' }, from_index: 0,
    ///   to: { kind: 'cell', position: 1, row: 0 }, to_index: 1,
    ///   pointer_over_container: true,
    ///   item: { uuid: 'd1', first_name: 'Ana', last_name: 'Pavlova' },
    /// });
    /// ```
    #[wasm_bindgen(js_name = drop)]
    pub fn drop_item(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: DropEvent = from_value(event)?;
        let outcome = js_result!(self.inner.board_mut().drop(&event))?;
        Ok(to_js_value(&outcome)?)
    }

    /// Registers a callback receiving the cast after every edit.
    #[wasm_bindgen(js_name = onCastChange)]
    pub fn on_cast_change(&mut self, callback: Function) {
        self.inner.board_mut().on_cast_change(move |cast| {
            let value = match to_js_value(cast) {
                Ok(value) => value,
                Err(err) => {
                    warn!(cast = %cast.uuid, error = %err, "cast change not serializable");
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                warn!(cast = %cast.uuid, error = ?err, "cast change listener threw");
            }
        });
    }

    #[wasm_bindgen(js_name = setTitle)]
    pub fn set_title(&mut self, name: &str) -> Result<(), JsValue> {
        js_result!(self.inner.board_mut().set_title(name))
    }

    #[wasm_bindgen(js_name = setBoldedCast)]
    pub fn set_bolded_cast(&mut self, num: Option<u32>) {
        self.inner.board_mut().set_bolded_cast(num);
    }

    #[wasm_bindgen(js_name = incrementCastCount)]
    pub fn increment_cast_count(&mut self) -> Result<(), JsValue> {
        js_result!(self.inner.board_mut().increment_cast_count())
    }

    #[wasm_bindgen(js_name = decrementCastCount)]
    pub fn decrement_cast_count(&mut self) -> Result<(), JsValue> {
        js_result!(self.inner.board_mut().decrement_cast_count())
    }

    #[wasm_bindgen(js_name = incrementDancerCount)]
    pub fn increment_dancer_count(&mut self, position: usize) -> Result<(), JsValue> {
        js_result!(self.inner.board_mut().increment_dancer_count(position))
    }

    #[wasm_bindgen(js_name = decrementDancerCount)]
    pub fn decrement_dancer_count(&mut self, position: usize) -> Result<(), JsValue> {
        js_result!(self.inner.board_mut().decrement_dancer_count(position))
    }

    #[wasm_bindgen(js_name = canSaveCast)]
    pub fn can_save_cast(&self) -> bool {
        self.inner.board().can_save_cast()
    }

    #[wasm_bindgen(js_name = canDeleteCast)]
    pub fn can_delete_cast(&self) -> bool {
        self.inner.board().can_delete_cast()
    }

    #[wasm_bindgen(js_name = buttonsEnabled)]
    pub fn buttons_enabled(&self) -> bool {
        self.inner.board().buttons_enabled()
    }

    #[wasm_bindgen(js_name = canAddCast)]
    pub fn can_add_cast(&self) -> bool {
        self.inner.can_add_cast()
    }
}

// =============================================================================
// CAST LIFECYCLE
// =============================================================================

#[wasm_bindgen]
impl JsCastEditor {
    /// Adds an empty cast to the selected segment. Returns its UUID.
    #[wasm_bindgen(js_name = addCast)]
    pub fn add_cast(&mut self) -> Result<String, JsValue> {
        js_result!(self.inner.add_cast())
    }

    /// Saves the working cast. Returns its UUID.
    #[wasm_bindgen(js_name = saveCast)]
    pub fn save_cast(&mut self) -> Result<String, JsValue> {
        js_result!(self.inner.save_cast())
    }

    #[wasm_bindgen(js_name = deleteCast)]
    pub fn delete_cast(&mut self) -> Result<bool, JsValue> {
        js_result!(self.inner.delete_cast())
    }
}

// =============================================================================
// SYNC METHODS
// =============================================================================

#[wasm_bindgen]
impl JsCastEditor {
    /// Gets the current heads of the cast library as hex strings.
    #[wasm_bindgen(js_name = getHeads)]
    pub fn get_heads(&mut self) -> Array {
        let heads = self.inner.store_mut().get_heads();
        let array = Array::new();
        for head in heads {
            array.push(&JsValue::from_str(&head.to_string()));
        }
        array
    }

    /// Gets changes since the given hex-encoded heads as a Uint8Array, or
    /// null if there are none.
    #[wasm_bindgen(js_name = getChangesSince)]
    pub fn get_changes_since(&mut self, their_heads: Array) -> Result<JsValue, JsValue> {
        let heads: Vec<ChangeHash> = their_heads
            .iter()
            .filter_map(|v| {
                v.as_string().and_then(|s| {
                    let bytes = hex::decode(&s).ok()?;
                    if bytes.len() == 32 {
                        let mut arr = [0u8; 32];
                        arr.copy_from_slice(&bytes);
                        Some(ChangeHash(arr))
                    } else {
                        None
                    }
                })
            })
            .collect();

        match self.inner.store_mut().generate_sync_message(&heads) {
            Some(bytes) => Ok(Uint8Array::from(&bytes[..]).into()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Applies changes from a peer and reloads the casts.
    #[wasm_bindgen(js_name = applyChanges)]
    pub fn apply_changes(&mut self, changes: &[u8]) -> Result<JsValue, JsValue> {
        js_result!(self.inner.store_mut().apply_sync_message(changes))?;
        self.load_casts()
    }
}
