//! Automerge-backed cast library.
//!
//! `CastStore` is the in-process cast persistence/query service: it keeps
//! every cast of the company in one Automerge document so the library can be
//! saved, loaded and merged between clients. All mutations go through
//! autosurgeon hydrate/reconcile on the [`CastLibrary`] root.

use automerge::{AutoCommit, ChangeHash};
use autosurgeon::{hydrate, reconcile};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CastError, CastResult};
use super::model::{Cast, CastLibrary};

/// The cast persistence/query service.
///
/// # Caching Strategy
///
/// `cached_state` holds the hydrated library and is replaced on every
/// reconcile. It is dropped on load, merge and sync.
pub struct CastStore {
    doc: AutoCommit,
    /// Cached hydrated state - invalidated after load/merge/sync.
    cached_state: Option<CastLibrary>,
    /// UUID of the cast stored by the last `set_cast`.
    last_saved_cast_id: Option<String>,
}

impl CastStore {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty store with an initialized document schema.
    pub fn new() -> CastResult<Self> {
        let mut doc = AutoCommit::new();
        let root = CastLibrary::default();
        reconcile(&mut doc, &root)?;
        Ok(Self {
            doc,
            cached_state: Some(root),
            last_saved_cast_id: None,
        })
    }

    /// Creates a store from saved binary data.
    pub fn from_bytes(bytes: &[u8]) -> CastResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        Ok(Self {
            doc,
            cached_state: None,
            last_saved_cast_id: None,
        })
    }

    /// Saves the document to binary format.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    /// Returns the current heads (for sync protocol).
    pub fn get_heads(&mut self) -> Vec<ChangeHash> {
        self.doc.get_heads()
    }

    /// Gets the actor ID for this document instance.
    pub fn actor_id(&self) -> String {
        self.doc.get_actor().to_hex_string()
    }

    // =========================================================================
    // HIGH-LEVEL OPERATIONS (via Hydrate/Reconcile)
    // =========================================================================

    /// Hydrates the whole library.
    pub fn get_state(&mut self) -> CastResult<CastLibrary> {
        if let Some(ref cached) = self.cached_state {
            return Ok(cached.clone());
        }
        let state: CastLibrary = hydrate(&self.doc)?;
        self.cached_state = Some(state.clone());
        Ok(state)
    }

    /// Applies a function to the library, then reconciles it back.
    pub fn update_state<F>(&mut self, f: F) -> CastResult<()>
    where
        F: FnOnce(&mut CastLibrary),
    {
        let mut state = self.get_state()?;
        f(&mut state);
        reconcile(&mut self.doc, &state)?;
        self.cached_state = Some(state);
        Ok(())
    }

    /// Creates or replaces a cast.
    ///
    /// A cast without a UUID gets a fresh one. `is_new` only marks creation
    /// in the logs. Returns the stored UUID, which is also remembered as
    /// [`last_saved_cast_id`](Self::last_saved_cast_id).
    pub fn set_cast(&mut self, mut cast: Cast, is_new: bool) -> CastResult<String> {
        if cast.uuid.is_empty() {
            cast.uuid = Uuid::new_v4().to_string();
        }
        let uuid = cast.uuid.clone();
        self.update_state(|state| {
            if !state.cast_order.contains(&uuid) {
                state.cast_order.push(uuid.clone());
            }
            state.casts.insert(uuid.clone(), cast);
        })?;
        if is_new {
            info!(cast = %uuid, "created cast");
        } else {
            debug!(cast = %uuid, "saved cast");
        }
        self.last_saved_cast_id = Some(uuid.clone());
        Ok(uuid)
    }

    /// Gets a cast by UUID.
    pub fn get_cast(&mut self, uuid: &str) -> CastResult<Option<Cast>> {
        let state = self.get_state()?;
        Ok(state.casts.get(uuid).cloned())
    }

    /// Gets a cast by UUID, failing if it does not exist.
    pub fn cast_from_uuid(&mut self, uuid: &str) -> CastResult<Cast> {
        self.get_cast(uuid)?
            .ok_or_else(|| CastError::cast_not_found(uuid))
    }

    /// True if the library holds the cast.
    pub fn has_cast(&mut self, uuid: &str) -> CastResult<bool> {
        let state = self.get_state()?;
        Ok(state.casts.contains_key(uuid))
    }

    /// All casts in storage order.
    pub fn all_casts(&mut self) -> CastResult<Vec<Cast>> {
        Ok(self.get_state()?.ordered())
    }

    /// Casts belonging to one segment, in storage order.
    pub fn casts_for_segment(&mut self, segment: &str) -> CastResult<Vec<Cast>> {
        Ok(self
            .all_casts()?
            .into_iter()
            .filter(|c| c.segment == segment)
            .collect())
    }

    /// Removes a cast. Returns false if it did not exist.
    pub fn delete_cast(&mut self, uuid: &str) -> CastResult<bool> {
        if !self.has_cast(uuid)? {
            return Ok(false);
        }
        self.update_state(|state| {
            state.casts.remove(uuid);
            state.cast_order.retain(|s| s != uuid);
        })?;
        if self.last_saved_cast_id.as_deref() == Some(uuid) {
            self.last_saved_cast_id = None;
        }
        info!(cast = %uuid, "deleted cast");
        Ok(true)
    }

    /// UUID of the cast stored by the most recent `set_cast`.
    pub fn last_saved_cast_id(&self) -> Option<&str> {
        self.last_saved_cast_id.as_deref()
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    /// Merges another store into this one.
    pub fn merge(&mut self, other: &mut Self) -> CastResult<()> {
        self.cached_state = None;
        self.doc.merge(&mut other.doc)?;
        Ok(())
    }

    /// Changes since `their_heads`, or None if there are none.
    pub fn generate_sync_message(&mut self, their_heads: &[ChangeHash]) -> Option<Vec<u8>> {
        let changes = self.doc.get_changes(their_heads);
        if changes.is_empty() {
            return None;
        }
        let mut bytes = Vec::new();
        for change in changes {
            bytes.extend_from_slice(change.raw_bytes());
        }
        Some(bytes)
    }

    /// Applies changes produced by `generate_sync_message` on a peer.
    pub fn apply_sync_message(&mut self, msg: &[u8]) -> CastResult<()> {
        self.cached_state = None;
        self.doc.load_incremental(msg)?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::model::{CastGroup, CastMember, FilledPosition};

    fn sample(uuid: &str, segment: &str) -> Cast {
        Cast::new(uuid, "Spring", segment)
            .with_cast_count(2)
            .with_filled_position(
                FilledPosition::new("pos-a")
                    .with_group(CastGroup::new(0).with_member(CastMember::new("d1", 0)))
                    .with_group(CastGroup::new(1).with_member(CastMember::new("d2", 3))),
            )
    }

    #[test]
    fn test_new_store_is_empty() {
        let mut store = CastStore::new().unwrap();
        assert!(store.get_state().unwrap().is_empty());
        assert!(store.last_saved_cast_id().is_none());
    }

    #[test]
    fn test_set_and_get_cast() {
        let mut store = CastStore::new().unwrap();
        let uuid = store.set_cast(sample("c1", "seg-1"), false).unwrap();
        assert_eq!(uuid, "c1");
        assert_eq!(store.last_saved_cast_id(), Some("c1"));
        assert!(store.has_cast("c1").unwrap());
        assert_eq!(store.get_cast("c1").unwrap().unwrap(), sample("c1", "seg-1"));
        assert!(store.get_cast("c2").unwrap().is_none());
        assert!(matches!(
            store.cast_from_uuid("c2"),
            Err(CastError::CastNotFound(_))
        ));
    }

    #[test]
    fn test_new_cast_without_uuid_gets_one() {
        let mut store = CastStore::new().unwrap();
        let uuid = store.set_cast(sample("", "seg-1"), true).unwrap();
        assert_eq!(uuid.len(), 36);
        assert_eq!(store.get_cast(&uuid).unwrap().unwrap().uuid, uuid);
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut store = CastStore::new().unwrap();
        store.set_cast(sample("c1", "seg-1"), false).unwrap();
        store.set_cast(sample("c2", "seg-2"), false).unwrap();
        let mut renamed = sample("c1", "seg-1");
        renamed.name = "Autumn".into();
        store.set_cast(renamed, false).unwrap();

        let all = store.all_casts().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Autumn");
        assert_eq!(store.casts_for_segment("seg-2").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_cast() {
        let mut store = CastStore::new().unwrap();
        store.set_cast(sample("c1", "seg-1"), false).unwrap();
        assert!(store.delete_cast("c1").unwrap());
        assert!(!store.delete_cast("c1").unwrap());
        assert!(store.all_casts().unwrap().is_empty());
        assert!(store.last_saved_cast_id().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = CastStore::new().unwrap();
        store.set_cast(sample("c1", "seg-1"), false).unwrap();
        let bytes = store.save();

        let mut loaded = CastStore::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.get_cast("c1").unwrap().unwrap(), sample("c1", "seg-1"));
    }

    #[test]
    fn test_merge_stores() {
        let mut base = CastStore::new().unwrap();
        base.set_cast(sample("base", "seg-1"), false).unwrap();
        let bytes = base.save();

        let mut client_a = CastStore::from_bytes(&bytes).unwrap();
        let mut client_b = CastStore::from_bytes(&bytes).unwrap();
        client_a.set_cast(sample("a", "seg-1"), true).unwrap();
        client_b.set_cast(sample("b", "seg-2"), true).unwrap();

        client_a.merge(&mut client_b).unwrap();
        client_b.merge(&mut client_a).unwrap();

        assert_eq!(client_a.get_state().unwrap().len(), 3);
        assert_eq!(client_b.get_state().unwrap().len(), 3);
    }

    #[test]
    fn test_incremental_sync() {
        let mut source = CastStore::new().unwrap();
        let bytes = source.save();
        let mut replica = CastStore::from_bytes(&bytes).unwrap();
        let heads = replica.get_heads();

        source.set_cast(sample("c1", "seg-1"), true).unwrap();
        let msg = source.generate_sync_message(&heads).unwrap();
        replica.apply_sync_message(&msg).unwrap();

        assert!(replica.has_cast("c1").unwrap());
        let heads = source.get_heads();
        assert!(source.generate_sync_message(&heads).is_none());
    }
}
