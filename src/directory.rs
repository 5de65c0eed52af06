//! Lookups for the records casts refer to but do not own.
//!
//! Segments and dancers are provided by collaborator services. The editor
//! only reads them through these traits; the in-memory implementations are
//! what the WASM bindings and the CLI load JSON snapshots into.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cast::model::{Dancer, Segment};

/// Read access to segments and their positions.
pub trait SegmentLookup {
    /// Finds a segment by UUID.
    fn segment(&self, uuid: &str) -> Option<&Segment>;

    /// All segments in display order.
    fn segments(&self) -> Vec<&Segment>;
}

/// Read access to dancers.
pub trait DancerLookup {
    /// Finds a dancer by UUID.
    fn dancer(&self, uuid: &str) -> Option<&Dancer>;
}

/// Ordered in-memory segment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SegmentCatalog {
    segments: Vec<Segment>,
}

impl SegmentCatalog {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Replaces the catalog contents.
    pub fn replace(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment, if any.
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }
}

impl SegmentLookup for SegmentCatalog {
    fn segment(&self, uuid: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.uuid == uuid)
    }

    fn segments(&self) -> Vec<&Segment> {
        self.segments.iter().collect()
    }
}

/// In-memory dancer index keyed by UUID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DancerRoster {
    dancers: HashMap<String, Dancer>,
}

impl DancerRoster {
    pub fn new(dancers: Vec<Dancer>) -> Self {
        let mut roster = Self::default();
        roster.replace(dancers);
        roster
    }

    /// Replaces the roster contents.
    pub fn replace(&mut self, dancers: Vec<Dancer>) {
        self.dancers = dancers.into_iter().map(|d| (d.uuid.clone(), d)).collect();
    }

    pub fn len(&self) -> usize {
        self.dancers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dancers.is_empty()
    }
}

impl DancerLookup for DancerRoster {
    fn dancer(&self, uuid: &str) -> Option<&Dancer> {
        self.dancers.get(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::model::Position;

    #[test]
    fn test_segment_catalog_lookup() {
        let catalog = SegmentCatalog::new(vec![
            Segment::new("s1", "Prologue"),
            Segment::new("s2", "Finale").with_position(Position::new("p1", 0, 2)),
        ]);
        assert_eq!(catalog.segment("s2").unwrap().positions.len(), 1);
        assert!(catalog.segment("nope").is_none());
        assert_eq!(catalog.first().unwrap().uuid, "s1");
        assert_eq!(catalog.segments().len(), 2);
    }

    #[test]
    fn test_segment_catalog_deserializes_from_array() {
        let catalog: SegmentCatalog =
            serde_json::from_str(r#"[{"uuid": "s1", "positions": [{"uuid": "p1", "size": 3}]}]"#)
                .unwrap();
        assert_eq!(catalog.segment("s1").unwrap().positions[0].size, 3);
    }

    #[test]
    fn test_dancer_roster_replace() {
        let mut roster = DancerRoster::new(vec![Dancer::new("d1", "Ana", "P")]);
        assert!(roster.dancer("d1").is_some());
        roster.replace(vec![Dancer::new("d2", "Ben", "Q")]);
        assert!(roster.dancer("d1").is_none());
        assert_eq!(roster.len(), 1);
    }
}
