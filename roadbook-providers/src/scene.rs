//! Declarative overlay state shared by both adapters.
//!
//! Callers describe the overlays they want as plain lists; the scene diffs
//! the new list against what is currently drawn and reports the minimal
//! additions and removals. The imperative create/destroy lifecycle of
//! vendor overlay objects stays behind the adapter.

use geo::Coord;
use roadbook_core::Marker;

/// Changes needed to bring the drawn markers in line with a new list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerDiff {
    /// Markers to create. A marker whose position or label changed shows
    /// up here as well as in `removed`.
    pub added: Vec<Marker>,
    /// Waypoint ids whose native overlay must be destroyed.
    pub removed: Vec<u64>,
}

impl MarkerDiff {
    /// Whether nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The overlays currently drawn on the map, in WGS84.
#[derive(Debug, Default)]
pub struct OverlayScene {
    markers: Vec<Marker>,
    search: Option<Coord<f64>>,
    routes: Vec<Vec<Coord<f64>>>,
}

impl OverlayScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the marker list, returning the diff to apply natively.
    pub fn set_markers(&mut self, new: &[Marker]) -> MarkerDiff {
        let removed = self
            .markers
            .iter()
            .filter(|old| !new.iter().any(|m| m == *old))
            .map(|old| old.id)
            .collect();
        let added = new
            .iter()
            .filter(|m| !self.markers.contains(m))
            .cloned()
            .collect();
        self.markers = new.to_vec();
        MarkerDiff { added, removed }
    }

    /// Drop every marker, returning the ids to destroy natively.
    pub fn clear_markers(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.markers)
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    /// Place the single search marker, returning whether it moved.
    pub fn set_search(&mut self, at: Coord<f64>) -> bool {
        let moved = self.search != Some(at);
        self.search = Some(at);
        moved
    }

    /// Remove the search marker, returning whether one was drawn.
    pub fn clear_search(&mut self) -> bool {
        self.search.take().is_some()
    }

    /// Replace all route polylines.
    pub fn replace_routes(&mut self, routes: Vec<Vec<Coord<f64>>>) {
        self.routes = routes;
    }

    /// Markers currently drawn.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Search marker currently drawn.
    #[must_use]
    pub fn search(&self) -> Option<Coord<f64>> {
        self.search
    }

    /// Route polylines currently drawn.
    #[must_use]
    pub fn routes(&self) -> &[Vec<Coord<f64>>] {
        &self.routes
    }
}
