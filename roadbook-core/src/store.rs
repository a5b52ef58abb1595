//! Ordered, mutable collection of waypoints with structural edits.
//!
//! The store is the single owner of waypoint state. Components that need to
//! read sibling waypoints query it directly rather than holding references
//! of their own, and every structural edit goes through it so list order
//! stays consistent with the segment indices produced by recalculation.

use geo::Coord;
use thiserror::Error;

use crate::waypoint::{Waypoint, WaypointKind};

/// Errors returned by structural edits on [`WaypointStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaypointStoreError {
    /// The index did not refer to a stored waypoint.
    #[error("waypoint index {index} out of bounds for {len} waypoints")]
    OutOfBounds {
        /// Offending index.
        index: usize,
        /// Number of waypoints at the time of the edit.
        len: usize,
    },
}

/// Ordered waypoint collection with stable identifiers.
///
/// # Examples
/// ```
/// use roadbook_core::{WaypointKind, WaypointStore};
///
/// let mut store = WaypointStore::new();
/// let id = store.append(WaypointKind::Sight);
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.points()[0].id, id);
/// ```
#[derive(Debug, Default)]
pub struct WaypointStore {
    points: Vec<Waypoint>,
    next_id: u64,
    dirty: bool,
}

impl WaypointStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            next_id: 1,
            dirty: false,
        }
    }

    /// Adopt waypoints loaded from a persisted plan.
    ///
    /// Identifier assignment resumes above the highest loaded id.
    #[must_use]
    pub fn from_points(points: Vec<Waypoint>) -> Self {
        let next_id = points.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            points,
            next_id,
            dirty: false,
        }
    }

    /// Append a fresh, unlocated waypoint and return its id.
    pub fn append(&mut self, kind: WaypointKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.points.push(Waypoint::new(id, kind));
        self.dirty = true;
        id
    }

    /// Remove the waypoint at `index`, returning it.
    ///
    /// Confirmation is the editor's concern; by the time this runs the user
    /// has already agreed to the deletion.
    pub fn remove(&mut self, index: usize) -> Result<Waypoint, WaypointStoreError> {
        self.check(index)?;
        self.dirty = true;
        Ok(self.points.remove(index))
    }

    /// Swap the waypoint at `index` with its predecessor.
    ///
    /// Returns `false` when `index` is already first.
    pub fn move_up(&mut self, index: usize) -> Result<bool, WaypointStoreError> {
        self.check(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.points.swap(index - 1, index);
        self.dirty = true;
        Ok(true)
    }

    /// Swap the waypoint at `index` with its successor.
    ///
    /// Returns `false` when `index` is already last.
    pub fn move_down(&mut self, index: usize) -> Result<bool, WaypointStoreError> {
        self.check(index)?;
        if index + 1 == self.points.len() {
            return Ok(false);
        }
        self.points.swap(index, index + 1);
        self.dirty = true;
        Ok(true)
    }

    /// Assign a coordinate to the waypoint at `index`.
    pub fn accept_location(
        &mut self,
        index: usize,
        at: Coord<f64>,
    ) -> Result<(), WaypointStoreError> {
        self.check(index)?;
        self.points[index].location = Some(at);
        self.dirty = true;
        Ok(())
    }

    /// All waypoints in itinerary order.
    #[must_use]
    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    /// Mutable access to a single waypoint.
    pub fn point_mut(&mut self, index: usize) -> Result<&mut Waypoint, WaypointStoreError> {
        self.check(index)?;
        self.dirty = true;
        Ok(&mut self.points[index])
    }

    /// Mutable access to the whole list, for recalculation write-back.
    pub fn points_mut(&mut self) -> &mut [Waypoint] {
        self.dirty = true;
        &mut self.points
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the store holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the dirty flag, reporting whether a re-render is due.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn check(&self, index: usize) -> Result<(), WaypointStoreError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(WaypointStoreError::OutOfBounds {
                index,
                len: self.points.len(),
            })
        }
    }
}
