//! The day-plan editing session.
//!
//! `PlanEditor` owns the waypoint store, the interaction state machine, and
//! the provider for the session, and exposes the callback hooks the host UI
//! wires up. It accepts start time, stay durations, and travel modes as
//! plain data; rendering stays on the host's side of the boundary.

use std::time::Duration;

use chrono::NaiveTime;
use geo::Coord;

use crate::calculator::{RecalculateError, RouteSegmentCalculator};
use crate::codec;
use crate::interaction::InteractionStateMachine;
use crate::persistence::{PersistenceError, PlanRecord, PlanStore};
use crate::plan::{DayPlan, RouteSegment};
use crate::provider::{MapProvider, Marker};
use crate::store::{WaypointStore, WaypointStoreError};
use crate::waypoint::{TravelMode, Waypoint, WaypointKind};

/// Callbacks into the host UI.
///
/// All hooks are optional; an unset hook is simply skipped.
#[derive(Default)]
pub struct EditorHooks {
    /// Invoked after a successful save, with the saved plan.
    pub on_finish: Option<Box<dyn FnMut(&DayPlan)>>,
    /// Invoked when the session is cancelled.
    pub on_cancel: Option<Box<dyn FnMut()>>,
    /// Invoked when a waypoint gains a coordinate.
    pub on_locate_change: Option<Box<dyn FnMut(usize, Coord<f64>)>>,
    /// Invoked when a waypoint moves, with `(from, to)` indices.
    pub on_index_change: Option<Box<dyn FnMut(usize, usize)>>,
}

/// Interactive editing session for one day's plan.
pub struct PlanEditor {
    road_id: u64,
    day_index: u16,
    title: String,
    remark: String,
    start_time: Option<NaiveTime>,
    store: WaypointStore,
    routes: Vec<RouteSegment>,
    interaction: InteractionStateMachine,
    calculator: RouteSegmentCalculator,
    provider: Box<dyn MapProvider>,
    hooks: EditorHooks,
    pending_removal: Option<usize>,
    current_position: String,
}

impl PlanEditor {
    /// Start a session over `plan` using the given provider.
    #[must_use]
    pub fn new(
        road_id: u64,
        day_index: u16,
        plan: DayPlan,
        provider: Box<dyn MapProvider>,
        hooks: EditorHooks,
    ) -> Self {
        Self {
            road_id,
            day_index,
            title: plan.title,
            remark: plan.remark,
            start_time: plan.start_time,
            store: WaypointStore::from_points(plan.points),
            routes: plan.routes,
            interaction: InteractionStateMachine::new(),
            calculator: RouteSegmentCalculator::new(),
            provider,
            hooks,
            pending_removal: None,
            current_position: String::new(),
        }
    }

    /// Render the map and draw the loaded plan.
    pub fn open(&mut self, container: &str) {
        let _ = self.provider.render(container);
        self.refresh_markers();
        if !self.routes.is_empty() {
            self.provider.draw_route(&self.routes);
        }
        let located: Vec<Coord<f64>> = self
            .store
            .points()
            .iter()
            .filter_map(|p| p.location)
            .collect();
        if !located.is_empty() {
            self.provider.fit_viewport(&located);
        }
    }

    /// The current plan as plain data.
    #[must_use]
    pub fn plan(&self) -> DayPlan {
        DayPlan {
            title: self.title.clone(),
            remark: self.remark.clone(),
            start_time: self.start_time,
            points: self.store.points().to_vec(),
            routes: self.routes.clone(),
        }
    }

    /// Address shown for the last idle map click.
    #[must_use]
    pub fn current_position(&self) -> &str {
        &self.current_position
    }

    /// Waypoint index currently in locate mode, if any.
    #[must_use]
    pub fn locating(&self) -> Option<usize> {
        self.interaction.locating()
    }

    /// Set the display title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Set the free-form remark.
    pub fn set_remark(&mut self, remark: impl Into<String>) {
        self.remark = remark.into();
    }

    /// Set or clear the itinerary start time.
    pub fn set_start_time(&mut self, start_time: Option<NaiveTime>) {
        self.start_time = start_time;
    }

    /// Set the stay duration at a waypoint.
    pub fn set_stay(&mut self, index: usize, stay: Duration) -> Result<(), WaypointStoreError> {
        self.store.point_mut(index)?.stay = stay;
        Ok(())
    }

    /// Set the travel mode of a waypoint's incoming leg.
    pub fn set_travel_mode(
        &mut self,
        index: usize,
        mode: TravelMode,
    ) -> Result<(), WaypointStoreError> {
        let point = self.store.point_mut(index)?;
        point.mode = mode;
        // Stale figures from the other mode would mislead until the next
        // recalculation.
        point.leg_distance_m = None;
        point.leg_duration = None;
        point.window = None;
        Ok(())
    }

    /// Set the user-supplied travel time for a rail or flight leg.
    pub fn set_travel_time(
        &mut self,
        index: usize,
        travel_time: Duration,
    ) -> Result<(), WaypointStoreError> {
        self.store.point_mut(index)?.leg_duration = Some(travel_time);
        Ok(())
    }

    /// Append an empty waypoint, returning its id.
    pub fn append_waypoint(&mut self, kind: WaypointKind) -> u64 {
        self.store.append(kind)
    }

    /// Ask for the waypoint at `index` to be deleted.
    ///
    /// Deletion always goes through a confirmation step; nothing changes
    /// until [`Self::confirm_remove`] runs.
    pub fn request_remove(&mut self, index: usize) -> Result<(), WaypointStoreError> {
        if index >= self.store.len() {
            return Err(WaypointStoreError::OutOfBounds {
                index,
                len: self.store.len(),
            });
        }
        self.pending_removal = Some(index);
        Ok(())
    }

    /// Carry out a requested deletion.
    pub fn confirm_remove(&mut self) -> Result<Option<Waypoint>, WaypointStoreError> {
        let Some(index) = self.pending_removal.take() else {
            return Ok(None);
        };
        let removed = self.store.remove(index)?;
        self.interaction.notify_removed(index);
        self.refresh_markers();
        Ok(Some(removed))
    }

    /// Abandon a requested deletion.
    pub fn cancel_remove(&mut self) {
        self.pending_removal = None;
    }

    /// Move the waypoint at `index` one position up.
    pub fn move_up(&mut self, index: usize) -> Result<(), WaypointStoreError> {
        if self.store.move_up(index)? {
            self.interaction.notify_swapped(index - 1, index);
            if let Some(hook) = self.hooks.on_index_change.as_mut() {
                hook(index, index - 1);
            }
            self.refresh_markers();
        }
        Ok(())
    }

    /// Move the waypoint at `index` one position down.
    pub fn move_down(&mut self, index: usize) -> Result<(), WaypointStoreError> {
        if self.store.move_down(index)? {
            self.interaction.notify_swapped(index, index + 1);
            if let Some(hook) = self.hooks.on_index_change.as_mut() {
                hook(index, index + 1);
            }
            self.refresh_markers();
        }
        Ok(())
    }

    /// Toggle or switch locate mode for the waypoint at `index`.
    pub fn request_locate(&mut self, index: usize) -> Result<Option<usize>, WaypointStoreError> {
        if index >= self.store.len() {
            return Err(WaypointStoreError::OutOfBounds {
                index,
                len: self.store.len(),
            });
        }
        Ok(self.interaction.request_locate(index))
    }

    /// Dispatch a map click.
    ///
    /// While locating, the click assigns the coordinate to the targeted
    /// waypoint and leaves locate mode. While idle, the click only updates
    /// the displayed current position; a geocode failure degrades to an
    /// empty string and never blocks the session.
    pub async fn map_click(&mut self, at: Coord<f64>) {
        if let Some(index) = self.interaction.take_click_target() {
            if self.store.accept_location(index, at).is_ok() {
                if let Some(hook) = self.hooks.on_locate_change.as_mut() {
                    hook(index, at);
                }
                self.refresh_markers();
            }
            return;
        }
        self.current_position = match self.provider.reverse_geocode(at).await {
            Ok(address) => address,
            Err(err) => {
                log::warn!("reverse geocode at ({:.5}, {:.5}): {err}", at.x, at.y);
                String::new()
            }
        };
    }

    /// Place the search marker and centre on it.
    pub fn show_search_result(&mut self, at: Coord<f64>, zoom: u8) {
        self.provider.draw_search_marker(at);
        self.provider.center_and_zoom(at, zoom);
    }

    /// Remove the search marker.
    pub fn clear_search_result(&mut self) {
        self.provider.clear_search_marker();
    }

    /// Recompute segments and the schedule for the current waypoints.
    pub async fn recalculate(&mut self) -> Result<(), RecalculateError> {
        let segments = self
            .calculator
            .recalculate(
                self.provider.as_mut(),
                self.start_time,
                self.store.points_mut(),
            )
            .await?;
        self.routes = segments;
        Ok(())
    }

    /// Persist the plan.
    ///
    /// On failure the error is returned and the session keeps its in-memory
    /// state, so the user can retry without losing edits.
    pub async fn save(&mut self, plans: &dyn PlanStore) -> Result<(), PersistenceError> {
        let plan = self.plan();
        let blob = codec::encode(&plan.body())
            .map_err(|err| PersistenceError::Rejected(err.to_string()))?;
        let record = PlanRecord {
            road_id: self.road_id,
            day_index: self.day_index,
            title: plan.title.clone(),
            remark: plan.remark.clone(),
            start_time: plan.start_time,
            blob,
        };
        plans.save(&record).await?;
        if let Some(hook) = self.hooks.on_finish.as_mut() {
            hook(&plan);
        }
        Ok(())
    }

    /// Abandon the session.
    pub fn cancel(&mut self) {
        if let Some(hook) = self.hooks.on_cancel.as_mut() {
            hook();
        }
    }

    fn refresh_markers(&mut self) {
        let markers: Vec<Marker> = self
            .store
            .points()
            .iter()
            .filter_map(|point| {
                point.location.map(|location| Marker {
                    id: point.id,
                    location,
                    label: point.address.clone(),
                })
            })
            .collect();
        let _ = self.store.take_dirty();
        if markers.is_empty() {
            self.provider.clear_waypoint_markers();
        } else {
            self.provider.draw_waypoint_markers(&markers);
        }
    }
}
