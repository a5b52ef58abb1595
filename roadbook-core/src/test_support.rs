//! Test-only fakes: a scripted `MapProvider` and an in-memory `PlanStore`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use crate::persistence::{PersistenceError, PlanRecord, PlanStore};
use crate::plan::RouteSegment;
use crate::provider::{
    ClickHandler, DriveRoutingError, EngineHandle, GeocodeError, MapProvider, Marker, RouteNode,
    RoutePlanError, RoutedLeg, plan_segments,
};

/// Deterministic `MapProvider` for tests.
///
/// Drive and geocode answers are scripted with `push_drive`/`push_geocode`
/// and consumed in segment order; when the script runs out, drive calls
/// fall back to a unit leg (1 km, 10 min). Every overlay operation is
/// recorded for assertions.
#[derive(Default)]
pub struct ScriptedProvider {
    drive_results: RefCell<VecDeque<Result<RoutedLeg, DriveRoutingError>>>,
    geocode_results: RefCell<VecDeque<Result<String, GeocodeError>>>,
    drawn_routes: Vec<Vec<RouteSegment>>,
    drawn_markers: Vec<Vec<Marker>>,
    marker_clears: usize,
    search_marker: Option<Coord<f64>>,
    viewport: Option<(Coord<f64>, u8)>,
    fitted: Option<Vec<Coord<f64>>>,
    click_handler: Option<ClickHandler>,
    engines: u64,
}

impl ScriptedProvider {
    /// Create a provider with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next drive-leg routing call.
    pub fn push_drive(&mut self, result: Result<RoutedLeg, DriveRoutingError>) {
        self.drive_results.borrow_mut().push_back(result);
    }

    /// Queue the answer for the next reverse-geocode call.
    pub fn push_geocode(&mut self, result: Result<String, GeocodeError>) {
        self.geocode_results.borrow_mut().push_back(result);
    }

    /// Simulate a user click on the map.
    pub fn click(&mut self, at: Coord<f64>) {
        if let Some(handler) = self.click_handler.as_mut() {
            handler(at);
        }
    }

    /// Every `draw_route` call, oldest first.
    #[must_use]
    pub fn drawn_routes(&self) -> &[Vec<RouteSegment>] {
        &self.drawn_routes
    }

    /// Every `draw_waypoint_markers` call, oldest first.
    #[must_use]
    pub fn drawn_markers(&self) -> &[Vec<Marker>] {
        &self.drawn_markers
    }

    /// Number of `clear_waypoint_markers` calls.
    #[must_use]
    pub fn marker_clears(&self) -> usize {
        self.marker_clears
    }

    /// Current search marker, if drawn.
    #[must_use]
    pub fn search_marker(&self) -> Option<Coord<f64>> {
        self.search_marker
    }

    /// Last `center_and_zoom` call.
    #[must_use]
    pub fn viewport(&self) -> Option<(Coord<f64>, u8)> {
        self.viewport
    }

    /// Last `fit_viewport` call.
    #[must_use]
    pub fn fitted(&self) -> Option<&[Coord<f64>]> {
        self.fitted.as_deref()
    }
}

fn unit_leg(from: Coord<f64>, to: Coord<f64>) -> RoutedLeg {
    RoutedLeg {
        path: vec![from, to],
        distance_m: 1000.0,
        duration: Duration::from_secs(600),
    }
}

#[async_trait(?Send)]
impl MapProvider for ScriptedProvider {
    fn render(&mut self, _container: &str) -> EngineHandle {
        self.engines += 1;
        EngineHandle::new(self.engines)
    }

    fn on_click(&mut self, handler: ClickHandler) {
        self.click_handler = Some(handler);
    }

    fn draw_waypoint_markers(&mut self, markers: &[Marker]) {
        self.drawn_markers.push(markers.to_vec());
    }

    fn clear_waypoint_markers(&mut self) {
        self.marker_clears += 1;
    }

    fn draw_search_marker(&mut self, at: Coord<f64>) {
        self.search_marker = Some(at);
    }

    fn clear_search_marker(&mut self) {
        self.search_marker = None;
    }

    fn draw_route(&mut self, segments: &[RouteSegment]) {
        self.drawn_routes.push(segments.to_vec());
    }

    fn center_and_zoom(&mut self, at: Coord<f64>, zoom: u8) {
        self.viewport = Some((at, zoom));
    }

    fn fit_viewport(&mut self, bounds: &[Coord<f64>]) {
        self.fitted = Some(bounds.to_vec());
    }

    async fn reverse_geocode(&self, at: Coord<f64>) -> Result<String, GeocodeError> {
        self.geocode_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("near ({:.3}, {:.3})", at.x, at.y)))
    }

    async fn calculate_route(
        &self,
        nodes: &[RouteNode],
    ) -> Result<Vec<RouteSegment>, RoutePlanError> {
        plan_segments(nodes, |from, to| {
            let scripted = self.drive_results.borrow_mut().pop_front();
            async move { scripted.unwrap_or_else(|| Ok(unit_leg(from, to))) }
        })
        .await
    }
}

/// In-memory `PlanStore` with failure injection.
#[derive(Default)]
pub struct MemoryPlanStore {
    records: RefCell<HashMap<(u64, u16), PlanRecord>>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
}

impl MemoryPlanStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly, bypassing the trait.
    pub fn seed(&self, record: PlanRecord) {
        self.records
            .borrow_mut()
            .insert((record.road_id, record.day_index), record);
    }

    /// Fetch a stored record directly, bypassing the trait.
    #[must_use]
    pub fn get(&self, road_id: u64, day_index: u16) -> Option<PlanRecord> {
        self.records.borrow().get(&(road_id, day_index)).cloned()
    }

    /// Make every subsequent load fail.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

#[async_trait(?Send)]
impl PlanStore for MemoryPlanStore {
    async fn load(
        &self,
        road_id: u64,
        day_index: u16,
    ) -> Result<Option<PlanRecord>, PersistenceError> {
        if self.fail_loads.get() {
            return Err(PersistenceError::Unavailable("injected outage".into()));
        }
        Ok(self.get(road_id, day_index))
    }

    async fn save(&self, record: &PlanRecord) -> Result<(), PersistenceError> {
        if self.fail_saves.get() {
            return Err(PersistenceError::Unavailable("injected outage".into()));
        }
        self.seed(record.clone());
        Ok(())
    }

    async fn delete(&self, road_id: u64, day_index: u16) -> Result<(), PersistenceError> {
        if self.fail_loads.get() {
            return Err(PersistenceError::Unavailable("injected outage".into()));
        }
        self.records.borrow_mut().remove(&(road_id, day_index));
        Ok(())
    }
}
