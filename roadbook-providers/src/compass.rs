//! Adapter over the "compass" mapping back-end.
//!
//! Compass is the GCJ-02 vendor: every coordinate crossing its SDK is in
//! GCJ-02, and its routing service answers with a single dense polyline per
//! drive plan. The adapter converts at the boundary in both directions, so
//! callers and the overlay scene only ever see WGS84.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

use roadbook_core::{
    ClickHandler, DriveRoutingError, EngineHandle, GeocodeError, MapProvider, Marker, RouteNode,
    RoutePlanError, RouteSegment, RoutedLeg, plan_segments,
};

use crate::datum::{gcj02_to_wgs84, wgs84_to_gcj02};
use crate::scene::OverlayScene;

/// A failure reported by the compass SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compass service error {code}: {message}")]
pub struct CompassServiceError {
    /// Vendor status code.
    pub code: i32,
    /// Vendor message.
    pub message: String,
}

/// One drive plan from the compass routing service, in GCJ-02.
#[derive(Debug, Clone, PartialEq)]
pub struct CompassPlan {
    /// Dense path geometry.
    pub polyline: Vec<Coord<f64>>,
    /// Plan length in metres.
    pub distance_m: f64,
    /// Plan travel time.
    pub duration: Duration,
}

/// The compass routing service, supplied by the host as the SDK transport.
#[async_trait(?Send)]
pub trait CompassRouting {
    /// Plan a drive between two GCJ-02 coordinates.
    async fn plan_drive(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<CompassPlan, CompassServiceError>;
}

/// The compass reverse-geocoding service.
#[async_trait(?Send)]
pub trait CompassGeocoder {
    /// Resolve a GCJ-02 coordinate to an address string.
    async fn locate(&self, at: Coord<f64>) -> Result<String, CompassServiceError>;
}

/// [`MapProvider`] implementation backed by the compass SDK.
///
/// Owns the single vendor engine for the editor session; dropping the
/// provider drops its native overlay registry with it.
pub struct CompassProvider {
    routing: Box<dyn CompassRouting>,
    geocoder: Box<dyn CompassGeocoder>,
    scene: OverlayScene,
    native_markers: HashMap<u64, Coord<f64>>,
    native_search: Option<Coord<f64>>,
    native_routes: Vec<Vec<Coord<f64>>>,
    native_viewport: Option<(Coord<f64>, u8)>,
    click_handler: Option<ClickHandler>,
    engines: u64,
}

impl CompassProvider {
    /// Construct the adapter over the injected vendor services.
    #[must_use]
    pub fn new(routing: Box<dyn CompassRouting>, geocoder: Box<dyn CompassGeocoder>) -> Self {
        Self {
            routing,
            geocoder,
            scene: OverlayScene::new(),
            native_markers: HashMap::new(),
            native_search: None,
            native_routes: Vec::new(),
            native_viewport: None,
            click_handler: None,
            engines: 0,
        }
    }

    /// Feed a native (GCJ-02) click from the vendor engine.
    ///
    /// The registered click handler receives the resolved WGS84 coordinate.
    pub fn dispatch_native_click(&mut self, native: Coord<f64>) {
        let resolved = gcj02_to_wgs84(native);
        if let Some(handler) = self.click_handler.as_mut() {
            handler(resolved);
        }
    }

    /// Native marker positions, keyed by waypoint id.
    #[must_use]
    pub fn native_markers(&self) -> &HashMap<u64, Coord<f64>> {
        &self.native_markers
    }

    /// Native route polylines currently drawn.
    #[must_use]
    pub fn native_routes(&self) -> &[Vec<Coord<f64>>] {
        &self.native_routes
    }

    /// Native search-marker position, if drawn.
    #[must_use]
    pub fn native_search(&self) -> Option<Coord<f64>> {
        self.native_search
    }

    /// Native viewport centre and zoom, if set.
    #[must_use]
    pub fn native_viewport(&self) -> Option<(Coord<f64>, u8)> {
        self.native_viewport
    }

    fn reset_overlays(&mut self) {
        self.scene = OverlayScene::new();
        self.native_markers.clear();
        self.native_search = None;
        self.native_routes.clear();
        self.native_viewport = None;
    }
}

#[async_trait(?Send)]
impl MapProvider for CompassProvider {
    fn render(&mut self, container: &str) -> EngineHandle {
        log::debug!("compass engine starting in {container}");
        self.reset_overlays();
        self.engines += 1;
        EngineHandle::new(self.engines)
    }

    fn on_click(&mut self, handler: ClickHandler) {
        self.click_handler = Some(handler);
    }

    fn draw_waypoint_markers(&mut self, markers: &[Marker]) {
        let diff = self.scene.set_markers(markers);
        for id in diff.removed {
            self.native_markers.remove(&id);
        }
        for marker in diff.added {
            self.native_markers
                .insert(marker.id, wgs84_to_gcj02(marker.location));
        }
    }

    fn clear_waypoint_markers(&mut self) {
        for id in self.scene.clear_markers() {
            self.native_markers.remove(&id);
        }
    }

    fn draw_search_marker(&mut self, at: Coord<f64>) {
        if self.scene.set_search(at) {
            self.native_search = Some(wgs84_to_gcj02(at));
        }
    }

    fn clear_search_marker(&mut self) {
        if self.scene.clear_search() {
            self.native_search = None;
        }
    }

    fn draw_route(&mut self, segments: &[RouteSegment]) {
        let paths: Vec<Vec<Coord<f64>>> = segments
            .iter()
            .map(|segment| segment.path.clone())
            .collect();
        self.native_routes = paths
            .iter()
            .map(|path| path.iter().copied().map(wgs84_to_gcj02).collect())
            .collect();
        self.scene.replace_routes(paths);
    }

    fn center_and_zoom(&mut self, at: Coord<f64>, zoom: u8) {
        self.native_viewport = Some((wgs84_to_gcj02(at), zoom));
    }

    fn fit_viewport(&mut self, bounds: &[Coord<f64>]) {
        if bounds.is_empty() {
            return;
        }
        let native: Vec<Coord<f64>> = bounds.iter().copied().map(wgs84_to_gcj02).collect();
        let centre = Coord {
            x: native.iter().map(|c| c.x).sum::<f64>() / native.len() as f64,
            y: native.iter().map(|c| c.y).sum::<f64>() / native.len() as f64,
        };
        self.native_viewport = Some((centre, 0));
    }

    async fn reverse_geocode(&self, at: Coord<f64>) -> Result<String, GeocodeError> {
        self.geocoder
            .locate(wgs84_to_gcj02(at))
            .await
            .map_err(|err| GeocodeError::new(err.to_string()))
    }

    async fn calculate_route(
        &self,
        nodes: &[RouteNode],
    ) -> Result<Vec<RouteSegment>, RoutePlanError> {
        let routing = self.routing.as_ref();
        plan_segments(nodes, |from, to| async move {
            let plan = routing
                .plan_drive(wgs84_to_gcj02(from), wgs84_to_gcj02(to))
                .await
                .map_err(|err| DriveRoutingError::new(err.to_string()))?;
            Ok(RoutedLeg {
                path: plan.polyline.into_iter().map(gcj02_to_wgs84).collect(),
                distance_m: plan.distance_m,
                duration: plan.duration,
            })
        })
        .await
    }
}
