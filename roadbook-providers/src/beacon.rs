//! Adapter over the "beacon" mapping back-end.
//!
//! Beacon is the BD-09 vendor. Its routing service answers with a ranked
//! list of candidate plans rather than a single one, and its geocoder
//! returns a structured address instead of a flat string. The adapter takes
//! the top-ranked plan, flattens the address, and converts every coordinate
//! at the SDK boundary so everything upstream stays in WGS84.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

use roadbook_core::{
    ClickHandler, DriveRoutingError, EngineHandle, GeocodeError, MapProvider, Marker, RouteNode,
    RoutePlanError, RouteSegment, RoutedLeg, plan_segments,
};

use crate::datum::{bd09_to_wgs84, wgs84_to_bd09};
use crate::scene::OverlayScene;

/// A failure reported by the beacon SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("beacon service error: {status}")]
pub struct BeaconServiceError {
    /// Vendor status description.
    pub status: String,
}

/// One candidate drive plan from the beacon routing service, in BD-09.
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconPlan {
    /// Dense path geometry.
    pub polyline: Vec<Coord<f64>>,
    /// Plan length in metres.
    pub distance_m: f64,
    /// Plan travel time.
    pub duration: Duration,
}

/// A structured reverse-geocoding answer from the beacon SDK.
///
/// Components run from the broadest division to the narrowest; empty
/// components are skipped when flattening.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeaconAddress {
    /// Address components, broadest first.
    pub components: Vec<String>,
}

impl BeaconAddress {
    fn flatten(&self) -> String {
        self.components
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The beacon routing service, supplied by the host as the SDK transport.
#[async_trait(?Send)]
pub trait BeaconRouting {
    /// Plan drives between two BD-09 coordinates, ranked best first.
    async fn plan_drives(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<Vec<BeaconPlan>, BeaconServiceError>;
}

/// The beacon reverse-geocoding service.
#[async_trait(?Send)]
pub trait BeaconGeocoder {
    /// Resolve a BD-09 coordinate to a structured address.
    async fn locate(&self, at: Coord<f64>) -> Result<BeaconAddress, BeaconServiceError>;
}

/// [`MapProvider`] implementation backed by the beacon SDK.
pub struct BeaconProvider {
    routing: Box<dyn BeaconRouting>,
    geocoder: Box<dyn BeaconGeocoder>,
    scene: OverlayScene,
    native_markers: HashMap<u64, Coord<f64>>,
    native_search: Option<Coord<f64>>,
    native_routes: Vec<Vec<Coord<f64>>>,
    native_viewport: Option<(Coord<f64>, u8)>,
    click_handler: Option<ClickHandler>,
    engines: u64,
}

impl BeaconProvider {
    /// Construct the adapter over the injected vendor services.
    #[must_use]
    pub fn new(routing: Box<dyn BeaconRouting>, geocoder: Box<dyn BeaconGeocoder>) -> Self {
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

    /// Feed a native (BD-09) click from the vendor engine.
    ///
    /// The registered click handler receives the resolved WGS84 coordinate.
    pub fn dispatch_native_click(&mut self, native: Coord<f64>) {
        let resolved = bd09_to_wgs84(native);
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
impl MapProvider for BeaconProvider {
    fn render(&mut self, container: &str) -> EngineHandle {
        log::debug!("beacon engine starting in {container}");
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
                .insert(marker.id, wgs84_to_bd09(marker.location));
        }
    }

    fn clear_waypoint_markers(&mut self) {
        for id in self.scene.clear_markers() {
            self.native_markers.remove(&id);
        }
    }

    fn draw_search_marker(&mut self, at: Coord<f64>) {
        if self.scene.set_search(at) {
            self.native_search = Some(wgs84_to_bd09(at));
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
            .map(|path| path.iter().copied().map(wgs84_to_bd09).collect())
            .collect();
        self.scene.replace_routes(paths);
    }

    fn center_and_zoom(&mut self, at: Coord<f64>, zoom: u8) {
        self.native_viewport = Some((wgs84_to_bd09(at), zoom));
    }

    fn fit_viewport(&mut self, bounds: &[Coord<f64>]) {
        if bounds.is_empty() {
            return;
        }
        let native: Vec<Coord<f64>> = bounds.iter().copied().map(wgs84_to_bd09).collect();
        let centre = Coord {
            x: native.iter().map(|c| c.x).sum::<f64>() / native.len() as f64,
            y: native.iter().map(|c| c.y).sum::<f64>() / native.len() as f64,
        };
        self.native_viewport = Some((centre, 0));
    }

    async fn reverse_geocode(&self, at: Coord<f64>) -> Result<String, GeocodeError> {
        let address = self
            .geocoder
            .locate(wgs84_to_bd09(at))
            .await
            .map_err(|err| GeocodeError::new(err.to_string()))?;
        Ok(address.flatten())
    }

    async fn calculate_route(
        &self,
        nodes: &[RouteNode],
    ) -> Result<Vec<RouteSegment>, RoutePlanError> {
        let routing = self.routing.as_ref();
        plan_segments(nodes, |from, to| async move {
            let plans = routing
                .plan_drives(wgs84_to_bd09(from), wgs84_to_bd09(to))
                .await
                .map_err(|err| DriveRoutingError::new(err.to_string()))?;
            let best = plans
                .into_iter()
                .next()
                .ok_or_else(|| DriveRoutingError::new("no candidate plans"))?;
            Ok(RoutedLeg {
                path: best.polyline.into_iter().map(bd09_to_wgs84).collect(),
                distance_m: best.distance_m,
                duration: best.duration,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::wgs84_to_bd09;
    use roadbook_core::TravelMode;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BEIJING: Coord<f64> = Coord {
        x: 116.397_428,
        y: 39.909_23,
    };
    const NEARBY: Coord<f64> = Coord {
        x: 116.403_963,
        y: 39.915_119,
    };

    #[derive(Default)]
    struct FakeRouting {
        requests: Rc<RefCell<Vec<(Coord<f64>, Coord<f64>)>>>,
        empty: bool,
    }

    #[async_trait(?Send)]
    impl BeaconRouting for FakeRouting {
        async fn plan_drives(
            &self,
            from: Coord<f64>,
            to: Coord<f64>,
        ) -> Result<Vec<BeaconPlan>, BeaconServiceError> {
            self.requests.borrow_mut().push((from, to));
            if self.empty {
                return Ok(Vec::new());
            }
            let detour = BeaconPlan {
                polyline: vec![from, to],
                distance_m: 9800.0,
                duration: Duration::from_secs(2100),
            };
            let best = BeaconPlan {
                polyline: vec![from, to],
                distance_m: 2600.0,
                duration: Duration::from_secs(780),
            };
            Ok(vec![best, detour])
        }
    }

    #[derive(Default)]
    struct FakeGeocoder {
        requests: Rc<RefCell<Vec<Coord<f64>>>>,
    }

    #[async_trait(?Send)]
    impl BeaconGeocoder for FakeGeocoder {
        async fn locate(&self, at: Coord<f64>) -> Result<BeaconAddress, BeaconServiceError> {
            self.requests.borrow_mut().push(at);
            Ok(BeaconAddress {
                components: vec![
                    "Beijing".into(),
                    String::new(),
                    "Dongcheng".into(),
                    "Jingshan Front St".into(),
                ],
            })
        }
    }

    fn close(a: Coord<f64>, b: Coord<f64>) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    fn node(at: Coord<f64>) -> RouteNode {
        RouteNode {
            location: at,
            mode: TravelMode::Drive,
            travel_time: Duration::ZERO,
        }
    }

    fn provider_with(routing: FakeRouting, geocoder: FakeGeocoder) -> BeaconProvider {
        BeaconProvider::new(Box::new(routing), Box::new(geocoder))
    }

    #[rstest]
    fn native_clicks_are_resolved_to_wgs84() {
        let mut provider = provider_with(FakeRouting::default(), FakeGeocoder::default());
        let seen: Rc<RefCell<Vec<Coord<f64>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        provider.on_click(Box::new(move |at| sink.borrow_mut().push(at)));

        provider.dispatch_native_click(wgs84_to_bd09(BEIJING));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(close(seen[0], BEIJING), "got {:?}", seen[0]);
    }

    #[rstest]
    #[tokio::test]
    async fn addresses_are_flattened_broadest_first() {
        let geocoder = FakeGeocoder::default();
        let requests = Rc::clone(&geocoder.requests);
        let provider = provider_with(FakeRouting::default(), geocoder);

        let address = provider
            .reverse_geocode(BEIJING)
            .await
            .expect("geocoder scripted to succeed");

        assert_eq!(address, "Beijing Dongcheng Jingshan Front St");
        let requests = requests.borrow();
        assert!(close(requests[0], wgs84_to_bd09(BEIJING)));
    }

    #[rstest]
    #[tokio::test]
    async fn top_ranked_plan_wins() {
        let provider = provider_with(FakeRouting::default(), FakeGeocoder::default());

        let segments = provider
            .calculate_route(&[node(BEIJING), node(NEARBY)])
            .await
            .expect("two drive nodes");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].distance_m, 2600.0);
        assert_eq!(segments[0].duration, Duration::from_secs(780));
        assert!(close(segments[0].path[0], BEIJING));
        assert!(close(segments[0].path[1], NEARBY));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_candidate_list_degrades_to_a_placeholder() {
        let routing = FakeRouting {
            empty: true,
            ..FakeRouting::default()
        };
        let provider = provider_with(routing, FakeGeocoder::default());

        let segments = provider
            .calculate_route(&[node(BEIJING), node(NEARBY)])
            .await
            .expect("failures degrade per leg");

        assert_eq!(segments.len(), 1);
        assert!(segments[0].path.is_empty());
        assert_eq!(segments[0].distance_m, 0.0);
        assert_eq!(segments[0].duration, Duration::ZERO);
    }

    #[rstest]
    #[tokio::test]
    async fn routing_requests_cross_in_bd09() {
        let routing = FakeRouting::default();
        let requests = Rc::clone(&routing.requests);
        let provider = provider_with(routing, FakeGeocoder::default());

        provider
            .calculate_route(&[node(BEIJING), node(NEARBY)])
            .await
            .expect("two drive nodes");

        let requests = requests.borrow();
        assert!(close(requests[0].0, wgs84_to_bd09(BEIJING)));
        assert!(close(requests[0].1, wgs84_to_bd09(NEARBY)));
    }

    #[rstest]
    fn marker_diffs_keep_the_native_registry_in_step() {
        let mut provider = provider_with(FakeRouting::default(), FakeGeocoder::default());
        let first = Marker {
            id: 1,
            location: BEIJING,
            label: "1".into(),
        };

        provider.draw_waypoint_markers(std::slice::from_ref(&first));
        assert!(close(
            provider.native_markers()[&1],
            wgs84_to_bd09(BEIJING)
        ));

        provider.clear_waypoint_markers();
        assert!(provider.native_markers().is_empty());
    }

    #[rstest]
    fn search_and_viewport_cross_in_bd09() {
        let mut provider = provider_with(FakeRouting::default(), FakeGeocoder::default());

        provider.draw_search_marker(BEIJING);
        let search = provider.native_search().expect("search marker drawn");
        assert!(close(search, wgs84_to_bd09(BEIJING)));
        provider.clear_search_marker();
        assert!(provider.native_search().is_none());

        provider.center_and_zoom(BEIJING, 10);
        let (centre, zoom) = provider.native_viewport().expect("viewport set");
        assert_eq!(zoom, 10);
        assert!(close(centre, wgs84_to_bd09(BEIJING)));
    }
}
