//! The mapping-provider adapter contract.
//!
//! Two incompatible vendor SDKs sit behind [`MapProvider`]. A provider is
//! chosen once, at construction, and never mixed with the other at runtime;
//! calculation logic upstream of this trait never branches on vendor
//! identity. All vendor-crossing calls are asynchronous request/response
//! operations on a single-threaded, cooperative executor, so the futures
//! involved are deliberately not `Send`.

mod error;
mod segments;

pub use error::{DriveRoutingError, GeocodeError, RoutePlanError};
pub use segments::plan_segments;

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use crate::plan::RouteSegment;
use crate::waypoint::TravelMode;

/// Opaque handle to a vendor map engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineHandle(u64);

impl EngineHandle {
    /// Wrap a vendor engine identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A waypoint marker to draw on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Identifier of the waypoint the marker stands for.
    pub id: u64,
    /// WGS84 position.
    pub location: Coord<f64>,
    /// Label rendered beside the marker.
    pub label: String,
}

/// Click handler receiving a resolved WGS84 coordinate.
pub type ClickHandler = Box<dyn FnMut(Coord<f64>)>;

/// Input to [`MapProvider::calculate_route`]: a located waypoint reduced to
/// what routing needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteNode {
    /// WGS84 position.
    pub location: Coord<f64>,
    /// Travel mode of the leg arriving at this node.
    pub mode: TravelMode,
    /// User-supplied travel time, consulted for rail and flight legs.
    pub travel_time: Duration,
}

/// A vendor routing service's answer for a single drive leg.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLeg {
    /// Ordered path coordinates (WGS84).
    pub path: Vec<Coord<f64>>,
    /// Path length in metres.
    pub distance_m: f64,
    /// Travel time along the path.
    pub duration: Duration,
}

/// Uniform interface over the two mapping-provider SDKs.
///
/// Rendering and overlay calls are synchronous scene mutations; routing and
/// geocoding cross into the vendor SDK and are async. The provider owns the
/// single underlying map engine for the editor session and releases every
/// overlay when dropped.
#[async_trait(?Send)]
pub trait MapProvider {
    /// Initialise the vendor engine inside `container`, returning an opaque
    /// handle. Rendering again replaces the previous engine and its
    /// overlays.
    fn render(&mut self, container: &str) -> EngineHandle;

    /// Register the single click handler. A later registration replaces the
    /// earlier one.
    fn on_click(&mut self, handler: ClickHandler);

    /// Replace the drawn waypoint markers with `markers`.
    fn draw_waypoint_markers(&mut self, markers: &[Marker]);

    /// Remove all waypoint markers.
    fn clear_waypoint_markers(&mut self);

    /// Place the single search marker.
    fn draw_search_marker(&mut self, at: Coord<f64>);

    /// Remove the search marker.
    fn clear_search_marker(&mut self);

    /// Replace all previously drawn route polylines with `segments`.
    fn draw_route(&mut self, segments: &[RouteSegment]);

    /// Centre the viewport on `at` at `zoom`.
    fn center_and_zoom(&mut self, at: Coord<f64>, zoom: u8);

    /// Fit the viewport around `bounds`.
    fn fit_viewport(&mut self, bounds: &[Coord<f64>]);

    /// Resolve a coordinate to a human-readable address.
    async fn reverse_geocode(&self, at: Coord<f64>) -> Result<String, GeocodeError>;

    /// Compute the pairwise segments for `nodes`.
    ///
    /// Individual drive legs may fail and degrade to placeholder segments;
    /// the call as a whole only fails when fewer than two nodes are given.
    async fn calculate_route(
        &self,
        nodes: &[RouteNode],
    ) -> Result<Vec<RouteSegment>, RoutePlanError>;
}
