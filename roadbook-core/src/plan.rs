//! Day plans and the routed segments joining their waypoints.

use std::time::Duration;

use chrono::NaiveTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::waypoint::{TravelMode, Waypoint};

/// The routed (or synthesized) path between two consecutive waypoints.
///
/// Segment *i* always connects waypoint *i − 1* to waypoint *i*; the first
/// waypoint has no incoming segment, so a plan with `n` waypoints carries
/// `n − 1` segments.
///
/// # Examples
/// ```
/// use roadbook_core::{RouteSegment, TravelMode};
///
/// let segment = RouteSegment::placeholder(0, 1, TravelMode::Drive);
/// assert!(segment.path.is_empty());
/// assert_eq!(segment.distance_m, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Index of the predecessor waypoint.
    pub from_index: usize,
    /// Index of the successor waypoint; always `from_index + 1`.
    pub to_index: usize,
    /// Ordered path coordinates (WGS84).
    pub path: Vec<Coord<f64>>,
    /// Length of the path in metres; zero for synthesized legs.
    pub distance_m: f64,
    /// Travel time along the segment.
    pub duration: Duration,
    /// How the segment is travelled.
    pub mode: TravelMode,
}

impl RouteSegment {
    /// Zero-length, zero-duration stand-in for a leg whose routing failed.
    #[must_use]
    pub const fn placeholder(from_index: usize, to_index: usize, mode: TravelMode) -> Self {
        Self {
            from_index,
            to_index,
            path: Vec::new(),
            distance_m: 0.0,
            duration: Duration::ZERO,
            mode,
        }
    }

    /// Two-point straight segment for rail and flight legs.
    ///
    /// These modes are not geographically routed: the distance is reported
    /// as zero and the duration is the user-supplied travel time.
    #[must_use]
    pub fn straight(
        from_index: usize,
        to_index: usize,
        from: Coord<f64>,
        to: Coord<f64>,
        mode: TravelMode,
        duration: Duration,
    ) -> Self {
        Self {
            from_index,
            to_index,
            path: vec![from, to],
            distance_m: 0.0,
            duration,
            mode,
        }
    }
}

/// The persisted portion of a day plan: waypoints and routed segments.
///
/// This is exactly the shape the codec writes as UTF-8 JSON; metadata such
/// as the title lives on the surrounding record instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanBody {
    /// Ordered waypoints.
    pub points: Vec<Waypoint>,
    /// Segments parallel to `points`; `routes[i]` arrives at `points[i + 1]`.
    pub routes: Vec<RouteSegment>,
}

impl PlanBody {
    /// Whether the body holds neither waypoints nor segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.routes.is_empty()
    }
}

/// The full itinerary for one day: waypoints, computed segments, metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayPlan {
    /// Display title of the day.
    pub title: String,
    /// Free-form remark.
    pub remark: String,
    /// Time of day the itinerary starts; required before scheduling.
    pub start_time: Option<NaiveTime>,
    /// Ordered waypoints.
    pub points: Vec<Waypoint>,
    /// Segments between consecutive waypoints.
    pub routes: Vec<RouteSegment>,
}

impl DayPlan {
    /// Assemble a plan from decoded body and record metadata.
    #[must_use]
    pub fn from_parts(
        title: String,
        remark: String,
        start_time: Option<NaiveTime>,
        body: PlanBody,
    ) -> Self {
        Self {
            title,
            remark,
            start_time,
            points: body.points,
            routes: body.routes,
        }
    }

    /// Borrowless view of the persisted portion.
    #[must_use]
    pub fn body(&self) -> PlanBody {
        PlanBody {
            points: self.points.clone(),
            routes: self.routes.clone(),
        }
    }
}
