//! Waypoints: the individual stops of a day's itinerary.
//!
//! A waypoint is created without a coordinate and gains one through locate
//! mode or a geocoder-assisted search. Its computed fields (incoming leg
//! distance/duration and the arrival/departure window) stay unset until a
//! recalculation completes for the plan.

use std::time::Duration;

use chrono::NaiveTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

/// Broad category of a stop, used for labelling and default stay times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    /// A through-point with no activity of its own.
    #[default]
    Transit,
    /// A meal stop.
    Meal,
    /// An overnight stay.
    Lodging,
    /// A sight or attraction.
    Sight,
}

/// How the leg *arriving* at a waypoint is travelled.
///
/// Only `Drive` legs are geographically routed. `Rail` and `Flight` legs are
/// synthesized as straight lines with a user-supplied travel time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    /// Routed by the mapping provider.
    #[default]
    Drive,
    /// Straight-line leg; duration is user-supplied.
    Rail,
    /// Straight-line leg; duration is user-supplied.
    Flight,
}

impl TravelMode {
    /// Whether this mode is routed by the provider rather than synthesized.
    #[must_use]
    pub const fn is_routed(self) -> bool {
        matches!(self, Self::Drive)
    }
}

/// Computed arrival/departure window at a waypoint.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use roadbook_core::TimeWindow;
///
/// let window = TimeWindow {
///     arrival: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
///     departure: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
/// };
/// assert!(window.arrival < window.departure);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// When the traveller arrives at the waypoint.
    pub arrival: NaiveTime,
    /// When the traveller leaves again.
    pub departure: NaiveTime,
}

/// A single stop in a day's itinerary, optionally geolocated.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use roadbook_core::{TravelMode, Waypoint, WaypointKind};
///
/// let waypoint = Waypoint::new(1, WaypointKind::Sight);
/// assert_eq!(waypoint.id, 1);
/// assert!(waypoint.location.is_none());
/// assert_eq!(waypoint.mode, TravelMode::Drive);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Stable identifier assigned by the store.
    pub id: u64,
    /// Category of the stop.
    pub kind: WaypointKind,
    /// WGS84 position; absent until located.
    pub location: Option<Coord<f64>>,
    /// Free-text address label.
    pub address: String,
    /// Travel mode of the incoming leg.
    pub mode: TravelMode,
    /// How long the traveller stays at this stop.
    pub stay: Duration,
    /// Incoming leg distance in metres; computed for drive legs.
    pub leg_distance_m: Option<f64>,
    /// Incoming leg duration; computed for drive legs, user-entered for
    /// rail and flight legs.
    pub leg_duration: Option<Duration>,
    /// Arrival/departure window; unset until a recalculation succeeds.
    pub window: Option<TimeWindow>,
}

impl Waypoint {
    /// Construct an empty, unlocated waypoint.
    #[must_use]
    pub fn new(id: u64, kind: WaypointKind) -> Self {
        Self {
            id,
            kind,
            location: None,
            address: String::new(),
            mode: TravelMode::default(),
            stay: Duration::ZERO,
            leg_distance_m: None,
            leg_duration: None,
            window: None,
        }
    }

    /// Whether the waypoint can take part in routing.
    #[must_use]
    pub const fn is_located(&self) -> bool {
        self.location.is_some()
    }

    /// Drop every computed field, keeping user-entered data.
    ///
    /// Used when the waypoint is copied into a fresh plan, where stale
    /// schedules and leg figures would be misleading.
    pub fn clear_computed(&mut self) {
        self.leg_distance_m = None;
        if self.mode.is_routed() {
            self.leg_duration = None;
        }
        self.window = None;
    }
}
