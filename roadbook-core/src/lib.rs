//! Core domain types and algorithms for the roadbook day-trip planner.
//!
//! A day plan is an ordered list of [`Waypoint`]s. Consecutive waypoints are
//! joined by [`RouteSegment`]s computed through a [`MapProvider`] adapter, and
//! a [`TimePropagationEngine`] folds segment durations and per-waypoint stay
//! times into an arrival/departure schedule. The [`PlanEditor`] wires the
//! pieces together for a host UI; [`codec`] and [`persistence`] cover the
//! load/save boundary.
//!
//! Coordinates are WGS84 throughout, `x = longitude` and `y = latitude`.
//! Provider adapters convert to their vendor's native datum at the adapter
//! boundary, never here.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod calculator;
pub mod codec;
pub mod editor;
pub mod interaction;
pub mod persistence;
pub mod plan;
pub mod provider;
pub mod schedule;
pub mod store;
pub mod waypoint;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use calculator::{PlanValidationError, RecalculateError, RouteSegmentCalculator};
pub use codec::{DecodedPlan, ParseError, decode, encode};
pub use editor::{EditorHooks, PlanEditor};
pub use interaction::{InteractionState, InteractionStateMachine};
pub use persistence::{PersistenceError, PlanRecord, PlanStore, open_day};
pub use plan::{DayPlan, PlanBody, RouteSegment};
pub use provider::{
    ClickHandler, DriveRoutingError, EngineHandle, GeocodeError, MapProvider, Marker, RouteNode,
    RoutePlanError, RoutedLeg, plan_segments,
};
pub use schedule::{ScheduleError, ScheduleLeg, TimePropagationEngine};
pub use store::{WaypointStore, WaypointStoreError};
pub use waypoint::{TimeWindow, TravelMode, Waypoint, WaypointKind};
