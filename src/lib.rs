//! Facade crate for the roadbook day-trip planning engine.
//!
//! This crate re-exports the core domain types and exposes the two mapping
//! provider adapters behind a feature flag.

#![forbid(unsafe_code)]

pub use roadbook_core::{
    ClickHandler, DayPlan, DecodedPlan, DriveRoutingError, EditorHooks, EngineHandle, GeocodeError,
    InteractionState, InteractionStateMachine, MapProvider, Marker, ParseError, PersistenceError,
    PlanBody, PlanEditor, PlanRecord, PlanStore, PlanValidationError, RecalculateError, RouteNode,
    RoutePlanError, RouteSegment, RouteSegmentCalculator, RoutedLeg, ScheduleError, ScheduleLeg,
    TimePropagationEngine, TimeWindow, TravelMode, Waypoint, WaypointKind, WaypointStore,
    WaypointStoreError, open_day,
};

#[cfg(feature = "providers")]
pub use roadbook_providers::{BeaconProvider, CompassProvider};
