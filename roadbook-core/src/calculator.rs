//! Recalculation: waypoints in, routed segments and schedule out.
//!
//! `recalculate` is the only path that writes computed state (leg figures,
//! windows) back onto waypoints. Validation runs before anything is
//! mutated, so a failed recalculation leaves prior segments and schedules
//! exactly as they were.

use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;

use crate::plan::RouteSegment;
use crate::provider::{MapProvider, RouteNode, RoutePlanError};
use crate::schedule::{ScheduleError, ScheduleLeg, TimePropagationEngine};
use crate::waypoint::Waypoint;

/// All-or-nothing validation failures, raised before any state mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanValidationError {
    /// The plan has no start time.
    #[error("missing start time")]
    MissingStartTime,
    /// Too few located waypoints to route between.
    #[error("routing requires {required} located waypoints, found {found}")]
    InsufficientWaypoints {
        /// Located waypoints present.
        found: usize,
        /// Minimum required.
        required: usize,
    },
}

/// Errors returned by [`RouteSegmentCalculator::recalculate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecalculateError {
    /// A precondition failed; nothing was mutated.
    #[error(transparent)]
    Validation(#[from] PlanValidationError),
    /// The provider rejected the node list outright.
    #[error(transparent)]
    Route(#[from] RoutePlanError),
}

impl From<ScheduleError> for RecalculateError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::MissingStartTime => {
                Self::Validation(PlanValidationError::MissingStartTime)
            }
        }
    }
}

/// Turns the ordered waypoint list into pairwise segments and a schedule.
#[derive(Debug, Clone, Copy)]
pub struct RouteSegmentCalculator {
    engine: TimePropagationEngine,
    minimum_points: usize,
}

impl Default for RouteSegmentCalculator {
    fn default() -> Self {
        Self {
            engine: TimePropagationEngine::new(),
            minimum_points: 2,
        }
    }
}

impl RouteSegmentCalculator {
    /// Construct a calculator with the default two-point minimum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the located waypoints and propagate the schedule.
    ///
    /// Only coordinate-bearing waypoints take part; unlocated ones are
    /// skipped and left untouched. On success the computed segments are
    /// drawn through the provider and returned; each located waypoint past
    /// the first receives its leg figures and window, and the first has its
    /// window cleared (it is the origin).
    pub async fn recalculate(
        &self,
        provider: &mut dyn MapProvider,
        start_time: Option<NaiveTime>,
        points: &mut [Waypoint],
    ) -> Result<Vec<RouteSegment>, RecalculateError> {
        if start_time.is_none() {
            return Err(PlanValidationError::MissingStartTime.into());
        }

        let mut located = Vec::new();
        let mut nodes = Vec::new();
        for (index, point) in points.iter().enumerate() {
            if let Some(location) = point.location {
                located.push(index);
                nodes.push(RouteNode {
                    location,
                    mode: point.mode,
                    travel_time: point.leg_duration.unwrap_or(Duration::ZERO),
                });
            }
        }
        if located.len() < self.minimum_points {
            return Err(PlanValidationError::InsufficientWaypoints {
                found: located.len(),
                required: self.minimum_points,
            }
            .into());
        }

        let segments = provider.calculate_route(&nodes).await?;

        let legs: Vec<ScheduleLeg> = segments
            .iter()
            .zip(located.iter().skip(1))
            .map(|(segment, &index)| ScheduleLeg {
                travel: segment.duration,
                stay: points[index].stay,
            })
            .collect();
        let windows = self.engine.propagate(start_time, &legs)?;

        let origin = &mut points[located[0]];
        origin.window = None;
        origin.leg_distance_m = None;
        if origin.mode.is_routed() {
            origin.leg_duration = None;
        }
        for (position, (&index, window)) in located.iter().skip(1).zip(&windows).enumerate() {
            let segment = &segments[position];
            let point = &mut points[index];
            if point.mode.is_routed() {
                point.leg_distance_m = Some(segment.distance_m);
                point.leg_duration = Some(segment.duration);
            } else {
                point.leg_distance_m = Some(segment.distance_m);
            }
            point.window = Some(*window);
        }

        provider.draw_route(&segments);
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RoutedLeg;
    use crate::test_support::ScriptedProvider;
    use crate::waypoint::{TravelMode, WaypointKind};
    use geo::Coord;
    use rstest::rstest;

    fn hms(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid clock time")
    }

    fn located(id: u64, x: f64, stay_secs: u64) -> Waypoint {
        let mut point = Waypoint::new(id, WaypointKind::Sight);
        point.location = Some(Coord { x, y: 30.0 });
        point.stay = Duration::from_secs(stay_secs);
        point
    }

    fn leg(secs: u64) -> RoutedLeg {
        RoutedLeg {
            path: vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }],
            distance_m: 1000.0,
            duration: Duration::from_secs(secs),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn routes_and_schedules_three_drive_stops() {
        let mut provider = ScriptedProvider::new();
        provider.push_drive(Ok(leg(3600)));
        provider.push_drive(Ok(leg(1800)));

        let mut points = vec![located(1, 0.0, 0), located(2, 1.0, 1800), located(3, 2.0, 0)];
        let calculator = RouteSegmentCalculator::new();
        let segments = calculator
            .recalculate(&mut provider, Some(hms(7, 30)), &mut points)
            .await
            .expect("valid plan");

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].from_index, segments[0].to_index), (0, 1));
        assert_eq!((segments[1].from_index, segments[1].to_index), (1, 2));

        assert!(points[0].window.is_none());
        let first = points[1].window.expect("window set");
        assert_eq!(first.arrival, hms(8, 30));
        assert_eq!(first.departure, hms(9, 0));
        let second = points[2].window.expect("window set");
        assert_eq!(second.arrival, hms(9, 30));
        assert_eq!(second.departure, hms(9, 30));

        assert_eq!(points[1].leg_duration, Some(Duration::from_secs(3600)));
        assert_eq!(points[1].leg_distance_m, Some(1000.0));
        assert_eq!(provider.drawn_routes().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn single_waypoint_fails_validation_without_mutation() {
        let mut provider = ScriptedProvider::new();
        let mut points = vec![located(1, 0.0, 0)];
        points[0].window = Some(crate::waypoint::TimeWindow {
            arrival: hms(8, 0),
            departure: hms(8, 0),
        });

        let calculator = RouteSegmentCalculator::new();
        let err = calculator
            .recalculate(&mut provider, Some(hms(7, 30)), &mut points)
            .await
            .expect_err("one waypoint cannot be routed");

        assert_eq!(
            err,
            RecalculateError::Validation(PlanValidationError::InsufficientWaypoints {
                found: 1,
                required: 2,
            })
        );
        // Prior state untouched, nothing drawn.
        assert!(points[0].window.is_some());
        assert!(provider.drawn_routes().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_start_time_fails_before_routing() {
        let mut provider = ScriptedProvider::new();
        let mut points = vec![located(1, 0.0, 0), located(2, 1.0, 0)];

        let calculator = RouteSegmentCalculator::new();
        let err = calculator
            .recalculate(&mut provider, None, &mut points)
            .await
            .expect_err("start time is required");

        assert_eq!(
            err,
            RecalculateError::Validation(PlanValidationError::MissingStartTime)
        );
        assert!(provider.drawn_routes().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unlocated_waypoints_are_skipped() {
        let mut provider = ScriptedProvider::new();
        provider.push_drive(Ok(leg(600)));

        let mut points = vec![
            located(1, 0.0, 0),
            Waypoint::new(2, WaypointKind::Meal), // never located
            located(3, 2.0, 0),
        ];
        let calculator = RouteSegmentCalculator::new();
        let segments = calculator
            .recalculate(&mut provider, Some(hms(9, 0)), &mut points)
            .await
            .expect("two located waypoints");

        assert_eq!(segments.len(), 1);
        assert!(points[1].window.is_none());
        assert!(points[2].window.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn rail_waypoint_keeps_user_travel_time() {
        let mut provider = ScriptedProvider::new();
        let mut points = vec![located(1, 0.0, 0), located(2, 1.0, 0)];
        points[1].mode = TravelMode::Rail;
        points[1].leg_duration = Some(Duration::from_secs(7200));

        let calculator = RouteSegmentCalculator::new();
        let segments = calculator
            .recalculate(&mut provider, Some(hms(7, 0)), &mut points)
            .await
            .expect("valid plan");

        assert_eq!(segments[0].duration, Duration::from_secs(7200));
        assert_eq!(segments[0].distance_m, 0.0);
        assert_eq!(points[1].leg_duration, Some(Duration::from_secs(7200)));
        assert_eq!(points[1].leg_distance_m, Some(0.0));
        let window = points[1].window.expect("window set");
        assert_eq!(window.arrival, hms(9, 0));
    }
}
