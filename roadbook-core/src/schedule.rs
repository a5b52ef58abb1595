//! Arrival/departure schedule propagation.
//!
//! The engine folds segment durations and per-waypoint stay times into a
//! window per waypoint, starting from the plan's start time. It is pure:
//! the same inputs always yield the same windows, and it never touches
//! waypoint state itself — callers assign the returned windows.

use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;

use crate::waypoint::TimeWindow;

/// One step of the schedule fold: the leg arriving at a waypoint and the
/// stay at that waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleLeg {
    /// Travel time of the incoming segment.
    pub travel: Duration,
    /// Stay duration at the waypoint the segment arrives at.
    pub stay: Duration,
}

/// Errors returned by [`TimePropagationEngine::propagate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The plan has no start time; the caller must set one and re-request.
    #[error("missing start time")]
    MissingStartTime,
}

/// Pure schedule calculator.
///
/// The origin waypoint receives no window; `legs[i]` describes the segment
/// arriving at waypoint `i + 1` and the stay there, so the returned vector
/// holds one window per non-origin waypoint.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::NaiveTime;
/// use roadbook_core::{ScheduleLeg, TimePropagationEngine};
///
/// let engine = TimePropagationEngine::new();
/// let legs = [ScheduleLeg {
///     travel: Duration::from_secs(3600),
///     stay: Duration::from_secs(1800),
/// }];
/// let start = NaiveTime::from_hms_opt(7, 30, 0);
/// let windows = engine.propagate(start, &legs).unwrap();
/// assert_eq!(windows[0].arrival, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
/// assert_eq!(windows[0].departure, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TimePropagationEngine;

impl TimePropagationEngine {
    /// Construct the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Fold `legs` into arrival/departure windows from `start_time`.
    ///
    /// Fails with [`ScheduleError::MissingStartTime`] when no start time is
    /// set, producing no windows at all.
    pub fn propagate(
        &self,
        start_time: Option<NaiveTime>,
        legs: &[ScheduleLeg],
    ) -> Result<Vec<TimeWindow>, ScheduleError> {
        let start = start_time.ok_or(ScheduleError::MissingStartTime)?;

        let mut elapsed = Duration::ZERO;
        let mut windows = Vec::with_capacity(legs.len());
        for leg in legs {
            elapsed += leg.travel;
            let arrival = clock_offset(start, elapsed);
            elapsed += leg.stay;
            let departure = clock_offset(start, elapsed);
            windows.push(TimeWindow { arrival, departure });
        }
        Ok(windows)
    }
}

/// Add an elapsed duration to a time of day.
///
/// `NaiveTime` arithmetic wraps at midnight, so the elapsed time is reduced
/// modulo one day first; itineraries that run past midnight wrap with it.
fn clock_offset(start: NaiveTime, elapsed: Duration) -> NaiveTime {
    let secs = i64::try_from(elapsed.as_secs() % 86_400).unwrap_or(0);
    start
        .overflowing_add_signed(chrono::Duration::seconds(secs))
        .0
}
