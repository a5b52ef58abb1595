//! Remote persistence boundary for day-plan records.
//!
//! Day plans live in a remote CRUD service keyed by `(road_id, day_index)`.
//! The payload is the codec's opaque blob plus scalar metadata; this module
//! never interprets the blob beyond handing it to [`crate::codec`].

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec;
use crate::plan::DayPlan;
use crate::waypoint::Waypoint;

/// Save/load against the remote API failed.
///
/// Surfaced to the user by default; the editor session stays open so the
/// in-memory edits survive and the operation can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The service could not be reached.
    #[error("plan store unavailable: {0}")]
    Unavailable(String),
    /// The service refused the request.
    #[error("plan store rejected the request: {0}")]
    Rejected(String),
}

/// One persisted day-plan row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Identifier of the road trip the day belongs to.
    pub road_id: u64,
    /// Zero-based day within the trip.
    pub day_index: u16,
    /// Display title.
    pub title: String,
    /// Free-form remark.
    pub remark: String,
    /// Start time of the itinerary.
    pub start_time: Option<NaiveTime>,
    /// Opaque codec blob of `{points, routes}`.
    pub blob: Vec<u8>,
}

/// Remote CRUD access to day-plan records.
#[async_trait(?Send)]
pub trait PlanStore {
    /// Fetch the record for `(road_id, day_index)`, if one exists.
    async fn load(
        &self,
        road_id: u64,
        day_index: u16,
    ) -> Result<Option<PlanRecord>, PersistenceError>;

    /// Create or update a record.
    async fn save(&self, record: &PlanRecord) -> Result<(), PersistenceError>;

    /// Delete the record for `(road_id, day_index)`.
    async fn delete(&self, road_id: u64, day_index: u16) -> Result<(), PersistenceError>;
}

/// Load the plan for a day, seeding a fresh one when no record exists.
///
/// A malformed blob opens as an empty plan with a logged warning rather
/// than failing the call. When the day has no record yet and a previous day
/// exists, its final waypoint is copied (computed state cleared) as the new
/// day's starting point.
pub async fn open_day(
    plans: &dyn PlanStore,
    road_id: u64,
    day_index: u16,
) -> Result<DayPlan, PersistenceError> {
    if let Some(record) = plans.load(road_id, day_index).await? {
        let decoded = codec::decode(&record.blob);
        if let Some(warning) = &decoded.warning {
            log::warn!("road {road_id} day {day_index}: {warning}; opening empty plan");
        }
        return Ok(DayPlan::from_parts(
            record.title,
            record.remark,
            record.start_time,
            decoded.body,
        ));
    }

    let mut plan = DayPlan::default();
    if let Some(start) = carried_over_start(plans, road_id, day_index).await {
        plan.points.push(start);
    }
    Ok(plan)
}

/// Copy of the previous day's last waypoint, when one can be fetched.
///
/// This is a convenience, not a requirement: any failure along the way
/// degrades to an empty seed with a logged warning.
async fn carried_over_start(
    plans: &dyn PlanStore,
    road_id: u64,
    day_index: u16,
) -> Option<Waypoint> {
    let previous = day_index.checked_sub(1)?;
    let record = match plans.load(road_id, previous).await {
        Ok(record) => record?,
        Err(err) => {
            log::warn!("road {road_id} day {previous}: {err}; seeding without carry-over");
            return None;
        }
    };
    let decoded = codec::decode(&record.blob);
    let mut start = decoded.body.points.last().cloned()?;
    start.clear_computed();
    Some(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::plan::PlanBody;
    use crate::test_support::MemoryPlanStore;
    use crate::waypoint::WaypointKind;
    use geo::Coord;
    use rstest::rstest;

    fn record_with_points(road_id: u64, day_index: u16, points: Vec<Waypoint>) -> PlanRecord {
        let body = PlanBody {
            points,
            routes: Vec::new(),
        };
        PlanRecord {
            road_id,
            day_index,
            title: format!("day {day_index}"),
            remark: String::new(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            blob: encode(&body).expect("encodable body"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn opens_an_existing_record() {
        let store = MemoryPlanStore::new();
        let mut point = Waypoint::new(1, WaypointKind::Lodging);
        point.address = "hotel".into();
        store.seed(record_with_points(7, 0, vec![point]));

        let plan = open_day(&store, 7, 0).await.expect("store reachable");
        assert_eq!(plan.title, "day 0");
        assert_eq!(plan.points.len(), 1);
        assert_eq!(plan.points[0].address, "hotel");
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_blob_opens_as_empty_plan() {
        let store = MemoryPlanStore::new();
        let mut record = record_with_points(7, 0, vec![Waypoint::new(1, WaypointKind::Sight)]);
        record.blob = b"{broken".to_vec();
        store.seed(record);

        let plan = open_day(&store, 7, 0).await.expect("store reachable");
        assert!(plan.points.is_empty());
        assert_eq!(plan.title, "day 0");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_first_day_seeds_empty() {
        let store = MemoryPlanStore::new();
        let plan = open_day(&store, 7, 0).await.expect("store reachable");
        assert!(plan.points.is_empty());
        assert!(plan.start_time.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_day_copies_previous_days_last_waypoint() {
        let store = MemoryPlanStore::new();
        let mut last = Waypoint::new(3, WaypointKind::Lodging);
        last.location = Some(Coord { x: 120.1, y: 30.2 });
        last.address = "lakeside hotel".into();
        last.leg_distance_m = Some(5000.0);
        store.seed(record_with_points(
            7,
            0,
            vec![Waypoint::new(1, WaypointKind::Transit), last],
        ));

        let plan = open_day(&store, 7, 1).await.expect("store reachable");
        assert_eq!(plan.points.len(), 1);
        let start = &plan.points[0];
        assert_eq!(start.address, "lakeside hotel");
        assert_eq!(start.location, Some(Coord { x: 120.1, y: 30.2 }));
        // Computed state does not carry over into the new day.
        assert!(start.leg_distance_m.is_none());
        assert!(start.window.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_store_surfaces_the_error() {
        let store = MemoryPlanStore::new();
        store.fail_loads(true);
        let err = open_day(&store, 7, 0).await.expect_err("store down");
        assert!(matches!(err, PersistenceError::Unavailable(_)));
    }
}
