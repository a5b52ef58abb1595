//! Pairwise segment planning shared by both vendor adapters.

use std::future::Future;

use futures_util::future::join_all;
use geo::Coord;

use crate::plan::RouteSegment;

use super::error::{DriveRoutingError, RoutePlanError};
use super::{RouteNode, RoutedLeg};

/// Plan the segments between consecutive nodes.
///
/// For each pair `(i − 1, i)`:
/// - a drive leg invokes `drive` with the two coordinates; a failure is
///   contained to that segment, which degrades to an empty zero-length,
///   zero-duration placeholder;
/// - a rail or flight leg never touches the routing service and becomes a
///   two-point straight segment whose duration is the user-supplied travel
///   time of node `i` and whose distance is zero.
///
/// The per-pair calculations are independent and issued concurrently;
/// results are reassembled in index order regardless of completion order.
/// The first node never produces a segment.
pub async fn plan_segments<F, Fut>(
    nodes: &[RouteNode],
    drive: F,
) -> Result<Vec<RouteSegment>, RoutePlanError>
where
    F: Fn(Coord<f64>, Coord<f64>) -> Fut,
    Fut: Future<Output = Result<RoutedLeg, DriveRoutingError>>,
{
    if nodes.len() < 2 {
        return Err(RoutePlanError::NotEnoughNodes);
    }

    let drive = &drive;
    let pending = (1..nodes.len()).map(|to_index| {
        let from = nodes[to_index - 1];
        let to = nodes[to_index];
        async move {
            if !to.mode.is_routed() {
                return RouteSegment::straight(
                    to_index - 1,
                    to_index,
                    from.location,
                    to.location,
                    to.mode,
                    to.travel_time,
                );
            }
            match drive(from.location, to.location).await {
                Ok(leg) => RouteSegment {
                    from_index: to_index - 1,
                    to_index,
                    path: leg.path,
                    distance_m: leg.distance_m,
                    duration: leg.duration,
                    mode: to.mode,
                },
                Err(err) => {
                    log::warn!("routing segment {to_index} failed: {err}; using empty placeholder");
                    RouteSegment::placeholder(to_index - 1, to_index, to.mode)
                }
            }
        }
    });

    Ok(join_all(pending).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::TravelMode;
    use rstest::rstest;
    use std::time::Duration;

    fn node(x: f64, mode: TravelMode, travel_secs: u64) -> RouteNode {
        RouteNode {
            location: Coord { x, y: 0.0 },
            mode,
            travel_time: Duration::from_secs(travel_secs),
        }
    }

    async fn unit_drive(from: Coord<f64>, to: Coord<f64>) -> Result<RoutedLeg, DriveRoutingError> {
        Ok(RoutedLeg {
            path: vec![from, to],
            distance_m: 1000.0,
            duration: Duration::from_secs(600),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn produces_one_segment_per_consecutive_pair() {
        let nodes = vec![
            node(0.0, TravelMode::Drive, 0),
            node(1.0, TravelMode::Drive, 0),
            node(2.0, TravelMode::Drive, 0),
            node(3.0, TravelMode::Drive, 0),
        ];
        let segments = plan_segments(&nodes, unit_drive).await.expect("enough nodes");

        assert_eq!(segments.len(), nodes.len() - 1);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.from_index, i);
            assert_eq!(segment.to_index, i + 1);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn single_node_is_rejected_without_segments() {
        let nodes = vec![node(0.0, TravelMode::Drive, 0)];
        let err = plan_segments(&nodes, unit_drive)
            .await
            .expect_err("one node cannot be routed");
        assert_eq!(err, RoutePlanError::NotEnoughNodes);
    }

    #[rstest]
    #[tokio::test]
    async fn rail_leg_is_synthesized_without_routing() {
        let nodes = vec![node(0.0, TravelMode::Drive, 0), node(1.0, TravelMode::Rail, 7200)];
        let segments = plan_segments(&nodes, |_, _| async {
            Err(DriveRoutingError::new("routing service must not be called"))
        })
        .await
        .expect("enough nodes");

        let segment = &segments[0];
        assert_eq!(segment.path.len(), 2);
        assert_eq!(segment.distance_m, 0.0);
        assert_eq!(segment.duration, Duration::from_secs(7200));
        assert_eq!(segment.mode, TravelMode::Rail);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_drive_leg_degrades_to_placeholder_only() {
        let nodes = vec![
            node(0.0, TravelMode::Drive, 0),
            node(1.0, TravelMode::Drive, 0),
            node(2.0, TravelMode::Drive, 0),
        ];
        // Fail only the first pair; the second must still route.
        let segments = plan_segments(&nodes, |from, to| async move {
            if from.x == 0.0 {
                Err(DriveRoutingError::new("no road data"))
            } else {
                unit_drive(from, to).await
            }
        })
        .await
        .expect("enough nodes");

        assert_eq!(segments[0], RouteSegment::placeholder(0, 1, TravelMode::Drive));
        assert_eq!(segments[1].distance_m, 1000.0);
        assert_eq!(segments[1].duration, Duration::from_secs(600));
    }

    #[rstest]
    #[tokio::test]
    async fn drive_leg_takes_vendor_path_and_figures() {
        let nodes = vec![node(0.0, TravelMode::Drive, 0), node(1.0, TravelMode::Drive, 0)];
        let segments = plan_segments(&nodes, unit_drive).await.expect("enough nodes");

        assert_eq!(segments[0].path, vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }]);
        assert_eq!(segments[0].distance_m, 1000.0);
    }
}
