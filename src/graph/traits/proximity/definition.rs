use crate::graph::{Projection, RoadSegment};

use geo::Point;

/// The spatial index over the segments of the network.
///
/// All implementations are read-only, and may be queried concurrently.
pub trait Scan {
    /// Returns every segment with any portion within `radius` meters of the `point`,
    /// deduplicated by segment identifier. The ordering of the result is unspecified.
    ///
    /// A query outside of the covered area yields an empty result.
    fn query<'a>(&'a self, point: &Point, radius: f64) -> Vec<&'a RoadSegment>;

    /// Returns each segment within `radius` meters of the `point`, alongside the
    /// [`Projection`] of the point onto the closest position on that segment.
    ///
    /// ### Note
    /// This is a square-scan over the bounding boxes of every segment line,
    /// followed by a precise filter on the projected haversine distance.
    /// Therefore, every projection returned lies within `radius` of the `point`.
    fn query_projected<'a>(
        &'a self,
        point: &Point,
        radius: f64,
    ) -> Vec<(Projection, &'a RoadSegment)>;

    /// Searches for the segment nearest to the `point`, without any distance bound.
    /// This segment may not exist (an empty network), and therefore the return type is optional.
    fn nearest<'a>(&'a self, point: &Point) -> Option<(Projection, &'a RoadSegment)>;
}
