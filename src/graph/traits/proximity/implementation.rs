use crate::graph::{Graph, Projection, RoadSegment, Scan, SegmentId};

use geo::{Destination, Geodesic, Point};
use rstar::AABB;
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;

#[cfg(feature = "tracing")]
use tracing::Level;

/// The envelopes covering the square which circumscribes the search circle.
///
/// Where the square crosses the antimeridian its corner longitudes wrap
/// around, so it is covered by one envelope on either side instead.
pub(crate) fn envelopes(point: &Point, radius: f64) -> SmallVec<[AABB<[f64; 2]>; 2]> {
    let bottom_right = Geodesic.destination(*point, 135.0, radius * SQRT_2);
    let top_left = Geodesic.destination(*point, 315.0, radius * SQRT_2);

    let (west, east) = (top_left.x(), bottom_right.x());
    let (north, south) = (top_left.y(), bottom_right.y());

    if west <= east {
        return smallvec![AABB::from_corners([west, north], [east, south])];
    }

    smallvec![
        AABB::from_corners([west, north], [180.0, south]),
        AABB::from_corners([-180.0, north], [east, south]),
    ]
}

impl Scan for Graph {
    #[inline]
    fn query<'a>(&'a self, point: &Point, radius: f64) -> Vec<&'a RoadSegment> {
        self.query_projected(point, radius)
            .into_iter()
            .map(|(_, segment)| segment)
            .collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip(self)))]
    fn query_projected<'a>(
        &'a self,
        point: &Point,
        radius: f64,
    ) -> Vec<(Projection, &'a RoadSegment)> {
        if !radius.is_finite() || radius < 0.0 {
            return vec![];
        }

        // A segment is indexed once per line, so many pieces may share a segment.
        let segments = envelopes(point, radius)
            .iter()
            .flat_map(|bbox| self.index().locate_in_envelope_intersecting(bbox))
            .map(|piece| piece.segment)
            .collect::<BTreeSet<SegmentId>>();

        segments
            .into_iter()
            .filter_map(|id| self.segment(&id))
            .map(|segment| (segment.project(point), segment))
            .filter(|(projection, _)| projection.distance <= radius)
            .collect()
    }

    fn nearest<'a>(&'a self, point: &Point) -> Option<(Projection, &'a RoadSegment)> {
        let piece = self.index().nearest_neighbor(&[point.x(), point.y()])?;
        let segment = self.segment(&piece.segment)?;

        Some((segment.project(point), segment))
    }
}
