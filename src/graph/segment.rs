use crate::graph::GraphError;

use geo::{Coord, Distance, Haversine, Line, LineLocatePoint, LineString, Point};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub const fn identifier(&self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(
    /// Identifies a [`RoadSegment`] within the network.
    SegmentId
);
identifier!(
    /// Identifies the way (road) a [`RoadSegment`] belongs to. Many segments share a way.
    WayId
);
identifier!(
    /// Identifies a junction node, shared by the segments which meet there.
    NodeId
);

/// A single segment of road within the network.
///
/// Every segment is a polyline running from its `source` junction to its
/// `target` junction. Segments which are not one-way may be traversed in
/// either direction. Offsets along a segment are measured in meters from
/// the first vertex of its geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadSegment {
    pub(crate) id: SegmentId,
    pub(crate) way: WayId,

    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) one_way: bool,

    pub(crate) geometry: LineString,

    /// Cumulative haversine distance (meters) at each vertex of `geometry`.
    cumulative: Vec<f64>,
}

/// The projection of a position onto a [`RoadSegment`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// The closest position upon the segment.
    pub position: Point,

    /// Distance along the segment, in meters, at which the position lies.
    pub offset: f64,

    /// Distance between the projected position and the source position, in meters.
    pub distance: f64,
}

impl RoadSegment {
    pub fn new(
        id: SegmentId,
        way: WayId,
        (source, target): (NodeId, NodeId),
        geometry: LineString,
        one_way: bool,
    ) -> Result<Self, GraphError> {
        if geometry.0.len() < 2 {
            return Err(GraphError::InvalidSegment {
                id,
                reason: format!("geometry requires 2 or more vertices, found {}", geometry.0.len()),
            });
        }

        if let Some(invalid) = geometry.0.iter().find(|c| {
            !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y)
        }) {
            return Err(GraphError::InvalidSegment {
                id,
                reason: format!("vertex ({}, {}) is not a valid position", invalid.x, invalid.y),
            });
        }

        let cumulative = geometry
            .lines()
            .scan(0.0, |length, line| {
                *length += Haversine.distance(line.start_point(), line.end_point());
                Some(*length)
            })
            .fold(vec![0.0], |mut acc, length| {
                acc.push(length);
                acc
            });

        Ok(RoadSegment {
            id,
            way,
            source,
            target,
            one_way,
            geometry,
            cumulative,
        })
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    pub fn way(&self) -> WayId {
        self.way
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    #[inline]
    pub fn one_way(&self) -> bool {
        self.one_way
    }

    pub fn geometry(&self) -> &LineString {
        &self.geometry
    }

    /// The length of the segment in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or_default()
    }

    /// The individual lines making up the polyline of the segment.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = Line> + '_ {
        self.geometry.lines()
    }

    /// Projects the `point` onto the closest position upon the segment.
    ///
    /// The closest position is located on each line of the polyline,
    /// and the line yielding the smallest haversine distance is chosen.
    pub fn project(&self, point: &Point) -> Projection {
        self.lines()
            .enumerate()
            .map(|(index, line)| {
                // We locate the point upon the line, and then
                // project that fraction upon the line to obtain a point
                let fraction = line
                    .line_locate_point(point)
                    .filter(|frac| frac.is_finite())
                    .unwrap_or(0.0)
                    .clamp(0.0, 1.0);

                let position = Point(interpolate(&line, fraction));
                let offset = self.cumulative[index] + Haversine.distance(line.start_point(), position);

                Projection {
                    position,
                    offset: offset.min(self.length()),
                    distance: Haversine.distance(position, *point),
                }
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap_or_else(|| Projection {
                position: self.geometry.points().next().unwrap_or(*point),
                offset: 0.0,
                distance: f64::INFINITY,
            })
    }

    /// Index of the line which holds the given `offset`.
    fn line_at(&self, offset: f64) -> usize {
        let lines = self.cumulative.len().saturating_sub(1);

        self.cumulative
            .partition_point(|length| *length <= offset)
            .saturating_sub(1)
            .min(lines.saturating_sub(1))
    }

    /// The position at the given `offset` (meters) along the segment.
    /// Offsets are clamped to the extent of the segment.
    pub fn point_at(&self, offset: f64) -> Point {
        let offset = offset.clamp(0.0, self.length());
        let index = self.line_at(offset);

        let line = Line::new(self.geometry.0[index], self.geometry.0[index + 1]);
        let span = self.cumulative[index + 1] - self.cumulative[index];

        let fraction = if span > 0.0 {
            (offset - self.cumulative[index]) / span
        } else {
            0.0
        };

        Point(interpolate(&line, fraction.clamp(0.0, 1.0)))
    }

    /// The portion of the segment's geometry between two offsets, inclusive
    /// of the interpolated end positions. If `from` is greater than `to`,
    /// the coordinates are given in reverse (travelling against the geometry).
    pub fn slice(&self, from: f64, to: f64) -> Vec<Coord> {
        if from > to {
            let mut reversed = self.slice(to, from);
            reversed.reverse();
            return reversed;
        }

        let (from, to) = (from.clamp(0.0, self.length()), to.clamp(0.0, self.length()));

        let inner = self
            .cumulative
            .iter()
            .zip(self.geometry.0.iter())
            .filter(|(length, _)| **length > from && **length < to)
            .map(|(_, coord)| *coord);

        std::iter::once(self.point_at(from).0)
            .chain(inner)
            .chain(std::iter::once(self.point_at(to).0))
            .collect()
    }
}

#[inline]
fn interpolate(line: &Line, fraction: f64) -> Coord {
    line.start + (line.end - line.start) * fraction
}
