//! Synthetic road networks and traces, used by tests and benchmarks.
//!
//! Every network is laid out in meters relative to [`origin`], so the
//! expected distances of a scenario can be read straight from its layout.

use crate::geo::{Coordinate, GeoError, Trace};
use crate::graph::{Graph, GraphError, NodeId, RoadSegment, SegmentId, WayId};

use chrono::{DateTime, Duration, Utc};
use geo::{Destination, Haversine, LineString, Point};

/// Sydney CBD.
pub fn origin() -> Point {
    Point::new(151.2093, -33.8688)
}

/// The position `east` and `north` meters from `from`.
/// Negative distances move west and south respectively.
pub fn offset(from: Point, east: f64, north: f64) -> Point {
    let bearing = if east < 0.0 { 270.0 } else { 90.0 };
    let across = Haversine.destination(from, bearing, east.abs());

    let bearing = if north < 0.0 { 180.0 } else { 0.0 };
    Haversine.destination(across, bearing, north.abs())
}

/// The position `east` and `north` meters from the [`origin`].
pub fn at(east: f64, north: f64) -> Point {
    offset(origin(), east, north)
}

pub fn road(
    id: u64,
    (source, target): (u64, u64),
    points: Vec<Point>,
    one_way: bool,
) -> Result<RoadSegment, GraphError> {
    RoadSegment::new(
        SegmentId(id),
        WayId(id),
        (NodeId(source), NodeId(target)),
        points.into_iter().collect::<LineString>(),
        one_way,
    )
}

/// A single, bidirectional 1km road running east from the origin,
/// with a vertex every 250m.
pub fn straight_road() -> Result<Graph, GraphError> {
    let vertices = (0..=4).map(|i| at(i as f64 * 250.0, 0.0)).collect();
    Graph::from_segments([road(1, (1, 2), vertices, false)?])
}

/// A `size` x `size` lattice of junctions `spacing` meters apart, joined
/// by bidirectional roads. Junction `(row, col)` has the identifier
/// `row * size + col + 1`, and lies `col * spacing` east and `row * spacing`
/// north of the origin.
pub fn grid(size: usize, spacing: f64) -> Result<Graph, GraphError> {
    let node = |row: usize, col: usize| (row * size + col + 1) as u64;
    let position = |row: usize, col: usize| at(col as f64 * spacing, row as f64 * spacing);

    let mut segments = vec![];
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                let id = segments.len() as u64 + 1;
                segments.push(road(
                    id,
                    (node(row, col), node(row, col + 1)),
                    vec![position(row, col), position(row, col + 1)],
                    false,
                )?);
            }

            if row + 1 < size {
                let id = segments.len() as u64 + 1;
                segments.push(road(
                    id,
                    (node(row, col), node(row + 1, col)),
                    vec![position(row, col), position(row + 1, col)],
                    false,
                )?);
            }
        }
    }

    Graph::from_segments(segments)
}

/// A square of one-way roads with sides of `side` meters, travelling
/// anticlockwise: east along the bottom (segment 1), north up the right
/// (segment 2), west along the top (segment 3) and south down the left (segment 4).
pub fn one_way_loop(side: f64) -> Result<Graph, GraphError> {
    let corners = [at(0.0, 0.0), at(side, 0.0), at(side, side), at(0.0, side)];

    let segments = (0..4)
        .map(|i| {
            let next = (i + 1) % 4;
            road(
                i as u64 + 1,
                (i as u64 + 1, next as u64 + 1),
                vec![corners[i], corners[next]],
                true,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Graph::from_segments(segments)
}

/// Two disconnected 1km roads running east, the second lying
/// `separation` meters north of the first.
pub fn islands(separation: f64) -> Result<Graph, GraphError> {
    Graph::from_segments([
        road(1, (1, 2), vec![at(0.0, 0.0), at(1000.0, 0.0)], false)?,
        road(
            2,
            (3, 4),
            vec![at(0.0, separation), at(1000.0, separation)],
            false,
        )?,
    ])
}

/// A fixed reference instant, so traces are reproducible.
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// A trace visiting each of the `points`, observed `interval` apart.
pub fn trace(points: &[Point], interval: Duration) -> Result<Trace, GeoError> {
    let coordinates = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            Coordinate::from(*point).with_timestamp(epoch() + interval * index as i32)
        })
        .collect();

    Trace::new(coordinates)
}
