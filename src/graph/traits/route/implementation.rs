use crate::graph::primitives::{Cost, Dijkstra};
use crate::graph::traits::route::definition::{NetworkPath, Position, Route, Traversal};
use crate::graph::{Graph, NodeId, RoadSegment, SegmentId};

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

#[cfg(feature = "tracing")]
use tracing::Level;

#[inline]
fn centimeters(meters: f64) -> Cost {
    (meters.max(0.0) * 100.0).round() as Cost
}

/// Leaving a position onto a junction at one end of its segment.
#[derive(Clone, Copy, Debug)]
struct Departure {
    node: NodeId,
    cost: Cost,
    traversal: Traversal,
}

/// Arriving at a position from a junction at one end of its segment.
#[derive(Clone, Copy, Debug)]
struct Arrival {
    node: NodeId,
    length: f64,
    traversal: Traversal,
}

fn departures(segment: &RoadSegment, offset: f64) -> SmallVec<[Departure; 2]> {
    let (id, length) = (segment.id(), segment.length());
    let offset = offset.clamp(0.0, length);

    let mut departures = smallvec![Departure {
        node: segment.target(),
        cost: centimeters(length - offset),
        traversal: Traversal {
            segment: id,
            from: offset,
            to: length,
        },
    }];

    if !segment.one_way() {
        departures.push(Departure {
            node: segment.source(),
            cost: centimeters(offset),
            traversal: Traversal {
                segment: id,
                from: offset,
                to: 0.0,
            },
        });
    }

    departures
}

fn arrivals(segment: &RoadSegment, offset: f64) -> SmallVec<[Arrival; 2]> {
    let (id, length) = (segment.id(), segment.length());
    let offset = offset.clamp(0.0, length);

    let mut arrivals = smallvec![Arrival {
        node: segment.source(),
        length: offset,
        traversal: Traversal {
            segment: id,
            from: 0.0,
            to: offset,
        },
    }];

    if !segment.one_way() {
        arrivals.push(Arrival {
            node: segment.target(),
            length: length - offset,
            traversal: Traversal {
                segment: id,
                from: length,
                to: offset,
            },
        });
    }

    arrivals
}

/// The best way found to reach a single target.
enum Resolution {
    /// Along the shared segment, without passing a junction.
    Direct(f64),
    /// Through the network, arriving via the given junction.
    Network(f64, Arrival),
}

impl Resolution {
    fn length(&self) -> f64 {
        match self {
            Resolution::Direct(length) | Resolution::Network(length, _) => *length,
        }
    }
}

impl Graph {
    /// Converts a junction path, as recovered from the search, into the traversals
    /// it makes. The path begins at a junction reached by one of the `departures`.
    fn traversals(
        &self,
        departures: &[Departure],
        path: &[(NodeId, Option<SegmentId>)],
        arrival: &Arrival,
    ) -> Option<NetworkPath> {
        let (start, _) = path.first()?;
        let departure = departures
            .iter()
            .filter(|departure| departure.node == *start)
            .min_by_key(|departure| departure.cost)?;

        let mut traversals = vec![departure.traversal];

        for pair in path.windows(2) {
            let [(previous, _), (node, Some(label))] = pair else {
                continue;
            };

            let segment = self.segment(label)?;
            let forward = segment.source() == *previous && segment.target() == *node;

            traversals.push(match forward {
                true => Traversal {
                    segment: *label,
                    from: 0.0,
                    to: segment.length(),
                },
                false => Traversal {
                    segment: *label,
                    from: segment.length(),
                    to: 0.0,
                },
            });
        }

        traversals.push(arrival.traversal);
        Some(NetworkPath::new(traversals))
    }
}

impl Route for Graph {
    fn route_between(
        &self,
        source: &Position,
        target: &Position,
        bound: f64,
    ) -> Option<NetworkPath> {
        self.route_many(source, std::slice::from_ref(target), bound)
            .into_iter()
            .next()
            .flatten()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::DEBUG, skip(self, targets)))]
    fn route_many(
        &self,
        source: &Position,
        targets: &[Position],
        bound: f64,
    ) -> Vec<Option<NetworkPath>> {
        let Some(origin) = self.segment(&source.segment) else {
            return vec![None; targets.len()];
        };

        let departures = departures(origin, source.offset);
        let arrivals = targets
            .iter()
            .map(|target| {
                self.segment(&target.segment)
                    .map(|segment| arrivals(segment, target.offset))
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        let mut remaining = arrivals
            .iter()
            .flatten()
            .map(|arrival| arrival.node)
            .collect::<FxHashSet<_>>();

        let limit = centimeters(bound);
        let mut reach = Dijkstra.reach(
            departures
                .iter()
                .map(|departure| (departure.node, departure.cost)),
            |node: &NodeId| {
                self.successors(*node)
                    .map(|(next, segment)| (next, centimeters(segment.length()), segment.id()))
            },
        );

        // Settle junctions in order of distance, until every junction a target
        // can be arrived from is settled, or the bound is exceeded.
        let mut settled = FxHashMap::default();
        for item in reach.by_ref() {
            if item.total_cost > limit {
                break;
            }

            remaining.remove(&item.node);
            settled.insert(item.node, item.total_cost);

            if remaining.is_empty() {
                break;
            }
        }

        trace!(
            "Settled {} junctions routing from {}@{:.1}",
            settled.len(),
            source.segment,
            source.offset
        );

        targets
            .iter()
            .zip(arrivals.iter())
            .map(|(target, arrivals)| {
                let mut options: SmallVec<[Resolution; 3]> = SmallVec::new();

                if target.segment == source.segment {
                    let ahead = target.offset >= source.offset;
                    if ahead || !origin.one_way() {
                        options.push(Resolution::Direct((target.offset - source.offset).abs()));
                    }
                }

                options.extend(arrivals.iter().filter_map(|arrival| {
                    let cost = settled.get(&arrival.node)?;
                    Some(Resolution::Network(
                        *cost as f64 / 100.0 + arrival.length,
                        *arrival,
                    ))
                }));

                let best = options
                    .into_iter()
                    .filter(|option| option.length() <= bound)
                    .min_by(|a, b| a.length().total_cmp(&b.length()))?;

                match best {
                    Resolution::Direct(_) => Some(NetworkPath::new(vec![Traversal {
                        segment: source.segment,
                        from: source.offset.clamp(0.0, origin.length()),
                        to: target.offset.clamp(0.0, origin.length()),
                    }])),
                    Resolution::Network(_, arrival) => {
                        let path = reach.path(&arrival.node)?;
                        self.traversals(&departures, &path, &arrival)
                    }
                }
            })
            .collect()
    }
}
