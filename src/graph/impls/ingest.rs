use crate::graph::item::SegmentPiece;
use crate::graph::{Graph, GraphError, GraphStructure, NodeId, RoadSegment, SegmentId, WayId};

use geo::{coord, LineString};
use log::{debug, info};
use measure_time::debug_time;
use rayon::prelude::*;
use rstar::RTree;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A static road-network dataset, as loaded at startup.
///
/// ```json
/// { "segments": [{ "id": 1, "way": 10, "source": 100, "target": 101,
///                  "oneWay": false, "geometry": [[151.2093, -33.8688], [151.2104, -33.8688]] }] }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NetworkData {
    pub segments: Vec<SegmentData>,
}

/// A single segment within a [`NetworkData`] dataset.
/// Geometry vertices are given in `[lng, lat]` order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentData {
    pub id: SegmentId,
    pub way: WayId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub one_way: bool,
    pub geometry: Vec<[f64; 2]>,
}

impl TryFrom<SegmentData> for RoadSegment {
    type Error = GraphError;

    fn try_from(data: SegmentData) -> Result<Self, Self::Error> {
        let geometry = data
            .geometry
            .into_iter()
            .map(|[x, y]| coord! { x: x, y: y })
            .collect::<LineString>();

        RoadSegment::new(
            data.id,
            data.way,
            (data.source, data.target),
            geometry,
            data.one_way,
        )
    }
}

impl From<&RoadSegment> for SegmentData {
    fn from(segment: &RoadSegment) -> Self {
        SegmentData {
            id: segment.id(),
            way: segment.way(),
            source: segment.source(),
            target: segment.target(),
            one_way: segment.one_way(),
            geometry: segment.geometry().coords().map(|c| [c.x, c.y]).collect(),
        }
    }
}

impl Graph {
    /// Builds the network from its segments.
    ///
    /// Segments are connected wherever they share a junction [`NodeId`].
    /// Segments which are not one-way are connected in both directions.
    pub fn from_segments(
        segments: impl IntoIterator<Item = RoadSegment>,
    ) -> Result<Graph, GraphError> {
        debug_time!("graph construction");

        let mut graph = GraphStructure::new();
        let mut lookup = FxHashMap::default();

        for segment in segments {
            let id = segment.id();

            let mut connect = |from: NodeId, to: NodeId| match graph.edge_weight_mut(from, to) {
                Some(connections) => connections.push(id),
                None => {
                    graph.add_edge(from, to, smallvec![id]);
                }
            };

            connect(segment.source(), segment.target());
            if !segment.one_way() {
                connect(segment.target(), segment.source());
            }

            if lookup.insert(id, segment).is_some() {
                return Err(GraphError::DuplicateSegment(id));
            }
        }

        let pieces = {
            debug_time!("index pieces");

            lookup
                .par_iter()
                .flat_map_iter(|(id, segment)| {
                    segment.lines().map(move |line| SegmentPiece::new(*id, line))
                })
                .collect::<Vec<_>>()
        };

        debug!("Indexing {} pieces", pieces.len());
        let index = RTree::bulk_load(pieces);

        info!(
            "Graph created: {} segments, {} junctions",
            lookup.len(),
            graph.node_count()
        );

        Ok(Graph {
            graph,
            segments: lookup,
            index,
        })
    }

    pub fn from_data(data: NetworkData) -> Result<Graph, GraphError> {
        let segments = data
            .segments
            .into_iter()
            .map(RoadSegment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Graph::from_segments(segments)
    }

    /// Reads a JSON [`NetworkData`] dataset from the reader.
    pub fn from_reader(reader: impl Read) -> Result<Graph, GraphError> {
        debug_time!("network parse");

        let data: NetworkData = serde_json::from_reader(BufReader::new(reader))?;
        Graph::from_data(data)
    }

    /// Reads a JSON [`NetworkData`] dataset from the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Graph, GraphError> {
        info!("Loading network from {}", path.as_ref().display());
        Graph::from_reader(File::open(path)?)
    }

    /// The dataset the graph was built from, with segments in identifier order.
    pub fn data(&self) -> NetworkData {
        let mut segments = self.segments().map(SegmentData::from).collect::<Vec<_>>();
        segments.sort_by_key(|segment| segment.id);

        NetworkData { segments }
    }
}
