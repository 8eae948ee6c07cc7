use crate::geo::{Coordinate, Trace};
use crate::transition::*;
use crate::{Graph, Scan};

use geo::Point;
use itertools::Itertools;
use log::trace;
use measure_time::debug_time;

/// The candidates of a single observation.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Index of the observation within the trace.
    pub index: usize,

    /// The observed position.
    pub origin: Point,

    /// Candidates in ascending order of distance from the origin.
    pub candidates: Vec<Candidate>,
}

impl Layer {
    /// A layer without candidates is a forced gap in the trace.
    #[inline]
    pub fn is_gap(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Layers {
    pub layers: Vec<Layer>,
}

impl Layers {
    pub fn last(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn first(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// The total number of candidates across every layer.
    pub fn candidates(&self) -> usize {
        self.layers.iter().map(|layer| layer.candidates.len()).sum()
    }
}

impl FromIterator<Layer> for Layers {
    fn from_iter<I: IntoIterator<Item = Layer>>(layers: I) -> Self {
        Layers {
            layers: layers.into_iter().collect(),
        }
    }
}

const DEFAULT_MAX_CANDIDATES: usize = 8;
const DEFAULT_SEARCH_RADIUS: f64 = 50.0; // 50m

/// Generates the layers within the transition graph.
///
/// Each layer represents an observation of the trace, and each candidate
/// in the layer is the projection of that observation onto a segment
/// within the search radius.
pub struct LayerGenerator<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    /// The most candidates kept for each observation. The closest are kept.
    pub max_candidates: usize,

    /// The radius (meters) around each observation within which candidates are found.
    pub search_radius: f64,

    /// The costing heuristics required to generate the layers.
    ///
    /// The emission probability of a candidate is calculated once, as it is generated.
    pub heuristics: &'a CostingStrategies<E, T>,

    /// The routing map used to pull candidates from.
    map: &'a Graph,
}

impl<'a, E, T> LayerGenerator<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    /// Creates a [`LayerGenerator`] from a map and costing heuristics.
    pub fn new(map: &'a Graph, heuristics: &'a CostingStrategies<E, T>) -> Self {
        LayerGenerator {
            map,
            heuristics,

            max_candidates: DEFAULT_MAX_CANDIDATES,
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }

    pub fn with_limits(self, max_candidates: usize, search_radius: f64) -> Self {
        LayerGenerator {
            max_candidates,
            search_radius,
            ..self
        }
    }

    /// Generates at most `max_candidates` candidates for the `coordinate`, from the
    /// segments within `search_radius` meters. Candidates are sorted by ascending
    /// distance, with ties broken by segment identifier, so the output is deterministic.
    ///
    /// The candidates are placed in the first layer, see [`Candidate::in_layer`].
    pub fn generate(
        &self,
        coordinate: &Coordinate,
        max_candidates: usize,
        search_radius: f64,
    ) -> Vec<Candidate> {
        let origin = coordinate.point();

        self.map
            .query_projected(&origin, search_radius)
            .into_iter()
            .sorted_by(|(a, a_segment), (b, b_segment)| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a_segment.id().cmp(&b_segment.id()))
            })
            .take(max_candidates)
            .enumerate()
            .map(|(node_id, (projection, segment))| {
                // We have the projected position and its segment, so we
                // can use the emission costing function to calculate the
                // associated emission probability of this candidate.
                let context =
                    EmissionContext::new(&projection.position, &origin, projection.distance)
                        .with_accuracy(coordinate.accuracy());

                Candidate {
                    segment: segment.id(),
                    offset: projection.offset,
                    position: projection.position,
                    origin,
                    distance: projection.distance,
                    emission: self.heuristics.emission(context),
                    location: CandidateLocation {
                        layer_id: 0,
                        node_id,
                    },
                }
            })
            .collect()
    }

    /// Generates the layer for the observation at `index` of the trace.
    pub fn layer(&self, layer_id: usize, index: usize, coordinate: &Coordinate) -> Layer {
        let candidates = self
            .generate(coordinate, self.max_candidates, self.search_radius)
            .into_iter()
            .map(|candidate| candidate.in_layer(layer_id))
            .collect::<Vec<_>>();

        trace!("{layer_id}: {} candidates for {coordinate}", candidates.len());

        Layer {
            index,
            origin: coordinate.point(),
            candidates,
        }
    }

    /// Generates a layer for each of the observations at `indices` within the trace.
    pub fn with_trace(&self, trace: &Trace, indices: &[usize]) -> Layers {
        debug_time!("layer generation");

        indices
            .iter()
            .enumerate()
            .filter_map(|(layer_id, index)| {
                let coordinate = trace.get(*index)?;
                Some(self.layer(layer_id, *index, coordinate))
            })
            .collect()
    }
}
