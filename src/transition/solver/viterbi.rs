use crate::config::BreakPolicy;
use crate::transition::*;

use log::debug;
use measure_time::debug_time;

#[cfg(feature = "tracing")]
use tracing::Level;

/// A single entry of the decoding table.
#[derive(Clone, Debug)]
struct Cell {
    /// The best cumulative log-probability of any sequence ending at this candidate.
    score: f64,

    /// The candidate of the previous layer from which the best sequence arrived.
    back: Option<usize>,

    /// The transition taken from that previous candidate.
    edge: Option<TransitionEdge>,
}

impl Cell {
    fn initial(candidate: &Candidate) -> Self {
        Cell {
            score: candidate.emission.ln(),
            back: None,
            edge: None,
        }
    }

    fn unreachable() -> Self {
        Cell {
            score: f64::NEG_INFINITY,
            back: None,
            edge: None,
        }
    }

    #[inline]
    fn is_reachable(&self) -> bool {
        self.score > f64::NEG_INFINITY
    }
}

/// The decoding table of a single piece of the trace.
///
/// Rows are addressed by their layer (relative to the first layer of the
/// piece), and columns by the candidate within that layer. Back-pointers
/// are column indices into the previous row.
struct Table {
    start: usize,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(start: usize, layer: &Layer) -> Self {
        Table {
            start,
            rows: vec![layer.candidates.iter().map(Cell::initial).collect()],
        }
    }

    /// Recovers the best sequence through the table, by following
    /// back-pointers from the best candidate of the final row.
    fn backtrack(self, layers: &[Layer]) -> Vec<Step> {
        let Some(mut column) = self.rows.last().and_then(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_reachable())
                .fold(None, |best: Option<(usize, f64)>, (index, cell)| match best {
                    Some((_, score)) if score >= cell.score => best,
                    _ => Some((index, cell.score)),
                })
                .map(|(index, _)| index)
        }) else {
            return vec![];
        };

        let start = self.start;
        let mut steps = Vec::with_capacity(self.rows.len());

        for (offset, mut row) in self.rows.into_iter().enumerate().rev() {
            let Some(layer) = layers.get(start + offset) else {
                break;
            };

            if column >= row.len() || column >= layer.candidates.len() {
                break;
            }

            let cell = row.swap_remove(column);
            steps.push(Step {
                index: layer.index,
                candidate: layer.candidates[column],
                transition: cell.edge,
            });

            match cell.back {
                Some(back) => column = back,
                None => break,
            }
        }

        steps.reverse();
        steps
    }
}

/// A Viterbi decoder over the layers of the transition graph.
///
/// The most likely sequence is found using the recurrence, in log-probability space:
///
/// ```math
/// best[0][c] = emission(c)
/// best[i][c] = emission(c) + max over c' of (best[i-1][c'] + transition(c', c))
/// ```
///
/// Observations without candidates split the trace into runs which are decoded
/// independently. Within a run, a layer which no candidate of the previous layer
/// can transition to is handled according to the [`BreakPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ViterbiSolver {
    pub break_policy: BreakPolicy,
}

impl ViterbiSolver {
    pub fn new(break_policy: BreakPolicy) -> Self {
        ViterbiSolver { break_policy }
    }

    /// Computes the row of the table for `layer`, from the `previous` row.
    fn advance<E, T>(
        &self,
        transition: &Transition<E, T>,
        model: &TransitionModel<E, T>,
        previous: (&Layer, &[Cell]),
        layer: &Layer,
    ) -> Result<Vec<Cell>, MatchError>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        let (previous_layer, previous_row) = previous;
        let elapsed = transition.elapsed(previous_layer.index, layer.index);

        let mut row = vec![Cell::unreachable(); layer.candidates.len()];

        for (column, cell) in previous_row.iter().enumerate() {
            if !cell.is_reachable() {
                continue;
            }

            transition.check_deadline()?;

            let source = &previous_layer.candidates[column];
            for (target, edge) in model
                .score_many(source, &layer.candidates, elapsed)
                .into_iter()
                .enumerate()
            {
                // Forbidden transitions are absent from the graph.
                if edge.is_forbidden() {
                    continue;
                }

                let score = cell.score + edge.probability.ln();
                if score > row[target].score {
                    row[target] = Cell {
                        score,
                        back: Some(column),
                        edge: Some(edge),
                    };
                }
            }
        }

        for (cell, candidate) in row.iter_mut().zip(&layer.candidates) {
            if cell.is_reachable() {
                cell.score += candidate.emission.ln();
            }
        }

        Ok(row)
    }
}

impl Solver for ViterbiSolver {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip_all))]
    fn solve<E, T>(&self, transition: &Transition<E, T>) -> Result<Collapse, MatchError>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        debug_time!("viterbi decode");
        transition.check_deadline()?;

        let layers = &transition.layers.layers;
        if layers.iter().all(Layer::is_gap) {
            return Err(MatchError::NoViablePath);
        }

        let model = transition.model();
        let mut collapse = Collapse::default();

        let (mut attempted, mut viable) = (0usize, 0usize);
        let mut table: Option<Table> = None;

        for (layer_id, layer) in layers.iter().enumerate() {
            transition.check_deadline()?;

            if layer.is_gap() {
                debug!("{layer_id}: no candidates for observation {}", layer.index);

                if let Some(finished) = table.take() {
                    collapse.pieces.push(finished.backtrack(layers));
                }

                continue;
            }

            let Some(current) = table.as_mut() else {
                table = Some(Table::new(layer_id, layer));
                continue;
            };

            // The table is only open while its layers are consecutive, so
            // the previous layer is the final row of the table.
            let previous_layer = &layers[layer_id - 1];
            let previous_row = current.rows.last().map(Vec::as_slice).unwrap_or_default();

            let row = self.advance(transition, &model, (previous_layer, previous_row), layer)?;
            attempted += 1;

            if row.iter().any(Cell::is_reachable) {
                viable += 1;
                current.rows.push(row);
                continue;
            }

            debug!(
                "{layer_id}: every transition from observation {} to {} is forbidden",
                previous_layer.index, layer.index
            );

            match self.break_policy {
                BreakPolicy::Fail => return Err(MatchError::NoViablePath),
                BreakPolicy::Split => {
                    collapse
                        .disconnections
                        .push((previous_layer.index, layer.index));

                    if let Some(finished) = table.replace(Table::new(layer_id, layer)) {
                        collapse.pieces.push(finished.backtrack(layers));
                    }
                }
            }
        }

        if let Some(finished) = table.take() {
            collapse.pieces.push(finished.backtrack(layers));
        }

        // Every pairing of consecutive observations was forbidden,
        // so the trace holds no more than isolated matches.
        if attempted > 0 && viable == 0 {
            return Err(MatchError::NoViablePath);
        }

        collapse.pieces.retain(|piece| !piece.is_empty());
        debug!(
            "Decoded {} pieces with {} disconnections",
            collapse.pieces.len(),
            collapse.disconnections.len()
        );

        Ok(collapse)
    }
}
