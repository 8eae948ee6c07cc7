use crate::transition::{Candidate, TransitionEdge};

/// A chosen candidate within a decoded piece of the trace.
#[derive(Clone, Debug)]
pub struct Step {
    /// Index of the observation within the trace.
    pub index: usize,

    pub candidate: Candidate,

    /// The transition taken from the previous step of the piece.
    /// The first step of every piece has no transition.
    pub transition: Option<TransitionEdge>,
}

/// The solution of a transition graph.
///
/// Holds the most likely candidate sequence of each independently decoded
/// piece of the trace, in trace order. Pieces are separated either by
/// observations without candidates, or by a disconnection.
#[derive(Clone, Debug, Default)]
pub struct Collapse {
    pub pieces: Vec<Vec<Step>>,

    /// Pairs of observation indices between which every transition was forbidden.
    pub disconnections: Vec<(usize, usize)>,
}

impl Collapse {
    /// Iterates over every chosen step, across all pieces.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.pieces.iter().flatten()
    }

    /// The geometric mean of every emission and transition
    /// probability along the decoded pieces.
    pub fn mean_probability(&self) -> f64 {
        let (sum, count) = self
            .steps()
            .flat_map(|step| {
                std::iter::once(step.candidate.emission)
                    .chain(step.transition.as_ref().map(|edge| edge.probability))
            })
            .fold((0.0, 0usize), |(sum, count), probability| {
                (sum + probability.ln(), count + 1)
            });

        match count {
            0 => 0.0,
            count => (sum / count as f64).exp(),
        }
    }
}
