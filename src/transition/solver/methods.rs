use crate::transition::*;

/// Defines a structure which can be supplied to the [`Transition::solve`] function
/// in order to solve the transition graph.
///
/// Functionality is implemented using the [`Solver::solve`] method.
pub trait Solver {
    /// Finds the most likely sequence of candidates through the layers
    /// of the transition graph.
    ///
    /// It may return a match error for trace-wide failures: when no sequence
    /// has a non-zero probability, or the time budget of the transition is
    /// exhausted. Observations without candidates are not failures, they
    /// split the trace into independently solved pieces.
    fn solve<E, T>(&self, transition: &Transition<E, T>) -> Result<Collapse, MatchError>
    where
        E: EmissionStrategy,
        T: TransitionStrategy;
}
