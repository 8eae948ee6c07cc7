use crate::transition::*;

pub trait Strategy<Ctx> {
    /// The probability of the event described by the context, which must be
    /// within `[0, 1]`. Returning `None` marks the event as impossible.
    fn calculate(&self, context: Ctx) -> Option<f64>;

    /// The probability given by [`Strategy::calculate`], where impossible
    /// (or non-finite) outcomes are given a probability of exactly zero.
    #[inline(always)]
    fn probability(&self, context: Ctx) -> f64 {
        self.calculate(context)
            .filter(|probability| probability.is_finite())
            .map_or(0.0, |probability| probability.clamp(0.0, 1.0))
    }

    /// The natural logarithm of the [`Strategy::probability`].
    /// Impossible outcomes have a log-probability of negative infinity.
    #[inline(always)]
    fn log_probability(&self, context: Ctx) -> f64 {
        match self.probability(context) {
            probability if probability > 0.0 => probability.ln(),
            _ => f64::NEG_INFINITY,
        }
    }
}

pub trait Costing<Emission, Transition>
where
    Transition: TransitionStrategy,
    Emission: EmissionStrategy,
{
    /// The emission probability of a candidate, in `[0, 1]`.
    fn emission(&self, context: EmissionContext) -> f64;

    /// The transition probability between two candidates, in `[0, 1]`.
    /// A probability of exactly zero marks a forbidden transition.
    fn transition(&self, context: TransitionContext) -> f64;
}
