pub mod emission {
    use crate::transition::*;

    /// Calculates the emission probability of a candidate relative
    /// to its source observation.
    ///
    /// ## Calculation
    ///
    /// The GPS error is assumed to be normally distributed, with a standard
    /// deviation `σ` of the observation's own accuracy radius where it is
    /// reported, otherwise the configured default.
    ///
    /// ```math
    /// emission(d) = e^(-0.5 * (d / σ)^2)
    /// ```
    ///
    /// The normalising coefficient is dropped, so a candidate
    /// lying exactly upon its observation has a probability of `1`.
    /// Distant candidates never underflow to zero.
    #[derive(Clone, Copy, Debug)]
    pub struct DefaultEmissionCost {
        pub sigma: f64,
    }

    impl Default for DefaultEmissionCost {
        fn default() -> Self {
            // 10 meters (85th% GPS error)
            DefaultEmissionCost { sigma: 10.0 }
        }
    }

    impl<'a> Strategy<EmissionContext<'a>> for DefaultEmissionCost {
        fn calculate(&self, context: EmissionContext<'a>) -> Option<f64> {
            let sigma = context
                .accuracy
                .filter(|accuracy| *accuracy > 0.0)
                .unwrap_or(self.sigma);

            let relative = context.distance / sigma;
            Some((-0.5 * relative * relative).exp().max(f64::MIN_POSITIVE))
        }
    }
}

pub mod transition {
    use crate::transition::*;

    /// Calculates the transition probability between two candidates.
    ///
    /// # Calculation
    ///
    /// ## Detour
    /// The difference between the length of the optimal route and the
    /// great-circle distance between the two observations. Paths following
    /// the observations closely have a small detour. The probability decays
    /// exponentially in the detour, with scale `β`.
    ///
    /// ```math
    /// detour(trip) = |length(trip) - distance(source, target)|
    /// p_detour = e^(-detour(trip) / β)
    /// ```
    ///
    /// ## Speed
    /// Where the observations are timed, the implied speed of the trip
    /// is compared against the maximum plausible speed `v_max`, beyond
    /// which the probability is penalised quadratically. Beyond the hard
    /// ceiling `v_ceil`, the transition is impossible.
    ///
    /// ```math
    /// speed(trip) = length(trip) / elapsed
    /// p_speed = min(1, v_max / speed(trip))^2
    /// ```
    ///
    /// ### Total
    /// ```math
    /// transition(trip) = p_detour * p_speed
    /// ```
    ///
    /// Possible transitions never underflow to zero, as zero is
    /// reserved for forbidden transitions.
    #[derive(Clone, Copy, Debug)]
    pub struct DefaultTransitionCost {
        pub beta: f64,
        pub max_speed: f64,
        pub speed_ceiling: f64,
    }

    impl Default for DefaultTransitionCost {
        fn default() -> Self {
            DefaultTransitionCost {
                beta: 30.0,
                max_speed: 55.0,
                speed_ceiling: 150.0,
            }
        }
    }

    impl<'a> Strategy<TransitionContext<'a>> for DefaultTransitionCost {
        fn calculate(&self, context: TransitionContext<'a>) -> Option<f64> {
            let detour = context.lengths().detour();
            let mut probability = (-detour / self.beta).exp();

            if let Some(speed) = context.implied_speed() {
                if speed > self.speed_ceiling {
                    return None;
                }

                if speed > self.max_speed {
                    probability *= (self.max_speed / speed).powi(2);
                }
            }

            Some(probability.max(f64::MIN_POSITIVE))
        }
    }
}

pub mod costing {
    use super::{DefaultEmissionCost, DefaultTransitionCost};
    use crate::config::MatchOptions;
    use crate::transition::*;

    #[derive(Clone, Copy, Debug)]
    pub struct CostingStrategies<E, T>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        emission: E,
        transition: T,
    }

    impl<E, T> CostingStrategies<E, T>
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        pub fn new(emission: E, transition: T) -> Self {
            Self {
                emission,
                transition,
            }
        }
    }

    impl CostingStrategies<DefaultEmissionCost, DefaultTransitionCost> {
        /// The default strategies, parameterised by the `options`.
        pub fn from_options(options: &MatchOptions) -> Self {
            CostingStrategies::new(
                DefaultEmissionCost {
                    sigma: options.emission_sigma,
                },
                DefaultTransitionCost {
                    beta: options.transition_beta,
                    max_speed: options.max_speed,
                    speed_ceiling: options.speed_ceiling,
                },
            )
        }
    }

    impl Default for CostingStrategies<DefaultEmissionCost, DefaultTransitionCost> {
        fn default() -> Self {
            CostingStrategies::new(DefaultEmissionCost::default(), DefaultTransitionCost::default())
        }
    }

    impl<E, T> Costing<E, T> for CostingStrategies<E, T>
    where
        T: TransitionStrategy,
        E: EmissionStrategy,
    {
        fn emission(&self, context: EmissionContext) -> f64 {
            self.emission.probability(context)
        }

        fn transition(&self, context: TransitionContext) -> f64 {
            self.transition.probability(context)
        }
    }
}

#[doc(hidden)]
pub use costing::*;
#[doc(hidden)]
pub use emission::*;
#[doc(hidden)]
pub use transition::*;
