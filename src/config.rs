//! Matching configuration.
//!
//! A process-wide [`MatchOptions`] is usually loaded once with
//! [`MatchOptions::from_env`], and individual requests may narrow
//! it using [`MatchOverrides`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const PREFIX: &str = "TRACE_MATCHER_";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {name} has an invalid value: {value:?}")]
    InvalidVariable { name: String, value: String },

    #[error("{field} must be a positive, finite value. Given: {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("max_candidates must be at least 1")]
    NoCandidates,

    #[error("max_trace_points must be at least 1")]
    NoTracePoints,

    #[error("max_detour_ratio must be at least 1. Given: {0}")]
    DetourRatio(f64),

    #[error("max_speed ({max_speed}) must not exceed speed_ceiling ({speed_ceiling})")]
    InconsistentSpeeds { max_speed: f64, speed_ceiling: f64 },
}

/// How the decoder treats a transition at which every candidate pairing is forbidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakPolicy {
    /// Split the trace into independently decoded pieces at the break.
    #[default]
    Split,

    /// Fail the whole match with [`MatchError::NoViablePath`](crate::MatchError::NoViablePath).
    Fail,
}

impl FromStr for BreakPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "split" => Ok(BreakPolicy::Split),
            "fail" => Ok(BreakPolicy::Fail),
            _ => Err(()),
        }
    }
}

/// Parameters of the matching model. Distances are in meters, speeds in meters per second.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchOptions {
    /// The most candidates kept for a single observation.
    pub max_candidates: usize,

    /// Radius around each observation within which candidates are searched for.
    pub search_radius: f64,

    /// Standard deviation of the GPS error, used by the emission probability
    /// of observations which do not report their own accuracy.
    pub emission_sigma: f64,

    /// Scale of the exponential penalty for the difference between
    /// the routed distance and the great-circle distance of a transition.
    pub transition_beta: f64,

    /// The fastest plausible speed. Transitions implying a faster
    /// speed are penalised.
    pub max_speed: f64,

    /// The hard speed limit. Transitions implying a faster speed are forbidden.
    pub speed_ceiling: f64,

    /// Routed distance, as a multiple of the great-circle distance,
    /// beyond which a transition is not searched for.
    pub max_detour_ratio: f64,

    /// Observations closer than this to the previously kept observation
    /// are folded into it rather than decoded on their own.
    pub dedupe_distance: f64,

    /// Douglas-Peucker tolerance (degrees) applied to the assembled route, if any.
    pub simplify_tolerance: Option<f64>,

    /// The longest a single match may run for.
    pub timeout: Duration,

    /// The most observations accepted in a single trace.
    pub max_trace_points: usize,

    pub break_policy: BreakPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            max_candidates: 8,
            search_radius: 50.0,
            emission_sigma: 10.0,
            transition_beta: 30.0,
            max_speed: 55.0,
            speed_ceiling: 150.0,
            max_detour_ratio: 4.0,
            dedupe_distance: 2.0,
            simplify_tolerance: None,
            timeout: Duration::from_secs(5),
            max_trace_points: 20_000,
            break_policy: BreakPolicy::Split,
        }
    }
}

/// Per-request overrides of the process-wide [`MatchOptions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_radius: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
}

fn parse<T: FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidVariable {
            name: name.to_string(),
            value,
        })
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl MatchOptions {
    /// Loads the options from `TRACE_MATCHER_*` environment variables,
    /// falling back to the default for each variable not set.
    ///
    /// | Variable | Option |
    /// |---|---|
    /// | `TRACE_MATCHER_MAX_CANDIDATES` | [`max_candidates`](#structfield.max_candidates) |
    /// | `TRACE_MATCHER_SEARCH_RADIUS` | [`search_radius`](#structfield.search_radius) |
    /// | `TRACE_MATCHER_EMISSION_SIGMA` | [`emission_sigma`](#structfield.emission_sigma) |
    /// | `TRACE_MATCHER_TRANSITION_BETA` | [`transition_beta`](#structfield.transition_beta) |
    /// | `TRACE_MATCHER_MAX_SPEED` | [`max_speed`](#structfield.max_speed) |
    /// | `TRACE_MATCHER_SPEED_CEILING` | [`speed_ceiling`](#structfield.speed_ceiling) |
    /// | `TRACE_MATCHER_MAX_DETOUR_RATIO` | [`max_detour_ratio`](#structfield.max_detour_ratio) |
    /// | `TRACE_MATCHER_DEDUPE_DISTANCE` | [`dedupe_distance`](#structfield.dedupe_distance) |
    /// | `TRACE_MATCHER_SIMPLIFY_TOLERANCE` | [`simplify_tolerance`](#structfield.simplify_tolerance) |
    /// | `TRACE_MATCHER_TIMEOUT_MS` | [`timeout`](#structfield.timeout) |
    /// | `TRACE_MATCHER_MAX_TRACE_POINTS` | [`max_trace_points`](#structfield.max_trace_points) |
    /// | `TRACE_MATCHER_BREAK_POLICY` | [`break_policy`](#structfield.break_policy) (`split` or `fail`) |
    pub fn from_env() -> Result<Self, ConfigError> {
        MatchOptions::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the options from any key-value source, keyed as in [`MatchOptions::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = MatchOptions::default();

        let var = |key: &str| {
            let name = format!("{PREFIX}{key}");
            lookup(&name).map(|value| (name, value))
        };

        if let Some((name, value)) = var("MAX_CANDIDATES") {
            options.max_candidates = parse(&name, value)?;
        }

        if let Some((name, value)) = var("SEARCH_RADIUS") {
            options.search_radius = parse(&name, value)?;
        }

        if let Some((name, value)) = var("EMISSION_SIGMA") {
            options.emission_sigma = parse(&name, value)?;
        }

        if let Some((name, value)) = var("TRANSITION_BETA") {
            options.transition_beta = parse(&name, value)?;
        }

        if let Some((name, value)) = var("MAX_SPEED") {
            options.max_speed = parse(&name, value)?;
        }

        if let Some((name, value)) = var("SPEED_CEILING") {
            options.speed_ceiling = parse(&name, value)?;
        }

        if let Some((name, value)) = var("MAX_DETOUR_RATIO") {
            options.max_detour_ratio = parse(&name, value)?;
        }

        if let Some((name, value)) = var("DEDUPE_DISTANCE") {
            options.dedupe_distance = parse(&name, value)?;
        }

        if let Some((name, value)) = var("SIMPLIFY_TOLERANCE") {
            options.simplify_tolerance = Some(parse(&name, value)?);
        }

        if let Some((name, value)) = var("TIMEOUT_MS") {
            options.timeout = Duration::from_millis(parse(&name, value)?);
        }

        if let Some((name, value)) = var("MAX_TRACE_POINTS") {
            options.max_trace_points = parse(&name, value)?;
        }

        if let Some((name, value)) = var("BREAK_POLICY") {
            options.break_policy = parse(&name, value)?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Applies the request-level `overrides` over these options.
    pub fn with_overrides(&self, overrides: &MatchOverrides) -> MatchOptions {
        MatchOptions {
            max_candidates: overrides.max_candidates.unwrap_or(self.max_candidates),
            search_radius: overrides.search_radius.unwrap_or(self.search_radius),
            max_speed: overrides.max_speed.unwrap_or(self.max_speed),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_candidates == 0 {
            return Err(ConfigError::NoCandidates);
        }

        if self.max_trace_points == 0 {
            return Err(ConfigError::NoTracePoints);
        }

        positive("search_radius", self.search_radius)?;
        positive("emission_sigma", self.emission_sigma)?;
        positive("transition_beta", self.transition_beta)?;
        positive("max_speed", self.max_speed)?;
        positive("speed_ceiling", self.speed_ceiling)?;

        if self.max_detour_ratio.is_nan() || self.max_detour_ratio < 1.0 {
            return Err(ConfigError::DetourRatio(self.max_detour_ratio));
        }

        if self.dedupe_distance.is_nan() || self.dedupe_distance < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "dedupe_distance",
                value: self.dedupe_distance,
            });
        }

        if let Some(tolerance) = self.simplify_tolerance {
            positive("simplify_tolerance", tolerance)?;
        }

        if self.max_speed > self.speed_ceiling {
            return Err(ConfigError::InconsistentSpeeds {
                max_speed: self.max_speed,
                speed_ceiling: self.speed_ceiling,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();

        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MatchOptions::default().validate(), Ok(()));
    }

    #[test]
    fn reads_prefixed_variables() {
        let options = MatchOptions::from_lookup(lookup(&[
            ("TRACE_MATCHER_MAX_CANDIDATES", "4"),
            ("TRACE_MATCHER_SEARCH_RADIUS", " 75.5 "),
            ("TRACE_MATCHER_TIMEOUT_MS", "250"),
            ("TRACE_MATCHER_BREAK_POLICY", "FAIL"),
            ("TRACE_MATCHER_SIMPLIFY_TOLERANCE", "0.0001"),
        ]))
        .expect("options must load");

        assert_eq!(options.max_candidates, 4);
        assert_eq!(options.search_radius, 75.5);
        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.break_policy, BreakPolicy::Fail);
        assert_eq!(options.simplify_tolerance, Some(0.0001));
        assert_eq!(options.max_speed, MatchOptions::default().max_speed);
    }

    #[test]
    fn rejects_unparseable_variable() {
        let error = MatchOptions::from_lookup(lookup(&[("TRACE_MATCHER_MAX_SPEED", "fast")]))
            .expect_err("must not load");

        assert_eq!(
            error,
            ConfigError::InvalidVariable {
                name: "TRACE_MATCHER_MAX_SPEED".to_string(),
                value: "fast".to_string()
            }
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let invalid = [
            MatchOptions {
                max_candidates: 0,
                ..Default::default()
            },
            MatchOptions {
                search_radius: -5.0,
                ..Default::default()
            },
            MatchOptions {
                emission_sigma: f64::NAN,
                ..Default::default()
            },
            MatchOptions {
                max_detour_ratio: 0.5,
                ..Default::default()
            },
            MatchOptions {
                max_speed: 200.0,
                ..Default::default()
            },
        ];

        for options in invalid {
            assert!(options.validate().is_err(), "{options:?}");
        }
    }

    #[test]
    fn overrides_replace_given_fields() {
        let base = MatchOptions::default();
        let overrides = MatchOverrides {
            search_radius: Some(30.0),
            ..Default::default()
        };

        let options = base.with_overrides(&overrides);
        assert_eq!(options.search_radius, 30.0);
        assert_eq!(options.max_candidates, base.max_candidates);
    }

    #[test]
    fn overrides_deserialize_camel_case() {
        let overrides: MatchOverrides =
            serde_json::from_str(r#"{ "maxCandidates": 3, "maxSpeed": 20.0 }"#)
                .expect("must parse");

        assert_eq!(overrides.max_candidates, Some(3));
        assert_eq!(overrides.max_speed, Some(20.0));
        assert_eq!(overrides.search_radius, None);
    }
}
