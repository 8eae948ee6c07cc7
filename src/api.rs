//! Request and response shapes exchanged with the front end.
//!
//! ```json
//! { "points": [{ "latitude": -33.8688, "longitude": 151.2093, "timestamp": "2024-01-01T00:00:00Z" }],
//!   "options": { "searchRadius": 30.0 } }
//! ```

use crate::config::MatchOverrides;
use crate::geo::{Coordinate, GeoError, Trace};
use crate::transition::{GapReason, MatchResult, MatchWarning, MatchedPoint};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub points: Vec<Coordinate>,

    #[serde(default)]
    pub options: MatchOverrides,
}

impl MatchRequest {
    /// Validates the points of the request as a [`Trace`].
    pub fn trace(&self) -> Result<Trace, GeoError> {
        Trace::new(self.points.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    /// One entry per requested point, `null` where the point could not be matched.
    pub matched: Vec<Option<MatchedPoint>>,

    /// The polyline of each piece of the route, as `[lng, lat]` pairs.
    pub routes: Vec<Vec<[f64; 2]>>,

    /// The gap markers between the pieces of the route.
    pub gaps: Vec<GapReason>,

    pub warnings: Vec<MatchWarning>,

    pub confidence: f64,
}

impl From<MatchResult> for MatchResponse {
    fn from(result: MatchResult) -> Self {
        MatchResponse {
            matched: result.points().to_vec(),
            routes: result
                .pieces()
                .map(|piece| piece.geometry.coords().map(|c| [c.x, c.y]).collect())
                .collect(),
            gaps: result.gaps().copied().collect(),
            warnings: result.warnings().to_vec(),
            confidence: result.confidence(),
        }
    }
}
