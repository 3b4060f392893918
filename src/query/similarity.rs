//! k-most-similar brew search
//!
//! Each brew session is projected onto a weighted feature vector. Features
//! are min-max normalized over every session in the graph, so a weight
//! expresses relative importance independent of the feature's unit.

use super::QueryEngine;
use crate::error::{QueryError, QueryResult};
use crate::graph::{EdgeKind, GraphStore, Node, NodeId, NodeKind};
use crate::record::Rating;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A numeric feature of a brew session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    /// Sensory rating on the session's evaluation
    Rating(Rating),
    /// Attribute of the BrewSession node (dose_g, days_off_roast, ...)
    Session(String),
    /// Attribute of the BREWED_WITH edge (water_temp_c, bloom_sec, ...)
    BrewedWith(String),
    /// Attribute of the USES_GRINDER edge (grind_setting)
    Grinder(String),
    /// Attribute of the RoastBatch reached via USES_ROAST
    Roast(String),
}

impl Feature {
    /// Numeric value of this feature for a session, if present
    pub fn value(&self, store: &GraphStore, session: &Node) -> Option<f64> {
        match self {
            Feature::Rating(rating) => store
                .first_target(session.id, EdgeKind::EvaluatedAs)?
                .get_f64(rating.attribute()),
            Feature::Session(attr) => session.get_f64(attr),
            Feature::BrewedWith(attr) => store
                .first_outgoing(session.id, EdgeKind::BrewedWith)?
                .get_f64(attr),
            Feature::Grinder(attr) => store
                .first_outgoing(session.id, EdgeKind::UsesGrinder)?
                .get_f64(attr),
            Feature::Roast(attr) => store
                .first_target(session.id, EdgeKind::UsesRoast)?
                .get_f64(attr),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Rating(rating) => write!(f, "{}", rating),
            Feature::Session(attr) => write!(f, "session:{}", attr),
            Feature::BrewedWith(attr) => write!(f, "brewed_with:{}", attr),
            Feature::Grinder(attr) => write!(f, "grinder:{}", attr),
            Feature::Roast(attr) => write!(f, "roast:{}", attr),
        }
    }
}

impl FromStr for Feature {
    type Err = String;

    /// `overall`, `rating:overall`, `session:dose_g`,
    /// `brewed_with:water_temp_c`, `grinder:grind_setting`, `roast:<attr>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((scope, attr)) = s.split_once(':') else {
            return s.parse::<Rating>().map(Feature::Rating);
        };
        let attr = attr.trim();
        if attr.is_empty() {
            return Err(format!("feature '{}' has no attribute name", s));
        }
        match scope.trim().to_lowercase().as_str() {
            "rating" => attr.parse::<Rating>().map(Feature::Rating),
            "session" => Ok(Feature::Session(attr.to_string())),
            "brewed_with" => Ok(Feature::BrewedWith(attr.to_string())),
            "grinder" => Ok(Feature::Grinder(attr.to_string())),
            "roast" => Ok(Feature::Roast(attr.to_string())),
            other => Err(format!("unknown feature scope '{}'", other)),
        }
    }
}

impl TryFrom<String> for Feature {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.to_string()
    }
}

/// Weight per feature, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureWeights(IndexMap<Feature, f64>);

impl FeatureWeights {
    /// No features at all
    pub fn empty() -> Self {
        FeatureWeights(IndexMap::new())
    }

    /// Equal weight on the five sensory ratings
    pub fn ratings() -> Self {
        Rating::ALL
            .into_iter()
            .map(|r| (Feature::Rating(r), 1.0))
            .collect()
    }

    pub fn with(mut self, feature: Feature, weight: f64) -> Self {
        self.0.insert(feature, weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Feature, f64)> + '_ {
        self.0.iter().map(|(f, w)| (f, *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every weight must be finite and non-negative
    pub fn validate(&self) -> QueryResult<()> {
        match self.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            Some((feature, weight)) => Err(QueryError::InvalidWeight {
                feature: feature.to_string(),
                weight,
            }),
            None => Ok(()),
        }
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self::ratings()
    }
}

impl FromIterator<(Feature, f64)> for FeatureWeights {
    fn from_iter<I: IntoIterator<Item = (Feature, f64)>>(iter: I) -> Self {
        FeatureWeights(iter.into_iter().collect())
    }
}

/// One ranked result of a similarity search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarBrew {
    pub node: NodeId,
    pub brew_id: String,
    pub distance: f64,
}

/// Normalized difference a missing value contributes
const MISSING_PENALTY: f64 = 1.0;

impl<'g> QueryEngine<'g> {
    /// The `k` sessions closest to the reference brew.
    ///
    /// Distance is the weighted Euclidean distance over min-max normalized
    /// features. A feature missing on either side contributes the maximal
    /// normalized difference. Results are sorted by ascending distance,
    /// ties by brew_id; the reference itself is never returned.
    pub fn similar_brews(
        &self,
        reference_brew_id: &str,
        k: usize,
        weights: &FeatureWeights,
    ) -> QueryResult<Vec<SimilarBrew>> {
        weights.validate()?;
        let reference = self.session(reference_brew_id)?;

        let features: Vec<(&Feature, f64)> = weights.iter().collect();
        let sessions: Vec<&Node> = self.store.nodes_of_kind(NodeKind::BrewSession).collect();
        let vectors: Vec<Vec<Option<f64>>> = sessions
            .iter()
            .map(|s| features.iter().map(|(f, _)| f.value(self.store, s)).collect())
            .collect();

        // Per-feature (min, max) over sessions that have the feature
        let ranges: Vec<Option<(f64, f64)>> = (0..features.len())
            .map(|i| {
                vectors.iter().filter_map(|v| v[i]).fold(None, |acc, x| match acc {
                    None => Some((x, x)),
                    Some((lo, hi)) => Some((f64::min(lo, x), f64::max(hi, x))),
                })
            })
            .collect();

        let Some(ref_index) = sessions.iter().position(|s| s.id == reference.id) else {
            return Ok(Vec::new());
        };
        let ref_vector = &vectors[ref_index];

        let mut results: Vec<SimilarBrew> = sessions
            .iter()
            .zip(&vectors)
            .filter(|(s, _)| s.id != reference.id)
            .map(|(session, vector)| {
                let squared: f64 = features
                    .iter()
                    .enumerate()
                    .map(|(i, (_, weight))| {
                        let diff = match (ref_vector[i], vector[i], ranges[i]) {
                            (Some(a), Some(b), Some((lo, hi))) if hi > lo => (a - b) / (hi - lo),
                            (Some(_), Some(_), _) => 0.0,
                            _ => MISSING_PENALTY,
                        };
                        weight * diff * diff
                    })
                    .sum();
                SimilarBrew {
                    node: session.id,
                    brew_id: session.get_str("brew_id").unwrap_or_default().to_string(),
                    distance: squared.sqrt(),
                }
            })
            .collect();

        results.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.brew_id.cmp(&b.brew_id),
            other => other,
        });
        results.truncate(k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_parsing() {
        assert_eq!("overall".parse::<Feature>(), Ok(Feature::Rating(Rating::Overall)));
        assert_eq!("rating:body".parse::<Feature>(), Ok(Feature::Rating(Rating::Body)));
        assert_eq!(
            "session:dose_g".parse::<Feature>(),
            Ok(Feature::Session("dose_g".to_string()))
        );
        assert_eq!(
            "Brewed_With:bloom_sec".parse::<Feature>(),
            Ok(Feature::BrewedWith("bloom_sec".to_string()))
        );
        assert!("session:".parse::<Feature>().is_err());
        assert!("kettle:temp".parse::<Feature>().is_err());
        assert!("aroma".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_display_round_trips() {
        for feature in [
            Feature::Rating(Rating::Acidity),
            Feature::Grinder("grind_setting".to_string()),
            Feature::Roast("age".to_string()),
        ] {
            assert_eq!(feature.to_string().parse::<Feature>(), Ok(feature));
        }
    }

    #[test]
    fn test_weight_validation() {
        assert!(FeatureWeights::default().validate().is_ok());
        assert!(FeatureWeights::empty().validate().is_ok());

        let weights = FeatureWeights::empty().with(Feature::Rating(Rating::Body), f64::NAN);
        assert!(matches!(weights.validate(), Err(QueryError::InvalidWeight { .. })));

        let weights = FeatureWeights::empty().with(Feature::Session("dose_g".into()), -0.5);
        assert_eq!(
            weights.validate(),
            Err(QueryError::InvalidWeight {
                feature: "session:dose_g".to_string(),
                weight: -0.5,
            })
        );
    }
}
