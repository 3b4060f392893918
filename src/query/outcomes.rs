//! Outcome aggregation by brewing condition
//!
//! Groups brew sessions by one condition and summarizes a sensory rating
//! per group, e.g. mean `overall` per brewer or per water temperature.

use super::QueryEngine;
use crate::graph::{EdgeKind, Node, NodeKind};
use crate::record::Rating;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What to group sessions by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Attribute of the BrewSession node
    Session(String),
    /// Attribute of the BREWED_WITH edge (brew_method, water_temp_c, ...)
    BrewedWith(String),
    /// Attribute of the USES_GRINDER edge
    Grinder(String),
    /// Label of the node the session reaches via this edge
    Neighbor(EdgeKind),
}

impl Condition {
    /// Group key of a session, if the session has one
    pub fn value(&self, engine: &QueryEngine<'_>, session: &Node) -> Option<String> {
        let store = engine.store;
        let value = match self {
            Condition::Session(attr) => session.get_property(attr)?.to_string(),
            Condition::BrewedWith(attr) => store
                .first_outgoing(session.id, EdgeKind::BrewedWith)?
                .get_property(attr)?
                .to_string(),
            Condition::Grinder(attr) => store
                .first_outgoing(session.id, EdgeKind::UsesGrinder)?
                .get_property(attr)?
                .to_string(),
            Condition::Neighbor(kind) => store.first_target(session.id, *kind)?.display_label(),
        };
        Some(value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Session(attr) => write!(f, "session:{}", attr),
            Condition::BrewedWith(attr) => write!(f, "brewed_with:{}", attr),
            Condition::Grinder(attr) => write!(f, "grinder:{}", attr),
            Condition::Neighbor(kind) => write!(f, "neighbor:{}", kind),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    /// Accepts the shortcuts `brewer`, `grinder`, `roast` and `method`, or
    /// `session:<attr>`, `brewed_with:<attr>`, `grinder:<attr>`,
    /// `neighbor:<EDGE_KIND>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((scope, attr)) = s.split_once(':') else {
            return match s.to_lowercase().as_str() {
                "brewer" => Ok(Condition::Neighbor(EdgeKind::BrewedWith)),
                "grinder" => Ok(Condition::Neighbor(EdgeKind::UsesGrinder)),
                "roast" => Ok(Condition::Neighbor(EdgeKind::UsesRoast)),
                "method" => Ok(Condition::BrewedWith("brew_method".to_string())),
                other => Err(format!("unknown condition '{}'", other)),
            };
        };
        let attr = attr.trim();
        if attr.is_empty() {
            return Err(format!("condition '{}' has no attribute name", s));
        }
        match scope.trim().to_lowercase().as_str() {
            "session" => Ok(Condition::Session(attr.to_string())),
            "brewed_with" => Ok(Condition::BrewedWith(attr.to_string())),
            "grinder" => Ok(Condition::Grinder(attr.to_string())),
            "neighbor" => {
                let kind: EdgeKind = attr.parse()?;
                if kind.endpoints().0 != NodeKind::BrewSession {
                    return Err(format!("{} does not start at a BrewSession", kind));
                }
                Ok(Condition::Neighbor(kind))
            }
            other => Err(format!("unknown condition scope '{}'", other)),
        }
    }
}

/// Rating summary of one group of sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeGroup {
    pub value: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl<'g> QueryEngine<'g> {
    /// Summarize `rating` per distinct value of `condition`.
    ///
    /// Sessions without a value for the condition are left out. Groups are
    /// ordered by descending mean, then by value.
    pub fn outcomes_by(&self, condition: &Condition, rating: Rating) -> Vec<OutcomeGroup> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for session in self.store.nodes_of_kind(NodeKind::BrewSession) {
            let Some(key) = condition.value(self, session) else {
                continue;
            };
            let Some(score) = self
                .store
                .first_target(session.id, EdgeKind::EvaluatedAs)
                .and_then(|eval| eval.get_f64(rating.attribute()))
            else {
                continue;
            };
            groups.entry(key).or_default().push(score);
        }

        let mut outcomes: Vec<OutcomeGroup> = groups
            .into_iter()
            .map(|(value, scores)| {
                let count = scores.len();
                let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
                let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = scores.iter().sum::<f64>() / count as f64;
                OutcomeGroup {
                    value,
                    count,
                    mean,
                    min,
                    max,
                }
            })
            .collect();

        // BTreeMap order already sorts by value; a stable sort keeps it for ties
        outcomes.sort_by(|a, b| b.mean.total_cmp(&a.mean));
        outcomes
    }
}
