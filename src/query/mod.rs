//! Read-only query layer
//!
//! Implements exploratory queries over a finished [`GraphStore`]:
//! - neighbor lookup by edge kind and direction
//! - attribute filtering ([`filter`])
//! - k-most-similar brews ([`similarity`])
//! - rating outcomes grouped by brewing condition ([`outcomes`])
//!
//! No query mutates the store. The engine only borrows it, so any number
//! of engines can run against one store from different threads.

pub mod filter;
pub mod outcomes;
pub mod similarity;

pub use filter::{NodePredicate, Predicate};
pub use outcomes::{Condition, OutcomeGroup};
pub use similarity::{Feature, FeatureWeights, SimilarBrew};

use crate::error::{NotFoundError, QueryError, QueryResult};
use crate::graph::{EdgeKind, GraphStore, Node, NodeId, NodeKind};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which edges of a node to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Direction::Outgoing => "out",
            Direction::Incoming => "in",
            Direction::Both => "both",
        };
        f.write_str(text)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "out" | "outgoing" => Ok(Direction::Outgoing),
            "in" | "incoming" => Ok(Direction::Incoming),
            "both" | "any" => Ok(Direction::Both),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Query engine over a borrowed graph store
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'g> {
    store: &'g GraphStore,
}

impl<'g> QueryEngine<'g> {
    pub fn new(store: &'g GraphStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'g GraphStore {
        self.store
    }

    /// Nodes adjacent to `node`, optionally through one edge kind only
    pub fn neighbors(
        &self,
        node: NodeId,
        edge_kind: Option<EdgeKind>,
        direction: Direction,
    ) -> QueryResult<BTreeSet<NodeId>> {
        if !self.store.has_node(node) {
            return Err(QueryError::UnknownNode(node));
        }

        let mut result = BTreeSet::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            result.extend(
                self.store
                    .outgoing_edges(node, edge_kind)
                    .into_iter()
                    .map(|e| e.target),
            );
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            result.extend(
                self.store
                    .incoming_edges(node, edge_kind)
                    .into_iter()
                    .map(|e| e.source),
            );
        }
        Ok(result)
    }

    /// BrewSession by brew_id, matched the way the registry matches keys
    pub fn session(&self, brew_id: &str) -> QueryResult<&'g Node> {
        self.store.session_by_brew_id(brew_id).ok_or_else(|| {
            NotFoundError {
                kind: NodeKind::BrewSession,
                key: brew_id.to_string(),
            }
            .into()
        })
    }

    /// The SensoryEvaluation owned by a session
    pub fn evaluation_of(&self, session: NodeId) -> QueryResult<&'g Node> {
        if !self.store.has_node(session) {
            return Err(QueryError::UnknownNode(session));
        }
        self.store
            .first_target(session, EdgeKind::EvaluatedAs)
            .ok_or_else(|| {
                NotFoundError {
                    kind: NodeKind::SensoryEvaluation,
                    key: session.to_string(),
                }
                .into()
            })
    }
}
