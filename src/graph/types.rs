//! Core type definitions for the brewing graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// Entity type of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum NodeKind {
    Roaster,
    BeanLot,
    RoastBatch,
    Grinder,
    Brewer,
    BrewSession,
    SensoryEvaluation,
    FlavorNote,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Roaster,
        NodeKind::BeanLot,
        NodeKind::RoastBatch,
        NodeKind::Grinder,
        NodeKind::Brewer,
        NodeKind::BrewSession,
        NodeKind::SensoryEvaluation,
        NodeKind::FlavorNote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Roaster => "Roaster",
            NodeKind::BeanLot => "BeanLot",
            NodeKind::RoastBatch => "RoastBatch",
            NodeKind::Grinder => "Grinder",
            NodeKind::Brewer => "Brewer",
            NodeKind::BrewSession => "BrewSession",
            NodeKind::SensoryEvaluation => "SensoryEvaluation",
            NodeKind::FlavorNote => "FlavorNote",
        }
    }

    /// Prefix of the node's slug key (e.g. `brewer:hario-v60`)
    pub fn slug_prefix(&self) -> &'static str {
        match self {
            NodeKind::Roaster => "roaster",
            NodeKind::BeanLot => "bean",
            NodeKind::RoastBatch => "roast",
            NodeKind::Grinder => "grinder",
            NodeKind::Brewer => "brewer",
            NodeKind::BrewSession => "brew",
            NodeKind::SensoryEvaluation => "eval",
            NodeKind::FlavorNote => "note",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown node kind '{}'", s))
    }
}

/// Relationship type of a directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Roaster -> BeanLot
    Produces,
    /// BeanLot -> RoastBatch
    RoastedAs,
    /// BrewSession -> RoastBatch
    UsesRoast,
    /// BrewSession -> Grinder
    UsesGrinder,
    /// BrewSession -> Brewer
    BrewedWith,
    /// BrewSession -> SensoryEvaluation
    EvaluatedAs,
    /// SensoryEvaluation -> FlavorNote
    HasNote,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 7] = [
        EdgeKind::Produces,
        EdgeKind::RoastedAs,
        EdgeKind::UsesRoast,
        EdgeKind::UsesGrinder,
        EdgeKind::BrewedWith,
        EdgeKind::EvaluatedAs,
        EdgeKind::HasNote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Produces => "PRODUCES",
            EdgeKind::RoastedAs => "ROASTED_AS",
            EdgeKind::UsesRoast => "USES_ROAST",
            EdgeKind::UsesGrinder => "USES_GRINDER",
            EdgeKind::BrewedWith => "BREWED_WITH",
            EdgeKind::EvaluatedAs => "EVALUATED_AS",
            EdgeKind::HasNote => "HAS_NOTE",
        }
    }

    /// The (source, target) node kinds this edge connects
    pub fn endpoints(&self) -> (NodeKind, NodeKind) {
        match self {
            EdgeKind::Produces => (NodeKind::Roaster, NodeKind::BeanLot),
            EdgeKind::RoastedAs => (NodeKind::BeanLot, NodeKind::RoastBatch),
            EdgeKind::UsesRoast => (NodeKind::BrewSession, NodeKind::RoastBatch),
            EdgeKind::UsesGrinder => (NodeKind::BrewSession, NodeKind::Grinder),
            EdgeKind::BrewedWith => (NodeKind::BrewSession, NodeKind::Brewer),
            EdgeKind::EvaluatedAs => (NodeKind::BrewSession, NodeKind::SensoryEvaluation),
            EdgeKind::HasNote => (NodeKind::SensoryEvaluation, NodeKind::FlavorNote),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        EdgeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown edge kind '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "NodeId(42)");

        let id2: NodeId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(99);
        assert_eq!(id.as_u64(), 99);
        assert_eq!(format!("{}", id), "EdgeId(99)");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::SensoryEvaluation.to_string(), "SensoryEvaluation");
        assert_eq!(EdgeKind::BrewedWith.to_string(), "BREWED_WITH");
        assert_eq!("brewer".parse::<NodeKind>(), Ok(NodeKind::Brewer));
        assert_eq!("has-note".parse::<EdgeKind>(), Ok(EdgeKind::HasNote));
        assert!("Teapot".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_edge_kind_serializes_as_relationship_name() {
        let json = serde_json::to_string(&EdgeKind::UsesGrinder).unwrap();
        assert_eq!(json, "\"USES_GRINDER\"");
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            EdgeKind::HasNote.endpoints(),
            (NodeKind::SensoryEvaluation, NodeKind::FlavorNote)
        );
    }

    #[test]
    fn test_id_ordering() {
        let id1 = NodeId::new(1);
        let id2 = NodeId::new(2);
        assert!(id1 < id2);
    }
}
