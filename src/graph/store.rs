//! In-memory graph storage
//!
//! Nodes and edges live in dense arenas addressed by their ids. Side
//! indices keyed by `(node, edge kind)` give amortized O(1) lookup of
//! outgoing and incoming edges, and a kind index serves typed scans.
//!
//! Mutation is crate-private: only the builder writes, everything outside
//! the crate sees a read-only store.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::types::{EdgeId, EdgeKind, NodeId, NodeKind};
use crate::error::{GraphError, GraphResult};
use crate::registry::normalize;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// In-memory graph storage
///
/// - nodes: NodeId -> Node (arena, id == index)
/// - edges: EdgeId -> Edge (arena, id == index)
/// - outgoing: (source, kind) -> Vec<EdgeId>
/// - incoming: (target, kind) -> Vec<EdgeId>
/// - kind_index: NodeKind -> Vec<NodeId> in creation order
/// - brew_index: normalized brew_id -> BrewSession
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: FxHashMap<(NodeId, EdgeKind), Vec<EdgeId>>,
    incoming: FxHashMap<(NodeId, EdgeKind), Vec<EdgeId>>,
    kind_index: FxHashMap<NodeKind, Vec<NodeId>>,
    edge_kind_counts: FxHashMap<EdgeKind, usize>,
    brew_index: FxHashMap<String, NodeId>,
}

/// Node and edge counts, overall and per kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
}

impl GraphStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a node with the next free id
    pub(crate) fn create_node(
        &mut self,
        kind: NodeKind,
        key: impl Into<String>,
        properties: PropertyMap,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        let node = Node::new(id, kind, key, properties);
        if node.is(NodeKind::BrewSession) {
            if let Some(brew_id) = node.get_str("brew_id") {
                self.brew_index.entry(normalize(brew_id)).or_insert(id);
            }
        }
        self.nodes.push(node);
        self.kind_index.entry(kind).or_default().push(id);
        id
    }

    /// Create a directed edge between two existing nodes
    ///
    /// Endpoint kinds must match the relationship's schema.
    pub(crate) fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        let source_kind = self
            .get_node(source)
            .ok_or(GraphError::InvalidEdgeSource(source))?
            .kind;
        let target_kind = self
            .get_node(target)
            .ok_or(GraphError::InvalidEdgeTarget(target))?
            .kind;
        if kind.endpoints() != (source_kind, target_kind) {
            return Err(GraphError::EndpointMismatch {
                edge: kind,
                source_kind,
                target_kind,
            });
        }

        let id = EdgeId::new(self.edges.len() as u64);
        self.edges.push(Edge::new(id, source, target, kind, properties));

        // Update adjacency indices
        self.outgoing.entry((source, kind)).or_default().push(id);
        self.incoming.entry((target, kind)).or_default().push(id);
        *self.edge_kind_counts.entry(kind).or_default() += 1;

        Ok(id)
    }

    /// Create the edge unless an edge of this kind already links the pair.
    ///
    /// Returns the edge id and whether it was newly created.
    pub(crate) fn ensure_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
        properties: PropertyMap,
    ) -> GraphResult<(EdgeId, bool)> {
        if let Some(existing) = self.find_edge(source, target, kind) {
            return Ok((existing, false));
        }
        self.create_edge(source, target, kind, properties)
            .map(|id| (id, true))
    }

    /// First edge of `kind` from `source` to `target`
    pub fn find_edge(&self, source: NodeId, target: NodeId, kind: EdgeKind) -> Option<EdgeId> {
        self.outgoing
            .get(&(source, kind))?
            .iter()
            .copied()
            .find(|&id| self.edges[id.index()].target == target)
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Get a node, failing with `GraphError::NodeNotFound`
    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.get_node(id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Get an edge, failing with `GraphError::EdgeNotFound`
    pub fn edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.get_edge(id).ok_or(GraphError::EdgeNotFound(id))
    }

    /// BrewSession with the given brew_id, compared after normalization
    pub fn session_by_brew_id(&self, brew_id: &str) -> Option<&Node> {
        self.brew_index
            .get(&normalize(brew_id))
            .and_then(|id| self.get_node(*id))
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Outgoing edges of a node, optionally restricted to one kind.
    ///
    /// Ordered by edge kind, then creation order.
    pub fn outgoing_edges(&self, node: NodeId, kind: Option<EdgeKind>) -> Vec<&Edge> {
        self.collect_adjacent(&self.outgoing, node, kind)
    }

    /// Incoming edges of a node, optionally restricted to one kind
    pub fn incoming_edges(&self, node: NodeId, kind: Option<EdgeKind>) -> Vec<&Edge> {
        self.collect_adjacent(&self.incoming, node, kind)
    }

    fn collect_adjacent(
        &self,
        index: &FxHashMap<(NodeId, EdgeKind), Vec<EdgeId>>,
        node: NodeId,
        kind: Option<EdgeKind>,
    ) -> Vec<&Edge> {
        let kinds: &[EdgeKind] = match &kind {
            Some(k) => std::slice::from_ref(k),
            None => &EdgeKind::ALL,
        };
        kinds
            .iter()
            .filter_map(|k| index.get(&(node, *k)))
            .flatten()
            .map(|id| &self.edges[id.index()])
            .collect()
    }

    /// Target of the first outgoing edge of `kind`
    pub fn first_target(&self, node: NodeId, kind: EdgeKind) -> Option<&Node> {
        let edge_id = self.outgoing.get(&(node, kind))?.first()?;
        self.get_node(self.edges[edge_id.index()].target)
    }

    /// First outgoing edge of `kind`
    pub fn first_outgoing(&self, node: NodeId, kind: EdgeKind) -> Option<&Edge> {
        let edge_id = self.outgoing.get(&(node, kind))?.first()?;
        self.get_edge(*edge_id)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// All edges in id order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Nodes of one kind, in creation order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> + '_ {
        self.kind_index
            .get(&kind)
            .into_iter()
            .flatten()
            .map(move |id| &self.nodes[id.index()])
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of nodes of one kind
    pub fn count_nodes(&self, kind: NodeKind) -> usize {
        self.kind_index.get(&kind).map_or(0, Vec::len)
    }

    /// Number of edges of one kind
    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.edge_kind_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Summary counts for reporting
    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            nodes_by_kind: NodeKind::ALL
                .into_iter()
                .map(|k| (k, self.count_nodes(k)))
                .collect(),
            edges_by_kind: EdgeKind::ALL
                .into_iter()
                .map(|k| (k, self.count_edges(k)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), name.into());
        props
    }

    #[test]
    fn test_create_and_get_node() {
        let mut store = GraphStore::new();
        let node_id = store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));

        assert_eq!(store.node_count(), 1);
        let node = store.get_node(node_id).unwrap();
        assert_eq!(node.id, node_id);
        assert!(node.is(NodeKind::Roaster));
        assert_eq!(node.get_str("name"), Some("Onyx"));
        assert_eq!(store.count_nodes(NodeKind::Roaster), 1);
        assert_eq!(store.count_nodes(NodeKind::Brewer), 0);
    }

    #[test]
    fn test_create_and_get_edge() {
        let mut store = GraphStore::new();
        let roaster = store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));
        let lot = store.create_node(NodeKind::BeanLot, "bean:onyx:geometry", PropertyMap::new());

        let edge_id = store
            .create_edge(roaster, lot, EdgeKind::Produces, PropertyMap::new())
            .unwrap();

        assert_eq!(store.edge_count(), 1);
        let edge = store.get_edge(edge_id).unwrap();
        assert_eq!(edge.source, roaster);
        assert_eq!(edge.target, lot);
        assert_eq!(edge.kind, EdgeKind::Produces);
        assert_eq!(store.count_edges(EdgeKind::Produces), 1);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = GraphStore::new();
        let roaster = store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));
        let grinder = store.create_node(NodeKind::Grinder, "grinder:c40", named("C40"));
        let invalid_node = NodeId::new(999);

        let result = store.create_edge(invalid_node, roaster, EdgeKind::Produces, PropertyMap::new());
        assert_eq!(result, Err(GraphError::InvalidEdgeSource(invalid_node)));

        let result = store.create_edge(roaster, invalid_node, EdgeKind::Produces, PropertyMap::new());
        assert_eq!(result, Err(GraphError::InvalidEdgeTarget(invalid_node)));

        let result = store.create_edge(roaster, grinder, EdgeKind::Produces, PropertyMap::new());
        assert!(matches!(result, Err(GraphError::EndpointMismatch { .. })));
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_ensure_edge_is_idempotent() {
        let mut store = GraphStore::new();
        let roaster = store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));
        let lot = store.create_node(NodeKind::BeanLot, "bean:onyx:geometry", PropertyMap::new());

        let (first, created) = store
            .ensure_edge(roaster, lot, EdgeKind::Produces, PropertyMap::new())
            .unwrap();
        assert!(created);
        let (second, created) = store
            .ensure_edge(roaster, lot, EdgeKind::Produces, PropertyMap::new())
            .unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_adjacency_indices() {
        let mut store = GraphStore::new();
        let session = store.create_node(NodeKind::BrewSession, "brew:b1", PropertyMap::new());
        let brewer = store.create_node(NodeKind::Brewer, "brewer:hario-v60", PropertyMap::new());
        let grinder = store.create_node(NodeKind::Grinder, "grinder:c40", named("C40"));
        let eval = store.create_node(NodeKind::SensoryEvaluation, "eval:b1", PropertyMap::new());

        store.create_edge(session, brewer, EdgeKind::BrewedWith, PropertyMap::new()).unwrap();
        store.create_edge(session, grinder, EdgeKind::UsesGrinder, PropertyMap::new()).unwrap();
        store.create_edge(session, eval, EdgeKind::EvaluatedAs, PropertyMap::new()).unwrap();

        assert_eq!(store.outgoing_edges(session, None).len(), 3);
        assert_eq!(store.outgoing_edges(session, Some(EdgeKind::BrewedWith)).len(), 1);
        assert_eq!(store.outgoing_edges(session, Some(EdgeKind::HasNote)).len(), 0);
        assert_eq!(store.incoming_edges(brewer, None).len(), 1);
        assert_eq!(store.incoming_edges(brewer, Some(EdgeKind::UsesGrinder)).len(), 0);
        assert_eq!(store.outgoing_edges(brewer, None).len(), 0);

        assert_eq!(store.first_target(session, EdgeKind::EvaluatedAs).map(|n| n.id), Some(eval));
        assert!(store.first_target(session, EdgeKind::UsesRoast).is_none());
    }

    #[test]
    fn test_session_index() {
        let mut store = GraphStore::new();
        let mut props = PropertyMap::new();
        props.insert("brew_id".to_string(), "B 001".into());
        let session = store.create_node(NodeKind::BrewSession, "brew:b-001", props);
        store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));

        assert_eq!(store.session_by_brew_id("  b   001").map(|n| n.id), Some(session));
        assert!(store.session_by_brew_id("B001").is_none());
        assert!(store.session_by_brew_id("Onyx").is_none());
    }

    #[test]
    fn test_kind_index_preserves_creation_order() {
        let mut store = GraphStore::new();
        let a = store.create_node(NodeKind::FlavorNote, "note:cocoa", named("cocoa"));
        store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));
        let b = store.create_node(NodeKind::FlavorNote, "note:plum", named("plum"));

        let notes: Vec<NodeId> = store.nodes_of_kind(NodeKind::FlavorNote).map(|n| n.id).collect();
        assert_eq!(notes, vec![a, b]);
        assert_eq!(store.nodes_of_kind(NodeKind::Grinder).count(), 0);
    }

    #[test]
    fn test_statistics() {
        let mut store = GraphStore::new();
        let roaster = store.create_node(NodeKind::Roaster, "roaster:onyx", named("Onyx"));
        let lot = store.create_node(NodeKind::BeanLot, "bean:onyx:geometry", PropertyMap::new());
        store.create_edge(roaster, lot, EdgeKind::Produces, PropertyMap::new()).unwrap();

        let stats = store.statistics();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.nodes_by_kind[&NodeKind::BeanLot], 1);
        assert_eq!(stats.nodes_by_kind[&NodeKind::FlavorNote], 0);
        assert_eq!(stats.edges_by_kind[&EdgeKind::Produces], 1);
    }

    #[test]
    fn test_missing_lookups() {
        let store = GraphStore::new();
        assert_eq!(store.node(NodeId::new(3)).unwrap_err(), GraphError::NodeNotFound(NodeId::new(3)));
        assert_eq!(store.edge(EdgeId::new(3)).unwrap_err(), GraphError::EdgeNotFound(EdgeId::new(3)));
        assert!(!store.has_node(NodeId::new(0)));
    }
}
