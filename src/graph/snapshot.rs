//! Read-only export of the finished graph for rendering layers

use super::property::PropertyMap;
use super::store::GraphStore;
use super::types::{EdgeKind, NodeKind};
use serde::Serialize;

/// One node as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: u64,
    pub kind: NodeKind,
    pub key: String,
    pub label: String,
    pub properties: PropertyMap,
}

/// One edge as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub kind: EdgeKind,
    pub properties: PropertyMap,
}

/// Every node and edge of a graph, in id order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl GraphSnapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl GraphStore {
    /// Copy the graph into a renderer-facing snapshot
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .nodes()
                .map(|n| NodeView {
                    id: n.id.as_u64(),
                    kind: n.kind,
                    key: n.key.clone(),
                    label: n.display_label(),
                    properties: n.properties.clone(),
                })
                .collect(),
            edges: self
                .edges()
                .map(|e| EdgeView {
                    id: e.id.as_u64(),
                    source: e.source.as_u64(),
                    target: e.target.as_u64(),
                    kind: e.kind,
                    properties: e.properties.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_shape() {
        let mut store = GraphStore::new();
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), "Onyx".into());
        let roaster = store.create_node(NodeKind::Roaster, "roaster:onyx", props);
        let mut props = PropertyMap::new();
        props.insert("coffee_name".to_string(), "Geometry".into());
        let lot = store.create_node(NodeKind::BeanLot, "bean:onyx:geometry", props);
        store
            .create_edge(roaster, lot, EdgeKind::Produces, PropertyMap::new())
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].label, "Geometry");

        let json: serde_json::Value =
            serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["nodes"][0]["kind"], "Roaster");
        assert_eq!(json["nodes"][0]["key"], "roaster:onyx");
        assert_eq!(json["nodes"][0]["properties"]["name"], "Onyx");
        assert_eq!(json["edges"][0]["kind"], "PRODUCES");
        assert_eq!(json["edges"][0]["source"], 0);
        assert_eq!(json["edges"][0]["target"], 1);
    }
}
