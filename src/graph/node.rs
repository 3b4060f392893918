//! Node implementation for the brewing graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Nodes have:
/// - A unique ID
/// - An entity kind
/// - A slug key derived from the entity's natural key (`brewer:hario-v60`)
/// - Properties (key-value pairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Entity kind of this node
    pub kind: NodeKind,

    /// Human-readable stable key
    pub key: String,

    /// Properties associated with this node
    pub properties: PropertyMap,
}

impl Node {
    /// Create a new node with properties
    pub fn new(id: NodeId, kind: NodeKind, key: impl Into<String>, properties: PropertyMap) -> Self {
        Node {
            id,
            kind,
            key: key.into(),
            properties,
        }
    }

    /// Check if node is of a specific kind
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Get a string property
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_property(key).and_then(PropertyValue::as_string)
    }

    /// Get a numeric property (Integer or Float)
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_property(key).and_then(PropertyValue::as_f64)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Label shown by renderers
    pub fn display_label(&self) -> String {
        let prop = |key: &str| self.get_property(key).map(|v| v.to_string()).unwrap_or_default();
        match self.kind {
            NodeKind::Roaster | NodeKind::Grinder | NodeKind::FlavorNote => prop("name"),
            NodeKind::BeanLot => prop("coffee_name"),
            NodeKind::RoastBatch => {
                format!("{} ({})", prop("coffee_name"), prop("roast_level"))
            }
            NodeKind::Brewer => format!("{} {}", prop("brand"), prop("model")).trim().to_string(),
            NodeKind::BrewSession => prop("brew_id"),
            NodeKind::SensoryEvaluation => format!("Eval {}", prop("brew_id")),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_node_properties() {
        let node = Node::new(
            NodeId::new(4),
            NodeKind::BrewSession,
            "brew:b001",
            props(&[
                ("brew_id", "B001".into()),
                ("dose_g", 15.0.into()),
                ("days_off_roast", 9i64.into()),
            ]),
        );

        assert!(node.is(NodeKind::BrewSession));
        assert_eq!(node.get_str("brew_id"), Some("B001"));
        assert_eq!(node.get_f64("dose_g"), Some(15.0));
        assert_eq!(node.get_f64("days_off_roast"), Some(9.0));
        assert_eq!(node.get_str("dose_g"), None);
        assert!(!node.has_property("barista"));
    }

    #[test]
    fn test_display_labels() {
        let brewer = Node::new(
            NodeId::new(1),
            NodeKind::Brewer,
            "brewer:hario-v60",
            props(&[("brand", "Hario".into()), ("model", "V60".into())]),
        );
        assert_eq!(brewer.display_label(), "Hario V60");

        let batch = Node::new(
            NodeId::new(2),
            NodeKind::RoastBatch,
            "roast:onyx:geometry:light",
            props(&[("coffee_name", "Geometry".into()), ("roast_level", "light".into())]),
        );
        assert_eq!(batch.display_label(), "Geometry (light)");

        let eval = Node::new(
            NodeId::new(3),
            NodeKind::SensoryEvaluation,
            "eval:b7",
            props(&[("brew_id", "B7".into())]),
        );
        assert_eq!(eval.display_label(), "Eval B7");
    }

    #[test]
    fn test_node_equality() {
        let node1 = Node::new(NodeId::new(7), NodeKind::Roaster, "roaster:a", PropertyMap::new());
        let node2 = Node::new(NodeId::new(7), NodeKind::Roaster, "roaster:b", PropertyMap::new());
        let node3 = Node::new(NodeId::new(8), NodeKind::Roaster, "roaster:a", PropertyMap::new());

        assert_eq!(node1, node2); // Same ID
        assert_ne!(node1, node3); // Different ID
    }
}
