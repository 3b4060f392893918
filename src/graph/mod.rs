//! Core property graph implementation
//!
//! This module implements the typed brewing graph with:
//! - Nodes of a closed set of entity kinds, each with a slug key and properties
//! - Directed, typed edges with properties
//! - Multiple edges between the same nodes
//! - In-memory storage with hash-based adjacency indices

pub mod edge;
pub mod node;
pub mod property;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use snapshot::{EdgeView, GraphSnapshot, NodeView};
pub use store::{GraphStatistics, GraphStore};
pub use types::{EdgeId, EdgeKind, NodeId, NodeKind};
