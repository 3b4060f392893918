//! Brewgraph
//!
//! A knowledge graph of coffee-brewing experiments. A flat log of brew
//! records is turned into a typed property graph linking coffee provenance,
//! brewing equipment, brewing parameters and sensory outcomes, which can
//! then be explored with read-only queries.
//!
//! # Architecture
//!
//! - [`registry`]: natural key -> node identity, deduplicating shared entities
//! - [`builder`]: validated records -> nodes and typed, attributed edges
//! - [`graph`]: the in-memory store both sides operate on
//! - [`query`]: neighbors, attribute filters, similar brews, outcome groups
//!
//! # Graph model
//!
//! - Roaster -PRODUCES-> BeanLot -ROASTED_AS-> RoastBatch
//! - BrewSession -USES_ROAST-> RoastBatch
//! - BrewSession -USES_GRINDER-> Grinder {grind_setting}
//! - BrewSession -BREWED_WITH-> Brewer {brew_method, method parameters}
//! - BrewSession -EVALUATED_AS-> SensoryEvaluation -HAS_NOTE-> FlavorNote {intensity}
//!
//! ## Example Usage
//!
//! ```rust
//! use brewgraph::{build, BrewRecord, Direction, EdgeKind, FeatureWeights, NodeKind, QueryEngine};
//!
//! let brew = |id: &str, overall: &str| {
//!     BrewRecord::new()
//!         .with("brew_id", id)
//!         .with("barista", "Sam")
//!         .with("brew_date", "2024-03-10")
//!         .with("roaster", "Onyx")
//!         .with("coffee_name", "Geometry")
//!         .with("roast_level", "Light")
//!         .with("brew_method", "pourover")
//!         .with("brewer_brand", "Hario")
//!         .with("brewer_model", "V60")
//!         .with("dose_g", "15")
//!         .with("total_brew_time_sec", "180")
//!         .with("notes_intensities", "chocolate:4;fruit:3")
//!         .with("sweetness_0_10", "7")
//!         .with("acidity_0_10", "6")
//!         .with("bitterness_0_10", "2")
//!         .with("body_0_10", "5")
//!         .with("overall_0_10", overall)
//! };
//!
//! let graph = build([brew("B1", "8"), brew("B2", "6"), brew("B3", "7.5")]).unwrap();
//! assert_eq!(graph.count_nodes(NodeKind::Brewer), 1);
//! assert_eq!(graph.count_edges(EdgeKind::BrewedWith), 3);
//!
//! let engine = QueryEngine::new(&graph);
//! let b1 = engine.session("B1").unwrap();
//! let brewer = engine
//!     .neighbors(b1.id, Some(EdgeKind::BrewedWith), Direction::Outgoing)
//!     .unwrap();
//! assert_eq!(brewer.len(), 1);
//!
//! let similar = engine.similar_brews("B1", 1, &FeatureWeights::default()).unwrap();
//! assert_eq!(similar[0].brew_id, "B3");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod query;
pub mod record;
pub mod registry;

// Re-export main types for convenience
pub use builder::{build, build_with_config, BuildOutcome, BuildReport, BuildWarning, GraphBuilder};

pub use config::{BuildConfig, Config, SimilarityConfig, Strictness};

pub use error::{
    BuildError, BuildResult, ConfigError, DuplicateKeyError, GraphError, GraphResult,
    NotFoundError, QueryError, QueryResult, RecordError, RecordErrorReason, ValidationError,
};

pub use graph::{
    Edge, EdgeId, EdgeKind, GraphSnapshot, GraphStatistics, GraphStore, Node, NodeId, NodeKind,
    PropertyMap, PropertyValue,
};

pub use query::{
    Condition, Direction, Feature, FeatureWeights, NodePredicate, OutcomeGroup, Predicate,
    QueryEngine, SimilarBrew,
};

pub use record::{BrewRecord, Rating, REQUIRED_COLUMNS};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<GraphStore>();
        assert_sync::<QueryEngine<'static>>();
    }
}
