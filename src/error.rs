//! Error types for graph construction and querying

use crate::graph::{EdgeId, NodeId, NodeKind};
use thiserror::Error;

/// Errors raised by the graph store itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Invalid edge: {edge} cannot connect {source_kind} to {target_kind}")]
    EndpointMismatch {
        edge: crate::graph::EdgeKind,
        source_kind: NodeKind,
        target_kind: NodeKind,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A natural key component is missing or blank
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} key component '{field}' is missing or blank{}", brew_suffix(.brew_id))]
pub struct ValidationError {
    pub kind: NodeKind,
    pub field: String,
    pub brew_id: Option<String>,
}

impl ValidationError {
    pub fn new(kind: NodeKind, field: impl Into<String>) -> Self {
        ValidationError {
            kind,
            field: field.into(),
            brew_id: None,
        }
    }

    /// Attach the brew_id of the record being processed
    pub fn for_brew(mut self, brew_id: impl Into<String>) -> Self {
        self.brew_id = Some(brew_id.into());
        self
    }
}

fn brew_suffix(brew_id: &Option<String>) -> String {
    match brew_id {
        Some(id) => format!(" (brew_id {})", id),
        None => String::new(),
    }
}

/// Why a record field was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordErrorReason {
    #[error("is missing or blank")]
    Missing,

    #[error("is not numeric: '{0}'")]
    NotNumeric(String),

    #[error("value {value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("value {0} must not be negative")]
    Negative(f64),
}

/// A record failed required-field or range validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("record {brew_id}: field '{field}' {reason}")]
pub struct RecordError {
    pub brew_id: String,
    pub field: String,
    pub reason: RecordErrorReason,
}

impl RecordError {
    pub fn new(brew_id: impl Into<String>, field: impl Into<String>, reason: RecordErrorReason) -> Self {
        RecordError {
            brew_id: brew_id.into(),
            field: field.into(),
            reason,
        }
    }
}

/// The same brew_id appeared twice in the input
#[derive(Error, Debug, Clone, PartialEq)]
#[error("duplicate brew_id '{brew_id}'")]
pub struct DuplicateKeyError {
    pub brew_id: String,
}

/// A query referenced an entity that does not exist
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} '{key}' not found")]
pub struct NotFoundError {
    pub kind: NodeKind,
    pub key: String,
}

/// Top-level failure of a graph build
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("duplicate key: {0}")]
    DuplicateKey(#[from] DuplicateKeyError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl BuildError {
    /// brew_id of the offending record, when known
    pub fn brew_id(&self) -> Option<&str> {
        match self {
            BuildError::Validation(e) => e.brew_id.as_deref(),
            BuildError::Record(e) => Some(&e.brew_id),
            BuildError::DuplicateKey(e) => Some(&e.brew_id),
            BuildError::Graph(_) => None,
        }
    }

    /// Offending field, when known
    pub fn field(&self) -> Option<&str> {
        match self {
            BuildError::Validation(e) => Some(&e.field),
            BuildError::Record(e) => Some(&e.field),
            BuildError::DuplicateKey(_) => Some("brew_id"),
            BuildError::Graph(_) => None,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised by read-only queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("Node {0} not found")]
    UnknownNode(NodeId),

    #[error("invalid weight {weight} for feature {feature}: weights must be finite and non-negative")]
    InvalidWeight { feature: String, weight: f64 },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Errors loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
