//! Error types used by the crate.

use geograph_types::error::GeographTypesError;
use thiserror::Error;

use crate::graph::{EdgeId, NodeId};
use crate::traversal::TraversalState;

/// Geograph error type.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// Coordinate with NaN or infinite component was given as an input.
    #[error("invalid coordinate ({x}, {y})")]
    InvalidCoordinate {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
    },
    /// Node does not exist in the graph or was removed.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// Edge does not exist in the graph or was removed.
    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),
    /// Traversal operation is not allowed in the current state: a traversal can only be started when it is ready,
    /// and only resumed when it is suspended.
    #[error("operation is not allowed in traversal state {0:?}")]
    InvalidTraversalState(TraversalState),
    /// Error returned by a graph visitor.
    #[error("visitor failed: {0}")]
    Visitor(String),
}

impl From<GeographTypesError> for GraphError {
    fn from(value: GeographTypesError) -> Self {
        match value {
            GeographTypesError::NonFinite { x, y } => Self::InvalidCoordinate { x, y },
        }
    }
}
