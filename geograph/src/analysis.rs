//! Whole graph queries built on top of [`GraphTraversal`].

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};
use crate::iterator::BreadthFirstIterator;
use crate::traversal::GraphTraversal;
use crate::visitor::{ComponentCollector, OrphanCounter};

/// Splits the graph into connected components.
///
/// Components are ordered by their lowest node id, and nodes inside a component are in breadth first order from
/// that node.
pub fn connected_components<N, E>(graph: &Graph<N, E>) -> Result<Vec<Vec<NodeId>>, GraphError> {
    let mut traversal = GraphTraversal::new(
        graph,
        BreadthFirstIterator::new(),
        ComponentCollector::new(),
    );
    traversal.traverse_all()?;

    let components = traversal.into_visitor().into_components();
    log::debug!("Graph has {} connected components", components.len());

    Ok(components)
}

/// Counts nodes without edges by visiting every node of the graph.
pub fn count_orphans<N, E>(graph: &Graph<N, E>) -> Result<usize, GraphError> {
    let mut traversal =
        GraphTraversal::new(graph, BreadthFirstIterator::new(), OrphanCounter::new());
    traversal.traverse_all()?;

    Ok(traversal.visitor().orphans())
}
