//! Callbacks called by [`GraphTraversal`](crate::GraphTraversal) for every visited node and edge.

use crate::error::GraphError;
use crate::graph::{EdgeId, Graph, NodeId};

/// Tells the traversal how to proceed after a node is visited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VisitResult {
    /// Continue the traversal through the node's neighbors.
    Continue,
    /// Do not continue the traversal through this node, but go on with the rest of the frontier.
    SkipBranch,
    /// Pause the traversal. It can be continued later with [`GraphTraversal::resume`](crate::GraphTraversal::resume).
    Suspend,
    /// End the traversal immediately.
    Stop,
}

/// Node and edge visitor.
///
/// Any `FnMut(&Graph<N, E>, NodeId) -> Result<VisitResult, GraphError>` closure is a node-only visitor.
pub trait GraphVisitor<N, E> {
    /// Called once for every node produced by the traversal iterator.
    ///
    /// An error returned from this method ends the traversal and is returned to the caller unchanged.
    fn visit(&mut self, graph: &Graph<N, E>, node: NodeId) -> Result<VisitResult, GraphError>;

    /// Called for the edges of a node the traversal continues through, after [`GraphVisitor::visit`] of that node
    /// returned `Continue` or `Suspend`. Every edge is reported at most once per run, from the first of its nodes
    /// that is continued through.
    ///
    /// Returning `SkipBranch` stops reporting the remaining edges of the node and does not continue the traversal
    /// through it. `Suspend`, `Stop` and errors act the same way as for nodes.
    fn visit_edge(
        &mut self,
        _graph: &Graph<N, E>,
        _edge: EdgeId,
    ) -> Result<VisitResult, GraphError> {
        Ok(VisitResult::Continue)
    }

    /// Called by [`GraphTraversal::traverse_all`](crate::GraphTraversal::traverse_all) before a new connected
    /// component is entered from `seed`.
    fn start_component(&mut self, _seed: NodeId) {}

    /// Called when the traversal is completed (every reachable node was visited).
    fn finish(&mut self) {}
}

impl<N, E, F> GraphVisitor<N, E> for F
where
    F: FnMut(&Graph<N, E>, NodeId) -> Result<VisitResult, GraphError>,
{
    fn visit(&mut self, graph: &Graph<N, E>, node: NodeId) -> Result<VisitResult, GraphError> {
        self(graph, node)
    }
}

/// Counts visited nodes that have no edges.
#[derive(Debug, Default, Clone)]
pub struct OrphanCounter {
    orphans: usize,
    visited: usize,
}

impl OrphanCounter {
    /// Creates a new counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orphan nodes among visited ones.
    pub fn orphans(&self) -> usize {
        self.orphans
    }

    /// Total number of visited nodes.
    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl<N, E> GraphVisitor<N, E> for OrphanCounter {
    fn visit(&mut self, graph: &Graph<N, E>, node: NodeId) -> Result<VisitResult, GraphError> {
        self.visited += 1;
        if graph.node(node)?.is_orphan() {
            self.orphans += 1;
        }

        Ok(VisitResult::Continue)
    }
}

/// Records visited nodes in the visiting order.
#[derive(Debug, Default, Clone)]
pub struct NodeCollector {
    nodes: Vec<NodeId>,
    is_finished: bool,
}

impl NodeCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visited nodes.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Consumes the collector returning the visited nodes.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Returns true if the traversal reported completion.
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }
}

impl<N, E> GraphVisitor<N, E> for NodeCollector {
    fn visit(&mut self, _graph: &Graph<N, E>, node: NodeId) -> Result<VisitResult, GraphError> {
        self.nodes.push(node);
        Ok(VisitResult::Continue)
    }

    fn finish(&mut self) {
        self.is_finished = true;
    }
}

/// Records visited edges in the visiting order.
#[derive(Debug, Default, Clone)]
pub struct EdgeCollector {
    edges: Vec<EdgeId>,
}

impl EdgeCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visited edges.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Consumes the collector returning the visited edges.
    pub fn into_edges(self) -> Vec<EdgeId> {
        self.edges
    }
}

impl<N, E> GraphVisitor<N, E> for EdgeCollector {
    fn visit(&mut self, _graph: &Graph<N, E>, _node: NodeId) -> Result<VisitResult, GraphError> {
        Ok(VisitResult::Continue)
    }

    fn visit_edge(
        &mut self,
        _graph: &Graph<N, E>,
        edge: EdgeId,
    ) -> Result<VisitResult, GraphError> {
        self.edges.push(edge);
        Ok(VisitResult::Continue)
    }
}

/// Groups visited nodes by connected component.
///
/// Meant to be used with [`GraphTraversal::traverse_all`](crate::GraphTraversal::traverse_all), which notifies the
/// visitor every time it starts walking a new component.
#[derive(Debug, Default, Clone)]
pub struct ComponentCollector {
    components: Vec<Vec<NodeId>>,
}

impl ComponentCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected components in the order they were walked.
    pub fn components(&self) -> &[Vec<NodeId>] {
        &self.components
    }

    /// Consumes the collector returning the components.
    pub fn into_components(self) -> Vec<Vec<NodeId>> {
        self.components
    }
}

impl<N, E> GraphVisitor<N, E> for ComponentCollector {
    fn visit(&mut self, _graph: &Graph<N, E>, node: NodeId) -> Result<VisitResult, GraphError> {
        match self.components.last_mut() {
            Some(component) => component.push(node),
            None => self.components.push(vec![node]),
        }

        Ok(VisitResult::Continue)
    }

    fn start_component(&mut self, _seed: NodeId) {
        self.components.push(vec![]);
    }
}
