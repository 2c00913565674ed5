//! Node/edge graph storage.
//!
//! [`Graph`] is an arena: nodes and edges are stored in vectors and referenced by [`NodeId`] and [`EdgeId`] handles.
//! A removed entity leaves a tombstone behind, so handles of the remaining entities stay valid for the whole life of
//! the graph and are never reused.
//!
//! Edges are undirected. Every node keeps the list of its incident edges in the order the edges were added, which
//! makes neighbor enumeration (and so every traversal) deterministic.

use std::fmt::{Display, Formatter};

use geograph_types::cartesian::{CartesianPoint2d, Point2d, Rect};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Handle of a node in a [`Graph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a handle from a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Index of the node in the graph's node arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of an edge in a [`Graph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Creates a handle from a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Index of the edge in the graph's edge arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Graph vertex.
#[derive(Debug, Clone)]
pub struct Node<N> {
    payload: N,
    edges: Vec<EdgeId>,
}

impl<N> Node<N> {
    /// Object associated with the node. For line graphs this is the coordinate of the node.
    pub fn payload(&self) -> &N {
        &self.payload
    }

    /// Mutable reference to the node's payload.
    pub fn payload_mut(&mut self) -> &mut N {
        &mut self.payload
    }

    /// Edges incident to the node in the order they were added.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of incident edges. Parallel edges are counted separately.
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// A node without any incident edges.
    pub fn is_orphan(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Undirected graph edge.
#[derive(Debug, Clone)]
pub struct Edge<E> {
    a: NodeId,
    b: NodeId,
    payload: E,
}

impl<E> Edge<E> {
    /// First endpoint (as given when the edge was added).
    pub fn a(&self) -> NodeId {
        self.a
    }

    /// Second endpoint.
    pub fn b(&self) -> NodeId {
        self.b
    }

    /// Both endpoints.
    pub fn nodes(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    /// Object associated with the edge, e.g. the source line or feature.
    pub fn payload(&self) -> &E {
        &self.payload
    }

    /// Mutable reference to the edge's payload.
    pub fn payload_mut(&mut self) -> &mut E {
        &mut self.payload
    }

    /// Returns the endpoint opposite to `node`, or `None` if the edge is not incident to `node`.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Returns true if the edge connects `x` and `y` in any direction.
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// Set of nodes and edges.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<Option<Node<N>>>,
    edges: Vec<Option<Edge<E>>>,
    node_count: usize,
    edge_count: usize,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_count: 0,
            edge_count: 0,
        }
    }
}

impl<N, E> Graph<N, E> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without edges.
    pub fn add_node(&mut self, payload: N) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            payload,
            edges: vec![],
        }));
        self.node_count += 1;

        id
    }

    /// Adds an edge between two existing nodes and registers it with both of them.
    ///
    /// Adding an edge which starts and ends at the same node is allowed, such an edge is registered with the node
    /// once.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, payload: E) -> Result<EdgeId, GraphError> {
        self.node(a)?;
        self.node(b)?;

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(Edge { a, b, payload }));
        self.edge_count += 1;

        self.node_mut(a)?.edges.push(id);
        if a != b {
            self.node_mut(b)?.edges.push(id);
        }

        Ok(id)
    }

    /// Removes the edge from the graph and from the incident lists of its endpoints, returning its payload.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<E, GraphError> {
        let edge = self
            .edges
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;
        self.edge_count -= 1;

        for node in [edge.a, edge.b] {
            if let Some(Some(node)) = self.nodes.get_mut(node.0) {
                node.edges.retain(|e| *e != id);
            }
        }

        Ok(edge.payload)
    }

    /// Removes the node together with all its incident edges, returning the node's payload.
    pub fn remove_node(&mut self, id: NodeId) -> Result<N, GraphError> {
        let incident = self.node(id)?.edges.clone();
        for edge in incident {
            self.remove_edge(edge)?;
        }

        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(GraphError::NodeNotFound(id))?;
        self.node_count -= 1;

        Ok(node.payload)
    }

    /// Returns the node, or an error if it doesn't exist or was removed.
    pub fn node(&self, id: NodeId) -> Result<&Node<N>, GraphError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Returns mutable reference to the node.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<N>, GraphError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Returns the edge, or an error if it doesn't exist or was removed.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge<E>, GraphError> {
        self.edges
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(GraphError::EdgeNotFound(id))
    }

    /// Returns mutable reference to the edge.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge<E>, GraphError> {
        self.edges
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(GraphError::EdgeNotFound(id))
    }

    /// Returns true if the node exists and was not removed.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Iterates over all live nodes in the order of their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<N>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_ref().map(|node| (NodeId(index), node)))
    }

    /// Iterates over all live edges in the order of their ids.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<E>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| edge.as_ref().map(|edge| (EdgeId(index), edge)))
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Size of the node id space, including removed nodes. Every valid [`NodeId::index`] is less than this value.
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Iterates over `(edge, neighbor)` pairs of the node in the order the edges were added.
    ///
    /// A node connected to another one by parallel edges yields that neighbor once per edge.
    pub fn incident(
        &self,
        id: NodeId,
    ) -> Result<impl Iterator<Item = (EdgeId, NodeId)> + '_, GraphError> {
        let node = self.node(id)?;
        Ok(node.edges.iter().filter_map(move |edge_id| {
            let edge = self.edges.get(edge_id.0)?.as_ref()?;
            Some((*edge_id, edge.other(id)?))
        }))
    }

    /// Iterates over the neighbors of the node in the order of incident edges.
    pub fn neighbors(&self, id: NodeId) -> Result<impl Iterator<Item = NodeId> + '_, GraphError> {
        Ok(self.incident(id)?.map(|(_, node)| node))
    }

    /// Returns all edges connecting the two nodes, in the order they were added.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<EdgeId>, GraphError> {
        self.node(b)?;
        Ok(self
            .incident(a)?
            .filter(|(_, other)| *other == b)
            .map(|(edge, _)| edge)
            .collect())
    }

    /// Nodes with exactly `degree` incident edges.
    pub fn nodes_of_degree(&self, degree: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(move |(_, node)| node.degree() == degree)
            .map(|(id, _)| id)
    }

    /// Nodes without incident edges.
    pub fn orphans(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of_degree(0)
    }
}

impl<E> Graph<Point2d, E> {
    /// Bounding rectangle of all node coordinates. Returns `None` for an empty graph.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.nodes().map(|(_, node)| node.payload()))
    }

    /// Finds the node closest to `coord` within `tolerance` by checking every node of the graph.
    ///
    /// If several nodes are at the same distance, the one with the lowest id is returned.
    pub fn node_at(
        &self,
        coord: &impl CartesianPoint2d<Num = f64>,
        tolerance: f64,
    ) -> Option<NodeId> {
        let tolerance_sq = tolerance.max(0.0).powi(2);
        let mut closest: Option<(NodeId, f64)> = None;
        for (id, node) in self.nodes() {
            let distance = node.payload().distance_sq(coord);
            if distance <= tolerance_sq && closest.map_or(true, |(_, d)| distance < d) {
                closest = Some((id, distance));
            }
        }

        closest.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn triangle() -> (Graph<&'static str, u32>, [NodeId; 3], [EdgeId; 3]) {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let ab = graph.add_edge(a, b, 1).expect("valid nodes");
        let bc = graph.add_edge(b, c, 2).expect("valid nodes");
        let ca = graph.add_edge(c, a, 3).expect("valid nodes");

        (graph, [a, b, c], [ab, bc, ca])
    }

    #[test]
    fn incident_edges_are_consistent() {
        let (graph, [a, b, c], [ab, bc, ca]) = triangle();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node(a).expect("exists").edges(), &[ab, ca]);
        assert_eq!(graph.node(b).expect("exists").edges(), &[ab, bc]);
        assert_eq!(
            graph.neighbors(c).expect("exists").collect::<Vec<_>>(),
            vec![b, a]
        );

        for (id, edge) in graph.edges() {
            for node in [edge.a(), edge.b()] {
                assert!(graph.node(node).expect("exists").edges().contains(&id));
            }
        }
    }

    #[test]
    fn edge_to_unknown_node() {
        let (mut graph, [a, ..], _) = triangle();
        assert_matches!(
            graph.add_edge(a, NodeId::new(10), 0),
            Err(GraphError::NodeNotFound(id)) if id == NodeId::new(10)
        );
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn remove_edge() {
        let (mut graph, [a, b, _], [ab, _, ca]) = triangle();
        assert_eq!(graph.remove_edge(ab), Ok(1));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node(a).expect("exists").edges(), &[ca]);
        assert!(graph.edges_between(a, b).expect("exist").is_empty());
        assert_matches!(graph.remove_edge(ab), Err(GraphError::EdgeNotFound(_)));
    }

    #[test]
    fn remove_node_keeps_handles_stable() {
        let (mut graph, [a, b, c], [_, bc, _]) = triangle();
        assert_eq!(graph.remove_node(a), Ok("a"));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_capacity(), 3);
        assert!(!graph.contains_node(a));
        assert_eq!(graph.node(b).expect("exists").edges(), &[bc]);
        assert_eq!(graph.node(c).expect("exists").edges(), &[bc]);
        assert_matches!(graph.node(a), Err(GraphError::NodeNotFound(_)));

        let d = graph.add_node("d");
        assert_eq!(d.index(), 3);
    }

    #[test]
    fn parallel_edges_and_degrees() {
        let mut graph = Graph::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let orphan = graph.add_node(());
        let first = graph.add_edge(a, b, ()).expect("valid");
        let second = graph.add_edge(b, a, ()).expect("valid");

        assert_eq!(graph.edges_between(a, b), Ok(vec![first, second]));
        assert_eq!(graph.nodes_of_degree(2).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(graph.orphans().collect::<Vec<_>>(), vec![orphan]);
    }

    #[test]
    fn coordinate_queries() {
        let mut graph: Graph<Point2d, ()> = Graph::new();
        assert!(graph.bounding_rect().is_none());

        let first = graph.add_node(Point2d::new(1.0, 1.0));
        graph.add_node(Point2d::new(3.0, -1.0));

        assert_eq!(graph.bounding_rect(), Some(Rect::new(1.0, -1.0, 3.0, 1.0)));
        assert_eq!(graph.node_at(&Point2d::new(1.1, 1.0), 0.2), Some(first));
        assert_eq!(graph.node_at(&Point2d::new(1.5, 1.0), 0.2), None);
    }
}
