//! Strategies defining the order in which a traversal visits graph nodes.
//!
//! A [`GraphIterator`] owns the traversal frontier and the visited flags of one traversal run. It is driven by a
//! [`GraphTraversal`](crate::GraphTraversal): the traversal asks for the next node, gives it to the visitor and then
//! tells the iterator whether to continue through the node ([`GraphIterator::cont`]) or not
//! ([`GraphIterator::kill_branch`]).
//!
//! Each iterator produces a node at most once per run and never leaves the connected component of the start node.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

/// Node ordering strategy.
pub trait GraphIterator<N, E> {
    /// Adds the start node of a run to the frontier. Visited flags of the previous runs are kept, so calling `init`
    /// again with an unvisited node walks another connected component.
    fn init(&mut self, graph: &Graph<N, E>, start: NodeId);

    /// Returns the next node to visit, or `None` if the frontier is exhausted.
    fn next(&mut self, graph: &Graph<N, E>) -> Option<NodeId>;

    /// Continues the traversal through the neighbors of the `node` returned by the last call to `next`.
    fn cont(&mut self, graph: &Graph<N, E>, node: NodeId);

    /// Does not continue the traversal through the `node` returned by the last call to `next`.
    fn kill_branch(&mut self, _graph: &Graph<N, E>, _node: NodeId) {}

    /// Returns true if the node is marked as visited.
    ///
    /// When a node gets marked depends on the iterator: [`BreadthFirstIterator`] marks nodes as soon as they are
    /// queued, while [`DepthFirstIterator`] and [`NoBifurcationIterator`] mark a node only when `next` produces it.
    /// Marks are kept across `init` calls until [`reset`](GraphIterator::reset).
    fn is_visited(&self, node: NodeId) -> bool;

    /// Clears the frontier and visited flags.
    fn reset(&mut self);
}

impl<N, E> GraphIterator<N, E> for Box<dyn GraphIterator<N, E> + '_> {
    fn init(&mut self, graph: &Graph<N, E>, start: NodeId) {
        (**self).init(graph, start)
    }

    fn next(&mut self, graph: &Graph<N, E>) -> Option<NodeId> {
        (**self).next(graph)
    }

    fn cont(&mut self, graph: &Graph<N, E>, node: NodeId) {
        (**self).cont(graph, node)
    }

    fn kill_branch(&mut self, graph: &Graph<N, E>, node: NodeId) {
        (**self).kill_branch(graph, node)
    }

    fn is_visited(&self, node: NodeId) -> bool {
        (**self).is_visited(node)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Visited flags of the graph nodes, indexed by [`NodeId::index`].
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    flags: Vec<bool>,
    count: usize,
}

impl VisitedSet {
    /// Marks the node as visited. Returns false if it was already marked.
    pub fn mark(&mut self, node: NodeId) -> bool {
        let index = node.index();
        if index >= self.flags.len() {
            self.flags.resize(index + 1, false);
        }

        if self.flags[index] {
            return false;
        }

        self.flags[index] = true;
        self.count += 1;
        true
    }

    /// Returns true if the node is marked.
    pub fn contains(&self, node: NodeId) -> bool {
        self.flags.get(node.index()).copied().unwrap_or(false)
    }

    /// Number of marked nodes.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no nodes are marked.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Unmarks all nodes.
    pub fn clear(&mut self) {
        self.flags.fill(false);
        self.count = 0;
    }
}

/// Visits nodes in the order of their distance (in edges) from the start node.
///
/// Nodes at the same distance are ordered by the order of edges they were discovered through.
#[derive(Debug, Clone, Default)]
pub struct BreadthFirstIterator {
    visited: VisitedSet,
    queue: VecDeque<NodeId>,
}

impl BreadthFirstIterator {
    /// Creates a new iterator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N, E> GraphIterator<N, E> for BreadthFirstIterator {
    fn init(&mut self, _graph: &Graph<N, E>, start: NodeId) {
        if self.visited.mark(start) {
            self.queue.push_back(start);
        }
    }

    fn next(&mut self, _graph: &Graph<N, E>) -> Option<NodeId> {
        self.queue.pop_front()
    }

    fn cont(&mut self, graph: &Graph<N, E>, node: NodeId) {
        let Ok(neighbors) = graph.neighbors(node) else {
            return;
        };

        for neighbor in neighbors {
            // Nodes are marked when queued, so a node reachable through several edges is queued once.
            if self.visited.mark(neighbor) {
                self.queue.push_back(neighbor);
            }
        }
    }

    fn is_visited(&self, node: NodeId) -> bool {
        self.visited.contains(node)
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.queue.clear();
    }
}

/// Goes as deep as possible along the first unvisited edge before backtracking.
#[derive(Debug, Clone, Default)]
pub struct DepthFirstIterator {
    visited: VisitedSet,
    stack: Vec<NodeId>,
}

impl DepthFirstIterator {
    /// Creates a new iterator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N, E> GraphIterator<N, E> for DepthFirstIterator {
    fn init(&mut self, _graph: &Graph<N, E>, start: NodeId) {
        if !self.visited.contains(start) {
            self.stack.push(start);
        }
    }

    fn next(&mut self, _graph: &Graph<N, E>) -> Option<NodeId> {
        pop_unvisited(&mut self.stack, &mut self.visited)
    }

    fn cont(&mut self, graph: &Graph<N, E>, node: NodeId) {
        push_neighbors(graph, node, &mut self.stack, &self.visited);
    }

    fn is_visited(&self, node: NodeId) -> bool {
        self.visited.contains(node)
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.stack.clear();
    }
}

/// Walks along a chain of nodes without branching.
///
/// The traversal continues only through nodes with at most two edges. A bifurcation node (more than two edges) is
/// produced, but the walk does not continue past it. The start node is always continued through, so starting in the
/// middle of a line walks both directions until the line ends or splits.
#[derive(Debug, Clone, Default)]
pub struct NoBifurcationIterator {
    visited: VisitedSet,
    stack: Vec<NodeId>,
    start: Option<NodeId>,
}

impl NoBifurcationIterator {
    /// Creates a new iterator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N, E> GraphIterator<N, E> for NoBifurcationIterator {
    fn init(&mut self, _graph: &Graph<N, E>, start: NodeId) {
        if !self.visited.contains(start) {
            self.start = Some(start);
            self.stack.push(start);
        }
    }

    fn next(&mut self, _graph: &Graph<N, E>) -> Option<NodeId> {
        pop_unvisited(&mut self.stack, &mut self.visited)
    }

    fn cont(&mut self, graph: &Graph<N, E>, node: NodeId) {
        let Ok(degree) = graph.node(node).map(|n| n.degree()) else {
            return;
        };

        if degree <= 2 || self.start == Some(node) {
            push_neighbors(graph, node, &mut self.stack, &self.visited);
        }
    }

    fn is_visited(&self, node: NodeId) -> bool {
        self.visited.contains(node)
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.stack.clear();
        self.start = None;
    }
}

fn pop_unvisited(stack: &mut Vec<NodeId>, visited: &mut VisitedSet) -> Option<NodeId> {
    while let Some(node) = stack.pop() {
        if visited.mark(node) {
            return Some(node);
        }
    }

    None
}

fn push_neighbors<N, E>(
    graph: &Graph<N, E>,
    node: NodeId,
    stack: &mut Vec<NodeId>,
    visited: &VisitedSet,
) {
    let Ok(neighbors) = graph.neighbors(node) else {
        return;
    };

    // Reversed, so that the first edge of the node is explored first.
    let unvisited: Vec<NodeId> = neighbors.filter(|n| !visited.contains(*n)).collect();
    stack.extend(unvisited.into_iter().rev());
}

/// Built-in traversal strategies.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalOrder {
    /// [`BreadthFirstIterator`].
    #[default]
    BreadthFirst,
    /// [`DepthFirstIterator`].
    DepthFirst,
    /// [`NoBifurcationIterator`].
    NoBifurcation,
}

impl TraversalOrder {
    /// Creates a new iterator of this kind.
    pub fn iterator<'a, N, E>(self) -> Box<dyn GraphIterator<N, E> + 'a> {
        match self {
            TraversalOrder::BreadthFirst => Box::new(BreadthFirstIterator::new()),
            TraversalOrder::DepthFirst => Box::new(DepthFirstIterator::new()),
            TraversalOrder::NoBifurcation => Box::new(NoBifurcationIterator::new()),
        }
    }
}

/// Lazy sequence of nodes reachable from a start node, created by [`Graph::walk`], [`Graph::bfs`] and
/// [`Graph::dfs`].
pub struct Walk<'g, N, E> {
    graph: &'g Graph<N, E>,
    iterator: Box<dyn GraphIterator<N, E> + 'g>,
}

impl<N, E> std::fmt::Debug for Walk<'_, N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk").finish_non_exhaustive()
    }
}

impl<N, E> Iterator for Walk<'_, N, E> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.iterator.next(self.graph)?;
        self.iterator.cont(self.graph, node);
        Some(node)
    }
}

impl<N, E> Graph<N, E> {
    /// Iterates over the nodes reachable from `start` in the given order.
    pub fn walk(&self, start: NodeId, order: TraversalOrder) -> Result<Walk<'_, N, E>, GraphError> {
        self.node(start)?;

        let mut iterator: Box<dyn GraphIterator<N, E> + '_> = order.iterator();
        iterator.init(self, start);
        Ok(Walk {
            graph: self,
            iterator,
        })
    }

    /// Breadth first walk from `start`.
    pub fn bfs(&self, start: NodeId) -> Result<Walk<'_, N, E>, GraphError> {
        self.walk(start, TraversalOrder::BreadthFirst)
    }

    /// Depth first walk from `start`.
    pub fn dfs(&self, start: NodeId) -> Result<Walk<'_, N, E>, GraphError> {
        self.walk(start, TraversalOrder::DepthFirst)
    }
}
