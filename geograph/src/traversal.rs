//! Driving a [`GraphIterator`] and a [`GraphVisitor`] over a graph.

use std::collections::VecDeque;

use crate::error::GraphError;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::iterator::GraphIterator;
use crate::visitor::{GraphVisitor, VisitResult};

/// State of a [`GraphTraversal`].
///
/// ```text
/// Ready -> Running -> Completed | Halted | Failed | Suspended
/// Suspended -> Running
/// ```
///
/// `Completed`, `Halted` and `Failed` are terminal. Only [`GraphTraversal::reset`] brings a traversal in these
/// states back to `Ready`, which starts a new run from scratch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TraversalState {
    /// Created or reset, not started yet.
    Ready,
    /// Visiting nodes.
    Running,
    /// Paused by a visitor returning [`VisitResult::Suspend`].
    Suspended,
    /// All reachable nodes were visited.
    Completed,
    /// Stopped by a visitor returning [`VisitResult::Stop`].
    Halted,
    /// A visitor returned an error.
    Failed,
}

impl TraversalState {
    /// Returns true for the states a traversal cannot continue from.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TraversalState::Completed | TraversalState::Halted | TraversalState::Failed
        )
    }
}

#[derive(Debug, Copy, Clone)]
enum RunMode {
    Single,
    AllComponents { next_seed: usize },
}

/// Edges of a continued node that are still to be given to the visitor.
#[derive(Debug)]
struct PendingEdges {
    node: NodeId,
    edges: VecDeque<EdgeId>,
}

/// Visits graph nodes in the order given by an iterator, calling the visitor for every node.
///
/// When the traversal continues through a node, the edges of that node not reported yet are given to
/// [`GraphVisitor::visit_edge`] before the next node is visited.
///
/// The traversal is single threaded and synchronous. The graph is borrowed for the life of the traversal, so it cannot
/// be modified while a traversal is in progress.
///
/// If the visitor returns an error, the traversal is left in [`TraversalState::Failed`] state. Visited flags are
/// not cleaned up in this case, call [`GraphTraversal::reset`] before running it again.
///
/// ```
/// use geograph::{BreadthFirstIterator, Graph, GraphTraversal, NodeCollector, TraversalState};
///
/// let mut graph: Graph<(), ()> = Graph::new();
/// let a = graph.add_node(());
/// let b = graph.add_node(());
/// graph.add_edge(a, b, ()).unwrap();
///
/// let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), NodeCollector::new());
/// assert_eq!(traversal.traverse(b), Ok(TraversalState::Completed));
/// assert_eq!(traversal.visitor().nodes(), &[b, a]);
/// ```
pub struct GraphTraversal<'g, N, E, I, V> {
    graph: &'g Graph<N, E>,
    iterator: I,
    visitor: V,
    state: TraversalState,
    mode: RunMode,
    visited_count: usize,
    pending: Option<PendingEdges>,
    visited_edges: Vec<bool>,
}

impl<'g, N, E, I, V> GraphTraversal<'g, N, E, I, V>
where
    I: GraphIterator<N, E>,
    V: GraphVisitor<N, E>,
{
    /// Creates a new traversal in [`TraversalState::Ready`] state.
    pub fn new(graph: &'g Graph<N, E>, iterator: I, visitor: V) -> Self {
        Self {
            graph,
            iterator,
            visitor,
            state: TraversalState::Ready,
            mode: RunMode::Single,
            visited_count: 0,
            pending: None,
            visited_edges: vec![],
        }
    }

    /// Current state.
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Number of visitor calls made since the traversal was created or reset.
    pub fn visited_count(&self) -> usize {
        self.visited_count
    }

    /// Returns true if the iterator has marked the node. See [`GraphIterator::is_visited`] for when nodes get marked.
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.iterator.is_visited(node)
    }

    /// The visitor.
    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    /// Mutable reference to the visitor.
    pub fn visitor_mut(&mut self) -> &mut V {
        &mut self.visitor
    }

    /// Consumes the traversal returning the visitor with the results it collected.
    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Visits the nodes of the connected component of `start`.
    ///
    /// Returns the state the traversal ended in: `Completed`, `Halted` or `Suspended`. Fails with
    /// [`GraphError::NodeNotFound`] without visiting anything if `start` is not in the graph, and with
    /// [`GraphError::InvalidTraversalState`] if the traversal is not in `Ready` state.
    pub fn traverse(&mut self, start: NodeId) -> Result<TraversalState, GraphError> {
        self.ensure_state(TraversalState::Ready)?;
        self.graph.node(start)?;

        log::debug!("Starting traversal from node {start}");
        self.mode = RunMode::Single;
        self.iterator.init(self.graph, start);
        self.run()
    }

    /// Visits every node of the graph, one connected component at a time.
    ///
    /// Every run starts from the unvisited node with the lowest id. The visitor is notified with
    /// [`GraphVisitor::start_component`] before each run.
    pub fn traverse_all(&mut self) -> Result<TraversalState, GraphError> {
        self.ensure_state(TraversalState::Ready)?;

        log::debug!(
            "Starting traversal of all {} nodes",
            self.graph.node_count()
        );
        self.mode = RunMode::AllComponents { next_seed: 0 };
        self.run()
    }

    /// Continues a suspended traversal.
    pub fn resume(&mut self) -> Result<TraversalState, GraphError> {
        self.ensure_state(TraversalState::Suspended)?;
        log::debug!("Resuming traversal");
        self.run()
    }

    /// Returns true if the edge was given to the visitor in the current run.
    pub fn is_edge_visited(&self, edge: EdgeId) -> bool {
        self.visited_edges
            .get(edge.index())
            .copied()
            .unwrap_or(false)
    }

    /// Clears visited flags and brings the traversal back to `Ready` state.
    pub fn reset(&mut self) {
        self.iterator.reset();
        self.state = TraversalState::Ready;
        self.mode = RunMode::Single;
        self.visited_count = 0;
        self.pending = None;
        self.visited_edges.fill(false);
    }

    fn ensure_state(&self, expected: TraversalState) -> Result<(), GraphError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GraphError::InvalidTraversalState(self.state))
        }
    }

    fn run(&mut self) -> Result<TraversalState, GraphError> {
        self.state = TraversalState::Running;

        loop {
            if let Some(state) = self.visit_pending_edges()? {
                return Ok(state);
            }

            let Some(node) = self.next_node() else {
                self.state = TraversalState::Completed;
                self.visitor.finish();
                log::debug!(
                    "Traversal completed after visiting {} nodes",
                    self.visited_count
                );
                return Ok(self.state);
            };

            self.visited_count += 1;
            log::trace!("Visiting node {node}");

            match self.visitor.visit(self.graph, node) {
                Ok(VisitResult::Continue) => self.expand(node),
                Ok(VisitResult::SkipBranch) => self.iterator.kill_branch(self.graph, node),
                Ok(VisitResult::Suspend) => {
                    self.expand(node);
                    self.state = TraversalState::Suspended;
                    log::debug!("Traversal suspended at node {node}");
                    return Ok(self.state);
                }
                Ok(VisitResult::Stop) => {
                    self.state = TraversalState::Halted;
                    log::debug!(
                        "Traversal stopped at node {node} after visiting {} nodes",
                        self.visited_count
                    );
                    return Ok(self.state);
                }
                Err(err) => {
                    self.state = TraversalState::Failed;
                    log::debug!("Traversal failed at node {node}: {err}");
                    return Err(err);
                }
            }
        }
    }

    fn expand(&mut self, node: NodeId) {
        let edges = match self.graph.incident(node) {
            Ok(incident) => incident
                .map(|(edge, _)| edge)
                .filter(|edge| !self.is_edge_visited(*edge))
                .collect(),
            Err(_) => VecDeque::new(),
        };

        self.pending = Some(PendingEdges { node, edges });
    }

    /// Gives the pending edges to the visitor and continues through their node once all of them are visited.
    ///
    /// Edges visited in the meantime from another node are skipped. Returns the state to stop the run in, if the
    /// visitor asked for it.
    fn visit_pending_edges(&mut self) -> Result<Option<TraversalState>, GraphError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(None);
        };

        let node = pending.node;
        while let Some(edge) = pending.edges.pop_front() {
            if !mark_edge(&mut self.visited_edges, edge) {
                continue;
            }

            log::trace!("Visiting edge {edge}");

            match self.visitor.visit_edge(self.graph, edge) {
                Ok(VisitResult::Continue) => {}
                Ok(VisitResult::SkipBranch) => {
                    self.pending = None;
                    self.iterator.kill_branch(self.graph, node);
                    return Ok(None);
                }
                Ok(VisitResult::Suspend) => {
                    self.state = TraversalState::Suspended;
                    log::debug!("Traversal suspended at edge {edge}");
                    return Ok(Some(self.state));
                }
                Ok(VisitResult::Stop) => {
                    self.pending = None;
                    self.state = TraversalState::Halted;
                    log::debug!(
                        "Traversal stopped at edge {edge} after visiting {} nodes",
                        self.visited_count
                    );
                    return Ok(Some(self.state));
                }
                Err(err) => {
                    self.pending = None;
                    self.state = TraversalState::Failed;
                    log::debug!("Traversal failed at edge {edge}: {err}");
                    return Err(err);
                }
            }
        }

        self.pending = None;
        self.iterator.cont(self.graph, node);
        Ok(None)
    }

    fn next_node(&mut self) -> Option<NodeId> {
        loop {
            if let Some(node) = self.iterator.next(self.graph) {
                return Some(node);
            }

            let RunMode::AllComponents { next_seed } = &mut self.mode else {
                return None;
            };

            let seed = (*next_seed..self.graph.node_capacity())
                .map(NodeId::new)
                .find(|id| self.graph.contains_node(*id) && !self.iterator.is_visited(*id))?;
            *next_seed = seed.index() + 1;

            log::trace!("Entering component of node {seed}");
            self.visitor.start_component(seed);
            self.iterator.init(self.graph, seed);
        }
    }
}

fn mark_edge(marks: &mut Vec<bool>, edge: EdgeId) -> bool {
    let index = edge.index();
    if index >= marks.len() {
        marks.resize(index + 1, false);
    }

    !std::mem::replace(&mut marks[index], true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{BreadthFirstIterator, DepthFirstIterator, TraversalOrder};
    use crate::visitor::{ComponentCollector, EdgeCollector, NodeCollector, OrphanCounter};
    use assert_matches::assert_matches;

    /// Path `0 - 1 - 2 - 3`, triangle `4 - 5 - 6` and an orphan `7`.
    fn sample() -> Graph<(), ()> {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..8).map(|_| graph.add_node(())).collect();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (4, 5), (5, 6), (6, 4)] {
            graph.add_edge(nodes[a], nodes[b], ()).expect("valid nodes");
        }

        graph
    }

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    fn edge(index: usize) -> EdgeId {
        EdgeId::new(index)
    }

    /// Records everything it sees and answers `result` for one edge.
    struct EdgeRule {
        edge: EdgeId,
        result: VisitResult,
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    }

    impl EdgeRule {
        fn new(edge: EdgeId, result: VisitResult) -> Self {
            Self {
                edge,
                result,
                nodes: vec![],
                edges: vec![],
            }
        }
    }

    impl GraphVisitor<(), ()> for EdgeRule {
        fn visit(
            &mut self,
            _graph: &Graph<(), ()>,
            node: NodeId,
        ) -> Result<VisitResult, GraphError> {
            self.nodes.push(node);
            Ok(VisitResult::Continue)
        }

        fn visit_edge(
            &mut self,
            _graph: &Graph<(), ()>,
            edge: EdgeId,
        ) -> Result<VisitResult, GraphError> {
            self.edges.push(edge);
            Ok(if edge == self.edge {
                self.result
            } else {
                VisitResult::Continue
            })
        }
    }

    #[test]
    fn visits_component() {
        let graph = sample();
        let mut traversal =
            GraphTraversal::new(&graph, BreadthFirstIterator::new(), NodeCollector::new());
        assert_eq!(traversal.state(), TraversalState::Ready);
        assert_eq!(traversal.traverse(id(1)), Ok(TraversalState::Completed));

        assert_eq!(traversal.visitor().nodes(), &[id(1), id(0), id(2), id(3)]);
        assert!(traversal.visitor().is_finished());
        assert_eq!(traversal.visited_count(), 4);
        assert!(!traversal.is_visited(id(4)));
    }

    #[test]
    fn stop_ends_traversal() {
        let graph = sample();
        let mut visits = 0;
        let visitor = |_: &Graph<(), ()>, _: NodeId| -> Result<VisitResult, GraphError> {
            visits += 1;
            Ok(if visits == 2 {
                VisitResult::Stop
            } else {
                VisitResult::Continue
            })
        };

        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), visitor);
        assert_eq!(traversal.traverse(id(0)), Ok(TraversalState::Halted));
        assert_eq!(traversal.visited_count(), 2);
        drop(traversal);
        assert_eq!(visits, 2);
    }

    #[test]
    fn skip_branch_prunes_neighbors() {
        let graph = sample();
        let visitor = |_: &Graph<(), ()>, node: NodeId| -> Result<VisitResult, GraphError> {
            Ok(if node == id(1) {
                VisitResult::SkipBranch
            } else {
                VisitResult::Continue
            })
        };

        let mut traversal = GraphTraversal::new(&graph, DepthFirstIterator::new(), visitor);
        assert_eq!(traversal.traverse(id(0)), Ok(TraversalState::Completed));
        assert_eq!(traversal.visited_count(), 2);
        assert!(!traversal.is_visited(id(2)));
    }

    #[test]
    fn suspend_and_resume() {
        let graph = sample();
        let mut collected = vec![];
        let visitor = |_: &Graph<(), ()>, node: NodeId| -> Result<VisitResult, GraphError> {
            collected.push(node);
            Ok(if node == id(5) {
                VisitResult::Suspend
            } else {
                VisitResult::Continue
            })
        };

        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), visitor);
        assert_eq!(traversal.traverse(id(4)), Ok(TraversalState::Suspended));
        assert_eq!(traversal.visited_count(), 2);
        assert_matches!(
            traversal.traverse(id(4)),
            Err(GraphError::InvalidTraversalState(TraversalState::Suspended))
        );

        assert_eq!(traversal.resume(), Ok(TraversalState::Completed));
        assert_matches!(
            traversal.resume(),
            Err(GraphError::InvalidTraversalState(TraversalState::Completed))
        );
        drop(traversal);
        assert_eq!(collected, vec![id(4), id(5), id(6)]);
    }

    #[test]
    fn visitor_error_fails_traversal() {
        let graph = sample();
        let visitor = |_: &Graph<(), ()>, node: NodeId| -> Result<VisitResult, GraphError> {
            if node == id(2) {
                Err(GraphError::Visitor("unexpected node".into()))
            } else {
                Ok(VisitResult::Continue)
            }
        };

        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), visitor);
        assert_eq!(
            traversal.traverse(id(0)),
            Err(GraphError::Visitor("unexpected node".into()))
        );
        assert_eq!(traversal.state(), TraversalState::Failed);
        assert_matches!(
            traversal.traverse(id(0)),
            Err(GraphError::InvalidTraversalState(TraversalState::Failed))
        );
    }

    #[test]
    fn unknown_start_node() {
        let graph = sample();
        let mut traversal =
            GraphTraversal::new(&graph, BreadthFirstIterator::new(), NodeCollector::new());
        assert_eq!(
            traversal.traverse(id(100)),
            Err(GraphError::NodeNotFound(id(100)))
        );
        assert_eq!(traversal.state(), TraversalState::Ready);
        assert!(traversal.visitor().nodes().is_empty());
    }

    #[test]
    fn reset_repeats_order() {
        let graph = sample();
        let iterator: Box<dyn GraphIterator<(), ()>> = TraversalOrder::DepthFirst.iterator();
        let mut traversal = GraphTraversal::new(&graph, iterator, NodeCollector::new());
        assert_eq!(traversal.traverse(id(2)), Ok(TraversalState::Completed));
        let first = traversal.visitor().nodes().to_vec();

        traversal.reset();
        assert_eq!(traversal.state(), TraversalState::Ready);
        assert_eq!(traversal.traverse(id(2)), Ok(TraversalState::Completed));
        assert_eq!(traversal.visitor().nodes()[first.len()..], first[..]);
    }

    #[test]
    fn traverse_all_components() {
        let graph = sample();
        let mut traversal =
            GraphTraversal::new(&graph, BreadthFirstIterator::new(), ComponentCollector::new());
        assert_eq!(traversal.traverse_all(), Ok(TraversalState::Completed));

        let components = traversal.into_visitor().into_components();
        assert_eq!(
            components,
            vec![
                vec![id(0), id(1), id(2), id(3)],
                vec![id(4), id(5), id(6)],
                vec![id(7)],
            ]
        );
    }

    #[test]
    fn traverse_all_counts_orphans() {
        let graph = sample();
        let mut traversal =
            GraphTraversal::new(&graph, BreadthFirstIterator::new(), OrphanCounter::new());
        assert_eq!(traversal.traverse_all(), Ok(TraversalState::Completed));
        assert_eq!(traversal.visitor().orphans(), 1);
        assert_eq!(traversal.visitor().visited(), 8);
    }

    #[test]
    fn traverse_all_resumes_across_components() {
        let graph = sample();
        let visitor = |_: &Graph<(), ()>, _: NodeId| -> Result<VisitResult, GraphError> {
            Ok(VisitResult::Suspend)
        };

        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), visitor);
        let mut state = traversal.traverse_all();
        let mut suspensions = 0;
        while state == Ok(TraversalState::Suspended) {
            suspensions += 1;
            state = traversal.resume();
        }

        assert_eq!(state, Ok(TraversalState::Completed));
        assert_eq!(suspensions, 8);
    }

    #[test]
    fn edges_are_visited_once() {
        let graph = sample();
        let mut traversal =
            GraphTraversal::new(&graph, BreadthFirstIterator::new(), EdgeCollector::new());
        assert_eq!(traversal.traverse(id(4)), Ok(TraversalState::Completed));
        assert_eq!(traversal.visitor().edges(), &[edge(3), edge(5), edge(4)]);
        assert!(traversal.is_edge_visited(edge(4)));
        assert!(!traversal.is_edge_visited(edge(0)));

        traversal.reset();
        assert!(!traversal.is_edge_visited(edge(4)));
        assert_eq!(traversal.traverse_all(), Ok(TraversalState::Completed));

        let mut edges = traversal.into_visitor().into_edges();
        assert_eq!(edges.len(), 3 + 6);
        edges.drain(..3);
        edges.sort();
        assert_eq!(edges, (0..6).map(edge).collect::<Vec<_>>());
    }

    #[test]
    fn skipped_node_edges_are_not_visited() {
        let graph = sample();
        let visitor = |_: &Graph<(), ()>, node: NodeId| -> Result<VisitResult, GraphError> {
            Ok(if node == id(1) {
                VisitResult::SkipBranch
            } else {
                VisitResult::Continue
            })
        };

        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), visitor);
        assert_eq!(traversal.traverse(id(0)), Ok(TraversalState::Completed));
        assert!(traversal.is_edge_visited(edge(0)));
        assert!(!traversal.is_edge_visited(edge(1)));
    }

    #[test]
    fn edge_stop_halts_traversal() {
        let graph = sample();
        let mut traversal = GraphTraversal::new(
            &graph,
            BreadthFirstIterator::new(),
            EdgeRule::new(edge(1), VisitResult::Stop),
        );
        assert_eq!(traversal.traverse(id(0)), Ok(TraversalState::Halted));

        assert_eq!(traversal.visitor().nodes, vec![id(0), id(1)]);
        assert_eq!(traversal.visitor().edges, vec![edge(0), edge(1)]);
        assert!(!traversal.is_visited(id(2)));
    }

    #[test]
    fn edge_skip_branch_prunes_node() {
        let graph = sample();
        let mut traversal = GraphTraversal::new(
            &graph,
            DepthFirstIterator::new(),
            EdgeRule::new(edge(0), VisitResult::SkipBranch),
        );
        assert_eq!(traversal.traverse(id(1)), Ok(TraversalState::Completed));

        assert_eq!(traversal.visitor().nodes, vec![id(1)]);
        assert_eq!(traversal.visitor().edges, vec![edge(0)]);
        assert!(traversal.is_edge_visited(edge(0)));
        assert!(!traversal.is_edge_visited(edge(1)));
    }

    #[test]
    fn edge_suspend_and_resume() {
        let graph = sample();
        let mut traversal = GraphTraversal::new(
            &graph,
            BreadthFirstIterator::new(),
            EdgeRule::new(edge(5), VisitResult::Suspend),
        );
        assert_eq!(traversal.traverse(id(4)), Ok(TraversalState::Suspended));
        assert_eq!(traversal.visitor().nodes, vec![id(4)]);
        assert_eq!(traversal.visitor().edges, vec![edge(3), edge(5)]);

        assert_eq!(traversal.resume(), Ok(TraversalState::Completed));
        assert_eq!(traversal.visitor().nodes, vec![id(4), id(5), id(6)]);
        assert_eq!(traversal.visitor().edges, vec![edge(3), edge(5), edge(4)]);
    }

    #[test]
    fn edge_visitor_error_fails_traversal() {
        struct FailingEdge;

        impl GraphVisitor<(), ()> for FailingEdge {
            fn visit(&mut self, _: &Graph<(), ()>, _: NodeId) -> Result<VisitResult, GraphError> {
                Ok(VisitResult::Continue)
            }

            fn visit_edge(
                &mut self,
                _: &Graph<(), ()>,
                edge: EdgeId,
            ) -> Result<VisitResult, GraphError> {
                Err(GraphError::EdgeNotFound(edge))
            }
        }

        let graph = sample();
        let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), FailingEdge);
        assert_eq!(
            traversal.traverse(id(2)),
            Err(GraphError::EdgeNotFound(edge(1)))
        );
        assert_eq!(traversal.state(), TraversalState::Failed);
        assert_eq!(traversal.visited_count(), 1);
    }
}
