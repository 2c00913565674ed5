//! Building graphs from line geometries.

use geograph_types::cartesian::{CartesianPoint2d, CartesianPoint2dFloat, Point2d};
use geograph_types::{Contour, MultiContour};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::snap::{SnapIndex, SnapIndexKind};

/// What to do when a segment connects two nodes that are already connected by an edge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Create a new edge anyway. Several lines sharing both endpoints produce parallel edges.
    #[default]
    Parallel,
    /// Reuse the first existing edge between the two nodes.
    Merge,
}

/// Configuration of a [`LineGraphBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Maximum distance between two coordinates for them to be merged into one node. Values `<= 0` mean that only
    /// exactly equal coordinates are merged.
    pub tolerance: f64,
    /// Handling of repeated segments between the same pair of nodes.
    pub edge_policy: EdgePolicy,
    /// Spatial index used to find nodes to snap to.
    pub index: SnapIndexKind,
}

impl BuilderConfig {
    /// Sets snap tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets edge policy.
    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    /// Sets the snap index implementation.
    pub fn with_index(mut self, index: SnapIndexKind) -> Self {
        self.index = index;
        self
    }
}

/// Segment of an input line, given to the payload factory of [`LineGraphBuilder::add_with`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineSegment {
    /// Position of the segment in the line, starting from 0.
    pub index: usize,
    /// Start coordinate as it is in the input line (before snapping).
    pub start: Point2d,
    /// End coordinate as it is in the input line (before snapping).
    pub end: Point2d,
    /// Node the start coordinate was snapped to.
    pub start_node: NodeId,
    /// Node the end coordinate was snapped to.
    pub end_node: NodeId,
}

/// Builds a [`Graph`] from line geometries.
///
/// Every line is split into segments between its consecutive points. Each segment becomes an edge between the nodes
/// its endpoints snap to. A coordinate snaps to an existing node if it is within the configured tolerance of it,
/// otherwise a new node is created. So no two nodes of the resulting graph are within the tolerance of each other
/// (as long as nodes are not edited directly through [`Graph`] methods).
///
/// The graph is valid at any point of building. Lines can be added one by one as they are read from a data source.
///
/// ```
/// use geograph::LineGraphBuilder;
/// use geograph_types::cartesian::Point2d;
/// use geograph_types::impls::Contour;
///
/// let mut builder = LineGraphBuilder::new(0.2);
/// builder.add(&Contour::open(vec![Point2d::new(1.0, 1.0), Point2d::new(2.0, 2.0)]), "a").unwrap();
/// builder.add(&Contour::open(vec![Point2d::new(2.01, 2.0007), Point2d::new(3.0, 3.0)]), "b").unwrap();
///
/// let graph = builder.into_graph();
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub struct LineGraphBuilder<E> {
    config: BuilderConfig,
    index: Box<dyn SnapIndex>,
    graph: Graph<Point2d, E>,
}

impl<E> LineGraphBuilder<E> {
    /// Creates a builder with the given snap tolerance and default settings otherwise.
    pub fn new(tolerance: f64) -> Self {
        Self::with_config(BuilderConfig::default().with_tolerance(tolerance))
    }

    /// Creates a builder with the given configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        log::debug!("Creating line graph builder with {config:?}");
        Self {
            index: config.index.create(config.tolerance),
            config,
            graph: Graph::new(),
        }
    }

    /// Builder configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The graph built so far.
    pub fn graph(&self) -> &Graph<Point2d, E> {
        &self.graph
    }

    /// Consumes the builder returning the graph.
    pub fn into_graph(self) -> Graph<Point2d, E> {
        self.graph
    }

    /// Adds a line to the graph. Every created edge gets a clone of the `payload`.
    ///
    /// Returns ids of the edges for every non-degenerate segment of the line in the order of segments. See
    /// [`LineGraphBuilder::add_with`] for details.
    pub fn add<L>(&mut self, line: &L, payload: E) -> Result<Vec<EdgeId>, GraphError>
    where
        L: Contour,
        L::Point: CartesianPoint2d<Num = f64>,
        E: Clone,
    {
        self.add_with(line, |_| payload.clone())
    }

    /// Adds a line to the graph, creating the payload for every edge with the `payload` function.
    ///
    /// * Lines with less than two points do not add anything to the graph.
    /// * Segments whose both ends snap to the same node are skipped.
    /// * If any of the line's coordinates is NaN or infinite, the line is rejected as a whole with
    ///   [`GraphError::InvalidCoordinate`] and the graph is not modified.
    ///
    /// With [`EdgePolicy::Merge`] a segment between two already connected nodes returns the existing edge id and
    /// `payload` is not called for it.
    pub fn add_with<L>(
        &mut self,
        line: &L,
        mut payload: impl FnMut(LineSegment) -> E,
    ) -> Result<Vec<EdgeId>, GraphError>
    where
        L: Contour,
        L::Point: CartesianPoint2d<Num = f64>,
    {
        let points: Vec<Point2d> = line
            .iter_points_closing()
            .map(|p| Point2d::new(p.x(), p.y()))
            .collect();

        if let Some(invalid) = points.iter().find(|p| !p.is_finite()) {
            log::warn!(
                "Line with invalid coordinate ({}, {}) is rejected",
                invalid.x,
                invalid.y
            );
            return Err(GraphError::InvalidCoordinate {
                x: invalid.x,
                y: invalid.y,
            });
        }

        if points.len() < 2 {
            log::trace!("Line with {} point(s) is skipped", points.len());
            return Ok(vec![]);
        }

        let mut edges = Vec::with_capacity(points.len() - 1);
        let mut start_node = self.index.find_or_insert(&mut self.graph, points[0])?;
        for (index, pair) in points.windows(2).enumerate() {
            let end_node = self.index.find_or_insert(&mut self.graph, pair[1])?;
            if start_node == end_node {
                log::trace!("Degenerate segment {index} at node {start_node} is skipped");
                continue;
            }

            let segment = LineSegment {
                index,
                start: pair[0],
                end: pair[1],
                start_node,
                end_node,
            };
            edges.push(self.connect(segment, &mut payload)?);
            start_node = end_node;
        }

        Ok(edges)
    }

    /// Adds every line of a multi line geometry. Returns ids of all created edges.
    pub fn add_multi<M>(&mut self, lines: &M, payload: E) -> Result<Vec<EdgeId>, GraphError>
    where
        M: MultiContour,
        <M::Contour as Contour>::Point: CartesianPoint2d<Num = f64>,
        E: Clone,
    {
        let mut edges = vec![];
        for line in lines.contours() {
            edges.append(&mut self.add(line, payload.clone())?);
        }

        Ok(edges)
    }

    /// Adds a standalone node at the coordinate, or returns the existing node the coordinate snaps to.
    pub fn add_point(
        &mut self,
        point: &impl CartesianPoint2d<Num = f64>,
    ) -> Result<NodeId, GraphError> {
        let coord = Point2d::new(point.x(), point.y());
        self.index.find_or_insert(&mut self.graph, coord)
    }

    /// Returns the node the coordinate would snap to, without modifying the graph. Coordinates with NaN or infinite
    /// components do not snap to anything.
    pub fn find_node(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<NodeId> {
        self.index.nearest(&Point2d::new(point.x(), point.y()))
    }

    /// Returns the first edge connecting the nodes that `a` and `b` snap to.
    pub fn edge_for_segment(
        &self,
        a: &impl CartesianPoint2d<Num = f64>,
        b: &impl CartesianPoint2d<Num = f64>,
    ) -> Option<EdgeId> {
        let a = self.find_node(a)?;
        let b = self.find_node(b)?;
        self.graph.edges_between(a, b).ok()?.first().copied()
    }

    /// Removes an edge from the graph. The nodes of the edge are left in the graph.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<E, GraphError> {
        self.graph.remove_edge(edge)
    }

    /// Removes a node with all its edges from the graph. New coordinates will no longer snap to it.
    pub fn remove_node(&mut self, node: NodeId) -> Result<Point2d, GraphError> {
        let coord = self.graph.remove_node(node)?;
        self.index.remove(&coord, node);

        Ok(coord)
    }

    fn connect(
        &mut self,
        segment: LineSegment,
        payload: &mut impl FnMut(LineSegment) -> E,
    ) -> Result<EdgeId, GraphError> {
        if self.config.edge_policy == EdgePolicy::Merge {
            if let Some(existing) = self
                .graph
                .edges_between(segment.start_node, segment.end_node)?
                .first()
            {
                return Ok(*existing);
            }
        }

        self.graph
            .add_edge(segment.start_node, segment.end_node, payload(segment))
    }
}
