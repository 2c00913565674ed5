//! Geograph builds topological graphs out of line geometries and walks them.
//!
//! Line geometries (roads, pipes, cables) are split into segments, and the segment endpoints are snapped together
//! with a configurable tolerance, so lines that almost touch become connected through a shared node. The resulting
//! [`Graph`] can then be walked with a [`GraphTraversal`] that combines an ordering strategy ([`GraphIterator`]) with
//! a callback ([`GraphVisitor`]) called for every node.
//!
//! # Quick start
//!
//! ```
//! use geograph::{LineGraphBuilder, GraphTraversal, BreadthFirstIterator, OrphanCounter, TraversalState};
//! use geograph::geograph_types::cartesian::Point2d;
//! use geograph::geograph_types::impls::Contour;
//!
//! let mut builder = LineGraphBuilder::new(0.1);
//! builder.add(&Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)]), ()).unwrap();
//! builder.add(&Contour::open(vec![Point2d::new(1.05, 0.0), Point2d::new(1.0, 1.0)]), ()).unwrap();
//! builder.add_point(&Point2d::new(5.0, 5.0)).unwrap();
//! let graph = builder.into_graph();
//!
//! assert_eq!(graph.node_count(), 4);
//!
//! let mut traversal = GraphTraversal::new(&graph, BreadthFirstIterator::new(), OrphanCounter::new());
//! assert_eq!(traversal.traverse_all(), Ok(TraversalState::Completed));
//! assert_eq!(traversal.visitor().orphans(), 1);
//! ```
//!
//! # Logging
//!
//! The crate reports its progress through the [`log`] facade: traversal runs and builder configuration at `debug`
//! level, every snapped coordinate and visited node at `trace` level, and rejected input at `warn` level.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod analysis;
pub mod builder;
pub mod error;
pub mod feature;
pub mod graph;
pub mod iterator;
pub mod snap;
pub mod traversal;
pub mod visitor;

pub use builder::{BuilderConfig, EdgePolicy, LineGraphBuilder, LineSegment};
pub use error::GraphError;
pub use feature::{Feature, FeatureGraph, FeatureGraphBuilder, FeatureId};
pub use geograph_types;
pub use graph::{Edge, EdgeId, Graph, Node, NodeId};
pub use iterator::{
    BreadthFirstIterator, DepthFirstIterator, GraphIterator, NoBifurcationIterator, TraversalOrder,
    VisitedSet, Walk,
};
pub use snap::{GridSnapIndex, LinearSnapIndex, SnapIndex, SnapIndexKind};
pub use traversal::{GraphTraversal, TraversalState};
pub use visitor::{
    ComponentCollector, EdgeCollector, GraphVisitor, NodeCollector, OrphanCounter, VisitResult,
};
