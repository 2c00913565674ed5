//! Building graphs from features that carry line geometries together with arbitrary attributes.

use geograph_types::cartesian::{CartesianPoint2d, Point2d};
use geograph_types::impls::{ClosedContour, Contour};
use serde::{Deserialize, Serialize};

use crate::builder::{BuilderConfig, LineGraphBuilder};
use crate::error::GraphError;
use crate::graph::{EdgeId, Graph};

/// An object with a line geometry, e.g. a road or a pipe.
pub trait Feature {
    /// Type of the geometry the feature returns.
    type Geom: geograph_types::Contour;
    /// Returns the geometry of the feature.
    fn geometry(&self) -> &Self::Geom;
}

macro_rules! impl_feature {
    ($geom:ident) => {
        impl<P> Feature for $geom<P> {
            type Geom = Self;
            fn geometry(&self) -> &Self::Geom {
                self
            }
        }
    };
}

impl_feature!(Contour);
impl_feature!(ClosedContour);

/// Id of a feature added to a [`FeatureGraphBuilder`]. Stored as the payload of every edge created from the feature.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(usize);

impl FeatureId {
    /// Index of the feature in [`FeatureGraph::features`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Builds a graph from features, keeping the features to look them up by the edges later.
pub struct FeatureGraphBuilder<F> {
    builder: LineGraphBuilder<FeatureId>,
    features: Vec<F>,
}

impl<F> FeatureGraphBuilder<F>
where
    F: Feature,
    <F::Geom as geograph_types::Contour>::Point: CartesianPoint2d<Num = f64>,
{
    /// Creates a builder with the given snap tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self::with_config(BuilderConfig::default().with_tolerance(tolerance))
    }

    /// Creates a builder with the given configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            builder: LineGraphBuilder::with_config(config),
            features: vec![],
        }
    }

    /// Adds the feature geometry to the graph and stores the feature.
    ///
    /// A feature with an invalid geometry is dropped and the error is returned.
    pub fn add(&mut self, feature: F) -> Result<FeatureId, GraphError> {
        let id = FeatureId(self.features.len());
        let edges = self.builder.add(feature.geometry(), id)?;
        log::trace!("Feature {} added as {} edges", id.0, edges.len());

        self.features.push(feature);
        Ok(id)
    }

    /// Returns a feature added to the builder.
    pub fn feature(&self, id: FeatureId) -> Option<&F> {
        self.features.get(id.0)
    }

    /// The graph built so far.
    pub fn graph(&self) -> &Graph<Point2d, FeatureId> {
        self.builder.graph()
    }

    /// Finishes building.
    pub fn finish(self) -> FeatureGraph<F> {
        log::debug!(
            "Feature graph built from {} features: {} nodes, {} edges",
            self.features.len(),
            self.builder.graph().node_count(),
            self.builder.graph().edge_count()
        );

        FeatureGraph {
            graph: self.builder.into_graph(),
            features: self.features,
        }
    }
}

/// Graph built by [`FeatureGraphBuilder`] together with the features it was built from.
pub struct FeatureGraph<F> {
    graph: Graph<Point2d, FeatureId>,
    features: Vec<F>,
}

impl<F> FeatureGraph<F> {
    /// The graph. Edge payloads are ids of the features the edges were created from.
    pub fn graph(&self) -> &Graph<Point2d, FeatureId> {
        &self.graph
    }

    /// All features in the order they were added.
    pub fn features(&self) -> &[F] {
        &self.features
    }

    /// Returns the feature the edge was created from.
    pub fn feature_of(&self, edge: EdgeId) -> Option<&F> {
        let id = self.graph.edge(edge).ok()?.payload();
        self.features.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Road {
        name: &'static str,
        line: Contour<Point2d>,
    }

    impl Feature for Road {
        type Geom = Contour<Point2d>;

        fn geometry(&self) -> &Self::Geom {
            &self.line
        }
    }

    fn road(name: &'static str, points: &[(f64, f64)]) -> Road {
        Road {
            name,
            line: points.iter().map(|&(x, y)| Point2d::new(x, y)).collect(),
        }
    }

    #[test]
    fn edges_refer_to_features() {
        let mut builder = FeatureGraphBuilder::new(0.1);
        let main = builder
            .add(road("main", &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]))
            .expect("valid geometry");
        let side = builder
            .add(road("side", &[(10.05, 0.0), (10.0, 10.0)]))
            .expect("valid geometry");
        assert_eq!(builder.feature(side).map(|r| r.name), Some("side"));

        let graph = builder.finish();
        assert_eq!(graph.features().len(), 2);
        assert_eq!(graph.graph().node_count(), 4);
        assert_eq!(graph.graph().edge_count(), 3);

        for (id, edge) in graph.graph().edges() {
            let feature = graph.feature_of(id).expect("edge has a feature");
            let expected = if *edge.payload() == main { "main" } else { "side" };
            assert_eq!(feature.name, expected);
        }

        assert!(graph.feature_of(EdgeId::new(100)).is_none());
    }

    #[test]
    fn invalid_feature_is_not_stored() {
        let mut builder = FeatureGraphBuilder::new(0.0);
        assert_matches!(
            builder.add(road("broken", &[(0.0, 0.0), (f64::NAN, 1.0)])),
            Err(GraphError::InvalidCoordinate { .. })
        );
        let id = builder
            .add(road("ok", &[(0.0, 0.0), (1.0, 1.0)]))
            .expect("valid geometry");

        assert_eq!(id.index(), 0);
        assert_eq!(builder.finish().features().len(), 1);
    }

    #[test]
    fn contour_is_a_feature() {
        let mut builder = FeatureGraphBuilder::new(0.0);
        builder
            .add(ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
            ]))
            .expect("valid geometry");

        let graph = builder.finish();
        assert_eq!(graph.graph().node_count(), 3);
        assert_eq!(graph.graph().edge_count(), 3);
    }
}
