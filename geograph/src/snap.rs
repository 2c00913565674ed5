//! Spatial lookup of graph nodes by coordinate.
//!
//! A [`SnapIndex`] answers one question: is there already a node within the snap tolerance of a given coordinate?
//! Line graph builders use it to merge line endpoints that are close to each other into a single node.
//!
//! Two implementations are provided:
//! * [`GridSnapIndex`] - a hash grid with the cell size equal to the tolerance. A query only checks the 3x3 block of
//!   cells around the query coordinate, so lookups stay cheap as the graph grows. This is the default.
//! * [`LinearSnapIndex`] - checks every indexed node. Good enough for small graphs.
//!
//! With tolerance `<= 0` both implementations match coordinates only if they are exactly equal.

use ahash::AHashMap;
use geograph_types::cartesian::{CartesianPoint2d, CartesianPoint2dFloat, Point2d};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

/// Coordinate to node lookup structure.
pub trait SnapIndex {
    /// Snap radius. Values `<= 0` mean exact matching.
    fn tolerance(&self) -> f64;

    /// Returns the node closest to `coord` if it is within the tolerance.
    ///
    /// If several nodes are at exactly the same distance, the one with the lowest id (inserted first) is returned.
    /// A coordinate with NaN or infinite components never matches any node.
    fn nearest(&self, coord: &Point2d) -> Option<NodeId>;

    /// Adds a node at the given coordinate to the index.
    fn insert(&mut self, coord: Point2d, node: NodeId);

    /// Removes the node from the index. Returns false if the node was not indexed at `coord`.
    fn remove(&mut self, coord: &Point2d, node: NodeId) -> bool;

    /// Number of indexed nodes.
    fn len(&self) -> usize;

    /// Returns true if no nodes are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node the coordinate snaps to, creating a new node in the `graph` if there is no node within the
    /// tolerance.
    ///
    /// Coordinates with NaN or infinite components are rejected with [`GraphError::InvalidCoordinate`].
    fn find_or_insert<E>(
        &mut self,
        graph: &mut Graph<Point2d, E>,
        coord: Point2d,
    ) -> Result<NodeId, GraphError>
    where
        Self: Sized,
    {
        coord.ensure_finite()?;

        if let Some(node) = self.nearest(&coord) {
            log::trace!("Coordinate ({}, {}) snapped to node {node}", coord.x, coord.y);
            return Ok(node);
        }

        let node = graph.add_node(coord);
        self.insert(coord, node);
        log::trace!("Created node {node} at ({}, {})", coord.x, coord.y);

        Ok(node)
    }
}

impl SnapIndex for Box<dyn SnapIndex> {
    fn tolerance(&self) -> f64 {
        (**self).tolerance()
    }

    fn nearest(&self, coord: &Point2d) -> Option<NodeId> {
        (**self).nearest(coord)
    }

    fn insert(&mut self, coord: Point2d, node: NodeId) {
        (**self).insert(coord, node)
    }

    fn remove(&mut self, coord: &Point2d, node: NodeId) -> bool {
        (**self).remove(coord, node)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Snap index implementation to use.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapIndexKind {
    /// [`GridSnapIndex`].
    #[default]
    Grid,
    /// [`LinearSnapIndex`].
    Linear,
}

impl SnapIndexKind {
    /// Creates an empty index of this kind.
    pub fn create(self, tolerance: f64) -> Box<dyn SnapIndex> {
        match self {
            SnapIndexKind::Grid => Box::new(GridSnapIndex::new(tolerance)),
            SnapIndexKind::Linear => Box::new(LinearSnapIndex::new(tolerance)),
        }
    }
}

type CellKey = (i64, i64);

/// Hash grid snap index. See module documentation for details.
#[derive(Debug, Clone)]
pub struct GridSnapIndex {
    tolerance: f64,
    cells: AHashMap<CellKey, Vec<(NodeId, Point2d)>>,
    exact: AHashMap<(u64, u64), Vec<NodeId>>,
    len: usize,
}

impl GridSnapIndex {
    /// Creates an empty index.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: AHashMap::new(),
            exact: AHashMap::new(),
            len: 0,
        }
    }

    fn is_exact(&self) -> bool {
        self.tolerance.is_nan() || self.tolerance <= 0.0
    }

    fn cell(&self, coord: &Point2d) -> CellKey {
        (
            (coord.x / self.tolerance).floor() as i64,
            (coord.y / self.tolerance).floor() as i64,
        )
    }
}

impl SnapIndex for GridSnapIndex {
    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn nearest(&self, coord: &Point2d) -> Option<NodeId> {
        if !coord.is_finite() {
            return None;
        }

        if self.is_exact() {
            return self
                .exact
                .get(&exact_key(coord))
                .and_then(|nodes| nodes.iter().min().copied());
        }

        let (cx, cy) = self.cell(coord);
        let mut closest = Closest::new(self.tolerance);
        for x in cx.saturating_sub(1)..=cx.saturating_add(1) {
            for y in cy.saturating_sub(1)..=cy.saturating_add(1) {
                let Some(cell) = self.cells.get(&(x, y)) else {
                    continue;
                };

                for (node, position) in cell {
                    closest.offer(*node, position.distance_sq(coord));
                }
            }
        }

        closest.into_node()
    }

    fn insert(&mut self, coord: Point2d, node: NodeId) {
        if self.is_exact() {
            self.exact.entry(exact_key(&coord)).or_default().push(node);
        } else {
            let key = self.cell(&coord);
            self.cells.entry(key).or_default().push((node, coord));
        }

        self.len += 1;
    }

    fn remove(&mut self, coord: &Point2d, node: NodeId) -> bool {
        let removed = if self.is_exact() {
            remove_from_bucket(&mut self.exact, exact_key(coord), |id| *id == node)
        } else {
            let key = self.cell(coord);
            remove_from_bucket(&mut self.cells, key, |(id, _)| *id == node)
        };

        if removed {
            self.len -= 1;
        }

        removed
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Snap index checking every node on every query.
#[derive(Debug, Clone, Default)]
pub struct LinearSnapIndex {
    tolerance: f64,
    nodes: Vec<(NodeId, Point2d)>,
}

impl LinearSnapIndex {
    /// Creates an empty index.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            nodes: vec![],
        }
    }
}

impl SnapIndex for LinearSnapIndex {
    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn nearest(&self, coord: &Point2d) -> Option<NodeId> {
        if !coord.is_finite() {
            return None;
        }

        let mut closest = Closest::new(self.tolerance);
        for (node, position) in &self.nodes {
            closest.offer(*node, position.distance_sq(coord));
        }

        closest.into_node()
    }

    fn insert(&mut self, coord: Point2d, node: NodeId) {
        self.nodes.push((node, coord));
    }

    fn remove(&mut self, _coord: &Point2d, node: NodeId) -> bool {
        let Some(position) = self.nodes.iter().position(|(id, _)| *id == node) else {
            return false;
        };

        self.nodes.remove(position);
        true
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Running minimum over candidate nodes: closest distance first, lowest id on ties.
struct Closest {
    tolerance_sq: f64,
    best: Option<(NodeId, f64)>,
}

impl Closest {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance_sq: if tolerance > 0.0 {
                tolerance * tolerance
            } else {
                0.0
            },
            best: None,
        }
    }

    fn offer(&mut self, node: NodeId, distance_sq: f64) {
        if distance_sq.is_nan() || distance_sq > self.tolerance_sq {
            return;
        }

        let is_better = match self.best {
            None => true,
            Some((best_node, best_distance)) => {
                distance_sq < best_distance || (distance_sq == best_distance && node < best_node)
            }
        };

        if is_better {
            self.best = Some((node, distance_sq));
        }
    }

    fn into_node(self) -> Option<NodeId> {
        self.best.map(|(node, _)| node)
    }
}

fn exact_key(coord: &Point2d) -> (u64, u64) {
    // `-0.0` and `0.0` are the same coordinate.
    let bits = |v: f64| if v == 0.0 { 0 } else { v.to_bits() };
    (bits(coord.x), bits(coord.y))
}

fn remove_from_bucket<K, T>(
    buckets: &mut AHashMap<K, Vec<T>>,
    key: K,
    predicate: impl Fn(&T) -> bool,
) -> bool
where
    K: std::hash::Hash + Eq,
{
    let Some(bucket) = buckets.get_mut(&key) else {
        return false;
    };
    let Some(position) = bucket.iter().position(predicate) else {
        return false;
    };

    bucket.remove(position);
    if bucket.is_empty() {
        buckets.remove(&key);
    }

    true
}
