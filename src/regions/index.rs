//! Spatial index over projected region geometries.

use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

/// Wrapper for R-tree indexing of a projected region
#[derive(Clone)]
struct IndexedRegion {
    /// Position of the region in the store
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    fn new(position: usize, geometry: &MultiPolygon<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self {
            position,
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        })
    }
}

/// Region geometries in the projected frame, parallel to the store.
#[derive(Clone)]
pub struct ProjectedRegions {
    geometries: Vec<MultiPolygon<f64>>,
    tree: RTree<IndexedRegion>,
}

impl Default for ProjectedRegions {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

impl std::fmt::Debug for ProjectedRegions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectedRegions")
            .field("len", &self.geometries.len())
            .finish()
    }
}

impl ProjectedRegions {
    /// Build the R-tree over projected bounding boxes
    pub fn build(geometries: Vec<MultiPolygon<f64>>) -> Self {
        let indexed: Vec<IndexedRegion> = geometries
            .iter()
            .enumerate()
            .filter_map(|(position, geometry)| IndexedRegion::new(position, geometry))
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Spatial index built with {} entries", tree.size());

        Self { geometries, tree }
    }

    /// Store positions whose bounding box touches `bounds`, in store order.
    pub fn candidates(&self, bounds: Rect<f64>) -> Vec<usize> {
        let query = AABB::from_corners(
            [bounds.min().x, bounds.min().y],
            [bounds.max().x, bounds.max().y],
        );

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .collect();
        positions.sort_unstable();
        positions
    }

    pub fn geometry(&self, position: usize) -> &MultiPolygon<f64> {
        &self.geometries[position]
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
