//! Administrative region store and buffer intersection.
//!
//! Regions are loaded from GeoJSON in the geodetic frame, reprojected into
//! the working frame and indexed with an R-tree so a buffer query only runs
//! exact geometry on nearby candidates.

mod index;
mod intersection;
mod store;

pub use index::ProjectedRegions;
pub use intersection::{select, IntersectionRecord};
pub use store::PolygonStore;
