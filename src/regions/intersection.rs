//! Buffer overlap selection and covered-area fractions.

use geo::{Area, BooleanOps, BoundingRect, Contains, Intersects, MultiPolygon, Polygon};
use tracing::debug;

use super::{PolygonStore, ProjectedRegions};
use crate::error::{ExposureError, Result};
use crate::geometry::{CoordinateProjector, Frame};
use crate::models::RegionCode;

/// A region that overlaps the buffer with positive area.
#[derive(Debug, Clone)]
pub struct IntersectionRecord {
    pub region_code: RegionCode,
    /// Overlap with the buffer, in the projected frame
    pub intersection: MultiPolygon<f64>,
    /// Share of the region's area inside the buffer, in `(0, 1]`
    pub area_percentage: f64,
}

/// Select regions overlapping `buffer` and measure how much of each is covered.
///
/// Output follows store order. Intersections with zero area (boundary
/// touches, slivers) are dropped. With [`Frame::Geodetic`] the ratio is taken
/// between planar lon/lat areas of the intersection and the original
/// boundary; [`Frame::Projected`] uses the equal-area meters directly.
pub fn select(
    store: &PolygonStore,
    projected: &ProjectedRegions,
    buffer: &Polygon<f64>,
    projector: &CoordinateProjector,
    ratio_frame: Frame,
) -> Result<Vec<IntersectionRecord>> {
    let Some(bounds) = buffer.bounding_rect() else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();

    for position in projected.candidates(bounds) {
        let region = &store.regions()[position];
        let geometry = projected.geometry(position);

        if !geometry.intersects(buffer) {
            continue;
        }

        if buffer.contains(geometry) {
            debug!("Region {} ({}) lies inside the buffer", region.code, region.name);
            records.push(IntersectionRecord {
                region_code: region.code,
                intersection: geometry.clone(),
                area_percentage: 1.0,
            });
            continue;
        }

        let intersection = geometry.intersection(buffer);
        let covered = intersection.unsigned_area();
        if !covered.is_finite() {
            return Err(ExposureError::Computation(format!(
                "intersection area of region {} is not finite",
                region.code
            )));
        }
        if covered <= 0.0 {
            debug!("Region {} only touches the buffer, skipping", region.code);
            continue;
        }

        let ratio = match ratio_frame {
            Frame::Projected => covered / geometry.unsigned_area(),
            Frame::Geodetic => {
                let geodetic =
                    projector.reproject(&intersection, Frame::Projected, Frame::Geodetic)?;
                geodetic.unsigned_area() / region.geometry.unsigned_area()
            }
        };

        if !ratio.is_finite() {
            return Err(ExposureError::Computation(format!(
                "area ratio of region {} is not finite",
                region.code
            )));
        }
        if ratio <= 0.0 {
            debug!("Region {} has negligible overlap, skipping", region.code);
            continue;
        }

        debug!(
            "Region {} ({}) covered at {:.4}",
            region.code, region.name, ratio
        );

        records.push(IntersectionRecord {
            region_code: region.code,
            intersection,
            area_percentage: ratio.min(1.0),
        });
    }

    Ok(records)
}
