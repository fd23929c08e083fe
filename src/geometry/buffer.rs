//! Circular buffer zones around a projected point.

use std::f64::consts::FRAC_PI_2;

use geo::{Coord, LineString, Polygon};

use crate::error::{ExposureError, Result};
use crate::models::ProjectedPoint;

/// Vertices per quarter circle when rendering a buffer as a polygon.
pub const DEFAULT_QUADRANT_SEGMENTS: u32 = 16;

/// A disk of `radius_m` meters around `center`, in the projected frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferZone {
    pub center: ProjectedPoint,
    pub radius_m: f64,
}

/// Build the buffer zone for a radius given in kilometers.
pub fn buffer(center: ProjectedPoint, radius_km: f64) -> Result<BufferZone> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ExposureError::InvalidInput(format!(
            "buffer radius must be a positive number of kilometers, got {radius_km}"
        )));
    }
    Ok(BufferZone {
        center,
        radius_m: radius_km * 1000.0,
    })
}

impl BufferZone {
    /// Render the disk as a closed polygon with vertices on the circle.
    pub fn to_polygon(&self, quadrant_segments: u32) -> Result<Polygon<f64>> {
        if quadrant_segments == 0 {
            return Err(ExposureError::InvalidInput(
                "buffer needs at least one segment per quadrant".to_string(),
            ));
        }

        let steps = quadrant_segments * 4;
        let step = FRAC_PI_2 / f64::from(quadrant_segments);
        let mut ring: Vec<Coord<f64>> = (0..steps)
            .map(|i| {
                let angle = step * f64::from(i);
                Coord {
                    x: self.center.x + self.radius_m * angle.cos(),
                    y: self.center.y + self.radius_m * angle.sin(),
                }
            })
            .collect();
        ring.push(ring[0]);

        Ok(Polygon::new(LineString::new(ring), vec![]))
    }
}
