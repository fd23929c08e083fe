//! Geodetic <-> projected coordinate conversion.
//!
//! The working frame is EPSG:3035 (ETRS89 Lambert Azimuthal Equal Area),
//! which keeps areas true across Europe and gives meter units for buffering.
//! Geodetic coordinates are lon/lat degrees (EPSG:4326); the WGS84/ETRS89
//! datum shift is treated as null.

use geo::{Coord, MapCoords};
use serde::{Deserialize, Serialize};

use crate::error::{ExposureError, Result};
use crate::models::{GeoPoint, ProjectedPoint};

/// Reference frame of a coordinate or geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// Longitude/latitude in degrees
    Geodetic,
    /// Planar meters in the equal-area projection
    Projected,
}

/// GRS80 semi-major axis (meters)
const GRS80_A: f64 = 6_378_137.0;
/// GRS80 inverse flattening
const GRS80_INV_F: f64 = 298.257_222_101;

/// Ellipsoidal Lambert Azimuthal Equal Area projection (oblique aspect).
#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    lat0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    e: f64,
    e2: f64,
    qp: f64,
    sin_beta1: f64,
    cos_beta1: f64,
    rq: f64,
    d: f64,
}

impl LambertAzimuthalEqualArea {
    /// Build a projection centered at `lat0`/`lon0` (degrees).
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        false_easting: f64,
        false_northing: f64,
        a: f64,
        inv_f: f64,
    ) -> Self {
        let f = 1.0 / inv_f;
        let e2 = f * (2.0 - f);
        let e = e2.sqrt();
        let lat0 = lat0_deg.to_radians();

        let qp = authalic_q(1.0, e, e2);
        let q1 = authalic_q(lat0.sin(), e, e2);
        let beta1 = (q1 / qp).clamp(-1.0, 1.0).asin();
        let rq = a * (qp / 2.0).sqrt();
        let m1 = lat0.cos() / (1.0 - e2 * lat0.sin().powi(2)).sqrt();
        let d = a * m1 / (rq * beta1.cos());

        Self {
            lat0,
            lon0: lon0_deg.to_radians(),
            false_easting,
            false_northing,
            e,
            e2,
            qp,
            sin_beta1: beta1.sin(),
            cos_beta1: beta1.cos(),
            rq,
            d,
        }
    }

    /// EPSG:3035, ETRS89-extended / LAEA Europe.
    pub fn etrs89_laea() -> Self {
        Self::new(52.0, 10.0, 4_321_000.0, 3_210_000.0, GRS80_A, GRS80_INV_F)
    }

    /// Project a lon/lat coordinate (degrees) to planar meters.
    pub fn forward(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        let (lon, lat) = (c.x, c.y);
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(ExposureError::Computation(format!(
                "cannot project coordinate ({lon}, {lat})"
            )));
        }

        let phi = lat.to_radians();
        let dlambda = lon.to_radians() - self.lon0;
        let q = authalic_q(phi.sin(), self.e, self.e2);
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
        let (sin_beta, cos_beta) = beta.sin_cos();

        let denom = 1.0 + self.sin_beta1 * sin_beta + self.cos_beta1 * cos_beta * dlambda.cos();
        if denom <= 1e-12 {
            return Err(ExposureError::Computation(format!(
                "coordinate ({lon}, {lat}) is antipodal to the projection origin"
            )));
        }
        let b = self.rq * (2.0 / denom).sqrt();

        Ok(Coord {
            x: self.false_easting + b * self.d * cos_beta * dlambda.sin(),
            y: self.false_northing
                + (b / self.d)
                    * (self.cos_beta1 * sin_beta - self.sin_beta1 * cos_beta * dlambda.cos()),
        })
    }

    /// Unproject planar meters back to lon/lat degrees.
    pub fn inverse(&self, c: Coord<f64>) -> Result<Coord<f64>> {
        if !c.x.is_finite() || !c.y.is_finite() {
            return Err(ExposureError::Computation(format!(
                "cannot unproject coordinate ({}, {})",
                c.x, c.y
            )));
        }

        let dx = c.x - self.false_easting;
        let dy = c.y - self.false_northing;
        let rho = ((dx / self.d).powi(2) + (self.d * dy).powi(2)).sqrt();

        if rho < 1e-9 {
            return Ok(Coord {
                x: self.lon0.to_degrees(),
                y: self.lat0.to_degrees(),
            });
        }
        if rho > 2.0 * self.rq {
            return Err(ExposureError::Computation(format!(
                "coordinate ({}, {}) lies outside the projection domain",
                c.x, c.y
            )));
        }

        let ce = 2.0 * (rho / (2.0 * self.rq)).asin();
        let (sin_ce, cos_ce) = ce.sin_cos();
        let beta = (cos_ce * self.sin_beta1 + self.d * dy * sin_ce * self.cos_beta1 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lambda = self.lon0
            + (dx * sin_ce).atan2(
                self.d * rho * self.cos_beta1 * cos_ce
                    - self.d * self.d * dy * self.sin_beta1 * sin_ce,
            );

        let e4 = self.e2 * self.e2;
        let e6 = e4 * self.e2;
        let phi = beta
            + (self.e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin();

        Ok(Coord {
            x: normalize_lon(lambda.to_degrees()),
            y: phi.to_degrees(),
        })
    }
}

/// Authalic `q` for a given sine of latitude.
fn authalic_q(sin_phi: f64, e: f64, e2: f64) -> f64 {
    let es = e * sin_phi;
    (1.0 - e2) * (sin_phi / (1.0 - e2 * sin_phi * sin_phi) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

fn normalize_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Converts points and geometries between the geodetic and projected frames.
#[derive(Debug, Clone)]
pub struct CoordinateProjector {
    projection: LambertAzimuthalEqualArea,
}

impl Default for CoordinateProjector {
    fn default() -> Self {
        Self::new(LambertAzimuthalEqualArea::etrs89_laea())
    }
}

impl CoordinateProjector {
    pub fn new(projection: LambertAzimuthalEqualArea) -> Self {
        Self { projection }
    }

    /// Reproject any coordinate-bearing geometry (point, polygon, multipolygon).
    pub fn reproject<G>(&self, geometry: &G, from: Frame, to: Frame) -> Result<G>
    where
        G: MapCoords<f64, f64, Output = G> + Clone,
    {
        match (from, to) {
            (Frame::Geodetic, Frame::Projected) => {
                geometry.try_map_coords(|c| self.projection.forward(c))
            }
            (Frame::Projected, Frame::Geodetic) => {
                geometry.try_map_coords(|c| self.projection.inverse(c))
            }
            _ => Ok(geometry.clone()),
        }
    }

    pub fn project_point(&self, point: GeoPoint) -> Result<ProjectedPoint> {
        let projected = self.reproject(
            &geo::Point::<f64>::from(point),
            Frame::Geodetic,
            Frame::Projected,
        )?;
        Ok(projected.into())
    }

    pub fn unproject_point(&self, point: ProjectedPoint) -> Result<GeoPoint> {
        let geodetic = self.reproject(
            &geo::Point::<f64>::from(point),
            Frame::Projected,
            Frame::Geodetic,
        )?;
        Ok(geodetic.into())
    }
}
