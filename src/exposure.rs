//! Exposure query pipeline.
//!
//! `compute` is the single entry point front-ends call: it validates the
//! request, loads the reference datasets, and runs buffer, intersection and
//! aggregation in one synchronous pass. Nothing is kept between calls.
//! Callers running many queries load a [`ReferenceData`] once and use
//! `compute_with`.

use tracing::info;

use crate::config::Config;
use crate::demographics::{aggregate, DemographicTable};
use crate::error::{ExposureError, Result};
use crate::geometry::{buffer, CoordinateProjector, Frame, DEFAULT_QUADRANT_SEGMENTS};
use crate::models::{AggregateResult, GeoPoint};
use crate::regions::{select, PolygonStore, ProjectedRegions};

/// Region and demographic datasets for one or more queries.
///
/// Regions are reprojected and indexed once, when the data is built.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    regions: PolygonStore,
    projected: ProjectedRegions,
    demographics: DemographicTable,
}

impl ReferenceData {
    pub fn new(regions: PolygonStore, demographics: DemographicTable) -> Result<Self> {
        let projected = regions.reproject_all(&CoordinateProjector::default())?;
        Ok(Self {
            regions,
            projected,
            demographics,
        })
    }

    pub fn load(config: &Config) -> Result<Self> {
        let regions = PolygonStore::load(&config.datasets.regions, &config.regions)?;
        let demographics =
            DemographicTable::load(&config.datasets.demographics, &config.demographics)?;
        Self::new(regions, demographics)
    }

    pub fn regions(&self) -> &PolygonStore {
        &self.regions
    }

    pub fn projected(&self) -> &ProjectedRegions {
        &self.projected
    }

    pub fn demographics(&self) -> &DemographicTable {
        &self.demographics
    }
}

/// Geometric knobs for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Buffer polygon resolution
    pub quadrant_segments: u32,
    /// Frame used for covered-area ratios
    pub ratio_frame: Frame,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
            ratio_frame: Frame::Geodetic,
        }
    }
}

impl From<&Config> for QueryOptions {
    fn from(config: &Config) -> Self {
        Self {
            quadrant_segments: config.buffer.quadrant_segments,
            ratio_frame: config.area.ratio_frame,
        }
    }
}

/// Load reference data per `config` and estimate exposure around `center`.
///
/// Inputs are validated before any dataset is read.
pub fn compute(config: &Config, center: GeoPoint, radius_km: f64) -> Result<AggregateResult> {
    validate(center, radius_km)?;
    let data = ReferenceData::load(config)?;
    compute_with(&data, QueryOptions::from(config), center, radius_km)
}

/// Estimate exposure against already-loaded reference data.
pub fn compute_with(
    data: &ReferenceData,
    options: QueryOptions,
    center: GeoPoint,
    radius_km: f64,
) -> Result<AggregateResult> {
    validate(center, radius_km)?;

    let projector = CoordinateProjector::default();
    let zone = buffer(projector.project_point(center)?, radius_km)?;
    let polygon = zone.to_polygon(options.quadrant_segments)?;

    let selected = select(
        &data.regions,
        &data.projected,
        &polygon,
        &projector,
        options.ratio_frame,
    )?;
    let result = aggregate(&selected, &data.regions, &data.demographics)?;

    info!(
        "Query ({}, {}) r={} km: {} regions, population {:.1}, active {:.1}",
        center.lat,
        center.lon,
        radius_km,
        result.detail.len(),
        result.total_population,
        result.total_active_population
    );

    Ok(result)
}

fn validate(center: GeoPoint, radius_km: f64) -> Result<()> {
    center.validate()?;
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ExposureError::InvalidInput(format!(
            "buffer radius must be a positive number of kilometers, got {radius_km}"
        )));
    }
    Ok(())
}
