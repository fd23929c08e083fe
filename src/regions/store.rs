//! Region geometry and attribute loading from GeoJSON.

use std::io::Read;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use hashbrown::HashMap;
use serde_json::Value;
use tracing::{debug, info};

use super::ProjectedRegions;
use crate::config::RegionSourceConfig;
use crate::error::{ExposureError, Result};
use crate::geometry::{CoordinateProjector, Frame};
use crate::models::{RegionAttributes, RegionCode, RegionRecord};
use crate::source::open_maybe_gz;

const DATASET: &str = "region dataset";

/// Immutable collection of regions keyed by administrative code.
///
/// Iteration follows the order of features in the source file.
#[derive(Debug, Clone, Default)]
pub struct PolygonStore {
    regions: Vec<RegionRecord>,
    by_code: HashMap<RegionCode, usize>,
}

impl PolygonStore {
    /// Load a GeoJSON FeatureCollection (optionally gzip-compressed).
    pub fn load(path: &Path, options: &RegionSourceConfig) -> Result<Self> {
        info!("Loading regions from {}", path.display());

        let text = read_text(path)
            .map_err(|e| ExposureError::load(DATASET, format!("{}: {e}", path.display())))?;
        let store = Self::from_geojson_str(&text, options)?;

        info!("Loaded {} regions", store.len());
        Ok(store)
    }

    pub fn from_geojson_str(text: &str, options: &RegionSourceConfig) -> Result<Self> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|e| ExposureError::load(DATASET, e))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(ExposureError::load(DATASET, "expected a FeatureCollection"));
        };

        let records = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| parse_feature(idx, feature, options))
            .collect::<Result<Vec<_>>>()?;

        Self::from_records(records)
    }

    /// Build a store from already-parsed records, rejecting duplicate codes.
    pub fn from_records(regions: Vec<RegionRecord>) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(regions.len());

        for (idx, region) in regions.iter().enumerate() {
            if region.geometry.0.is_empty() {
                return Err(ExposureError::load(
                    DATASET,
                    format!("region {} has an empty geometry", region.code),
                ));
            }
            if let Some(first) = by_code.insert(region.code, idx) {
                return Err(ExposureError::load(
                    DATASET,
                    format!(
                        "duplicate region code {} (features {} and {})",
                        region.code, first, idx
                    ),
                ));
            }
        }

        Ok(Self { regions, by_code })
    }

    /// Reproject every region into the working frame and index it.
    ///
    /// The geodetic geometries stay on the records for area ratios.
    pub fn reproject_all(&self, projector: &CoordinateProjector) -> Result<ProjectedRegions> {
        let geometries = self
            .regions
            .iter()
            .map(|r| projector.reproject(&r.geometry, Frame::Geodetic, Frame::Projected))
            .collect::<Result<Vec<_>>>()?;

        debug!("Reprojected {} regions", geometries.len());
        Ok(ProjectedRegions::build(geometries))
    }

    pub fn get(&self, code: RegionCode) -> Option<&RegionRecord> {
        self.by_code.get(&code).map(|&idx| &self.regions[idx])
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionRecord> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn read_text(path: &Path) -> std::io::Result<String> {
    let mut reader = open_maybe_gz(path)?;
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

fn parse_feature(idx: usize, feature: Feature, options: &RegionSourceConfig) -> Result<RegionRecord> {
    let properties = feature.properties.unwrap_or_default();

    let code = properties
        .get(&options.code_property)
        .and_then(parse_code)
        .ok_or_else(|| {
            ExposureError::load(
                DATASET,
                format!(
                    "feature {idx}: missing or invalid '{}' property",
                    options.code_property
                ),
            )
        })?;

    let name = match properties.get(&options.name_property) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(ExposureError::load(
                DATASET,
                format!(
                    "region {code}: missing or invalid '{}' property",
                    options.name_property
                ),
            ))
        }
    };

    let geometry = feature.geometry.ok_or_else(|| {
        ExposureError::load(DATASET, format!("region {code}: feature has no geometry"))
    })?;
    let geometry = to_multipolygon(geometry)
        .map_err(|e| ExposureError::load(DATASET, format!("region {code}: {e}")))?;

    let attributes: RegionAttributes = serde_json::from_value(Value::Object(properties))
        .map_err(|e| ExposureError::load(DATASET, format!("region {code}: {e}")))?;

    Ok(RegionRecord {
        code,
        name,
        geometry,
        attributes,
    })
}

/// Codes may arrive as integers, integral floats or numeric strings.
fn parse_code(value: &Value) -> Option<RegionCode> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return RegionCode::try_from(v).ok();
            }
            let v = n.as_f64()?;
            if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(RegionCode::MAX) {
                Some(v as RegionCode)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a GeoJSON geometry into a validated geodetic multipolygon.
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> std::result::Result<MultiPolygon<f64>, String> {
    // geo closes rings on conversion, so closure is checked on the raw positions.
    match &geometry.value {
        geojson::Value::Polygon(rings) => check_rings(rings)?,
        geojson::Value::MultiPolygon(polygons) => {
            for rings in polygons {
                check_rings(rings)?;
            }
        }
        _ => {}
    }

    let geometry = geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| format!("invalid geometry: {e}"))?;

    let multi = match geometry {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        _ => return Err("expected a Polygon or MultiPolygon geometry".to_string()),
    };

    if multi.0.is_empty() {
        return Err("empty multipolygon".to_string());
    }

    for polygon in &multi {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            if ring.0.len() < 4 {
                return Err(format!("ring with {} coordinates", ring.0.len()));
            }
            if let Some(c) = ring
                .coords()
                .find(|c| !c.x.is_finite() || !c.y.is_finite() || c.x.abs() > 180.0 || c.y.abs() > 90.0)
            {
                return Err(format!("coordinate ({}, {}) outside geodetic range", c.x, c.y));
            }
        }
    }

    Ok(multi)
}

fn check_rings(rings: &[Vec<geojson::Position>]) -> std::result::Result<(), String> {
    for ring in rings {
        if ring.len() < 4 {
            return Err(format!("ring with {} positions", ring.len()));
        }
        if ring.first() != ring.last() {
            return Err("unclosed ring".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(lon: f64, lat: f64, size: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [lon, lat],
                [lon + size, lat],
                [lon + size, lat + size],
                [lon, lat + size],
                [lon, lat]
            ]]
        })
    }

    fn collection(features: Vec<Value>) -> String {
        json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    fn feature(code: Value, name: &str, geometry: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": {
                "com_istat_code_num": code,
                "name": name,
                "Unemployment 2022": 6.1
            },
            "geometry": geometry
        })
    }

    #[test]
    fn test_load_preserves_order_and_attributes() {
        let text = collection(vec![
            feature(json!(1272), "Torino", square(7.6, 45.0, 0.1)),
            feature(json!(1001.0), "Agliè", square(7.7, 45.3, 0.05)),
            feature(json!("1002"), "Airasca", square(7.4, 44.9, 0.05)),
        ]);
        let store = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap();

        let codes: Vec<_> = store.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![1272, 1001, 1002]);
        assert_eq!(store.get(1001).unwrap().name, "Agliè");
        assert_eq!(
            store.get(1272).unwrap().attributes.unemployment_rate,
            Some(6.1)
        );
        assert!(store.get(9999).is_none());
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let text = collection(vec![
            feature(json!(7), "A", square(7.0, 45.0, 0.1)),
            feature(json!(7), "B", square(8.0, 45.0, 0.1)),
        ]);
        let err = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap_err();
        assert!(matches!(err, ExposureError::Load { .. }));
        assert!(err.to_string().contains("duplicate region code 7"));
    }

    #[test]
    fn test_point_geometry_rejected() {
        let text = collection(vec![feature(
            json!(1),
            "A",
            json!({ "type": "Point", "coordinates": [7.0, 45.0] }),
        )]);
        let err = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap_err();
        assert!(matches!(err, ExposureError::Load { .. }));
    }

    #[test]
    fn test_unclosed_ring_rejected() {
        let text = collection(vec![feature(
            json!(1),
            "A",
            json!({
                "type": "Polygon",
                "coordinates": [[[7.0, 45.0], [7.1, 45.0], [7.1, 45.1]]]
            }),
        )]);
        let err = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap_err();
        assert!(matches!(err, ExposureError::Load { .. }));
        assert!(err.to_string().contains("ring"), "{err}");
    }

    #[test]
    fn test_unclosed_multipolygon_ring_rejected() {
        let text = collection(vec![feature(
            json!(1),
            "A",
            json!({
                "type": "MultiPolygon",
                "coordinates": [[[[7.0, 45.0], [7.1, 45.0], [7.1, 45.1], [7.0, 45.1]]]]
            }),
        )]);
        let err = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unclosed ring"), "{err}");
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let text = collection(vec![feature(json!(1), "A", square(200.0, 45.0, 1.0))]);
        assert!(PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).is_err());
    }

    #[test]
    fn test_missing_code_rejected() {
        let text = collection(vec![json!({
            "type": "Feature",
            "properties": { "name": "A" },
            "geometry": square(7.0, 45.0, 0.1)
        })]);
        assert!(PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).is_err());
    }

    #[test]
    fn test_not_a_collection_rejected() {
        let text = square(7.0, 45.0, 0.1).to_string();
        assert!(PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).is_err());
    }

    #[test]
    fn test_custom_property_names() {
        let text = collection(vec![json!({
            "type": "Feature",
            "properties": { "code": 5, "label": "Five" },
            "geometry": square(7.0, 45.0, 0.1)
        })]);
        let options = RegionSourceConfig {
            code_property: "code".to_string(),
            name_property: "label".to_string(),
        };
        let store = PolygonStore::from_geojson_str(&text, &options).unwrap();
        assert_eq!(store.get(5).unwrap().name, "Five");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = PolygonStore::load(
            Path::new("/nonexistent/data.geojson"),
            &RegionSourceConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExposureError::Load { .. }));
    }

    #[test]
    fn test_reproject_all_keeps_order() {
        let text = collection(vec![
            feature(json!(1), "A", square(7.0, 45.0, 0.1)),
            feature(json!(2), "B", square(9.0, 44.0, 0.1)),
        ]);
        let store = PolygonStore::from_geojson_str(&text, &RegionSourceConfig::default()).unwrap();
        let projected = store.reproject_all(&CoordinateProjector::default()).unwrap();

        assert_eq!(projected.len(), 2);
        // Projected coordinates are in meters, far from degree magnitudes.
        let first = projected.geometry(0).0[0].exterior().0[0];
        assert!(first.x > 1_000_000.0);
    }
}
