//! Area-weighted population totals over the selected regions.

use tracing::debug;

use super::DemographicTable;
use crate::error::{ExposureError, Result};
use crate::models::{AggregateResult, DetailRow};
use crate::regions::{IntersectionRecord, PolygonStore};

/// Join selected regions against the demographic table and weight by coverage.
///
/// Totals are scaled by each region's `area_percentage`; the detail rows carry
/// the raw region sums. Regions with no demographic rows contribute zero.
pub fn aggregate(
    records: &[IntersectionRecord],
    store: &PolygonStore,
    table: &DemographicTable,
) -> Result<AggregateResult> {
    let detail = records
        .iter()
        .map(|record| {
            let region = store.get(record.region_code).ok_or_else(|| {
                ExposureError::Computation(format!(
                    "selected region {} is not in the store",
                    record.region_code
                ))
            })?;
            let counts = table.summarize(record.region_code);
            if table.rows_for(record.region_code).is_empty() {
                debug!("No demographic rows for region {}", record.region_code);
            }

            Ok(DetailRow {
                code: region.code,
                name: region.name.clone(),
                area_percentage: record.area_percentage,
                total_male: counts.total_male,
                total_female: counts.total_female,
                active_male: counts.active_male,
                active_female: counts.active_female,
                attributes: region.attributes.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (total, active) = detail.iter().fold((0.0, 0.0), |(total, active), row| {
        (
            total + (row.total_male + row.total_female) as f64 * row.area_percentage,
            active + (row.active_male + row.active_female) as f64 * row.area_percentage,
        )
    });

    Ok(AggregateResult::assemble(total, active, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::{DemographicRow, ALL_AGES};
    use crate::models::{RegionAttributes, RegionCode, RegionRecord};
    use geo::{polygon, MultiPolygon};

    fn region(code: RegionCode) -> RegionRecord {
        RegionRecord {
            code,
            name: format!("comune-{code}"),
            geometry: MultiPolygon(vec![polygon![
                (x: 7.0, y: 45.0),
                (x: 7.1, y: 45.0),
                (x: 7.1, y: 45.1),
                (x: 7.0, y: 45.0),
            ]]),
            attributes: RegionAttributes {
                poverty_incidence: Some(4.2),
                ..Default::default()
            },
        }
    }

    fn selected(code: RegionCode, area_percentage: f64) -> IntersectionRecord {
        IntersectionRecord {
            region_code: code,
            intersection: MultiPolygon(vec![]),
            area_percentage,
        }
    }

    fn row(code: RegionCode, age: u32, male: u64, female: u64) -> DemographicRow {
        DemographicRow {
            region_code: code,
            age_band: age,
            male_count: male,
            female_count: female,
        }
    }

    #[test]
    fn test_weighted_totals_unweighted_detail() {
        let store = PolygonStore::from_records(vec![region(1), region(2)]).unwrap();
        let table = DemographicTable::from_rows(vec![
            row(1, ALL_AGES, 100, 100),
            row(1, 30, 60, 60),
            row(2, ALL_AGES, 50, 50),
            row(2, 70, 50, 50),
        ]);

        let result = aggregate(&[selected(1, 1.0), selected(2, 0.25)], &store, &table).unwrap();

        assert_eq!(result.total_population, 200.0 + 25.0);
        assert_eq!(result.total_active_population, 120.0);
        assert_eq!(result.detail.len(), 2);
        assert_eq!(result.detail[1].total_male, 50);
        assert_eq!(result.detail[1].area_percentage, 0.25);
        assert_eq!(result.detail[0].attributes.poverty_incidence, Some(4.2));
    }

    #[test]
    fn test_missing_demographics_contribute_zero() {
        let store = PolygonStore::from_records(vec![region(1), region(2)]).unwrap();
        let table = DemographicTable::from_rows(vec![row(1, ALL_AGES, 10, 10)]);

        let result = aggregate(&[selected(1, 0.5), selected(2, 1.0)], &store, &table).unwrap();

        assert_eq!(result.total_population, 10.0);
        assert_eq!(result.total_active_population, 0.0);
        assert_eq!(result.detail[1].total_male, 0);
        assert_eq!(result.detail[1].name, "comune-2");
    }

    #[test]
    fn test_total_bounded_by_unweighted_sum() {
        let store = PolygonStore::from_records(vec![region(1), region(2), region(3)]).unwrap();
        let table = DemographicTable::from_rows(vec![
            row(1, ALL_AGES, 10, 12),
            row(2, ALL_AGES, 300, 280),
            row(3, ALL_AGES, 7, 9),
        ]);
        let records = [selected(1, 0.9), selected(2, 0.1), selected(3, 1.0)];

        let result = aggregate(&records, &store, &table).unwrap();
        let unweighted: u64 = records
            .iter()
            .map(|r| table.summarize(r.region_code).total())
            .sum();
        assert!(result.total_population <= unweighted as f64);
    }

    #[test]
    fn test_empty_selection() {
        let store = PolygonStore::from_records(vec![region(1)]).unwrap();
        let table = DemographicTable::from_rows(vec![row(1, ALL_AGES, 10, 10)]);
        let result = aggregate(&[], &store, &table).unwrap();
        assert_eq!(result, AggregateResult::default());
    }

    #[test]
    fn test_unknown_region_is_computation_error() {
        let store = PolygonStore::from_records(vec![region(1)]).unwrap();
        let table = DemographicTable::default();
        let err = aggregate(&[selected(9, 1.0)], &store, &table).unwrap_err();
        assert!(matches!(err, ExposureError::Computation(_)));
    }
}
