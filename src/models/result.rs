//! Query output: weighted totals plus a per-region detail table.

use serde::{Deserialize, Serialize};

use super::{RegionAttributes, RegionCode};

/// One row of the detail table.
///
/// Demographic counts are the region's raw sums, not scaled by
/// `area_percentage`; only the totals on [`AggregateResult`] are weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub code: RegionCode,
    pub name: String,
    pub area_percentage: f64,
    pub total_male: u64,
    pub total_female: u64,
    pub active_male: u64,
    pub active_female: u64,
    #[serde(flatten)]
    pub attributes: RegionAttributes,
}

/// Result of a single exposure query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_population: f64,
    pub total_active_population: f64,
    pub detail: Vec<DetailRow>,
}

impl AggregateResult {
    /// Package totals and detail rows. Row order is kept as given.
    pub fn assemble(
        total_population: f64,
        total_active_population: f64,
        detail: Vec<DetailRow>,
    ) -> Self {
        Self {
            total_population,
            total_active_population,
            detail,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: RegionCode, name: &str) -> DetailRow {
        DetailRow {
            code,
            name: name.to_string(),
            area_percentage: 0.5,
            total_male: 10,
            total_female: 12,
            active_male: 6,
            active_female: 7,
            attributes: RegionAttributes::default(),
        }
    }

    #[test]
    fn test_assemble_keeps_order() {
        let result = AggregateResult::assemble(
            11.0,
            6.5,
            vec![row(3, "Zeta"), row(1, "Alpha"), row(2, "Beta")],
        );
        let codes: Vec<_> = result.detail.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![3, 1, 2]);
        assert_eq!(result.total_population, 11.0);
    }

    #[test]
    fn test_default_is_empty() {
        let result = AggregateResult::default();
        assert!(result.is_empty());
        assert_eq!(result.total_population, 0.0);
        assert_eq!(result.total_active_population, 0.0);
    }

    #[test]
    fn test_detail_json_flattens_attributes() {
        let mut r = row(1, "Alpha");
        r.attributes.students = Some(40.0);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["students"], 40.0);
        assert_eq!(value["name"], "Alpha");
    }
}
