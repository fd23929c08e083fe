//! Administrative region records and their static attributes.

use geo::MultiPolygon;
use serde::{Deserialize, Deserializer, Serialize};

/// Administrative code shared by the region and demographic datasets.
pub type RegionCode = u32;

/// Static socioeconomic indicators attached to a region.
///
/// Property names follow the municipal reference dataset. Values may be
/// missing, null, empty strings or numeric strings; anything that does not
/// read as a number is rejected when the store is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionAttributes {
    #[serde(rename = "Unemployment 2022", default, deserialize_with = "lenient_f64")]
    pub unemployment_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub regional_cies: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub students: Option<f64>,

    #[serde(rename = "lvl_primary_school_k", default, deserialize_with = "lenient_f64")]
    pub primary_school_level: Option<f64>,

    #[serde(rename = "secondary_school_k", default, deserialize_with = "lenient_f64")]
    pub secondary_school_level: Option<f64>,

    #[serde(rename = "lvl_university_k", default, deserialize_with = "lenient_f64")]
    pub university_level: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub poverty_incidence: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub no_degree_wage: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub secondary_degree_wage: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub tertiary_degree_wage: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub all_levels_wage: Option<f64>,
}

impl RegionAttributes {
    /// Column headings and values in export order.
    pub fn columns(&self) -> [(&'static str, Option<f64>); 11] {
        [
            ("Unemployment 2022", self.unemployment_rate),
            ("regional_cies", self.regional_cies),
            ("students", self.students),
            ("lvl_primary_school_k", self.primary_school_level),
            ("secondary_school_k", self.secondary_school_level),
            ("lvl_university_k", self.university_level),
            ("poverty_incidence", self.poverty_incidence),
            ("no_degree_wage", self.no_degree_wage),
            ("secondary_degree_wage", self.secondary_degree_wage),
            ("tertiary_degree_wage", self.tertiary_degree_wage),
            ("all_levels_wage", self.all_levels_wage),
        ]
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, found {s:?}")))
        }
        other => Err(D::Error::custom(format!("expected a number, found {other}"))),
    }
}

/// A single administrative region as loaded from the reference dataset.
#[derive(Debug, Clone)]
pub struct RegionRecord {
    pub code: RegionCode,
    pub name: String,
    /// Boundary in the geodetic frame (lon/lat degrees)
    pub geometry: MultiPolygon<f64>,
    pub attributes: RegionAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_from_properties() {
        let attrs: RegionAttributes = serde_json::from_value(json!({
            "name": "Torino",
            "Unemployment 2022": 7.5,
            "students": "1200",
            "poverty_incidence": null,
            "all_levels_wage": "",
            "tertiary_degree_wage": "31,5"
        }))
        .unwrap();

        assert_eq!(attrs.unemployment_rate, Some(7.5));
        assert_eq!(attrs.students, Some(1200.0));
        assert_eq!(attrs.poverty_incidence, None);
        assert_eq!(attrs.all_levels_wage, None);
        assert_eq!(attrs.tertiary_degree_wage, Some(31.5));
        assert_eq!(attrs.no_degree_wage, None);
    }

    #[test]
    fn test_non_numeric_attribute_rejected() {
        let result: Result<RegionAttributes, _> =
            serde_json::from_value(json!({ "students": "many" }));
        assert!(result.is_err());
    }
}
