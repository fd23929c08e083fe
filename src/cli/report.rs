//! Detail table export.

use std::path::Path;

use anyhow::Result;
use csv::Writer;

use catchment::DetailRow;

const DEMOGRAPHIC_HEADERS: [&str; 6] = [
    "name",
    "area_percentage",
    "Totale maschi",
    "Totale femmine",
    "Active male",
    "Active female",
];

/// Write detail rows as CSV, one region per line, in query order.
pub fn write_detail_csv(path: &Path, rows: &[DetailRow]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header: Vec<&str> = DEMOGRAPHIC_HEADERS.to_vec();
    header.extend(
        catchment::models::RegionAttributes::default()
            .columns()
            .iter()
            .map(|(name, _)| *name),
    );
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.name.clone(),
            row.area_percentage.to_string(),
            row.total_male.to_string(),
            row.total_female.to_string(),
            row.active_male.to_string(),
            row.active_female.to_string(),
        ];
        record.extend(
            row.attributes
                .columns()
                .iter()
                .map(|(_, value)| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
