//! Demographic CSV loading, keyed by region code and age band.

use std::borrow::Cow;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use hashbrown::HashMap;
use serde::Serialize;
use tracing::info;

use crate::config::{DemographicSourceConfig, TextEncoding};
use crate::error::{ExposureError, Result};
use crate::models::RegionCode;
use crate::source::open_maybe_gz;

const DATASET: &str = "demographic dataset";

/// Age band of the explicit all-ages row.
pub const ALL_AGES: u32 = 999;

/// Working-age bands counted as active population.
pub const WORKING_AGE: RangeInclusive<u32> = 15..=64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemographicRow {
    pub region_code: RegionCode,
    pub age_band: u32,
    pub male_count: u64,
    pub female_count: u64,
}

/// Unweighted population sums for one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionDemographics {
    /// Males on the all-ages rows
    pub total_male: u64,
    /// Females on the all-ages rows
    pub total_female: u64,
    pub active_male: u64,
    pub active_female: u64,
}

impl RegionDemographics {
    pub fn total(&self) -> u64 {
        self.total_male + self.total_female
    }

    pub fn active(&self) -> u64 {
        self.active_male + self.active_female
    }
}

/// Demographic rows grouped by region code.
#[derive(Debug, Clone, Default)]
pub struct DemographicTable {
    rows: HashMap<RegionCode, Vec<DemographicRow>>,
    row_count: usize,
}

impl DemographicTable {
    /// Load the demographic CSV (optionally gzip-compressed).
    pub fn load(path: &Path, options: &DemographicSourceConfig) -> Result<Self> {
        info!("Loading demographics from {}", path.display());

        let reader = open_maybe_gz(path)
            .map_err(|e| ExposureError::load(DATASET, format!("{}: {e}", path.display())))?;

        let table = Self::from_reader(reader, options)?;
        info!(
            "Loaded {} demographic rows for {} regions",
            table.len(),
            table.region_count()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(mut reader: R, options: &DemographicSourceConfig) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ExposureError::load(DATASET, e))?;

        let text = decode(&bytes, options.encoding)?;
        let body = skip_lines(&text, options.skip_lines);

        if !options.delimiter.is_ascii() {
            return Err(ExposureError::load(
                DATASET,
                format!("delimiter {:?} is not a single byte", options.delimiter),
            ));
        }

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(options.delimiter as u8)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let headers = csv_reader
            .headers()
            .map_err(|e| ExposureError::load(DATASET, e))?
            .clone();

        let code_idx = column(&headers, &options.code_column)?;
        let age_idx = column(&headers, &options.age_column)?;
        let male_idx = column(&headers, &options.male_column)?;
        let female_idx = column(&headers, &options.female_column)?;

        // Reader positions count from the first line after the skipped preamble.
        let offset = options.skip_lines as u64;
        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| ExposureError::load(DATASET, e))?;
            rows.push(DemographicRow {
                region_code: field(&record, offset, code_idx, &options.code_column)?,
                age_band: field(&record, offset, age_idx, &options.age_column)?,
                male_count: field(&record, offset, male_idx, &options.male_column)?,
                female_count: field(&record, offset, female_idx, &options.female_column)?,
            });
        }

        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<DemographicRow>) -> Self {
        let row_count = rows.len();
        let mut grouped: HashMap<RegionCode, Vec<DemographicRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.region_code).or_default().push(row);
        }
        Self {
            rows: grouped,
            row_count,
        }
    }

    /// All rows for a region; empty when the code is unknown.
    pub fn rows_for(&self, code: RegionCode) -> &[DemographicRow] {
        self.rows.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum the all-ages and working-age rows of a region.
    ///
    /// Unknown codes yield zeros.
    pub fn summarize(&self, code: RegionCode) -> RegionDemographics {
        self.rows_for(code)
            .iter()
            .fold(RegionDemographics::default(), |mut acc, row| {
                if row.age_band == ALL_AGES {
                    acc.total_male += row.male_count;
                    acc.total_female += row.female_count;
                } else if WORKING_AGE.contains(&row.age_band) {
                    acc.active_male += row.male_count;
                    acc.active_female += row.female_count;
                }
                acc
            })
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn region_count(&self) -> usize {
        self.rows.len()
    }
}

fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        // Exact ISO-8859-1, not the windows-1252 mapping behind the "latin1" label.
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
        TextEncoding::Utf8 => {
            let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
            if had_errors {
                return Err(ExposureError::load(DATASET, "invalid UTF-8 text"));
            }
            Ok(text)
        }
    }
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ExposureError::load(DATASET, format!("column '{name}' not found")))
}

fn field<T: std::str::FromStr>(
    record: &StringRecord,
    offset: u64,
    idx: usize,
    name: &str,
) -> Result<T> {
    let line = record.position().map_or(0, |p| p.line()) + offset;
    let raw = record.get(idx).ok_or_else(|| {
        ExposureError::load(DATASET, format!("line {line}: missing '{name}' value"))
    })?;
    raw.parse().map_err(|_| {
        ExposureError::load(DATASET, format!("line {line}: invalid '{name}' value {raw:?}"))
    })
}
