//! CSV loader for progressive tax bracket tables.
//!
//! ## CSV Format
//!
//! | Column            | Required | Type    | Notes                                              |
//! |-------------------|----------|---------|----------------------------------------------------|
//! | `jurisdiction`    | yes      | string  | Schedule name, matched case-insensitively          |
//! | `upper_threshold` | no       | decimal | Empty on the single excess-rate row                |
//! | `rate`            | yes      | decimal | Marginal rate as a fraction (e.g. `0.15`)          |
//! | `exemption`       | yes      | decimal | Must be identical on every row of a jurisdiction   |
//!
//! Bracket rows of a jurisdiction appear in ascending threshold order and are
//! followed by exactly one excess-rate row.
//!
//! ```csv
//! jurisdiction,upper_threshold,rate,exemption
//! federal,55867,0.15,15705
//! federal,111733,0.205,15705
//! federal,,0.33,15705
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use forecast_core::{CalculationError, TaxBracket, TaxBracketSchedule};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a bracket table.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot open bracket table '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("jurisdiction '{0}' has no excess-rate row (empty upper_threshold)")]
    MissingExcessRate(String),

    #[error("jurisdiction '{0}' has a bracket row after its excess-rate row")]
    RowAfterExcessRate(String),

    #[error("jurisdiction '{jurisdiction}' mixes exemptions {expected} and {found}")]
    InconsistentExemption {
        jurisdiction: String,
        expected: Decimal,
        found: Decimal,
    },

    #[error("jurisdiction '{jurisdiction}' is not a valid schedule: {source}")]
    InvalidSchedule {
        jurisdiction: String,
        #[source]
        source: CalculationError,
    },

    #[error("jurisdiction '{0}' not found in bracket table")]
    UnknownJurisdiction(String),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the bracket table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub jurisdiction: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_threshold: Option<Decimal>,
    pub rate: Decimal,
    pub exemption: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Validated schedules keyed by lowercase jurisdiction name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketTable {
    schedules: BTreeMap<String, TaxBracketSchedule>,
}

impl BracketTable {
    /// Looks up a schedule by name, ignoring case and surrounding whitespace.
    pub fn get(
        &self,
        jurisdiction: &str,
    ) -> Result<&TaxBracketSchedule, ScheduleLoaderError> {
        self.schedules
            .get(&normalize(jurisdiction))
            .ok_or_else(|| ScheduleLoaderError::UnknownJurisdiction(jurisdiction.to_string()))
    }

    /// Jurisdiction names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schedules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

fn normalize(jurisdiction: &str) -> String {
    jurisdiction.trim().to_lowercase()
}

/// Loader for bracket tables stored as CSV.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records by jurisdiction and validate each group as a schedule.
    ///
    /// Rows keep their file order within a jurisdiction; rows of different
    /// jurisdictions may be interleaved.
    pub fn build(records: &[ScheduleRecord]) -> Result<BracketTable, ScheduleLoaderError> {
        let mut groups: BTreeMap<String, Vec<&ScheduleRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(normalize(&record.jurisdiction))
                .or_default()
                .push(record);
        }

        let mut schedules = BTreeMap::new();
        for (jurisdiction, rows) in groups {
            let schedule = build_schedule(&jurisdiction, &rows)?;
            debug!(
                %jurisdiction,
                brackets = schedule.brackets().len(),
                "loaded tax schedule"
            );
            schedules.insert(jurisdiction, schedule);
        }

        Ok(BracketTable { schedules })
    }

    /// Parse and build a bracket table from a file on disk.
    pub fn load_from_file(path: &Path) -> Result<BracketTable, ScheduleLoaderError> {
        let file = File::open(path).map_err(|source| ScheduleLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = Self::parse(file)?;
        Self::build(&records)
    }
}

fn build_schedule(
    jurisdiction: &str,
    rows: &[&ScheduleRecord],
) -> Result<TaxBracketSchedule, ScheduleLoaderError> {
    // `build` never creates an empty group.
    let exemption = rows[0].exemption;
    let mut brackets = Vec::with_capacity(rows.len());
    let mut excess_rate = None;

    for row in rows {
        if row.exemption != exemption {
            return Err(ScheduleLoaderError::InconsistentExemption {
                jurisdiction: jurisdiction.to_string(),
                expected: exemption,
                found: row.exemption,
            });
        }
        if excess_rate.is_some() {
            return Err(ScheduleLoaderError::RowAfterExcessRate(
                jurisdiction.to_string(),
            ));
        }
        match row.upper_threshold {
            Some(threshold) => brackets.push(TaxBracket::new(row.rate, threshold)),
            None => excess_rate = Some(row.rate),
        }
    }

    let excess_rate = excess_rate
        .ok_or_else(|| ScheduleLoaderError::MissingExcessRate(jurisdiction.to_string()))?;

    TaxBracketSchedule::new(brackets, excess_rate, exemption).map_err(|source| {
        ScheduleLoaderError::InvalidSchedule {
            jurisdiction: jurisdiction.to_string(),
            source,
        }
    })
}
