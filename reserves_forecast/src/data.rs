//! Well production histories and their cumulative transforms

use crate::error::{ReservesError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Opaque well identifier passed through from the upstream data
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WellId(String);

impl WellId {
    /// Create a new well identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WellId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WellId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One month of production for one well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Reporting month
    pub date: NaiveDate,
    /// Oil produced during the month, mass units
    pub oil: f64,
    /// Liquid produced during the month, mass units
    pub liquid: f64,
    /// Producing hours during the month
    pub hours: f64,
    /// Formation (object) the well produced from
    pub formation: String,
    /// Bottomhole X coordinate
    pub x: f64,
    /// Bottomhole Y coordinate
    pub y: f64,
}

impl ProductionRecord {
    /// Create a record with the formation left blank and zero hours
    pub fn new(date: NaiveDate, oil: f64, liquid: f64, x: f64, y: f64) -> Self {
        Self {
            date,
            oil,
            liquid,
            hours: 0.0,
            formation: String::new(),
            x,
            y,
        }
    }
}

/// Cleaned monthly history of a single well.
///
/// Dates are strictly increasing and monthly oil and liquid volumes are
/// positive. Both are checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WellHistory {
    well: WellId,
    records: Vec<ProductionRecord>,
}

impl WellHistory {
    /// Create a history, validating the record invariants
    pub fn new(well: impl Into<WellId>, records: Vec<ProductionRecord>) -> Result<Self> {
        let well = well.into();

        if records.is_empty() {
            return Err(ReservesError::DataError(format!(
                "Well {well} has no production records"
            )));
        }

        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ReservesError::DataError(format!(
                    "Well {well}: dates must be strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                )));
            }
        }

        if let Some(bad) = records.iter().find(|r| {
            !(r.oil.is_finite() && r.oil > 0.0 && r.liquid.is_finite() && r.liquid > 0.0)
        }) {
            return Err(ReservesError::DataError(format!(
                "Well {well}: non-positive monthly volume on {}",
                bad.date
            )));
        }

        Ok(Self { well, records })
    }

    /// Well identifier
    pub fn well(&self) -> &WellId {
        &self.well
    }

    /// Monthly records, oldest first
    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    /// Number of monthly records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; a history holds at least one record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn last_record(&self) -> &ProductionRecord {
        // Non-empty by construction
        &self.records[self.records.len() - 1]
    }

    /// Bottomhole location of the most recent record
    pub fn location(&self) -> (f64, f64) {
        let last = self.last_record();
        (last.x, last.y)
    }

    /// Oil produced over the whole history
    pub fn cumulative_oil(&self) -> f64 {
        self.records.iter().map(|r| r.oil).sum()
    }

    /// Oil rate of the most recent month
    pub fn last_oil_rate(&self) -> f64 {
        self.last_record().oil
    }

    /// Oil rate of the month before the most recent one, zero for a single record
    pub fn penultimate_oil_rate(&self) -> f64 {
        match self.records.len() {
            0 | 1 => 0.0,
            n => self.records[n - 2].oil,
        }
    }

    /// Cumulative production transforms over the full history
    pub fn cumulative(&self) -> CumulativeSeries {
        CumulativeSeries::from_history(self)
    }
}

/// Derived value channels available to the decline methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesChannel {
    CumulativeOil,
    CumulativeLiquid,
    CumulativeWater,
    /// Cumulative liquid over cumulative oil
    WaterLiquidRatio,
    LogCumulativeLiquid,
    LogCumulativeWater,
    LogCumulativeOil,
}

/// One month of the cumulative transform
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub oil_rate: f64,
    pub cumulative_oil: f64,
    pub cumulative_liquid: f64,
    pub cumulative_water: f64,
    pub water_liquid_ratio: f64,
    pub log_cumulative_liquid: f64,
    pub log_cumulative_water: f64,
    pub log_cumulative_oil: f64,
    pub x: f64,
    pub y: f64,
}

impl CumulativePoint {
    /// Value of a channel at this point
    pub fn channel(&self, channel: SeriesChannel) -> f64 {
        match channel {
            SeriesChannel::CumulativeOil => self.cumulative_oil,
            SeriesChannel::CumulativeLiquid => self.cumulative_liquid,
            SeriesChannel::CumulativeWater => self.cumulative_water,
            SeriesChannel::WaterLiquidRatio => self.water_liquid_ratio,
            SeriesChannel::LogCumulativeLiquid => self.log_cumulative_liquid,
            SeriesChannel::LogCumulativeWater => self.log_cumulative_water,
            SeriesChannel::LogCumulativeOil => self.log_cumulative_oil,
        }
    }
}

/// Cumulative oil, liquid and water with the regression transforms.
///
/// Sums always run over the full history; `tail` and `without_last` only
/// select points from the accumulated series.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSeries {
    points: Vec<CumulativePoint>,
}

impl CumulativeSeries {
    /// Accumulate a well history
    pub fn from_history(history: &WellHistory) -> Self {
        let mut cumulative_oil = 0.0;
        let mut cumulative_liquid = 0.0;

        let points = history
            .records()
            .iter()
            .map(|record| {
                cumulative_oil += record.oil;
                cumulative_liquid += record.liquid;
                let cumulative_water = cumulative_liquid - cumulative_oil;

                CumulativePoint {
                    date: record.date,
                    oil_rate: record.oil,
                    cumulative_oil,
                    cumulative_liquid,
                    cumulative_water,
                    water_liquid_ratio: cumulative_liquid / cumulative_oil,
                    log_cumulative_liquid: cumulative_liquid.ln(),
                    log_cumulative_water: cumulative_water.ln(),
                    log_cumulative_oil: cumulative_oil.ln(),
                    x: record.x,
                    y: record.y,
                }
            })
            .collect();

        Self { points }
    }

    /// Points of the series, oldest first
    pub fn points(&self) -> &[CumulativePoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Collect one channel as a vector
    pub fn channel(&self, channel: SeriesChannel) -> Vec<f64> {
        self.points.iter().map(|p| p.channel(channel)).collect()
    }

    /// The last `n` points (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// The series without its most recent point
    pub fn without_last(&self) -> Self {
        let end = self.points.len().saturating_sub(1);
        Self {
            points: self.points[..end].to_vec(),
        }
    }

    /// Most recent point
    pub fn last(&self) -> Option<&CumulativePoint> {
        self.points.last()
    }

    /// Point before the most recent one
    pub fn penultimate(&self) -> Option<&CumulativePoint> {
        self.points.len().checked_sub(2).map(|i| &self.points[i])
    }

    /// Whole calendar years between the first and the last point
    pub fn elapsed_years(&self) -> i32 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.date.year() - first.date.year(),
            _ => 0,
        }
    }
}

/// Column names of a cleaned history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryColumns {
    pub well: String,
    pub date: String,
    pub oil: String,
    pub liquid: String,
    pub hours: String,
    pub formation: String,
    pub x: String,
    pub y: String,
}

impl Default for HistoryColumns {
    fn default() -> Self {
        Self {
            well: "well".to_string(),
            date: "date".to_string(),
            oil: "oil".to_string(),
            liquid: "liquid".to_string(),
            hours: "hours".to_string(),
            formation: "formation".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
        }
    }
}

/// Data loader for cleaned well histories
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load well histories from a CSV file with the default column names
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<WellHistory>> {
        Self::from_csv_with_columns(path, &HistoryColumns::default())
    }

    /// Load well histories from a CSV file with custom column names
    pub fn from_csv_with_columns<P: AsRef<Path>>(
        path: P,
        columns: &HistoryColumns,
    ) -> Result<Vec<WellHistory>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe_with_columns(&df, columns)
    }

    /// Create well histories from an existing DataFrame with the default column names
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<WellHistory>> {
        Self::from_dataframe_with_columns(df, &HistoryColumns::default())
    }

    /// Create well histories from an existing DataFrame.
    ///
    /// Rows are grouped per well and sorted by date; histories come back in
    /// well-identifier order.
    pub fn from_dataframe_with_columns(
        df: &DataFrame,
        columns: &HistoryColumns,
    ) -> Result<Vec<WellHistory>> {
        let wells = Self::string_column(df, &columns.well)?;
        let dates = Self::string_column(df, &columns.date)?
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<Vec<_>>>()?;
        let oil = Self::float_column(df, &columns.oil)?;
        let liquid = Self::float_column(df, &columns.liquid)?;
        let hours = Self::float_column(df, &columns.hours)?;
        let formations = Self::string_column(df, &columns.formation)?;
        let xs = Self::float_column(df, &columns.x)?;
        let ys = Self::float_column(df, &columns.y)?;

        let mut grouped: BTreeMap<WellId, Vec<ProductionRecord>> = BTreeMap::new();
        for i in 0..df.height() {
            grouped
                .entry(WellId::new(wells[i].clone()))
                .or_default()
                .push(ProductionRecord {
                    date: dates[i],
                    oil: oil[i],
                    liquid: liquid[i],
                    hours: hours[i],
                    formation: formations[i].clone(),
                    x: xs[i],
                    y: ys[i],
                });
        }

        grouped
            .into_iter()
            .map(|(well, mut records)| {
                records.sort_by_key(|r| r.date);
                WellHistory::new(well, records)
            })
            .collect()
    }

    /// Helper method to get a column as f64 values, rejecting nulls
    fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let col = df.column(name).map_err(|e| {
            ReservesError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;
        let casted = col.cast(&DataType::Float64)?;

        casted
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    ReservesError::DataError(format!("Column '{}' has no value in row {}", name, row))
                })
            })
            .collect()
    }

    /// Helper method to get a column as strings, rejecting nulls
    fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
        let col = df.column(name).map_err(|e| {
            ReservesError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;
        let casted = col.cast(&DataType::Utf8)?;

        casted
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.map(|s| s.trim().to_string()).ok_or_else(|| {
                    ReservesError::DataError(format!("Column '{}' has no value in row {}", name, row))
                })
            })
            .collect()
    }
}

/// Parse a report date in ISO (`2021-03-01`, optionally with a time) or
/// day-first dotted (`01.03.2021`) form
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .map_err(|_| ReservesError::DataError(format!("Unrecognized date '{}'", raw)))
}
