//! Flat output tables of an aggregation run

use crate::aggregation::{AggregateResult, ReservesReport};
use crate::data::WellId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DIRECT_TABLE: &str = "direct_estimates.csv";
pub const FALLBACK_TABLE: &str = "fallback_estimates.csv";
pub const AGGREGATE_TABLE: &str = "aggregate_reserves.csv";
pub const AGGREGATE_JSON: &str = "aggregate_reserves.json";

/// One row of the aggregate table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub well: WellId,
    /// Residual reserves, thousands of mass units
    pub residual_reserves: f64,
}

/// Paths written by `write_report`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub direct: PathBuf,
    pub fallback: PathBuf,
    pub aggregate: PathBuf,
    pub aggregate_json: PathBuf,
}

/// Write the three tables and the JSON aggregate into `dir`, creating it if needed
pub fn write_report<P: AsRef<Path>>(report: &ReservesReport, dir: P) -> Result<ReportFiles> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let files = ReportFiles {
        direct: dir.join(DIRECT_TABLE),
        fallback: dir.join(FALLBACK_TABLE),
        aggregate: dir.join(AGGREGATE_TABLE),
        aggregate_json: dir.join(AGGREGATE_JSON),
    };

    write_csv(&files.direct, &report.direct)?;
    write_csv(&files.fallback, &report.fallback)?;
    write_csv(&files.aggregate, &aggregate_rows(&report.aggregate))?;
    write_json(&files.aggregate_json, &report.aggregate)?;

    info!(dir = %dir.display(), wells = report.aggregate.len(), "Report written");
    Ok(files)
}

/// Aggregate result as table rows in well order
pub fn aggregate_rows(aggregate: &AggregateResult) -> Vec<AggregateRow> {
    aggregate
        .iter()
        .map(|(well, residual_reserves)| AggregateRow {
            well: well.clone(),
            residual_reserves,
        })
        .collect()
}

/// Serialize rows to a CSV file with a header line
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read rows back from a CSV file written by `write_csv`
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

fn write_json(path: &Path, aggregate: &AggregateResult) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, aggregate)?;
    Ok(())
}

/// Load an aggregate written by `write_report`
pub fn read_aggregate_json<P: AsRef<Path>>(path: P) -> Result<AggregateResult> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
