use approx::assert_relative_eq;
use chrono::NaiveDate;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use reserves_forecast::data::{
    parse_date, DataLoader, HistoryColumns, ProductionRecord, SeriesChannel, WellHistory, WellId,
};
use reserves_forecast::error::ReservesError;
use std::io::Write;
use tempfile::NamedTempFile;

fn month(i: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, i % 12 + 1, 1).unwrap()
}

fn history(oil: &[f64], liquid: &[f64]) -> WellHistory {
    let records = oil
        .iter()
        .zip(liquid)
        .enumerate()
        .map(|(i, (&o, &l))| ProductionRecord::new(month(i as u32), o, l, 10.0 * i as f64, 5.0))
        .collect();
    WellHistory::new("W1", records).unwrap()
}

#[test]
fn test_well_history_validation() {
    assert!(matches!(
        WellHistory::new("W1", Vec::new()),
        Err(ReservesError::DataError(_))
    ));

    let unordered = vec![
        ProductionRecord::new(month(1), 10.0, 20.0, 0.0, 0.0),
        ProductionRecord::new(month(0), 10.0, 20.0, 0.0, 0.0),
    ];
    assert!(WellHistory::new("W1", unordered).is_err());

    let repeated = vec![
        ProductionRecord::new(month(0), 10.0, 20.0, 0.0, 0.0),
        ProductionRecord::new(month(0), 10.0, 20.0, 0.0, 0.0),
    ];
    assert!(WellHistory::new("W1", repeated).is_err());

    let zero_oil = vec![ProductionRecord::new(month(0), 0.0, 20.0, 0.0, 0.0)];
    assert!(WellHistory::new("W1", zero_oil).is_err());
}

#[test]
fn test_well_history_accessors() {
    let h = history(&[100.0, 150.0], &[300.0, 200.0]);

    assert_eq!(h.well(), &WellId::new("W1"));
    assert_eq!(h.len(), 2);
    assert_eq!(h.cumulative_oil(), 250.0);
    assert_eq!(h.last_oil_rate(), 150.0);
    assert_eq!(h.penultimate_oil_rate(), 100.0);
    assert_eq!(h.location(), (10.0, 5.0));

    let single = history(&[40.0], &[80.0]);
    assert_eq!(single.penultimate_oil_rate(), 0.0);
}

#[test]
fn test_cumulative_series_channels() {
    let series = history(&[100.0, 150.0], &[300.0, 200.0]).cumulative();

    assert_eq!(series.channel(SeriesChannel::CumulativeOil), vec![100.0, 250.0]);
    assert_eq!(series.channel(SeriesChannel::CumulativeLiquid), vec![300.0, 500.0]);
    assert_eq!(series.channel(SeriesChannel::CumulativeWater), vec![200.0, 250.0]);
    assert_eq!(series.channel(SeriesChannel::WaterLiquidRatio), vec![3.0, 2.0]);

    let log_water = series.channel(SeriesChannel::LogCumulativeWater);
    assert_relative_eq!(log_water[1], 250.0_f64.ln());
    let log_oil = series.channel(SeriesChannel::LogCumulativeOil);
    assert_relative_eq!(log_oil[0], 100.0_f64.ln());
}

#[test]
fn test_tail_keeps_full_history_sums() {
    let series = history(&[100.0, 150.0, 130.0, 20.0], &[300.0, 200.0, 220.0, 60.0]).cumulative();
    let tail = series.tail(3);

    assert_eq!(tail.len(), 3);
    assert_eq!(
        tail.channel(SeriesChannel::CumulativeOil),
        vec![250.0, 380.0, 400.0]
    );

    let trimmed = tail.without_last();
    assert_eq!(trimmed.len(), 2);
    assert_eq!(trimmed.last().unwrap().oil_rate, 130.0);
    assert_eq!(trimmed.penultimate().unwrap().oil_rate, 150.0);

    // Longer than the series
    assert_eq!(series.tail(10).len(), 4);
}

#[test]
fn test_elapsed_years() {
    let oil = vec![10.0; 14];
    let series = history(&oil, &oil).cumulative();
    assert_eq!(series.elapsed_years(), 1);
    assert_eq!(series.tail(2).elapsed_years(), 0);
}

#[test]
fn test_parse_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    assert_eq!(parse_date("2021-03-01").unwrap(), expected);
    assert_eq!(parse_date("2021-03-01 00:00:00").unwrap(), expected);
    assert_eq!(parse_date("01.03.2021").unwrap(), expected);
    assert!(parse_date("March 2021").is_err());
}

#[test]
fn test_load_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "well,date,oil,liquid,hours,formation,x,y").unwrap();
    // Rows deliberately out of order
    writeln!(file, "B,2021-02-01,50,80,700,J1,500,600").unwrap();
    writeln!(file, "A,2021-02-01,150,200,720,J1,100,200").unwrap();
    writeln!(file, "A,2021-01-01,100,300,744,J1,100,200").unwrap();
    writeln!(file, "B,2021-01-01,60,90,744,J1,500,600").unwrap();

    let histories = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].well().as_str(), "A");
    assert_eq!(histories[1].well().as_str(), "B");

    let a = &histories[0];
    assert_eq!(a.records()[0].date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    assert_eq!(a.records()[0].oil, 100.0);
    assert_eq!(a.records()[1].liquid, 200.0);
    assert_eq!(a.records()[1].hours, 720.0);
    assert_eq!(a.records()[1].formation, "J1");
    assert_eq!(a.location(), (100.0, 200.0));
}

#[test]
fn test_load_from_csv_missing_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "well,date,oil").unwrap();
    writeln!(file, "A,2021-01-01,100").unwrap();

    assert!(DataLoader::from_csv(file.path()).is_err());
}

#[test]
fn test_load_from_csv_rejects_bad_volumes() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "well,date,oil,liquid,hours,formation,x,y").unwrap();
    writeln!(file, "A,2021-01-01,0,300,744,J1,100,200").unwrap();

    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ReservesError::DataError(_))
    ));
}

#[test]
fn test_from_dataframe_with_custom_columns() {
    let df = DataFrame::new(vec![
        Series::new("skv", &[7i64, 7, 8]),
        Series::new("month", &["2022-05-01", "2022-06-01", "2022-05-01"]),
        Series::new("q_oil", &[10.0, 12.0, 30.0]),
        Series::new("q_liq", &[20.0, 25.0, 31.0]),
        Series::new("t", &[700.0, 710.0, 720.0]),
        Series::new("obj", &["U1", "U1", "U2"]),
        Series::new("bx", &[1.0, 1.0, 4.0]),
        Series::new("by", &[2.0, 2.0, 8.0]),
    ])
    .unwrap();

    let columns = HistoryColumns {
        well: "skv".to_string(),
        date: "month".to_string(),
        oil: "q_oil".to_string(),
        liquid: "q_liq".to_string(),
        hours: "t".to_string(),
        formation: "obj".to_string(),
        x: "bx".to_string(),
        y: "by".to_string(),
    };

    let histories = DataLoader::from_dataframe_with_columns(&df, &columns).unwrap();
    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].well().as_str(), "7");
    assert_eq!(histories[0].len(), 2);
    assert_eq!(histories[1].records()[0].formation, "U2");
}
