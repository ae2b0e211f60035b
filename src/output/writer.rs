use crate::normalize::table::{Cell, StationTable};
use crate::output::error::OutputError;
use chrono::{DateTime, Local};
use log::info;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// The polars dtype a table column is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Number,
    Timestamp,
    DateTime,
    Text,
}

impl ColumnKind {
    /// Uniform non-missing cells keep their type; a mix becomes text.
    /// Numbers without a fractional part are integers, like the API's `altitude`.
    /// An all-missing column is numeric so it reads back as nulls.
    fn infer(cells: &[Cell]) -> ColumnKind {
        let mut kinds = cells.iter().filter_map(|cell| match cell {
            Cell::Missing => None,
            Cell::Number(v) if as_whole(*v).is_some() => Some(ColumnKind::Integer),
            Cell::Number(_) => Some(ColumnKind::Number),
            Cell::Timestamp(_) => Some(ColumnKind::Timestamp),
            Cell::DateTime(_) => Some(ColumnKind::DateTime),
            Cell::Text(_) => Some(ColumnKind::Text),
        });
        let Some(mut kind) = kinds.next() else {
            return ColumnKind::Number;
        };
        for next in kinds {
            kind = match (kind, next) {
                (a, b) if a == b => a,
                (ColumnKind::Integer, ColumnKind::Number)
                | (ColumnKind::Number, ColumnKind::Integer) => ColumnKind::Number,
                _ => return ColumnKind::Text,
            };
        }
        kind
    }
}

/// `v` as an `i64` when it is finite, whole and in range.
fn as_whole(v: f64) -> Option<i64> {
    // 2^63 as f64; values at or beyond it do not fit.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (v.is_finite() && v.fract() == 0.0 && v >= -LIMIT && v < LIMIT).then_some(v as i64)
}

impl StationTable {
    /// Converts the table into a polars `DataFrame`, one column per table column.
    ///
    /// Missing cells become nulls. Datetime columns are `Datetime(ms, UTC)`.
    pub fn to_dataframe(&self) -> Result<DataFrame, OutputError> {
        let columns = self
            .columns()
            .map(|(name, cells)| column_to_series(name, cells).map(Column::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataFrame::new(columns)?)
    }
}

fn column_to_series(name: &str, cells: &[Cell]) -> Result<Series, OutputError> {
    let name = PlSmallStr::from(name);
    let series = match ColumnKind::infer(cells) {
        ColumnKind::Integer => Series::new(
            name,
            cells
                .iter()
                .map(|cell| cell.as_f64().and_then(as_whole))
                .collect::<Vec<Option<i64>>>(),
        ),
        ColumnKind::Number => Series::new(
            name,
            cells.iter().map(Cell::as_f64).collect::<Vec<Option<f64>>>(),
        ),
        ColumnKind::Timestamp => Series::new(
            name,
            cells
                .iter()
                .map(Cell::as_timestamp)
                .collect::<Vec<Option<i64>>>(),
        ),
        ColumnKind::DateTime => Series::new(
            name,
            cells
                .iter()
                .map(|cell| cell.as_datetime().map(|dt| dt.timestamp_millis()))
                .collect::<Vec<Option<i64>>>(),
        )
        .cast(&DataType::Datetime(
            TimeUnit::Milliseconds,
            Some("UTC".into()),
        ))?,
        ColumnKind::Text => Series::new(
            name,
            cells.iter().map(cell_text).collect::<Vec<Option<String>>>(),
        ),
    };
    Ok(series)
}

fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Missing => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(v) => Some(v.to_string()),
        Cell::Timestamp(t) => Some(t.to_string()),
        Cell::DateTime(dt) => Some(dt.to_rfc3339()),
    }
}

/// File name for a table written at `now`: local time, second precision.
pub fn timestamped_file_name(now: DateTime<Local>) -> String {
    format!("{}.csv", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Writes `table` as CSV into `dir`, named after the current local time.
///
/// Returns the path of the written file. The directory is created if needed.
pub fn write_csv(table: &StationTable, dir: &Path) -> Result<PathBuf, OutputError> {
    write_csv_at(table, dir, Local::now())
}

pub fn write_csv_at(
    table: &StationTable,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(dir).map_err(|e| OutputError::DirCreation(dir.to_path_buf(), e))?;
    let path = dir.join(timestamped_file_name(now));

    let mut df = table.to_dataframe()?;
    let mut file = File::create(&path).map_err(|e| OutputError::FileCreate(path.clone(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| OutputError::CsvWrite(path.clone(), e))?;

    info!(
        "Wrote {} stations x {} columns to {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(path)
}
