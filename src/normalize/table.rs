//! The column-oriented table produced by the normalizer.
//!
//! Columns appear lazily as stations report new measurement types, so the
//! table is an ordered map of column name to cells. Every write of a station
//! row is followed by a padding pass that keeps all columns the same length.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// A single value in a [`StationTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value for this station. Written as an empty field / null.
    Missing,
    Text(String),
    Number(f64),
    /// Seconds since the Unix epoch, as reported by the API.
    Timestamp(i64),
    /// A timestamp after [`StationTable::convert_timestamps`].
    DateTime(DateTime<Utc>),
}

impl Cell {
    /// Converts a JSON scalar from the API into a cell.
    ///
    /// `null` becomes [`Cell::Missing`]; booleans and nested values are kept as text.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Missing,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Cell::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// One row per station, one column per field seen in any station.
///
/// Invariant: every column holds exactly [`StationTable::height`] cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationTable {
    columns: IndexMap<String, Vec<Cell>>,
    rows: usize,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table whose first columns are `names`, in order.
    pub fn with_columns(names: &[&str]) -> Self {
        Self {
            columns: names
                .iter()
                .map(|name| (name.to_string(), Vec::new()))
                .collect(),
            rows: 0,
        }
    }

    /// Number of rows (stations).
    pub fn height(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn get(&self, column: &str, row: usize) -> Option<&Cell> {
        self.columns.get(column).and_then(|cells| cells.get(row))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.columns
            .iter()
            .map(|(name, cells)| (name.as_str(), cells.as_slice()))
    }

    /// `true` when every column has exactly `height()` cells.
    pub fn is_rectangular(&self) -> bool {
        self.columns.values().all(|cells| cells.len() == self.rows)
    }

    /// Appends one station's fields as a new row.
    ///
    /// Unseen fields create a column backfilled with [`Cell::Missing`] for the
    /// earlier rows; columns the station did not report are padded afterwards.
    pub fn push_row<I>(&mut self, record: I)
    where
        I: IntoIterator<Item = (String, Cell)>,
    {
        let previous_rows = self.rows;
        for (name, cell) in record {
            let cells = self
                .columns
                .entry(name)
                .or_insert_with(|| vec![Cell::Missing; previous_rows]);
            // A repeated field within one record keeps the last value.
            if cells.len() > previous_rows {
                cells.truncate(previous_rows);
            }
            cells.push(cell);
        }
        self.rows = previous_rows + 1;
        self.pad();
    }

    fn pad(&mut self) {
        let rows = self.rows;
        for cells in self.columns.values_mut() {
            cells.resize(rows, Cell::Missing);
        }
    }

    /// Turns epoch-second cells of every `*_timestamp` column into UTC datetimes.
    ///
    /// Cells that are already datetimes or missing are left alone, so applying
    /// this twice is the same as applying it once.
    pub fn convert_timestamps(&mut self) {
        for (name, cells) in self.columns.iter_mut() {
            if !name.ends_with("_timestamp") {
                continue;
            }
            for cell in cells.iter_mut() {
                if let Cell::Timestamp(secs) = *cell {
                    if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                        *cell = Cell::DateTime(dt);
                    }
                }
            }
        }
    }
}
