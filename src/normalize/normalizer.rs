use crate::normalize::error::NormalizeError;
use crate::normalize::measure_group::{parse_group, ParsedGroup};
use crate::normalize::table::{Cell, StationTable};
use crate::types::raw_response::RawResponse;
use bon::bon;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;

/// Columns every table starts with, one value per station.
pub const POSITION_COLUMNS: [&str; 5] = ["mac_id", "altitude", "longitude", "latitude", "timezone"];

/// Flattens a `getpublicdata` response into a [`StationTable`].
///
/// # Examples
///
/// ```
/// use netatmo_public::{Normalizer, RawResponse};
/// use serde_json::json;
///
/// let raw = RawResponse::new(json!({
///     "body": [{
///         "_id": "70:ee:50:00:00:01",
///         "place": {"location": [10.2, 56.15], "altitude": 42, "timezone": "Europe/Copenhagen"},
///         "measures": {
///             "02:00:00:00:00:01": {"res": {"1536149253": [18.1, 74]}, "type": ["temperature", "humidity"]}
///         }
///     }]
/// }));
///
/// let table = Normalizer::builder()
///     .convert_timestamps(true)
///     .build()
///     .normalize(&raw)?;
/// assert_eq!(table.height(), 1);
/// assert!(table.column("temperature_utc_timestamp").is_some());
/// # Ok::<(), netatmo_public::NormalizeError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    convert_timestamps: bool,
    wind: bool,
}

#[bon]
impl Normalizer {
    /// * `convert_timestamps` - turn `*_timestamp` columns into UTC datetimes.
    /// * `wind` - read wind-gauge groups (`wind_strength`, ...) instead of discarding them.
    #[builder]
    pub fn new(#[builder(default)] convert_timestamps: bool, #[builder(default)] wind: bool) -> Self {
        Self {
            convert_timestamps,
            wind,
        }
    }

    pub fn normalize(&self, response: &RawResponse) -> Result<StationTable, NormalizeError> {
        let stations = response.stations()?;
        let mut table = StationTable::with_columns(&POSITION_COLUMNS);

        for station in stations {
            table.push_row(self.station_record(station));
        }
        if self.convert_timestamps {
            table.convert_timestamps();
        }

        info!(
            "Normalized {} stations into {} columns",
            table.height(),
            table.width()
        );
        Ok(table)
    }

    /// Collects one station's position and readings in column order.
    ///
    /// When two modules report the same field, the later module's value wins
    /// but the column keeps the position where it was first seen.
    fn station_record(&self, station: &Value) -> IndexMap<String, Cell> {
        let mut record = IndexMap::new();

        let id = field_cell(station.get("_id"));
        let label = id.as_str().unwrap_or("<unknown>").to_owned();
        let place = station.get("place");

        let (longitude, latitude) = match place
            .and_then(|p| p.get("location"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
        {
            Some([longitude, latitude]) => (Cell::from_json(longitude), Cell::from_json(latitude)),
            _ => {
                warn!("Station {} has no [longitude, latitude] location", label);
                (Cell::Missing, Cell::Missing)
            }
        };

        record.insert(POSITION_COLUMNS[0].to_string(), id);
        record.insert(
            POSITION_COLUMNS[1].to_string(),
            field_cell(place.and_then(|p| p.get("altitude"))),
        );
        record.insert(POSITION_COLUMNS[2].to_string(), longitude);
        record.insert(POSITION_COLUMNS[3].to_string(), latitude);
        record.insert(
            POSITION_COLUMNS[4].to_string(),
            field_cell(place.and_then(|p| p.get("timezone"))),
        );

        let Some(measures) = station.get("measures").and_then(Value::as_object) else {
            debug!("Station {} has no measures", label);
            return record;
        };

        for (module_id, group) in measures {
            let parsed = parse_group(group, self.wind);
            match &parsed {
                ParsedGroup::Readings(_) => record.extend(parsed.entries()),
                ParsedGroup::Fallback(fallback) => {
                    debug!(
                        "Discarding module {} of station {}: {}",
                        module_id, label, fallback.cause
                    );
                    // Declared columns still appear, but never mask an earlier reading.
                    for (name, cell) in parsed.entries() {
                        record.entry(name).or_insert(cell);
                    }
                }
            }
        }
        record
    }
}

/// The two-argument form of [`Normalizer::normalize`].
pub fn normalize(
    response: &RawResponse,
    convert_timestamps: bool,
) -> Result<StationTable, NormalizeError> {
    Normalizer::builder()
        .convert_timestamps(convert_timestamps)
        .build()
        .normalize(response)
}

fn field_cell(value: Option<&Value>) -> Cell {
    value.map(Cell::from_json).unwrap_or(Cell::Missing)
}
