use serde::{Deserialize, Serialize};

/// A rectangular query region in decimal degrees.
///
/// `ne` is the north-east corner and `sw` the south-west corner, matching the
/// parameter names of the Netatmo `getpublicdata` endpoint.
///
/// # Examples
///
/// ```
/// use netatmo_public::BoundingBox;
///
/// // Aarhus, Denmark
/// let aarhus = BoundingBox::new(56.2330, 56.0843, 10.3324, 10.0344);
/// assert!(aarhus.is_well_ordered());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_ne: f64,
    pub lat_sw: f64,
    pub lon_ne: f64,
    pub lon_sw: f64,
}

impl BoundingBox {
    pub fn new(lat_ne: f64, lat_sw: f64, lon_ne: f64, lon_sw: f64) -> Self {
        Self {
            lat_ne,
            lat_sw,
            lon_ne,
            lon_sw,
        }
    }

    /// `true` when the north-east corner is not south or west of the south-west corner.
    ///
    /// The API is not told about this; a flipped box simply returns fewer stations.
    pub fn is_well_ordered(&self) -> bool {
        self.lat_ne >= self.lat_sw && self.lon_ne >= self.lon_sw
    }

    pub(crate) fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("lat_ne", self.lat_ne.to_string()),
            ("lon_ne", self.lon_ne.to_string()),
            ("lat_sw", self.lat_sw.to_string()),
            ("lon_sw", self.lon_sw.to_string()),
        ]
    }
}
