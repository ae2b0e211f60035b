//! The main entry point: authenticate, fetch a region and flatten it in one call.

use crate::api::client::NetatmoClient;
use crate::error::NetatmoError;
use crate::normalize::normalizer::Normalizer;
use crate::normalize::table::StationTable;
use crate::output::writer::write_csv;
use crate::types::bounding_box::BoundingBox;
use crate::types::credentials::Credentials;
use bon::bon;
use log::info;
use std::path::{Path, PathBuf};

/// Downloads public station data for a region and turns it into a table.
///
/// Each call performs the full exchange (token, then station data); nothing
/// is kept between calls.
///
/// # Examples
///
/// ```no_run
/// use netatmo_public::{BoundingBox, Credentials, Netatmo, NetatmoClient, NetatmoError};
/// use std::path::Path;
///
/// # fn main() -> Result<(), NetatmoError> {
/// let credentials = Credentials::builder()
///     .username("me@example.com")
///     .password("hunter2")
///     .client_id("abc")
///     .client_secret("def")
///     .build();
/// let netatmo = Netatmo::new(NetatmoClient::builder().build()?, credentials);
///
/// let table = netatmo
///     .public_data()
///     .region(BoundingBox::new(56.2330, 56.0843, 10.3324, 10.0344))
///     .convert_timestamps(true)
///     .call()?;
/// let path = Netatmo::save(&table, Path::new("data"))?;
/// println!("{} stations written to {}", table.height(), path.display());
/// # Ok(())
/// # }
/// ```
pub struct Netatmo {
    client: NetatmoClient,
    credentials: Credentials,
}

#[bon]
impl Netatmo {
    pub fn new(client: NetatmoClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Fetches and normalizes the stations inside `region`.
    ///
    /// * `.region(BoundingBox)`: **Required.**
    /// * `.convert_timestamps(bool)`: Optional, defaults to `false`.
    /// * `.wind(bool)`: Optional, defaults to `false`.
    ///
    /// # Errors
    ///
    /// [`NetatmoError::Api`] if authentication or the data request fails,
    /// [`NetatmoError::Normalize`] if the response carries no station list.
    #[builder]
    pub fn public_data(
        &self,
        region: BoundingBox,
        #[builder(default)] convert_timestamps: bool,
        #[builder(default)] wind: bool,
    ) -> Result<StationTable, NetatmoError> {
        let token = self.client.authenticate(&self.credentials)?;
        let raw = self.client.fetch_public_stations(&token, &region)?;
        let table = Normalizer::builder()
            .convert_timestamps(convert_timestamps)
            .wind(wind)
            .build()
            .normalize(&raw)?;
        info!("Region returned {} stations", table.height());
        Ok(table)
    }

    /// Writes `table` into `dir` as `<local time>.csv`.
    pub fn save(table: &StationTable, dir: &Path) -> Result<PathBuf, NetatmoError> {
        Ok(write_csv(table, dir)?)
    }
}
