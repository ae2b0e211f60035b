//! Run configuration: a TOML file with environment overrides.
//!
//! ```toml
//! [credentials]
//! username = "me@example.com"
//! client_id = "..."
//!
//! [region]
//! lat_ne = 56.2330
//! lat_sw = 56.0843
//! lon_ne = 10.3324
//! lon_sw = 10.0344
//!
//! [output]
//! dir = "data"
//! ```
//!
//! Secrets are usually kept out of the file and supplied through
//! `NETATMO_PASSWORD` / `NETATMO_CLIENT_SECRET` (a `.env` file works too).

pub mod error;

use crate::config::error::ConfigError;
use crate::types::bounding_box::BoundingBox;
use crate::types::credentials::Credentials;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "netatmo.toml";
const CONFIG_DIR_NAME: &str = "netatmo_public";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub credentials: CredentialsConfig,
    pub region: Option<BoundingBox>,
    pub output: OutputConfig,
    pub endpoints: EndpointsConfig,
}

/// Credential fields as they appear in the file; any of them may come from the environment instead.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub convert_timestamps: bool,
    pub wind: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            convert_timestamps: false,
            wind: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub token_url: Option<String>,
    pub api_url: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents, path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Applies `NETATMO_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Applies `NETATMO_*` overrides using `lookup` to read variables.
    ///
    /// Credential variables replace the file values; region variables set
    /// single corners and need an existing region or all four corners.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = &mut self.credentials;
        for (var, slot) in [
            ("NETATMO_USERNAME", &mut credentials.username),
            ("NETATMO_PASSWORD", &mut credentials.password),
            ("NETATMO_CLIENT_ID", &mut credentials.client_id),
            ("NETATMO_CLIENT_SECRET", &mut credentials.client_secret),
            ("NETATMO_SCOPE", &mut credentials.scope),
        ] {
            if let Some(value) = lookup(var) {
                *slot = Some(value);
            }
        }

        let corner = |var: &'static str| -> Result<Option<f64>, ConfigError> {
            lookup(var)
                .map(|value| {
                    value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| ConfigError::InvalidEnvValue { var, value })
                })
                .transpose()
        };
        self.override_region(
            corner("NETATMO_LAT_NE")?,
            corner("NETATMO_LAT_SW")?,
            corner("NETATMO_LON_NE")?,
            corner("NETATMO_LON_SW")?,
        );
        Ok(())
    }

    /// Replaces individual region corners. Without a configured region, all
    /// four corners are needed; partial input is ignored with a warning.
    pub fn override_region(
        &mut self,
        lat_ne: Option<f64>,
        lat_sw: Option<f64>,
        lon_ne: Option<f64>,
        lon_sw: Option<f64>,
    ) {
        if lat_ne.is_none() && lat_sw.is_none() && lon_ne.is_none() && lon_sw.is_none() {
            return;
        }
        if let Some(region) = self.region.as_mut() {
            region.lat_ne = lat_ne.unwrap_or(region.lat_ne);
            region.lat_sw = lat_sw.unwrap_or(region.lat_sw);
            region.lon_ne = lon_ne.unwrap_or(region.lon_ne);
            region.lon_sw = lon_sw.unwrap_or(region.lon_sw);
            return;
        }
        match (lat_ne, lat_sw, lon_ne, lon_sw) {
            (Some(lat_ne), Some(lat_sw), Some(lon_ne), Some(lon_sw)) => {
                self.region = Some(BoundingBox::new(lat_ne, lat_sw, lon_ne, lon_sw));
            }
            _ => warn!(
                "Ignoring partial region override: all four corners are needed when no region is configured"
            ),
        }
    }

    /// Resolves the credentials, failing on the first required field that is unset.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let c = &self.credentials;
        let required = |value: &Option<String>, name: &'static str| {
            value.clone().ok_or(ConfigError::MissingCredential(name))
        };
        Ok(Credentials::builder()
            .username(required(&c.username, "username")?)
            .password(required(&c.password, "password")?)
            .client_id(required(&c.client_id, "client_id")?)
            .client_secret(required(&c.client_secret, "client_secret")?)
            .maybe_grant_type(c.grant_type.clone())
            .maybe_scope(c.scope.clone())
            .build())
    }

    pub fn region(&self) -> Result<BoundingBox, ConfigError> {
        let region = self.region.ok_or(ConfigError::MissingRegion)?;
        if !region.is_well_ordered() {
            warn!(
                "Region north-east corner ({}, {}) is south or west of the south-west corner ({}, {})",
                region.lat_ne, region.lon_ne, region.lat_sw, region.lon_sw
            );
        }
        Ok(region)
    }
}

/// `netatmo.toml` in the working directory if present, else the user config directory.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}
