mod api;
mod config;
mod error;
mod netatmo;
mod normalize;
mod output;
mod types;

pub use error::NetatmoError;
pub use netatmo::*;

pub use api::client::{NetatmoClient, PUBLIC_DATA_URL, TOKEN_URL};
pub use api::error::ApiError;

pub use config::error::ConfigError;
pub use config::{
    default_config_path, AppConfig, CredentialsConfig, EndpointsConfig, OutputConfig,
    CONFIG_FILE_NAME,
};

pub use normalize::error::{MalformedGroup, NormalizeError};
pub use normalize::measure_group::{
    parse_group, Fallback, GroupKind, ParsedGroup, Readings, RAIN_FIELDS, RAIN_TIMESTAMP,
    TIMESTAMP_SUFFIX, WIND_FIELDS, WIND_TIMESTAMP,
};
pub use normalize::normalizer::{normalize, Normalizer, POSITION_COLUMNS};
pub use normalize::table::{Cell, StationTable};

pub use output::error::OutputError;
pub use output::writer::{timestamped_file_name, write_csv, write_csv_at};

pub use types::bounding_box::BoundingBox;
pub use types::credentials::Credentials;
pub use types::raw_response::RawResponse;
pub use types::token::Token;
