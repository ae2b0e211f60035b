use crate::api::error::ApiError;
use crate::config::error::ConfigError;
use crate::normalize::error::NormalizeError;
use crate::output::error::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetatmoError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
