use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Missing credential '{0}' (set it in [credentials] or via the environment)")]
    MissingCredential(&'static str),

    #[error("No query region configured (set [region] or the --lat-ne/--lat-sw/--lon-ne/--lon-sw flags)")]
    MissingRegion,

    #[error("Environment variable {var} has invalid value '{value}'")]
    InvalidEnvValue { var: &'static str, value: String },
}
