use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Response has no station list under 'body'")]
    MissingBody,
}

/// Why a measurement group was replaced by its fallback.
///
/// These are recovered locally and never returned to the caller; they are
/// kept on the parsed group so tests and logs can tell causes apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGroup {
    #[error("measurement group is not an object")]
    NotAnObject,

    #[error("measurement group has no '{0}' key")]
    MissingKey(&'static str),

    #[error("measurement group key '{0}' has an unexpected shape")]
    WrongShape(&'static str),

    #[error("expected exactly one timestamp in 'res', found {0}")]
    TimestampCount(usize),

    #[error("timestamp {0} is not an integer number of seconds")]
    InvalidTimestamp(String),
}
