use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // The token endpoint explains the failure in its body (e.g. invalid_grant).
    #[error("authentication failed: {status}")]
    AuthenticationFailed {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Token from {url} has an out-of-range lifetime of {expires_in} seconds")]
    InvalidToken { url: String, expires_in: i64 },

    #[error("Failed to parse JSON response from {url}")]
    JsonParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
