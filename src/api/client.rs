//! Blocking client for the two Netatmo endpoints this crate needs: the OAuth
//! token exchange and `getpublicdata`.

use crate::api::error::ApiError;
use crate::types::bounding_box::BoundingBox;
use crate::types::credentials::Credentials;
use crate::types::raw_response::RawResponse;
use crate::types::token::{Token, TokenResponse};
use bon::bon;
use chrono::Utc;
use log::{info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const TOKEN_URL: &str = "https://api.netatmo.com/oauth2/token";
pub const PUBLIC_DATA_URL: &str = "https://api.netatmo.com/api/getpublicdata";

/// Talks to the Netatmo API. One request per call; no retries, no timeout.
///
/// # Examples
///
/// ```no_run
/// use netatmo_public::{BoundingBox, Credentials, NetatmoClient};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NetatmoClient::builder().build()?;
/// let credentials = Credentials::builder()
///     .username("me@example.com")
///     .password("hunter2")
///     .client_id("abc")
///     .client_secret("def")
///     .build();
///
/// let token = client.authenticate(&credentials)?;
/// let raw = client.fetch_public_stations(&token, &BoundingBox::new(56.2330, 56.0843, 10.3324, 10.0344))?;
/// println!("{} stations", raw.stations()?.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NetatmoClient {
    http: Client,
    token_url: String,
    api_url: String,
}

#[bon]
impl NetatmoClient {
    /// Creates a client. Both URLs default to the public Netatmo endpoints.
    #[builder]
    pub fn new(
        #[builder(into)] token_url: Option<String>,
        #[builder(into)] api_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            http,
            token_url: token_url.unwrap_or_else(|| TOKEN_URL.to_string()),
            api_url: api_url.unwrap_or_else(|| PUBLIC_DATA_URL.to_string()),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Exchanges credentials for an access token (password grant).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthenticationFailed`] for any status other than
    /// 200, [`ApiError::NetworkRequest`] if the endpoint cannot be reached,
    /// [`ApiError::JsonParse`] if the body is not a token and
    /// [`ApiError::InvalidToken`] if its lifetime is out of range.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<Token, ApiError> {
        info!("Requesting access token from {}", self.token_url);
        let response = self
            .http
            .post(&self.token_url)
            .form(credentials)
            .send()
            .map_err(|e| ApiError::NetworkRequest(self.token_url.clone(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            warn!(
                "Token request to {} returned {}: {}",
                self.token_url, status, body
            );
            return Err(ApiError::AuthenticationFailed { status, body });
        }

        let token_response: TokenResponse = read_json(&self.token_url, response)?;
        let expires_in = token_response.expires_in;
        let token = Token::from_response(token_response, Utc::now()).ok_or_else(|| {
            ApiError::InvalidToken {
                url: self.token_url.clone(),
                expires_in,
            }
        })?;
        info!("Access token obtained, valid until {}", token.expiry);
        Ok(token)
    }

    /// Fetches public station readings inside `bbox`.
    ///
    /// The token and the box corners are sent as query parameters. The whole
    /// result set comes back in one response.
    pub fn fetch_public_stations(
        &self,
        token: &Token,
        bbox: &BoundingBox,
    ) -> Result<RawResponse, ApiError> {
        info!(
            "Fetching public data from {} for lat {}..{}, lon {}..{}",
            self.api_url, bbox.lat_sw, bbox.lat_ne, bbox.lon_sw, bbox.lon_ne
        );
        let response = self
            .http
            .post(&self.api_url)
            .query(&[("access_token", token.access_token.as_str())])
            .query(&bbox.query_pairs())
            .send()
            .map_err(|e| ApiError::NetworkRequest(self.api_url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", self.api_url, e);
                return Err(if let Some(status) = e.status() {
                    ApiError::HttpStatus {
                        url: self.api_url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    ApiError::NetworkRequest(self.api_url.clone(), e)
                });
            }
        };

        let value: Value = read_json(&self.api_url, response)?;
        let raw = RawResponse::new(value);
        if let Some(status) = raw.status().filter(|s| *s != "ok") {
            warn!("{} reported status '{}'", self.api_url, status);
        }
        Ok(raw)
    }
}

fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
    let text = response
        .text()
        .map_err(|e| ApiError::NetworkRequest(url.to_string(), e))?;
    serde_json::from_str(&text).map_err(|e| ApiError::JsonParse {
        url: url.to_string(),
        source: e,
    })
}
