//! Netatmo Connect developer credentials used for the password-grant token exchange.

use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The form fields sent to the Netatmo token endpoint.
///
/// The values are opaque to this crate; they are passed through to the API
/// without validation. `grant_type` and `scope` default to the values the
/// public-data endpoint expects (`password` and `read_station`).
///
/// # Examples
///
/// ```
/// use netatmo_public::Credentials;
///
/// let credentials = Credentials::builder()
///     .username("me@example.com")
///     .password("hunter2")
///     .client_id("abc")
///     .client_secret("def")
///     .build();
///
/// assert_eq!(credentials.grant_type, "password");
/// assert_eq!(credentials.scope, "read_station");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Credentials {
    #[builder(into, default = String::from("password"))]
    pub grant_type: String,
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub password: String,
    #[builder(into)]
    pub client_id: String,
    #[builder(into)]
    pub client_secret: String,
    #[builder(into, default = String::from("read_station"))]
    pub scope: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("grant_type", &self.grant_type)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}
