use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// The JSON body returned by the token endpoint on success.
///
/// Netatmo also sends `scope` and a misspelled `expire_in`; neither is needed.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// An OAuth access token obtained through the password grant.
///
/// A token is created once per run and never refreshed. `expiry` is the issue
/// time plus `expires_in` seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, as reported by the token endpoint.
    pub expires_in: i64,
    pub expiry: DateTime<Utc>,
}

impl Token {
    /// Builds a token issued at `issued_at`.
    ///
    /// Returns `None` if `expires_in` puts the expiry outside the representable time range.
    pub(crate) fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Option<Self> {
        let expiry = TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;
        Some(Self {
            expiry,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        })
    }

    /// Returns `true` once the current time has reached `expiry`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_is_issue_time_plus_lifetime() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc|123","refresh_token":"def|456","expires_in":10800,"expire_in":10800,"scope":["read_station"]}"#,
        )
        .unwrap();
        let issued_at = Utc.with_ymd_and_hms(2018, 8, 29, 12, 0, 0).unwrap();
        let token = Token::from_response(response, issued_at).unwrap();

        assert_eq!(token.access_token, "abc|123");
        assert_eq!(token.refresh_token.as_deref(), Some("def|456"));
        assert_eq!(
            token.expiry,
            Utc.with_ymd_and_hms(2018, 8, 29, 15, 0, 0).unwrap()
        );
        assert!(!token.is_expired_at(issued_at));
        assert!(token.is_expired_at(token.expiry));
    }

    #[test]
    fn test_refresh_token_is_optional() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":60}"#).unwrap();
        let token = Token::from_response(response, Utc::now()).unwrap();
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_out_of_range_lifetime_is_rejected() {
        let issued_at = Utc.with_ymd_and_hms(2018, 8, 29, 12, 0, 0).unwrap();
        for expires_in in [10_000_000_000_000_000, i64::MAX, 9_000_000_000_000] {
            let response = TokenResponse {
                access_token: "abc".into(),
                refresh_token: None,
                expires_in,
            };
            assert!(Token::from_response(response, issued_at).is_none(), "{expires_in}");
        }
    }
}
