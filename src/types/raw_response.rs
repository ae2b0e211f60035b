use crate::normalize::error::NormalizeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The parsed JSON body of a `getpublicdata` call, kept untyped.
///
/// Station payloads vary between hardware generations and module kinds, so
/// they are read best-effort by the normalizer instead of through a fixed
/// serde schema. Key order is preserved as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The station list under `body`.
    pub fn stations(&self) -> Result<&[Value], NormalizeError> {
        self.0
            .get("body")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or(NormalizeError::MissingBody)
    }

    /// The API's own `status` field (`"ok"` on success), if present.
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
