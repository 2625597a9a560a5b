// Wire types for the Ayla cloud API
//
// Only the fields this crate reads are typed; device records keep the
// full raw object so callers can dig into vendor metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Auth ─────────────────────────────────────────────────────────────

/// Body returned by `/users/sign_in` and `/users/refresh_token`.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

/// Body returned by `/users/get_user_profile`. Only the handle is used.
#[derive(Deserialize)]
pub(crate) struct UserProfile {
    pub uuid: String,
}

/// Error body shape: `{"error": "..."}`. Some endpoints return
/// `{"errors": {...}}` instead, which is kept as raw JSON.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> Option<String> {
        self.error
            .as_ref()
            .or(self.errors.as_ref())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// `{ "device": { ... } }` wrapper used by both device endpoints.
#[derive(Deserialize)]
pub(crate) struct DeviceEnvelope {
    pub device: Value,
}

/// A device registered to the account.
///
/// `dsn` is the stable serial used as the routing key for property
/// reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub dsn: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub oem_model: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub lan_ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub sw_version: Option<String>,
    /// The complete device record as returned by the cloud.
    #[serde(skip)]
    pub raw: Value,
}

impl Device {
    /// Returns `true` if the cloud reports the device as online.
    pub fn is_online(&self) -> bool {
        self.connection_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("online"))
    }
}

// ── Properties ───────────────────────────────────────────────────────

/// `{ "property": { ... } }` wrapper.
#[derive(Deserialize)]
pub(crate) struct PropertyEnvelope {
    pub property: Property,
}

/// A named, loosely-typed attribute of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub name: String,
    /// Numeric, boolean, or string depending on the property.
    pub value: Value,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub data_updated_at: Option<String>,
}
