// ── Runtime connection configuration ──
//
// These types describe *how* to reach the cloud and which device
// properties back each accessory state. They carry credential data but
// never touch disk: the CLI builds a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use controlr_api::{AppCredentials, ServiceRegion};

/// Default interval between token renewal checks.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additional CA certificate file (debugging proxies).
    CustomCa(PathBuf),
}

/// Names of the device properties that back each accessory state.
///
/// Temperatures are Fahrenheit-denominated on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    /// Recirculation mode (boolean). Read for active/heating, written to
    /// switch recirculation on and off.
    pub recirculation: String,
    /// Target domestic hot-water temperature (°F).
    pub target_temperature: String,
    /// Water flow detection (boolean).
    pub water_flowing: String,
    /// Measured outlet temperature (°F).
    pub outlet_temperature: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            recirculation: "set_recirculation_enabled".into(),
            target_temperature: "set_domestic_temperature".into(),
            water_flowing: "water_flow_status".into(),
            outlet_temperature: "m02_outlet_temperature".into(),
        }
    }
}

/// Configuration for one cloud account.
///
/// Built by the CLI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: SecretString,
    /// OEM application credentials sent on sign-in.
    pub app: AppCredentials,
    /// Service region hosting the account.
    pub region: ServiceRegion,
    /// Explicit base URL, overriding the region (proxies, tests).
    pub base_url: Option<Url>,
    /// Model label shown in accessory information.
    pub model: String,
    /// Property names backing each accessory state.
    pub properties: PropertyNames,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often the renewal task checks the token. Zero disables it.
    pub refresh_interval: Duration,
}

impl ControllerConfig {
    /// Minimal config for an account; everything else takes defaults.
    pub fn new(email: impl Into<String>, password: SecretString, app: AppCredentials) -> Self {
        Self {
            email: email.into(),
            password,
            app,
            region: ServiceRegion::default(),
            base_url: None,
            model: "Control-R".into(),
            properties: PropertyNames::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}
