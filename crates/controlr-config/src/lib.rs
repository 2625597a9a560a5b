//! Shared configuration for controlr hosts.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `controlr_core::ControllerConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use controlr_core::{
    AppCredentials, ControllerConfig, PropertyNames, ServiceRegion, TlsVerification,
};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "controlr";

/// Environment variable consulted for the account password.
pub const PASSWORD_ENV: &str = "CONTROLR_PASSWORD";

/// Environment variable consulted for the application secret.
pub const APP_SECRET_ENV: &str = "CONTROLR_APP_SECRET";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no application secret configured for profile '{profile}'")]
    NoAppSecret { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    controlr_core::DEFAULT_REFRESH_INTERVAL.as_secs()
}
fn default_model() -> String {
    "Control-R".into()
}

/// A named account profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Account email.
    #[serde(default)]
    pub email: String,

    /// Password (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Service region hosting the account.
    #[serde(default)]
    pub region: ServiceRegion,

    /// Explicit base URL, overriding the region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// OEM application id sent on sign-in.
    #[serde(default)]
    pub app_id: String,

    /// OEM application secret (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,

    /// Model label shown in accessory information.
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the renewal check interval (seconds, 0 disables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,

    /// Override the request timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Path to an extra CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Property-name overrides for non-standard firmware.
    #[serde(default)]
    pub properties: PropertyNames,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: None,
            password_env: None,
            region: ServiceRegion::default(),
            base_url: None,
            app_id: String::new(),
            app_secret: None,
            model: default_model(),
            refresh_interval_secs: None,
            timeout: None,
            ca_cert: None,
            properties: PropertyNames::default(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "controlr", "controlr").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("controlr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layered sources: defaults, then the TOML file, then `CONTROLR_*` env.
///
/// Nested keys in the environment use a double underscore, e.g.
/// `CONTROLR_DEFAULTS__TIMEOUT=60`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CONTROLR_").split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from an explicit file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Keyring user under which a profile's password is stored.
pub fn password_keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Keyring user under which a profile's application secret is stored.
pub fn app_secret_keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/app-secret")
}

/// Resolve the account password.
///
/// Order: the profile's `password_env` variable, `CONTROLR_PASSWORD`,
/// the system keyring, then plaintext in the config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, env_lookup, keyring_lookup)
}

/// Resolve the OEM application secret.
///
/// Order: `CONTROLR_APP_SECRET`, the system keyring, then plaintext.
pub fn resolve_app_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_app_secret_with(profile, profile_name, env_lookup, keyring_lookup)
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env(PASSWORD_ENV))
        .or_else(|| keyring(&password_keyring_user(profile_name)))
        .or_else(|| profile.password.clone())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

fn resolve_app_secret_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    env(APP_SECRET_ENV)
        .or_else(|| keyring(&app_secret_keyring_user(profile_name)))
        .or_else(|| profile.app_secret.clone())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoAppSecret {
            profile: profile_name.into(),
        })
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn keyring_lookup(user: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, user)
        .ok()?
        .get_password()
        .ok()
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    let app_secret = resolve_app_secret(profile, profile_name)?;
    build_controller_config(profile, defaults, password, app_secret)
}

/// Assemble a `ControllerConfig` from a profile and already-resolved secrets.
pub fn build_controller_config(
    profile: &Profile,
    defaults: &Defaults,
    password: SecretString,
    app_secret: SecretString,
) -> Result<ControllerConfig, ConfigError> {
    if profile.email.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "email".into(),
            reason: "must not be empty".into(),
        });
    }
    if profile.app_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "app_id".into(),
            reason: "must not be empty".into(),
        });
    }

    let base_url = profile
        .base_url
        .as_deref()
        .map(|raw| {
            raw.parse::<url::Url>().map_err(|_| ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL: {raw}"),
            })
        })
        .transpose()?;

    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);

    let app = AppCredentials {
        app_id: profile.app_id.clone(),
        app_secret,
    };

    let mut config = ControllerConfig::new(profile.email.clone(), password, app);
    config.region = profile.region;
    config.base_url = base_url;
    config.model.clone_from(&profile.model);
    config.properties = profile.properties.clone();
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_interval = Duration::from_secs(
        profile
            .refresh_interval_secs
            .unwrap_or(defaults.refresh_interval_secs),
    );
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn parse(toml: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn no_keyring(_: &str) -> Option<String> {
        None
    }

    const SAMPLE: &str = r#"
        default_profile = "home"

        [defaults]
        timeout = 15

        [profiles.home]
        email = "owner@example.com"
        password = "plaintext-pw"
        region = "eu"
        app_id = "rinnai-app-id"
        app_secret = "rinnai-app-secret"
        refresh_interval_secs = 600

        [profiles.home.properties]
        outlet_temperature = "outlet_temp"
    "#;

    #[test]
    fn parses_profiles_and_defaults() {
        let cfg = parse(SAMPLE);
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert_eq!(cfg.defaults.timeout, 15);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.refresh_interval_secs, 3600);

        let home = &cfg.profiles["home"];
        assert_eq!(home.email, "owner@example.com");
        assert_eq!(home.region, ServiceRegion::Eu);
        assert_eq!(home.model, "Control-R");
        assert_eq!(home.properties.outlet_temperature, "outlet_temp");
        assert_eq!(
            home.properties.recirculation,
            PropertyNames::default().recirculation
        );
    }

    #[test]
    fn unknown_region_is_rejected() {
        let result = Figment::from(Toml::string(
            "[profiles.x]\nemail = \"a@b.c\"\nregion = \"mars\"\n",
        ))
        .extract::<Config>();
        assert!(result.is_err());
    }

    #[test]
    fn password_chain_prefers_profile_env() {
        let profile = Profile {
            password_env: Some("HOME_PW".into()),
            password: Some("plaintext".into()),
            ..Profile::default()
        };
        let env = |name: &str| match name {
            "HOME_PW" => Some("from-profile-env".to_string()),
            PASSWORD_ENV => Some("from-global-env".to_string()),
            _ => None,
        };
        let pw = resolve_password_with(&profile, "home", env, no_keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");
    }

    #[test]
    fn password_chain_uses_keyring_before_plaintext() {
        let profile = Profile {
            password: Some("plaintext".into()),
            ..Profile::default()
        };
        let keyring = |user: &str| (user == "home/password").then(|| "from-keyring".to_string());
        let pw = resolve_password_with(&profile, "home", no_env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");
    }

    #[test]
    fn password_chain_falls_back_to_plaintext() {
        let profile = Profile {
            password: Some("plaintext".into()),
            ..Profile::default()
        };
        let pw = resolve_password_with(&profile, "home", no_env, no_keyring).unwrap();
        assert_eq!(pw.expose_secret(), "plaintext");
    }

    #[test]
    fn missing_password_is_an_error() {
        let result = resolve_password_with(&Profile::default(), "home", no_env, no_keyring);
        assert!(matches!(result, Err(ConfigError::NoCredentials { profile }) if profile == "home"));
    }

    #[test]
    fn app_secret_chain() {
        let profile = Profile {
            app_secret: Some("plaintext-secret".into()),
            ..Profile::default()
        };
        let secret = resolve_app_secret_with(&profile, "home", no_env, no_keyring).unwrap();
        assert_eq!(secret.expose_secret(), "plaintext-secret");

        let env = |name: &str| (name == APP_SECRET_ENV).then(|| "env-secret".to_string());
        let secret = resolve_app_secret_with(&profile, "home", env, no_keyring).unwrap();
        assert_eq!(secret.expose_secret(), "env-secret");

        let result = resolve_app_secret_with(&Profile::default(), "home", no_env, no_keyring);
        assert!(matches!(result, Err(ConfigError::NoAppSecret { .. })));
    }

    #[test]
    fn builds_controller_config_from_profile() {
        let cfg = parse(SAMPLE);
        let home = &cfg.profiles["home"];
        let config = build_controller_config(
            home,
            &cfg.defaults,
            SecretString::from("pw".to_string()),
            SecretString::from("secret".to_string()),
        )
        .unwrap();

        assert_eq!(config.email, "owner@example.com");
        assert_eq!(config.region, ServiceRegion::Eu);
        assert_eq!(config.base_url, None);
        assert_eq!(config.app.app_id, "rinnai-app-id");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert_eq!(config.properties.outlet_temperature, "outlet_temp");
    }

    #[test]
    fn rejects_bad_base_url_and_empty_email() {
        let defaults = Defaults::default();
        let secret = || SecretString::from("x".to_string());

        let profile = Profile {
            email: "a@b.c".into(),
            app_id: "id".into(),
            base_url: Some("not a url".into()),
            ..Profile::default()
        };
        let result = build_controller_config(&profile, &defaults, secret(), secret());
        assert!(matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "base_url"));

        let profile = Profile {
            app_id: "id".into(),
            ..Profile::default()
        };
        let result = build_controller_config(&profile, &defaults, secret(), secret());
        assert!(matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "email"));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                email: "owner@example.com".into(),
                app_id: "id".into(),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(loaded.profiles["default"].email, "owner@example.com");
        assert_eq!(loaded.profiles["default"].region, ServiceRegion::Us);
    }
}
