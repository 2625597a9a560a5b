//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use controlr_core::ServiceRegion;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(
        out,
        "refresh_interval_secs = {}",
        cfg.defaults.refresh_interval_secs
    );

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "email = \"{}\"", p.email);
        let _ = writeln!(out, "region = \"{}\"", region_name(p.region));
        if let Some(ref url) = p.base_url {
            let _ = writeln!(out, "base_url = \"{url}\"");
        }
        let _ = writeln!(out, "app_id = \"{}\"", p.app_id);
        if p.app_secret.is_some() {
            let _ = writeln!(out, "app_secret = \"****\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        let _ = writeln!(out, "model = \"{}\"", p.model);
        if let Some(secs) = p.refresh_interval_secs {
            let _ = writeln!(out, "refresh_interval_secs = {secs}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
    }

    out
}

/// Copy of the config with secrets masked, for structured output.
fn redacted(cfg: &Config) -> Config {
    let mask = |secret: Option<&String>| secret.map(|_| "****".to_string());
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            timeout: cfg.defaults.timeout,
            refresh_interval_secs: cfg.defaults.refresh_interval_secs,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let profile = Profile {
                    password: mask(p.password.as_ref()),
                    app_secret: mask(p.app_secret.as_ref()),
                    ..p.clone()
                };
                (name.clone(), profile)
            })
            .collect(),
    }
}

fn region_name(region: ServiceRegion) -> &'static str {
    match region {
        ServiceRegion::Us => "us",
        ServiceRegion::Eu => "eu",
        ServiceRegion::Cn => "cn",
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for a secret that must not be empty.
fn prompt_secret(label: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Store a secret in the system keyring under `user`.
fn store_in_keyring(user: &str, secret: &str, label: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(config::KEYRING_SERVICE, user).map_err(|e| {
        CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        }
    })?;
    entry
        .set_password(secret)
        .map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store {label} in keyring: {e}"),
        })
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    keyring_user: &str,
    prompt: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_in_keyring(keyring_user, secret, label)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword {
            profile,
            app_secret,
        } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            if app_secret {
                let secret = prompt_secret("Application secret: ", "app_secret")?;
                store_in_keyring(
                    &config::app_secret_keyring_user(&profile_name),
                    &secret,
                    "application secret",
                )?;
            } else {
                let secret = prompt_secret("Password: ", "password")?;
                store_in_keyring(
                    &config::password_keyring_user(&profile_name),
                    &secret,
                    "password",
                )?;
            }

            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard writing a fresh config with one profile.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("controlr -- configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let email: String = Input::new()
        .with_prompt("Account email")
        .interact_text()
        .map_err(prompt_err)?;
    if !email.contains('@') {
        return Err(CliError::Validation {
            field: "email".into(),
            reason: format!("'{email}' is not an email address"),
        });
    }

    let regions = [ServiceRegion::Us, ServiceRegion::Eu, ServiceRegion::Cn];
    let region_labels = &["North America (us)", "Europe (eu)", "China (cn)"];
    let region_idx = Select::new()
        .with_prompt("Service region")
        .items(region_labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let region = regions.get(region_idx).copied().unwrap_or_default();

    let password = prompt_secret("Password: ", "password")?;
    let password = prompt_keyring_storage(
        &password,
        &config::password_keyring_user(&profile_name),
        "Where to store the password?",
        "Password",
    )?;

    let app_id: String = Input::new()
        .with_prompt("Application id")
        .interact_text()
        .map_err(prompt_err)?;
    let app_secret = prompt_secret("Application secret: ", "app_secret")?;
    let app_secret = prompt_keyring_storage(
        &app_secret,
        &config::app_secret_keyring_user(&profile_name),
        "Where to store the application secret?",
        "Application secret",
    )?;

    let profile = Profile {
        email,
        password,
        region,
        app_id,
        app_secret,
        ..Profile::default()
    };

    let mut profiles = HashMap::new();
    profiles.insert(profile_name.clone(), profile);

    let cfg = Config {
        default_profile: Some(profile_name.clone()),
        defaults: Defaults::default(),
        profiles,
    };
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: controlr devices list");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_config_masks_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                email: "owner@example.com".into(),
                password: Some("hunter2".into()),
                app_id: "app".into(),
                app_secret: Some("s3cret".into()),
                region: ServiceRegion::Eu,
                ..Profile::default()
            },
        );

        let out = format_config_redacted(&cfg);
        assert!(out.contains("[profiles.home]"));
        assert!(out.contains("region = \"eu\""));
        assert!(out.contains("password = \"****\""));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn structured_copy_masks_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );

        let masked = redacted(&cfg);
        assert_eq!(masked.profiles["home"].password.as_deref(), Some("****"));
        assert_eq!(masked.profiles["home"].app_secret, None);
    }
}
