//! Config subcommand handlers.

use dialoguer::{Input, Select};

use sitedeploy_config::RegionSetting;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;

// ── Helpers ─────────────────────────────────────────────────────────

const REDACTED: &str = "****";

/// Copy of the config with every stored secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
        if profile.google_api_key.is_some() {
            profile.google_api_key = Some(REDACTED.into());
        }
    }
    cfg
}

fn region_label(region: RegionSetting) -> &'static str {
    match region {
        RegionSetting::Auto => "auto",
        RegionSetting::Worldwide => "worldwide",
        RegionSetting::China => "china",
    }
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let cfg = redacted(cfg);
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "max_retries = {}", cfg.defaults.max_retries);
    let _ = writeln!(out, "time_zone = \"{}\"", cfg.defaults.time_zone);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref org) = p.organization {
            let _ = writeln!(out, "organization = \"{org}\"");
        }
        if let Some(ref org) = p.organization_cn {
            let _ = writeln!(out, "organization_cn = \"{org}\"");
        }
        let _ = writeln!(out, "region = \"{}\"", region_label(p.region));
        if let Some(ref key) = p.api_key {
            let _ = writeln!(out, "api_key = \"{key}\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref key) = p.google_api_key {
            let _ = writeln!(out, "google_api_key = \"{key}\"");
        }
        if let Some(ref url) = p.base_url {
            let _ = writeln!(out, "base_url = \"{url}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(retries) = p.max_retries {
            let _ = writeln!(out, "max_retries = {retries}");
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let available = cfg.profile_names();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    profile_name: &str,
    keyring_secret: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(profile_name, keyring_secret, secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_owned();
    (!value.is_empty()).then_some(value)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("sitedeploy configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Organizations
            let organization: String = Input::new()
                .with_prompt("Organization name")
                .interact_text()
                .map_err(prompt_err)?;
            let organization_cn: String = Input::new()
                .with_prompt("China organization name (blank if the same)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Region
            let regions = [
                RegionSetting::Auto,
                RegionSetting::Worldwide,
                RegionSetting::China,
            ];
            let labels: Vec<&str> = regions.iter().map(|r| region_label(*r)).collect();
            let region = Select::new()
                .with_prompt("Dashboard region")
                .items(labels.as_slice())
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            // 4. Dashboard API key
            let key = rpassword::prompt_password("Dashboard API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }
            let api_key = prompt_keyring_storage(&key, &profile_name, "api-key", "API key")?;

            // 5. Geocoding key (optional)
            let google =
                rpassword::prompt_password("Google API key (blank to skip): ").map_err(prompt_err)?;
            let google_api_key = match optional(google) {
                Some(google) => {
                    prompt_keyring_storage(&google, &profile_name, "google-key", "Google API key")?
                }
                None => None,
            };

            // 6. Merge into the existing config
            let profile = Profile {
                organization: optional(organization),
                organization_cn: optional(organization_cn),
                region: regions[region],
                api_key,
                google_api_key,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }

            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.output {
                Some(OutputFormat::Json) => serde_json::to_string_pretty(&redacted(&cfg))?,
                _ => format_config_redacted(&cfg),
            };
            println!("{out}");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: sitedeploy config init");
            } else {
                for name in cfg.profile_names() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { google } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let (secret, prompt) = if google {
                ("google-key", "Google API key: ")
            } else {
                ("api-key", "Dashboard API key: ")
            };
            let value = rpassword::prompt_password(prompt).map_err(prompt_err)?;
            if value.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_secret(&profile_name, secret, &value)?;

            eprintln!("✓ {secret} stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
