//! # Settings Loader
//!
//! Centralised settings loading for the dashboard client. Settings come from
//! an optional JSON file (`dashboard.json` by default), then a `.env` file and
//! the process environment override individual fields.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/dashboard.json")?;
//!
//! // Fall back to ./dashboard.json, then to built-in defaults
//! let path = Some(PathBuf::from("dashboard.json"));
//! let settings = settings_loader::load_settings_with_fallback(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::ClientSettings;

pub const DEFAULT_SETTINGS_FILE: &str = "dashboard.json";

pub const ENV_BASE_URL: &str = "FINANCE_API_BASE_URL";
pub const ENV_LOGIN_PATH: &str = "FINANCE_LOGIN_PATH";
pub const ENV_SESSION_CHECK_PATH: &str = "FINANCE_SESSION_CHECK_PATH";
pub const ENV_SESSION_COOKIE: &str = "FINANCE_SESSION_COOKIE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "FINANCE_REQUEST_TIMEOUT_SECS";

/// Loads settings from a JSON file and applies environment overrides
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ClientSettings> {
    let settings = read_settings_file(path.as_ref())?;
    apply_process_env(settings)
}

/// Loads settings from the default location (dashboard.json in the current directory)
pub fn load_default_settings() -> Result<ClientSettings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Tries the provided path, then the default location, then built-in defaults.
/// A file that exists but cannot be parsed is an error rather than silently skipped.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<ClientSettings> {
    if let Some(settings_path) = path {
        if settings_file_exists(settings_path) {
            return load_settings(settings_path);
        }
        tracing::warn!(
            path = %settings_path.display(),
            "settings file not found, trying {DEFAULT_SETTINGS_FILE}"
        );
    }

    if default_settings_exist() {
        return load_default_settings();
    }

    tracing::debug!("no settings file found, using defaults");
    apply_process_env(ClientSettings::default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Checks if the default settings file (dashboard.json) exists
pub fn default_settings_exist() -> bool {
    settings_file_exists(DEFAULT_SETTINGS_FILE)
}

fn read_settings_file(path: &Path) -> Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: ClientSettings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

fn apply_process_env(settings: ClientSettings) -> Result<ClientSettings> {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}

/// Overrides fields with values returned by `lookup`. Empty values are ignored.
pub fn apply_env_overrides<F>(mut settings: ClientSettings, lookup: F) -> Result<ClientSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = get(ENV_BASE_URL) {
        settings.base_url = base_url;
    }
    if let Some(login_path) = get(ENV_LOGIN_PATH) {
        settings.login_path = login_path;
    }
    if let Some(check_path) = get(ENV_SESSION_CHECK_PATH) {
        settings.session_check_path = check_path;
    }
    if let Some(cookie) = get(ENV_SESSION_COOKIE) {
        settings.session_cookie = Some(cookie);
    }
    if let Some(timeout) = get(ENV_REQUEST_TIMEOUT_SECS) {
        settings.request_timeout_secs = timeout
            .trim()
            .parse()
            .with_context(|| format!("Invalid {ENV_REQUEST_TIMEOUT_SECS}: {timeout}"))?;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_replace_fields() {
        let settings = apply_env_overrides(
            ClientSettings::default(),
            lookup_from(&[
                (ENV_BASE_URL, "https://finance.example/api/v1/"),
                (ENV_SESSION_COOKIE, "abc-123"),
                (ENV_REQUEST_TIMEOUT_SECS, "30"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://finance.example/api/v1/");
        assert_eq!(settings.session_cookie.as_deref(), Some("abc-123"));
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.login_path, "/login.html");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let settings = apply_env_overrides(
            ClientSettings::default(),
            lookup_from(&[(ENV_LOGIN_PATH, "  ")]),
        )
        .unwrap();
        assert_eq!(settings.login_path, "/login.html");
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let result = apply_env_overrides(
            ClientSettings::default(),
            lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_read_settings_file() {
        let dir = std::env::temp_dir().join(format!("settings_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard.json");
        fs::write(&path, r#"{"login_path": "/signin", "request_timeout_secs": 3}"#).unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.login_path, "/signin");
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.base_url, ClientSettings::default().base_url);

        fs::write(&path, "{ not json").unwrap();
        assert!(read_settings_file(&path).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
