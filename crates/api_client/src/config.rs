use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use models::ClientSettings;
use reqwest::Url;

/// Validated connection settings for the dashboard API.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: Url,
    /// Absolute redirect target used when the session is rejected.
    pub login_url: Url,
    pub session_check_path: String,
    pub session_cookie: Option<String>,
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let base_url = validate_base_url(&settings.base_url)?;
        let login_url = base_url
            .join(&settings.login_path)
            .with_context(|| format!("Invalid login path: {}", settings.login_path))?;

        let session_check_path = settings.session_check_path.trim().trim_start_matches('/');
        if session_check_path.is_empty() {
            return Err(anyhow!("session_check_path must not be empty"));
        }

        Ok(Self {
            base_url,
            login_url,
            session_check_path: session_check_path.to_string(),
            session_cookie: settings.session_cookie.clone(),
            timeout: Duration::from_secs(settings.request_timeout_secs.max(1)),
        })
    }
}

/// Parses the API root and makes sure relative endpoint paths land beneath it.
fn validate_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).with_context(|| format!("Invalid API base URL: {base_url}"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(anyhow!(
                "Unsupported scheme '{other}' for API base URL (use http or https)"
            ))
        }
    }

    if url.host_str().is_none() {
        return Err(anyhow!("API base URL is missing a host"));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let config = ApiClientConfig::from_settings(&ClientSettings::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/api/v1/");
        assert_eq!(config.login_url.as_str(), "http://localhost:8000/login.html");
        assert_eq!(config.session_check_path, "auth/me");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_trailing_slash_is_added() {
        let settings = ClientSettings {
            base_url: "https://finance.example/api/v1".to_string(),
            ..ClientSettings::default()
        };
        let config = ApiClientConfig::from_settings(&settings).unwrap();
        assert_eq!(
            config.base_url.join("budget").unwrap().as_str(),
            "https://finance.example/api/v1/budget"
        );
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let settings = ClientSettings {
            base_url: "ftp://finance.example/api/v1/".to_string(),
            ..ClientSettings::default()
        };
        assert!(ApiClientConfig::from_settings(&settings).is_err());

        let settings = ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        };
        assert!(ApiClientConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_empty_session_check_path() {
        let settings = ClientSettings {
            session_check_path: " / ".to_string(),
            ..ClientSettings::default()
        };
        assert!(ApiClientConfig::from_settings(&settings).is_err());
    }
}
