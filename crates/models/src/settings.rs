use serde::{Deserialize, Serialize};

/// Connection settings for the dashboard client.
///
/// Every field has a default so a partial `dashboard.json` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Root of the versioned API; endpoint paths are joined beneath it.
    pub base_url: String,
    /// Where the client is sent when the session is rejected.
    pub login_path: String,
    pub session_check_path: String,
    /// Value of the `session_id` cookie issued at login, if any.
    pub session_cookie: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            login_path: "/login.html".to_string(),
            session_check_path: "auth/me".to_string(),
            session_cookie: None,
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url": "https://finance.example/api/v1/"}"#).unwrap();
        assert_eq!(settings.base_url, "https://finance.example/api/v1/");
        assert_eq!(settings.login_path, "/login.html");
        assert_eq!(settings.session_check_path, "auth/me");
        assert_eq!(settings.session_cookie, None);
        assert_eq!(settings.request_timeout_secs, 10);
    }
}
