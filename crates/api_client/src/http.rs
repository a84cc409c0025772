use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};

use crate::config::ApiClientConfig;
use crate::endpoint::{Endpoint, Method};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

const SESSION_COOKIE_NAME: &str = "session_id";

/// Transport backed by `reqwest`.
///
/// Requests are credentialed: a cookie store keeps whatever the server sets,
/// seeded with the configured session cookie.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
    session_check_path: String,
}

impl HttpTransport {
    pub fn new(config: &ApiClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        if let Some(session) = &config.session_cookie {
            jar.add_cookie_str(
                &format!("{SESSION_COOKIE_NAME}={session}; Path=/"),
                &config.base_url,
            );
        }

        let http = Client::builder()
            .default_headers(headers)
            .cookie_provider(jar)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session_check_path: config.session_check_path.clone(),
        })
    }

    /// Absolute URL of `endpoint` beneath the API root.
    pub fn url_for(&self, endpoint: Endpoint) -> Option<Url> {
        let path = match endpoint {
            Endpoint::SessionCheck => self.session_check_path.as_str(),
            other => other.path(),
        };
        self.base_url.join(path).ok()
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let ApiRequest {
            method,
            endpoint,
            body,
        } = request;

        let failed = |message: String| TransportError::Request {
            method,
            endpoint,
            message,
        };

        let url = self
            .url_for(endpoint)
            .ok_or_else(|| failed(format!("cannot join {endpoint} onto {}", self.base_url)))?;
        tracing::debug!(%method, %url, "sending request");

        let mut builder = self.http.request(method.into(), url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { method, endpoint }
            } else {
                failed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| failed(format!("failed to read body: {e}")))?;

        Ok(ApiResponse {
            status,
            body: bytes.to_vec(),
        })
    }
}
