use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::endpoint::{Endpoint, Method};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(endpoint: Endpoint) -> Self {
        Self {
            method: Method::Get,
            endpoint,
            body: None,
        }
    }

    pub fn with_body(method: Method, endpoint: Endpoint, body: Value) -> Self {
        Self {
            method,
            endpoint,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 and 403 both mean the session cannot be used.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    pub fn parse_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {endpoint} failed: {message}")]
    Request {
        method: Method,
        endpoint: Endpoint,
        message: String,
    },

    #[error("{method} {endpoint} timed out")]
    Timeout { method: Method, endpoint: Endpoint },

    #[error("no route for {method} {endpoint}")]
    Unrouted { method: Method, endpoint: Endpoint },
}

/// Sends one credentialed request and returns the raw response.
///
/// Implementations report only transport-level failures as errors; every
/// HTTP status, including 401, comes back as an [`ApiResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_classes() {
        assert!(ApiResponse::empty(200).is_success());
        assert!(ApiResponse::empty(201).is_success());
        assert!(!ApiResponse::empty(302).is_success());
        assert!(ApiResponse::empty(401).is_unauthorized());
        assert!(ApiResponse::empty(403).is_unauthorized());
        assert!(!ApiResponse::empty(404).is_unauthorized());
        assert!(!ApiResponse::empty(500).is_unauthorized());
    }

    #[test]
    fn test_parse_json() {
        let response = ApiResponse::json(200, &json!({"connected": true}));
        assert_eq!(response.parse_json().unwrap(), json!({"connected": true}));
        assert!(ApiResponse::empty(200).parse_json().is_err());
    }
}
