//! In-memory transport with scripted responses.
//!
//! Used by tests and by offline mode, where an empty script makes every
//! request fail and the dashboard renders from fallback data.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::{Endpoint, Method};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

/// Answers requests from a per-route queue. The last scripted answer for a
/// route is repeated once the queue is down to one entry; unscripted routes
/// fail with [`TransportError::Unrouted`].
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<(Method, Endpoint), VecDeque<Scripted>>>,
    delays: HashMap<Endpoint, Duration>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, method: Method, endpoint: Endpoint, status: u16, body: Value) -> Self {
        self.script(method, endpoint, Scripted::Respond(ApiResponse::json(status, &body)))
    }

    /// Scripts a response whose body is not valid JSON.
    pub fn respond_raw(self, method: Method, endpoint: Endpoint, status: u16, body: &str) -> Self {
        let response = ApiResponse {
            status,
            body: body.as_bytes().to_vec(),
        };
        self.script(method, endpoint, Scripted::Respond(response))
    }

    pub fn fail(self, method: Method, endpoint: Endpoint, message: &str) -> Self {
        self.script(method, endpoint, Scripted::Fail(message.to_string()))
    }

    /// Delays every answer for `endpoint`, to shuffle completion order.
    pub fn with_delay(mut self, endpoint: Endpoint, delay: Duration) -> Self {
        self.delays.insert(endpoint, delay);
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.endpoint == endpoint)
            .collect()
    }

    fn script(self, method: Method, endpoint: Endpoint, answer: Scripted) -> Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, endpoint))
            .or_default()
            .push_back(answer);
        self
    }

    fn next_answer(&self, method: Method, endpoint: Endpoint) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(&(method, endpoint))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let (method, endpoint) = (request.method, request.endpoint);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if let Some(delay) = self.delays.get(&endpoint) {
            tokio::time::sleep(*delay).await;
        }

        match self.next_answer(method, endpoint) {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(TransportError::Request {
                method,
                endpoint,
                message,
            }),
            None => Err(TransportError::Unrouted { method, endpoint }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queue_then_repeat_last() {
        let transport = MemoryTransport::new()
            .respond(Method::Get, Endpoint::Budget, 500, json!({}))
            .respond(Method::Get, Endpoint::Budget, 200, json!({"spent": 1, "limit": 2}));

        let first = transport.send(ApiRequest::get(Endpoint::Budget)).await.unwrap();
        let second = transport.send(ApiRequest::get(Endpoint::Budget)).await.unwrap();
        let third = transport.send(ApiRequest::get(Endpoint::Budget)).await.unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(transport.requests_to(Endpoint::Budget).len(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_route_fails() {
        let transport = MemoryTransport::new();
        let err = transport.send(ApiRequest::get(Endpoint::Goals)).await.unwrap_err();
        assert!(matches!(err, TransportError::Unrouted { endpoint: Endpoint::Goals, .. }));
    }
}
