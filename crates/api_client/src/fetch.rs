use models::FromPayload;
use serde_json::Value;

use crate::client::ApiClient;
use crate::endpoint::Endpoint;
use crate::session::SessionHalted;
use crate::transport::ApiRequest;

/// Outcome of a read. Live data and substituted defaults are distinct
/// variants so callers cannot confuse them.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    /// The read failed for a non-auth reason; this is the fallback data.
    Unavailable(T),
    /// The session was rejected and the redirect has been issued.
    Unauthorized(SessionHalted),
}

impl<T> Fetched<T> {
    pub fn is_live(&self) -> bool {
        matches!(self, Fetched::Live(_))
    }

    /// Data to use, live or fallback; the halt marker otherwise.
    pub fn into_result(self) -> Result<T, SessionHalted> {
        match self {
            Fetched::Live(data) | Fetched::Unavailable(data) => Ok(data),
            Fetched::Unauthorized(halted) => Err(halted),
        }
    }
}

impl ApiClient {
    /// Reads `endpoint`, substituting `fallback` on any failure other than
    /// an auth rejection.
    ///
    /// `decode` turns the parsed body into the caller's type; returning
    /// `None` marks the payload as unusable and selects the fallback.
    pub async fn fetch_with_fallback<T, F>(&self, endpoint: Endpoint, fallback: T, decode: F) -> Fetched<T>
    where
        F: FnOnce(Value) -> Option<T>,
    {
        if let Err(halted) = self.guard().ensure_active() {
            return Fetched::Unauthorized(halted);
        }

        let response = match self.transport().send(ApiRequest::get(endpoint)).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "API unavailable, using fallback data");
                return Fetched::Unavailable(fallback);
            }
        };

        if response.is_unauthorized() {
            return Fetched::Unauthorized(self.guard().reject(endpoint.path()));
        }
        if !response.is_success() {
            tracing::warn!(%endpoint, status = response.status, "API error, using fallback data");
            return Fetched::Unavailable(fallback);
        }

        let body = match response.parse_json() {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "malformed response body, using fallback data");
                return Fetched::Unavailable(fallback);
            }
        };

        match decode(body) {
            Some(data) => Fetched::Live(data),
            None => {
                tracing::warn!(%endpoint, "unexpected payload shape, using fallback data");
                Fetched::Unavailable(fallback)
            }
        }
    }

    /// Reads a single entity, coercing every field of the payload.
    pub async fn fetch_entity<T: FromPayload>(&self, endpoint: Endpoint, fallback: T) -> Fetched<T> {
        self.fetch_with_fallback(endpoint, fallback, |body| {
            body.is_object().then(|| T::from_payload(&body))
        })
        .await
    }

    /// Reads a list of entities. A body that is not an array is unusable.
    pub async fn fetch_list<T: FromPayload>(&self, endpoint: Endpoint, fallback: Vec<T>) -> Fetched<Vec<T>> {
        self.fetch_with_fallback(endpoint, fallback, |body| models::list_from_payload(&body))
            .await
    }
}
