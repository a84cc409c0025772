use std::sync::Arc;

use anyhow::Result;

use crate::config::ApiClientConfig;
use crate::endpoint::Endpoint;
use crate::http::HttpTransport;
use crate::session::{Navigator, SessionGuard, SessionHalted, SessionState};
use crate::transport::{ApiRequest, Transport};

/// Entry point for every dashboard request: a transport plus the session
/// guard all requests report to.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    guard: Arc<SessionGuard>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, guard: Arc<SessionGuard>) -> Self {
        Self { transport, guard }
    }

    /// Builds a client that talks HTTP to the configured API.
    pub fn http(config: &ApiClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let guard = SessionGuard::new(config.login_url.as_str(), navigator);
        Ok(Self::new(Arc::new(transport), Arc::new(guard)))
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Checks the session before anything else runs.
    ///
    /// Fails closed on 401/403 (redirect, terminal) and open on everything
    /// else, so an outage still lets the dashboard render fallback data.
    pub async fn require_auth(&self) -> Result<SessionState, SessionHalted> {
        self.guard.begin_check()?;

        match self.transport.send(ApiRequest::get(Endpoint::SessionCheck)).await {
            Ok(response) if response.is_unauthorized() => {
                return Err(self.guard.reject(Endpoint::SessionCheck.path()));
            }
            Ok(response) if !response.is_success() => {
                tracing::warn!(
                    status = response.status,
                    "session check unavailable, continuing without confirmation"
                );
            }
            Ok(_) => tracing::debug!("session confirmed"),
            Err(err) => {
                tracing::warn!(error = %err, "session check failed, continuing without confirmation");
            }
        }

        self.guard.mark_authenticated()?;
        Ok(self.guard.state())
    }

    /// Ends the session. The logout call is best effort; the redirect
    /// happens whatever the server answers.
    pub async fn logout(&self) -> SessionHalted {
        if let Err(halted) = self.guard.ensure_active() {
            return halted;
        }

        let request = ApiRequest::with_body(
            crate::endpoint::Method::Post,
            Endpoint::Logout,
            serde_json::json!({}),
        );
        match self.transport.send(request).await {
            Ok(response) if response.is_success() => tracing::info!("logged out"),
            Ok(response) => tracing::debug!(status = response.status, "logout not acknowledged"),
            Err(err) => tracing::debug!(error = %err, "logout request failed"),
        }

        self.guard.reject(Endpoint::Logout.path())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("guard", &self.guard).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Method;
    use crate::memory::MemoryTransport;
    use crate::session::tests::CountingNavigator;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn client_with(transport: MemoryTransport) -> (ApiClient, Arc<MemoryTransport>, Arc<CountingNavigator>) {
        let transport = Arc::new(transport);
        let navigator = Arc::new(CountingNavigator::default());
        let guard = Arc::new(SessionGuard::new("/login.html", navigator.clone()));
        (ApiClient::new(transport.clone(), guard), transport, navigator)
    }

    #[tokio::test]
    async fn test_require_auth_passes_on_success() {
        let (client, _, navigator) = client_with(
            MemoryTransport::new().respond(Method::Get, Endpoint::SessionCheck, 200, json!({"email": "a@b.c"})),
        );
        assert_eq!(client.require_auth().await, Ok(SessionState::Authenticated));
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_require_auth_redirects_on_401_and_403() {
        for status in [401, 403] {
            let (client, _, navigator) = client_with(
                MemoryTransport::new().respond(Method::Get, Endpoint::SessionCheck, status, json!({})),
            );
            let halted = client.require_auth().await.unwrap_err();
            assert_eq!(halted.destination, "/login.html");
            assert_eq!(client.guard().state(), SessionState::Redirecting);
            assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_require_auth_fails_open_on_outage() {
        let (client, _, _) = client_with(
            MemoryTransport::new().respond(Method::Get, Endpoint::SessionCheck, 503, json!({})),
        );
        assert_eq!(client.require_auth().await, Ok(SessionState::Authenticated));

        let (client, _, _) = client_with(MemoryTransport::new());
        assert_eq!(client.require_auth().await, Ok(SessionState::Authenticated));
    }

    #[tokio::test]
    async fn test_logout_redirects_even_when_request_fails() {
        let (client, transport, navigator) = client_with(MemoryTransport::new());
        let halted = client.logout().await;
        assert_eq!(halted.destination, "/login.html");
        assert!(client.guard().is_halted());
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
        assert_eq!(transport.requests().len(), 1);

        // Nothing is sent once halted.
        client.logout().await;
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
    }
}
