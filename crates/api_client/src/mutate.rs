use models::Reconcile;
use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::endpoint::{Endpoint, Method};
use crate::session::SessionHalted;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Create,
    Update,
}

impl From<WriteMethod> for Method {
    fn from(method: WriteMethod) -> Self {
        match method {
            WriteMethod::Create => Method::Post,
            WriteMethod::Update => Method::Put,
        }
    }
}

/// Outcome of a write.
///
/// `R` is the server's representation, `P` the payload that was submitted;
/// they are the same type for most entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted<R, P = R> {
    /// The server accepted the write; its answer is authoritative.
    Confirmed(R),
    /// The write did not go through; the local payload is handed back for
    /// optimistic use.
    Local(P),
    Unauthorized(SessionHalted),
}

impl<T> Submitted<T, T> {
    /// The entity to keep, confirmed or local.
    pub fn into_entity(self) -> Result<T, SessionHalted> {
        match self {
            Submitted::Confirmed(entity) | Submitted::Local(entity) => Ok(entity),
            Submitted::Unauthorized(halted) => Err(halted),
        }
    }
}

impl ApiClient {
    /// Sends `payload` to `endpoint`. Never fails for transient reasons: any
    /// error, non-success status or unparseable answer returns the payload
    /// unchanged as [`Submitted::Local`].
    ///
    /// `base` is the entity the write should produce. Fields a confirmation
    /// leaves out are taken from it.
    pub async fn submit<P, R>(
        &self,
        endpoint: Endpoint,
        method: WriteMethod,
        payload: P,
        base: R,
    ) -> Submitted<R, P>
    where
        P: Serialize,
        R: Reconcile,
    {
        if let Err(halted) = self.guard().ensure_active() {
            return Submitted::Unauthorized(halted);
        }

        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "payload not serialisable, keeping local copy");
                return Submitted::Local(payload);
            }
        };

        let request = ApiRequest::with_body(method.into(), endpoint, body);
        let response = match self.transport().send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "write failed, applying locally");
                return Submitted::Local(payload);
            }
        };

        if response.is_unauthorized() {
            return Submitted::Unauthorized(self.guard().reject(endpoint.path()));
        }
        if !response.is_success() {
            tracing::warn!(%endpoint, status = response.status, "write rejected, applying locally");
            return Submitted::Local(payload);
        }

        match response.parse_json() {
            Ok(confirmed) if confirmed.is_object() => Submitted::Confirmed(R::reconcile(&confirmed, &base)),
            Ok(_) => {
                tracing::warn!(%endpoint, "unexpected confirmation shape, applying locally");
                Submitted::Local(payload)
            }
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "unreadable confirmation, applying locally");
                Submitted::Local(payload)
            }
        }
    }

    /// Posts an empty body to a command endpoint.
    ///
    /// Returns `Ok(true)` when the server accepted it and `Ok(false)` on any
    /// transient failure, which is logged.
    pub async fn command(&self, endpoint: Endpoint) -> Result<bool, SessionHalted> {
        self.guard().ensure_active()?;

        let request = ApiRequest::with_body(Method::Post, endpoint, Value::Object(Default::default()));
        match self.transport().send(request).await {
            Ok(response) if response.is_unauthorized() => Err(self.guard().reject(endpoint.path())),
            Ok(response) if response.is_success() => Ok(true),
            Ok(response) => {
                tracing::error!(%endpoint, status = response.status, "command rejected");
                Ok(false)
            }
            Err(err) => {
                tracing::error!(%endpoint, error = %err, "command failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use crate::session::{tests::CountingNavigator, SessionGuard};
    use models::{BudgetState, BudgetUpdate, Goal};
    use serde_json::json;
    use std::sync::Arc;

    fn client_with(transport: MemoryTransport) -> (ApiClient, Arc<MemoryTransport>) {
        let transport = Arc::new(transport);
        let guard = Arc::new(SessionGuard::new(
            "/login.html",
            Arc::new(CountingNavigator::default()),
        ));
        (ApiClient::new(transport.clone(), guard), transport)
    }

    fn goal() -> Goal {
        Goal {
            name: "Car".to_string(),
            date: "Jun 2027".to_string(),
            monthly: 250.0,
            total: 9000.0,
        }
    }

    #[tokio::test]
    async fn test_confirmed_entity_is_authoritative() {
        let (client, transport) = client_with(MemoryTransport::new().respond(
            Method::Put,
            Endpoint::Budget,
            200,
            json!({"spent": 80.0, "limit": 2500}),
        ));

        let outcome: Submitted<BudgetState, BudgetUpdate> = client
            .submit(
                Endpoint::Budget,
                WriteMethod::Update,
                BudgetUpdate { limit: 2500 },
                BudgetState { spent: 10.0, limit: 2500.0 },
            )
            .await;
        assert_eq!(outcome, Submitted::Confirmed(BudgetState { spent: 80.0, limit: 2500.0 }));

        let sent = transport.requests_to(Endpoint::Budget);
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].body, Some(json!({"limit": 2500})));
    }

    #[tokio::test]
    async fn test_server_may_normalise_the_entity() {
        let (client, _) = client_with(MemoryTransport::new().respond(
            Method::Post,
            Endpoint::Goals,
            201,
            json!({"name": "Car", "date": "Jun 2027", "monthly": "250", "total": 9000.5}),
        ));

        let saved = client
            .submit::<Goal, Goal>(Endpoint::Goals, WriteMethod::Create, goal(), goal())
            .await
            .into_entity()
            .unwrap();
        assert_eq!(saved.total, 9000.5);
        assert_eq!(saved.monthly, 250.0);
    }

    #[tokio::test]
    async fn test_bare_acknowledgement_keeps_base_entity() {
        let (client, _) = client_with(
            MemoryTransport::new()
                .respond(Method::Put, Endpoint::Budget, 200, json!({"message": "ok"}))
                .respond(Method::Post, Endpoint::Goals, 201, json!({})),
        );

        let base = BudgetState { spent: 500.0, limit: 2500.0 };
        let budget: Submitted<BudgetState, BudgetUpdate> = client
            .submit(Endpoint::Budget, WriteMethod::Update, BudgetUpdate { limit: 2500 }, base.clone())
            .await;
        assert_eq!(budget, Submitted::Confirmed(base));

        let saved: Submitted<Goal> = client.submit(Endpoint::Goals, WriteMethod::Create, goal(), goal()).await;
        assert_eq!(saved, Submitted::Confirmed(goal()));
    }

    #[tokio::test]
    async fn test_failures_return_local_payload() {
        let cases = [
            MemoryTransport::new().respond(Method::Post, Endpoint::Goals, 422, json!({"detail": []})),
            MemoryTransport::new().fail(Method::Post, Endpoint::Goals, "reset by peer"),
            MemoryTransport::new().respond_raw(Method::Post, Endpoint::Goals, 200, "not json"),
            MemoryTransport::new().respond(Method::Post, Endpoint::Goals, 200, json!([1, 2])),
        ];

        for transport in cases {
            let (client, _) = client_with(transport);
            let outcome: Submitted<Goal> = client.submit(Endpoint::Goals, WriteMethod::Create, goal(), goal()).await;
            assert_eq!(outcome, Submitted::Local(goal()));
        }
    }

    #[tokio::test]
    async fn test_unauthorized_write_halts() {
        let (client, _) = client_with(
            MemoryTransport::new().respond(Method::Post, Endpoint::Goals, 401, json!({})),
        );

        let outcome: Submitted<Goal> = client.submit(Endpoint::Goals, WriteMethod::Create, goal(), goal()).await;
        assert!(outcome.into_entity().is_err());
        assert!(client.guard().is_halted());
    }

    #[tokio::test]
    async fn test_command_outcomes() {
        let (client, transport) = client_with(
            MemoryTransport::new()
                .respond(Method::Post, Endpoint::BankConnect, 200, json!({"message": "ok"}))
                .respond(Method::Post, Endpoint::BankDisconnect, 500, json!({})),
        );

        assert_eq!(client.command(Endpoint::BankConnect).await, Ok(true));
        assert_eq!(client.command(Endpoint::BankDisconnect).await, Ok(false));
        assert_eq!(transport.requests_to(Endpoint::BankConnect)[0].body, Some(json!({})));

        let (client, _) = client_with(
            MemoryTransport::new().respond(Method::Post, Endpoint::BankConnect, 403, json!({})),
        );
        assert!(client.command(Endpoint::BankConnect).await.is_err());
        assert!(client.guard().is_halted());
    }
}
